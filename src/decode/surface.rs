//! First strategy: image_dds.
//!
//! Covers the common DDS encodings (BC1-BC7, most uncompressed and float
//! layouts). The crate hands back 8-bit RGBA, which is promoted to 16 bits.

use super::{normalize, persist_png, read_container, DdsDecoder, DecodedImage};
use crate::error::DecodeError;
use std::path::Path;

/// Decodes the base mip level with `image_dds`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceDecoder;

impl DdsDecoder for SurfaceDecoder {
    fn name(&self) -> &'static str {
        "image_dds"
    }

    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedImage, DecodeError> {
        let dds = read_container(input)?;

        let rgba = image_dds::image_from_dds(&dds, 0)
            .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

        let image = normalize::from_rgba8(&rgba)?;
        persist_png(&image, output)?;
        Ok(image)
    }
}
