//! Fourth strategy: basic uncompressed 8-bit surfaces staged through an
//! intermediate PNG.
//!
//! The surface is copied into an 8-bit RGBA buffer, written to a scratch PNG
//! next to the output, and reopened with `image::open` so normalization runs
//! on exactly what a generic image loader sees.

use super::{normalize, persist_png, read_container, surface_len, DdsDecoder, DecodedImage};
use crate::error::DecodeError;
use image::RgbaImage;
use image_dds::ddsfile::{D3DFormat, Dds, DxgiFormat};
use std::path::Path;

/// Byte layout of one pixel in the source surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Rgba,
    Bgra,
    Bgrx,
    Bgr,
}

impl Layout {
    fn from_dds(dds: &Dds) -> Result<Self, DecodeError> {
        if let Some(format) = dds.get_dxgi_format() {
            return match format {
                DxgiFormat::R8G8B8A8_UNorm | DxgiFormat::R8G8B8A8_UNorm_sRGB => Ok(Layout::Rgba),
                DxgiFormat::B8G8R8A8_UNorm | DxgiFormat::B8G8R8A8_UNorm_sRGB => Ok(Layout::Bgra),
                DxgiFormat::B8G8R8X8_UNorm | DxgiFormat::B8G8R8X8_UNorm_sRGB => Ok(Layout::Bgrx),
                other => Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
            };
        }
        match dds.get_d3d_format() {
            Some(D3DFormat::A8B8G8R8) => Ok(Layout::Rgba),
            Some(D3DFormat::A8R8G8B8) => Ok(Layout::Bgra),
            Some(D3DFormat::X8R8G8B8) => Ok(Layout::Bgrx),
            Some(D3DFormat::R8G8B8) => Ok(Layout::Bgr),
            Some(other) => Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
            None => Err(DecodeError::UnsupportedFormat(
                "unrecognized pixel format".to_string(),
            )),
        }
    }

    fn bytes_per_pixel(self) -> usize {
        match self {
            Layout::Bgr => 3,
            _ => 4,
        }
    }

    fn to_rgba(self, px: &[u8]) -> [u8; 4] {
        match self {
            Layout::Rgba => [px[0], px[1], px[2], px[3]],
            Layout::Bgra => [px[2], px[1], px[0], px[3]],
            Layout::Bgrx => [px[2], px[1], px[0], 255],
            Layout::Bgr => [px[2], px[1], px[0], 255],
        }
    }
}

/// Loads 8-bit RGBA/BGRA/BGRX/BGR surfaces only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedDecoder;

impl DdsDecoder for StagedDecoder {
    fn name(&self) -> &'static str {
        "staged"
    }

    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedImage, DecodeError> {
        let dds = read_container(input)?;
        let layout = Layout::from_dds(&dds)?;
        let surface = to_rgba_image(layout, dds.get_width(), dds.get_height(), &dds.data)?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Removed on drop, whichever way this returns.
        let scratch = tempfile::Builder::new()
            .prefix(".dds2png-stage-")
            .suffix(".png")
            .tempfile_in(dir)?;
        surface.save_with_format(scratch.path(), image::ImageFormat::Png)?;

        let reopened = image::open(scratch.path())?;
        let image = normalize::from_dynamic(reopened)?;
        persist_png(&image, output)?;
        Ok(image)
    }
}

fn to_rgba_image(
    layout: Layout,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<RgbaImage, DecodeError> {
    let bpp = layout.bytes_per_pixel();
    let expected = surface_len(width, height, bpp)?;
    if data.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            found: data.len(),
        });
    }

    let rgba: Vec<u8> = data[..expected]
        .chunks_exact(bpp)
        .flat_map(|px| layout.to_rgba(px))
        .collect();

    let found = rgba.len();
    RgbaImage::from_raw(width, height, rgba).ok_or(DecodeError::Truncated {
        expected: expected / bpp * 4,
        found,
    })
}
