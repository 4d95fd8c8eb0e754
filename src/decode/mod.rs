/// DDS decoding strategies
///
/// This module handles:
/// - The `DdsDecoder` capability every strategy implements
/// - The canonical 16-bit RGBA image handed out on success
/// - Normalizing heterogeneous decoder output into that image
/// - Writing the PNG artifact without leaving partial files behind
///
/// Strategies, in cascade order:
/// 1. `SurfaceDecoder` - image_dds, broadest in-process coverage
/// 2. `BlockDecoder` - ddsfile container + bcdec_rs block decompression
/// 3. `NativeOrderDecoder` - uncompressed bitmask reader, BGR(A) native order
/// 4. `StagedDecoder` - basic uncompressed formats staged through an intermediate PNG
/// 5. `TexconvDecoder` - external texconv executable found on PATH

pub mod block;
pub mod native;
pub mod normalize;
pub mod staged;
pub mod surface;
pub mod texconv;

pub use block::BlockDecoder;
pub use native::NativeOrderDecoder;
pub use staged::StagedDecoder;
pub use surface::SurfaceDecoder;
pub use texconv::TexconvDecoder;

use crate::error::DecodeError;
use image::{ImageBuffer, ImageFormat, Rgba};
use image_dds::ddsfile::Dds;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Canonical pixel storage: RGBA, 16 bits per channel.
pub type Rgba16Buffer = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// A successfully decoded texture in canonical form.
///
/// Every strategy normalizes into this layout before returning, so callers
/// never see which decoder produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    buffer: Rgba16Buffer,
}

impl DecodedImage {
    pub fn new(buffer: Rgba16Buffer) -> Self {
        Self { buffer }
    }

    /// Build from interleaved RGBA samples.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u16>) -> Result<Self, DecodeError> {
        let expected = surface_len(width, height, 4)?;
        let found = samples.len();
        ImageBuffer::from_raw(width, height, samples)
            .map(Self::new)
            .ok_or(DecodeError::Truncated { expected, found })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// RGBA sample at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u16; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn samples(&self) -> &[u16] {
        self.buffer.as_raw()
    }

    pub fn buffer(&self) -> &Rgba16Buffer {
        &self.buffer
    }
}

/// One way of turning a DDS file into a canonical image.
///
/// On success the implementation has written a 16-bit PNG to `output` and
/// returns the image. On failure nothing is left at `output` by this call.
pub trait DdsDecoder {
    /// Short name used in failure log lines.
    fn name(&self) -> &'static str;

    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedImage, DecodeError>;
}

/// Number of elements in a `width`×`height` surface with `per_pixel` elements
/// per pixel. Header dimensions are untrusted, so overflow is a decode error.
pub(crate) fn surface_len(
    width: u32,
    height: u32,
    per_pixel: usize,
) -> Result<usize, DecodeError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(per_pixel))
        .ok_or_else(|| {
            DecodeError::UnsupportedFormat(format!("{}x{} surface is too large", width, height))
        })
}

/// Parse the DDS container with ddsfile.
pub(crate) fn read_container(input: &Path) -> Result<Dds, DecodeError> {
    let mut reader = BufReader::new(File::open(input)?);
    Dds::read(&mut reader).map_err(|e| DecodeError::Container(e.to_string()))
}

/// Write the image as a 16-bit RGBA PNG at `output`.
///
/// The PNG is encoded into a temporary file next to `output` and renamed into
/// place, so a failed write never leaves a truncated file at `output`.
pub fn persist_png(image: &DecodedImage, output: &Path) -> Result<(), DecodeError> {
    let persist_err = |reason: String| DecodeError::Persist {
        path: output.to_path_buf(),
        reason,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staging = tempfile::Builder::new()
        .prefix(".dds2png-")
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(|e| persist_err(e.to_string()))?;

    {
        let mut writer = BufWriter::new(staging.as_file_mut());
        image
            .buffer
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|e| persist_err(e.to_string()))?;
        writer.flush().map_err(|e| persist_err(e.to_string()))?;
    }

    staging
        .persist(output)
        .map_err(|e| persist_err(e.error.to_string()))?;
    Ok(())
}
