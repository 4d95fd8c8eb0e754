//! Conversion of decoder output into the canonical 16-bit RGBA layout.
//!
//! 8-bit samples are promoted by multiplying with 257, which maps 0..=255
//! onto the full 0..=65535 range (255 becomes 65535, not 65280 as a left
//! shift would give). 16-bit samples pass through untouched.

use super::{surface_len, DecodedImage};
use crate::error::DecodeError;
use image::{DynamicImage, RgbaImage};

/// Memory order of the color channels handed to the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Red first (canonical).
    Rgb,
    /// Blue first; swapped to red first during normalization.
    Bgr,
}

/// Full-range promotion of one 8-bit sample.
#[inline]
pub fn promote_u8(value: u8) -> u16 {
    u16::from(value) * 257
}

/// Normalize 8-bit interleaved samples with 1, 3 or 4 channels.
///
/// Gray input is replicated into all three color channels; missing alpha is
/// filled with full opacity.
pub fn from_samples_u8(
    width: u32,
    height: u32,
    channels: usize,
    order: ChannelOrder,
    samples: &[u8],
) -> Result<DecodedImage, DecodeError> {
    let promoted: Vec<u16> = samples.iter().copied().map(promote_u8).collect();
    from_samples_u16(width, height, channels, order, &promoted)
}

/// Normalize 16-bit interleaved samples with 1, 3 or 4 channels.
pub fn from_samples_u16(
    width: u32,
    height: u32,
    channels: usize,
    order: ChannelOrder,
    samples: &[u16],
) -> Result<DecodedImage, DecodeError> {
    if !matches!(channels, 1 | 3 | 4) {
        return Err(DecodeError::UnsupportedFormat(format!(
            "{} channels per pixel",
            channels
        )));
    }

    let expected = surface_len(width, height, channels)?;
    if samples.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            found: samples.len(),
        });
    }

    let mut out = Vec::with_capacity(expected / channels * 4);
    for pixel in samples[..expected].chunks_exact(channels) {
        let (r, g, b, a) = match (channels, order) {
            (1, _) => (pixel[0], pixel[0], pixel[0], u16::MAX),
            (3, ChannelOrder::Rgb) => (pixel[0], pixel[1], pixel[2], u16::MAX),
            (3, ChannelOrder::Bgr) => (pixel[2], pixel[1], pixel[0], u16::MAX),
            (_, ChannelOrder::Rgb) => (pixel[0], pixel[1], pixel[2], pixel[3]),
            (_, ChannelOrder::Bgr) => (pixel[2], pixel[1], pixel[0], pixel[3]),
        };
        out.extend_from_slice(&[r, g, b, a]);
    }

    DecodedImage::from_raw(width, height, out)
}

/// Normalize an 8-bit RGBA buffer.
pub fn from_rgba8(image: &RgbaImage) -> Result<DecodedImage, DecodeError> {
    from_samples_u8(
        image.width(),
        image.height(),
        4,
        ChannelOrder::Rgb,
        image.as_raw(),
    )
}

/// Normalize whatever the `image` crate handed back from a PNG.
///
/// 8-bit layouts get the explicit ×257 promotion, 16-bit layouts pass
/// through, anything else goes through the crate's own RGBA16 conversion.
pub fn from_dynamic(image: DynamicImage) -> Result<DecodedImage, DecodeError> {
    let (width, height) = (image.width(), image.height());
    match image {
        DynamicImage::ImageLuma8(buf) => {
            from_samples_u8(width, height, 1, ChannelOrder::Rgb, buf.as_raw())
        }
        DynamicImage::ImageRgb8(buf) => {
            from_samples_u8(width, height, 3, ChannelOrder::Rgb, buf.as_raw())
        }
        DynamicImage::ImageRgba8(buf) => from_rgba8(&buf),
        DynamicImage::ImageLuma16(buf) => {
            from_samples_u16(width, height, 1, ChannelOrder::Rgb, buf.as_raw())
        }
        DynamicImage::ImageRgb16(buf) => {
            from_samples_u16(width, height, 3, ChannelOrder::Rgb, buf.as_raw())
        }
        DynamicImage::ImageRgba16(buf) => Ok(DecodedImage::new(buf)),
        other => Ok(DecodedImage::new(other.to_rgba16())),
    }
}
