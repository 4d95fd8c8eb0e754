//! Third strategy: uncompressed surfaces read straight from the pixel-format
//! bitmasks in the legacy DDS header.
//!
//! Samples are assembled in blue-first order, the way they sit in memory for
//! the usual A8R8G8B8 / R8G8B8 layouts, and handed to the normalizer as BGR(A).
//! 8-bit samples are promoted by ×257; the 16-bit A16B16G16R16 layout passes
//! through unscaled.

use super::normalize::{self, ChannelOrder};
use super::{persist_png, surface_len, DdsDecoder, DecodedImage};
use crate::error::DecodeError;
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 4] = b"DDS ";
const HEADER_LEN: usize = 128;

const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDPF_LUMINANCE: u32 = 0x20000;

/// D3DFMT_A16B16G16R16 stored as a numeric FourCC
const FOURCC_A16B16G16R16: u32 = 36;

/// Fields of the 128-byte legacy header this decoder needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LegacyHeader {
    width: u32,
    height: u32,
    pf_flags: u32,
    fourcc: u32,
    bit_count: u32,
    masks: [u32; 4],
}

impl LegacyHeader {
    fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::Truncated {
                expected: HEADER_LEN,
                found: bytes.len(),
            });
        }
        if &bytes[..4] != MAGIC {
            return Err(DecodeError::Container("missing DDS magic".to_string()));
        }

        let word = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        Ok(Self {
            height: word(12),
            width: word(16),
            pf_flags: word(80),
            fourcc: word(84),
            bit_count: word(88),
            masks: [word(92), word(96), word(100), word(104)],
        })
    }
}

/// One channel extracted from a packed pixel through its bitmask.
#[derive(Debug, Clone, Copy)]
struct MaskChannel {
    mask: u32,
    shift: u32,
    max: u32,
}

impl MaskChannel {
    fn new(mask: u32) -> Result<Self, DecodeError> {
        let bits = mask.count_ones();
        if bits == 0 || bits > 8 {
            return Err(DecodeError::UnsupportedFormat(format!(
                "channel mask {:#010x}",
                mask
            )));
        }
        Ok(Self {
            mask,
            shift: mask.trailing_zeros(),
            max: (1u32 << bits) - 1,
        })
    }

    /// Rescale to 8 bits (exact for 8-bit masks).
    fn extract(self, pixel: u32) -> u8 {
        let value = (pixel & self.mask) >> self.shift;
        ((value * 255 + self.max / 2) / self.max) as u8
    }
}

/// Reads uncompressed 8/16/24/32-bit RGB, RGBA and luminance surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeOrderDecoder;

impl DdsDecoder for NativeOrderDecoder {
    fn name(&self) -> &'static str {
        "native"
    }

    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedImage, DecodeError> {
        let bytes = fs::read(input)?;
        let header = LegacyHeader::parse(&bytes)?;
        let image = decode_surface(&header, &bytes[HEADER_LEN..])?;
        persist_png(&image, output)?;
        Ok(image)
    }
}

fn decode_surface(header: &LegacyHeader, data: &[u8]) -> Result<DecodedImage, DecodeError> {
    let (width, height) = (header.width, header.height);

    if header.pf_flags & DDPF_FOURCC != 0 {
        if header.fourcc != FOURCC_A16B16G16R16 {
            return Err(DecodeError::UnsupportedFormat(format!(
                "compressed or unknown FourCC {:#010x}",
                header.fourcc
            )));
        }
        let expected = surface_len(width, height, 8)?;
        check_len(data, expected)?;
        let bgra: Vec<u16> = data[..expected]
            .chunks_exact(8)
            .flat_map(|px| {
                let sample = |i: usize| u16::from_le_bytes([px[i * 2], px[i * 2 + 1]]);
                [sample(2), sample(1), sample(0), sample(3)]
            })
            .collect();
        return normalize::from_samples_u16(width, height, 4, ChannelOrder::Bgr, &bgra);
    }

    let luminance = header.pf_flags & DDPF_LUMINANCE != 0;
    if header.pf_flags & DDPF_RGB == 0 && !luminance {
        return Err(DecodeError::UnsupportedFormat(format!(
            "pixel format flags {:#x}",
            header.pf_flags
        )));
    }

    let bytes_per_pixel = match header.bit_count {
        8 | 16 | 24 | 32 => header.bit_count as usize / 8,
        other => {
            return Err(DecodeError::UnsupportedFormat(format!(
                "{} bits per pixel",
                other
            )))
        }
    };
    let expected = surface_len(width, height, bytes_per_pixel)?;
    check_len(data, expected)?;

    let [r_mask, g_mask, b_mask, a_mask] = header.masks;
    let alpha = if header.pf_flags & DDPF_ALPHAPIXELS != 0 && a_mask != 0 {
        Some(MaskChannel::new(a_mask)?)
    } else {
        None
    };

    let color = if luminance {
        let l = MaskChannel::new(r_mask)?;
        [l, l, l]
    } else {
        [
            MaskChannel::new(b_mask)?,
            MaskChannel::new(g_mask)?,
            MaskChannel::new(r_mask)?,
        ]
    };

    let channels = if alpha.is_some() { 4 } else { 3 };
    let mut bgr = Vec::with_capacity(expected / bytes_per_pixel * channels);
    for px in data[..expected].chunks_exact(bytes_per_pixel) {
        let mut packed = [0u8; 4];
        packed[..bytes_per_pixel].copy_from_slice(px);
        let pixel = u32::from_le_bytes(packed);

        bgr.extend(color.iter().map(|c| c.extract(pixel)));
        if let Some(a) = alpha {
            bgr.push(a.extract(pixel));
        }
    }

    normalize::from_samples_u8(width, height, channels, ChannelOrder::Bgr, &bgr)
}

fn check_len(data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            found: data.len(),
        });
    }
    Ok(())
}
