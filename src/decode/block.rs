//! Second strategy: ddsfile container parsing with bcdec_rs block decoding.
//!
//! Narrower than image_dds but independent of it, so a texture that trips one
//! decoder's header handling can still be read here.

use super::normalize::{self, ChannelOrder};
use super::{persist_png, read_container, surface_len, DdsDecoder, DecodedImage};
use crate::error::DecodeError;
use image_dds::ddsfile::{D3DFormat, Dds, DxgiFormat};
use std::path::Path;

/// Surface layouts this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockFormat {
    Bc1,
    Bc2,
    Bc3,
    Bc7,
    Rgba8,
    Bgra8,
}

impl BlockFormat {
    /// Bytes per 4×4 block, or `None` for uncompressed layouts.
    fn block_bytes(self) -> Option<usize> {
        match self {
            BlockFormat::Bc1 => Some(8),
            BlockFormat::Bc2 | BlockFormat::Bc3 | BlockFormat::Bc7 => Some(16),
            BlockFormat::Rgba8 | BlockFormat::Bgra8 => None,
        }
    }

    fn from_dds(dds: &Dds) -> Result<Self, DecodeError> {
        if let Some(format) = dds.get_dxgi_format() {
            return match format {
                DxgiFormat::BC1_UNorm | DxgiFormat::BC1_UNorm_sRGB => Ok(BlockFormat::Bc1),
                DxgiFormat::BC2_UNorm | DxgiFormat::BC2_UNorm_sRGB => Ok(BlockFormat::Bc2),
                DxgiFormat::BC3_UNorm | DxgiFormat::BC3_UNorm_sRGB => Ok(BlockFormat::Bc3),
                DxgiFormat::BC7_UNorm | DxgiFormat::BC7_UNorm_sRGB => Ok(BlockFormat::Bc7),
                DxgiFormat::R8G8B8A8_UNorm | DxgiFormat::R8G8B8A8_UNorm_sRGB => {
                    Ok(BlockFormat::Rgba8)
                }
                DxgiFormat::B8G8R8A8_UNorm | DxgiFormat::B8G8R8A8_UNorm_sRGB => {
                    Ok(BlockFormat::Bgra8)
                }
                other => Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
            };
        }

        match dds.get_d3d_format() {
            Some(D3DFormat::DXT1) => Ok(BlockFormat::Bc1),
            Some(D3DFormat::DXT2) | Some(D3DFormat::DXT3) => Ok(BlockFormat::Bc2),
            Some(D3DFormat::DXT4) | Some(D3DFormat::DXT5) => Ok(BlockFormat::Bc3),
            Some(D3DFormat::A8B8G8R8) => Ok(BlockFormat::Rgba8),
            Some(D3DFormat::A8R8G8B8) => Ok(BlockFormat::Bgra8),
            Some(other) => Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
            None => Err(DecodeError::UnsupportedFormat(
                "unrecognized pixel format".to_string(),
            )),
        }
    }
}

/// Decodes BC1/BC2/BC3/BC7 and 8-bit RGBA/BGRA surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockDecoder;

impl DdsDecoder for BlockDecoder {
    fn name(&self) -> &'static str {
        "bcdec"
    }

    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedImage, DecodeError> {
        let dds = read_container(input)?;
        let format = BlockFormat::from_dds(&dds)?;
        let (width, height) = (dds.get_width(), dds.get_height());

        let image = match format.block_bytes() {
            Some(block_bytes) => {
                let rgba = decompress_blocks(format, width, height, block_bytes, &dds.data)?;
                normalize::from_samples_u8(width, height, 4, ChannelOrder::Rgb, &rgba)?
            }
            None => {
                let order = match format {
                    BlockFormat::Bgra8 => ChannelOrder::Bgr,
                    _ => ChannelOrder::Rgb,
                };
                normalize::from_samples_u8(width, height, 4, order, &dds.data)?
            }
        };

        persist_png(&image, output)?;
        Ok(image)
    }
}

/// Decompress the base level into tightly packed RGBA8.
fn decompress_blocks(
    format: BlockFormat,
    width: u32,
    height: u32,
    block_bytes: usize,
    data: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let out_len = surface_len(width, height, 4)?;
    let blocks_wide = width.div_ceil(4) as usize;
    let expected = surface_len(width.div_ceil(4), height.div_ceil(4), block_bytes)?;
    if data.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            found: data.len(),
        });
    }

    let mut out = vec![0u8; out_len];
    let (width, height) = (width as usize, height as usize);
    let mut decoded = [0u8; 4 * 4 * 4];

    for (index, block) in data[..expected].chunks_exact(block_bytes).enumerate() {
        match format {
            BlockFormat::Bc1 => bcdec_rs::bc1(block, &mut decoded, 4 * 4),
            BlockFormat::Bc2 => bcdec_rs::bc2(block, &mut decoded, 4 * 4),
            BlockFormat::Bc3 => bcdec_rs::bc3(block, &mut decoded, 4 * 4),
            BlockFormat::Bc7 => bcdec_rs::bc7(block, &mut decoded, 4 * 4),
            BlockFormat::Rgba8 | BlockFormat::Bgra8 => {
                return Err(DecodeError::UnsupportedFormat(format!(
                    "{:?} is not block compressed",
                    format
                )))
            }
        }

        let bx = (index % blocks_wide) * 4;
        let by = (index / blocks_wide) * 4;

        // Edge blocks hang past the image; clip them.
        for py in 0..4 {
            let y = by + py;
            if y >= height {
                break;
            }
            let columns = 4.min(width - bx);
            let src = py * 16;
            let dst = (y * width + bx) * 4;
            out[dst..dst + columns * 4].copy_from_slice(&decoded[src..src + columns * 4]);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    // color0 = color1 = 0xffff, all indices 0
    const WHITE_BC1: [u8; 8] = [0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00];

    #[test]
    fn test_bc1_solid_white_block() {
        let rgba = decompress_blocks(BlockFormat::Bc1, 4, 4, 8, &WHITE_BC1).unwrap();
        assert_eq!(rgba.len(), 64);
        assert!(rgba.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn test_edge_blocks_are_clipped() {
        let rgba = decompress_blocks(BlockFormat::Bc1, 3, 2, 8, &WHITE_BC1).unwrap();
        assert_eq!(rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn test_truncated_surface() {
        let result = decompress_blocks(BlockFormat::Bc3, 8, 8, 16, &[0u8; 32]);
        assert!(matches!(
            result,
            Err(DecodeError::Truncated {
                expected: 64,
                found: 32
            })
        ));
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(BlockFormat::Bc1.block_bytes(), Some(8));
        assert_eq!(BlockFormat::Bc7.block_bytes(), Some(16));
        assert_eq!(BlockFormat::Bgra8.block_bytes(), None);
    }

    #[test]
    fn test_decodes_dxt1_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tex.dds");
        let output = dir.path().join("tex.png");
        // White block on the left, opaque black block on the right
        let data = [WHITE_BC1, [0u8; 8]].concat();
        std::fs::write(&input, test_support::fourcc_dds(8, 4, b"DXT1", &data)).unwrap();

        let image = BlockDecoder.decode(&input, &output).unwrap();

        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.pixel(0, 0), [65535, 65535, 65535, 65535]);
        assert_eq!(image.pixel(3, 3), [65535, 65535, 65535, 65535]);
        assert_eq!(image.pixel(4, 0), [0, 0, 0, 65535]);
        assert_eq!(image.pixel(7, 3), [0, 0, 0, 65535]);

        let png = image::open(&output).unwrap();
        assert_eq!(png.color(), image::ColorType::Rgba16);
        assert_eq!((png.width(), png.height()), (8, 4));
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("huge.dds");
        let output = dir.path().join("huge.png");
        std::fs::write(
            &input,
            test_support::with_dimensions(
                test_support::solid_bgra_dds(2, 2, [1, 2, 3, 255]),
                u32::MAX,
                u32::MAX,
            ),
        )
        .unwrap();

        let result = BlockDecoder.decode(&input, &output);

        assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_oversized_block_grid_rejected() {
        let result = decompress_blocks(BlockFormat::Bc1, u32::MAX, u32::MAX, 8, &WHITE_BC1);
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
    }
}
