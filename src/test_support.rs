//! Fixtures shared by the unit tests.

use crate::batch::{BatchObserver, ProgressSnapshot};
use crate::decode::{persist_png, DdsDecoder, DecodedImage};
use crate::error::DecodeError;
use image::RgbaImage;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// DDPF_RGB | DDPF_ALPHAPIXELS
pub const DDPF_ALPHA_RGB: u32 = 0x40 | 0x1;

const DDPF_FOURCC: u32 = 0x4;

/// R, G, B, A masks for the A8R8G8B8 layout (bytes B, G, R, A in memory)
pub const ARGB8_MASKS: [u32; 4] = [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000];

/// DXGI_FORMAT_R8G8B8A8_UNORM
pub const DXGI_R8G8B8A8_UNORM: u32 = 28;

fn header(
    width: u32,
    height: u32,
    pitch: u32,
    pf_flags: u32,
    fourcc: u32,
    bit_count: u32,
    masks: [u32; 4],
) -> Vec<u8> {
    let mut words = [0u32; 31];
    words[0] = 124;
    // CAPS | HEIGHT | WIDTH | PIXELFORMAT, plus PITCH or LINEARSIZE
    words[1] = 0x1 | 0x2 | 0x4 | 0x1000;
    words[1] |= if pf_flags & DDPF_FOURCC != 0 { 0x8_0000 } else { 0x8 };
    words[2] = height;
    words[3] = width;
    words[4] = pitch;
    words[6] = 1;
    words[18] = 32;
    words[19] = pf_flags;
    words[20] = fourcc;
    words[21] = bit_count;
    words[22..26].copy_from_slice(&masks);
    // DDSCAPS_TEXTURE
    words[26] = 0x1000;

    let mut out = Vec::with_capacity(128);
    out.extend_from_slice(b"DDS ");
    for word in words {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

/// Build a legacy (non-DX10) uncompressed DDS file in memory.
pub fn legacy_dds(
    width: u32,
    height: u32,
    pf_flags: u32,
    bit_count: u32,
    masks: [u32; 4],
    pixels: &[u8],
) -> Vec<u8> {
    let pitch = (width * bit_count).div_ceil(8);
    let mut out = header(width, height, pitch, pf_flags, 0, bit_count, masks);
    out.extend_from_slice(pixels);
    out
}

/// Build a legacy DDS whose format is given by a FourCC such as `DXT1`.
pub fn fourcc_dds(width: u32, height: u32, fourcc: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let code = u32::from_le_bytes(*fourcc);
    let mut out = header(width, height, data.len() as u32, DDPF_FOURCC, code, 0, [0; 4]);
    out.extend_from_slice(data);
    out
}

/// Build a DX10 DDS holding one 2D surface of the given DXGI format.
pub fn dx10_dds(width: u32, height: u32, dxgi_format: u32, data: &[u8]) -> Vec<u8> {
    let code = u32::from_le_bytes(*b"DX10");
    let mut out = header(width, height, data.len() as u32, DDPF_FOURCC, code, 0, [0; 4]);
    // format, TEXTURE2D, misc flag, array size, misc flags 2
    for word in [dxgi_format, 3, 0, 1, 0] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.extend_from_slice(data);
    out
}

/// Overwrite the header dimensions of an existing DDS file.
pub fn with_dimensions(mut dds: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
    dds[12..16].copy_from_slice(&height.to_le_bytes());
    dds[16..20].copy_from_slice(&width.to_le_bytes());
    dds
}

/// A width×height A8R8G8B8 texture filled with one BGRA color.
pub fn solid_bgra_dds(width: u32, height: u32, bgra: [u8; 4]) -> Vec<u8> {
    let pixels = bgra.repeat((width * height) as usize);
    legacy_dds(width, height, DDPF_ALPHA_RGB, 32, ARGB8_MASKS, &pixels)
}

/// Decoder stub that counts its invocations.
pub struct MockDecoder {
    name: &'static str,
    succeed: bool,
    removes: Option<PathBuf>,
    calls: Rc<Cell<usize>>,
}

impl MockDecoder {
    pub fn failing(name: &'static str) -> (Self, Rc<Cell<usize>>) {
        Self::build(name, false)
    }

    pub fn succeeding(name: &'static str) -> (Self, Rc<Cell<usize>>) {
        Self::build(name, true)
    }

    fn build(name: &'static str, succeed: bool) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                name,
                succeed,
                removes: None,
                calls: calls.clone(),
            },
            calls,
        )
    }

    /// Delete `path` on every call, simulating a file removed mid-run.
    pub fn removing(mut self, path: PathBuf) -> Self {
        self.removes = Some(path);
        self
    }
}

impl DdsDecoder for MockDecoder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, _input: &Path, output: &Path) -> Result<DecodedImage, DecodeError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(path) = &self.removes {
            let _ = std::fs::remove_file(path);
        }
        if !self.succeed {
            return Err(DecodeError::UnsupportedFormat(format!(
                "{} cannot read this",
                self.name
            )));
        }
        let image = DecodedImage::from_raw(1, 1, vec![65535, 0, 0, 65535])?;
        persist_png(&image, output)?;
        Ok(image)
    }
}

/// Keeps every observer event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub lines: Vec<String>,
    pub previews: Vec<(u32, u32)>,
    pub snapshots: Vec<ProgressSnapshot>,
}

impl BatchObserver for RecordingObserver {
    fn on_log(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn on_preview(&mut self, _source: &Path, thumbnail: &RgbaImage) {
        self.previews.push(thumbnail.dimensions());
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.snapshots.push(*snapshot);
    }
}
