//! Run configuration.
//!
//! There is no config file; the binary fills this from command line flags.

use std::path::PathBuf;

/// Default name of the external texture conversion tool.
pub const DEFAULT_TEXCONV: &str = "texconv";

/// Bounding box for preview thumbnails (square)
pub const DEFAULT_PREVIEW_SIZE: u32 = 200;

/// Settings shared by the cascade and the batch walker.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Program name or path used by the texconv strategy.
    /// A bare name is resolved against `PATH`.
    pub texconv_program: PathBuf,
    /// Previews are scaled down to fit within this square.
    pub preview_size: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            texconv_program: PathBuf::from(DEFAULT_TEXCONV),
            preview_size: DEFAULT_PREVIEW_SIZE,
        }
    }
}

impl ConvertConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texconv_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.texconv_program = program.into();
        self
    }

    pub fn with_preview_size(mut self, size: u32) -> Self {
        self.preview_size = size.max(1);
        self
    }
}
