//! Error types for decoding and batch runs.
//!
//! Decoder errors never leave a strategy boundary as errors: the cascade turns
//! each one into a reason string. Only `BatchError` can stop a run, and only
//! before the first file is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single decoding strategy could not produce an image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid DDS container: {0}")]
    Container(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("surface data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0} not found in PATH")]
    ToolMissing(String),

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to write {path}: {reason}")]
    Persist { path: PathBuf, reason: String },
}

/// Conditions that prevent a batch run from starting.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Please select both source and destination folders.")]
    MissingRoot,

    #[error("source folder is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to create destination folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
