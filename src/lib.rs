//! DDS to 16-bit PNG batch conversion.
//!
//! The library is synchronous and single-threaded. A front end builds a
//! [`Cascade`], hands it to a [`BatchJob`] and receives log lines, previews
//! and progress through a [`BatchObserver`].

pub mod batch;
pub mod cascade;
pub mod config;
pub mod decode;
pub mod error;
pub mod preview;

#[cfg(test)]
mod test_support;

pub use batch::{BatchJob, BatchObserver, ProgressSnapshot, RunSummary};
pub use cascade::{AttemptFailure, Cascade, CascadeOutcome};
pub use config::ConvertConfig;
pub use decode::{DdsDecoder, DecodedImage};
pub use error::{BatchError, DecodeError};
