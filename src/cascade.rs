//! Decoding cascade
//!
//! Tries each decoder in a fixed priority order and stops at the first one
//! that produces an image:
//! - Tier 1: image_dds (broadest in-process coverage)
//! - Tier 2: ddsfile + bcdec_rs block decoding
//! - Tier 3: native-order bitmask reader for uncompressed surfaces
//! - Tier 4: staged loader for basic uncompressed surfaces
//! - Tier 5: external texconv (slowest, needs the tool on PATH)
//!
//! Failed tiers are recorded with their reason and never retried.

use crate::config::ConvertConfig;
use crate::decode::{
    BlockDecoder, DdsDecoder, DecodedImage, NativeOrderDecoder, StagedDecoder, SurfaceDecoder,
    TexconvDecoder,
};
use std::path::Path;
use tracing::debug;

/// One failed tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub decoder: &'static str,
    pub reason: String,
}

/// Result of running the cascade on one file.
#[derive(Debug)]
pub struct CascadeOutcome {
    /// The decoded image, if any tier succeeded.
    pub image: Option<DecodedImage>,
    /// Name of the tier that succeeded.
    pub decoder: Option<&'static str>,
    /// Every tier that failed before the successful one (or all of them),
    /// in cascade order.
    pub failures: Vec<AttemptFailure>,
}

impl CascadeOutcome {
    pub fn is_success(&self) -> bool {
        self.image.is_some()
    }

    pub fn into_image(self) -> Option<DecodedImage> {
        self.image
    }
}

/// Ordered list of decoders.
pub struct Cascade {
    decoders: Vec<Box<dyn DdsDecoder>>,
}

impl Cascade {
    /// The standard five-tier order.
    pub fn standard(config: &ConvertConfig) -> Self {
        Self::with_decoders(vec![
            Box::new(SurfaceDecoder),
            Box::new(BlockDecoder),
            Box::new(NativeOrderDecoder),
            Box::new(StagedDecoder),
            Box::new(TexconvDecoder::new(config.texconv_program.clone())),
        ])
    }

    pub fn with_decoders(decoders: Vec<Box<dyn DdsDecoder>>) -> Self {
        Self { decoders }
    }

    pub fn decoder_names(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    /// Convert `input` to a 16-bit PNG at `output`.
    pub fn convert(&self, input: &Path, output: &Path) -> CascadeOutcome {
        let mut failures = Vec::new();

        for decoder in &self.decoders {
            match decoder.decode(input, output) {
                Ok(image) => {
                    debug!(
                        "{} decoded {} ({}x{})",
                        decoder.name(),
                        input.display(),
                        image.width(),
                        image.height()
                    );
                    return CascadeOutcome {
                        image: Some(image),
                        decoder: Some(decoder.name()),
                        failures,
                    };
                }
                Err(e) => {
                    debug!("{} failed on {}: {}", decoder.name(), input.display(), e);
                    failures.push(AttemptFailure {
                        decoder: decoder.name(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        CascadeOutcome {
            image: None,
            decoder: None,
            failures,
        }
    }
}

impl std::fmt::Debug for Cascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cascade")
            .field("decoders", &self.decoder_names())
            .finish()
    }
}
