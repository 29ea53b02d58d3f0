//! Ordered concatenation of per-segment audio

use crate::audio::AudioBuffer;
use crate::{GovorunError, Result};
use log::{debug, warn};

/// What to do when a later buffer's sample rate differs from the first
///
/// The engine contract promises a single fixed rate, so a mismatch
/// means something upstream broke. Rejecting is the default; tolerating
/// reproduces the legacy behavior of concatenating raw sample arrays
/// under the first buffer's declared rate (audible speed-shift in the
/// mismatched span).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateMismatchPolicy {
    #[default]
    Reject,
    Tolerate,
}

/// Concatenates ordered segment buffers into the final waveform
#[derive(Debug, Default)]
pub struct AudioAssembler {
    policy: RateMismatchPolicy,
}

impl AudioAssembler {
    /// Assembler that rejects rate-mismatched buffers
    pub fn new() -> Self {
        Self {
            policy: RateMismatchPolicy::Reject,
        }
    }

    pub fn with_policy(policy: RateMismatchPolicy) -> Self {
        Self { policy }
    }

    /// Concatenate buffers in order under the first buffer's rate
    ///
    /// A single buffer passes through unchanged. Input buffers are
    /// consumed; the result is the only copy of the audio.
    pub fn assemble(&self, buffers: Vec<AudioBuffer>) -> Result<AudioBuffer> {
        let mut buffers = buffers.into_iter();
        let first = buffers
            .next()
            .ok_or_else(|| GovorunError::Audio("No audio buffers to assemble".to_string()))?;

        let canonical_rate = first.sample_rate;
        let mut samples = first.samples;

        for (i, buffer) in buffers.enumerate() {
            let segment = i + 2; // first buffer is segment 1
            if buffer.sample_rate != canonical_rate {
                match self.policy {
                    RateMismatchPolicy::Reject => {
                        return Err(GovorunError::RateMismatch {
                            segment,
                            expected: canonical_rate,
                            found: buffer.sample_rate,
                        });
                    }
                    RateMismatchPolicy::Tolerate => {
                        warn!(
                            "Segment {} is {} Hz but the run is {} Hz; concatenating anyway",
                            segment, buffer.sample_rate, canonical_rate
                        );
                    }
                }
            }
            samples.extend(buffer.samples);
        }

        debug!(
            "Assembled {} samples at {} Hz",
            samples.len(),
            canonical_rate
        );
        Ok(AudioBuffer::new(samples, canonical_rate))
    }
}
