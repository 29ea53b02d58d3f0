//! Per-segment synthesis orchestration
//!
//! Drives the engine one segment at a time, in order, with no
//! concurrency: the engine is stateful and single-flight, and ordered
//! concatenation must not need a merge step. Each segment gets one
//! full-parameter attempt and, on failure, one reduced-parameter
//! retry before the whole run aborts.

use crate::audio::AudioBuffer;
use crate::synth::{SynthesisEngine, SynthesisParams, SynthesisRequest};
use crate::{GovorunError, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::mpsc::Sender;

/// Advisory progress event
///
/// `current` is 1-based. Consumers may ignore these entirely;
/// correctness never depends on delivery.
#[derive(Debug, Clone)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub status: String,
}

/// The two-attempt schedule for one segment
///
/// Kept as its own object so the policy is testable apart from the
/// engine loop: a full-parameter request is followed by the reduced
/// request; a request that is already reduced gets a single attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegradedRetryPolicy;

impl DegradedRetryPolicy {
    pub fn attempts(&self, request: &SynthesisRequest) -> Vec<SynthesisRequest> {
        if request.params.is_some() {
            vec![request.clone(), request.reduced()]
        } else {
            vec![request.clone()]
        }
    }
}

/// Runs synthesis for an ordered segment list
pub struct SynthesisOrchestrator {
    engine: Box<dyn SynthesisEngine>,
    retry: DegradedRetryPolicy,
    progress: Option<Sender<Progress>>,
}

impl SynthesisOrchestrator {
    pub fn new(engine: Box<dyn SynthesisEngine>) -> Self {
        Self {
            engine,
            retry: DegradedRetryPolicy,
            progress: None,
        }
    }

    /// Attach an advisory progress channel
    pub fn with_progress(mut self, progress: Sender<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Synthesize every segment in order
    ///
    /// On failure the partial buffers are dropped: the caller never
    /// sees audio from an aborted run.
    pub fn synthesize_all(
        &mut self,
        segments: &[String],
        speaker_wav: &Path,
        language: &str,
        params: &SynthesisParams,
    ) -> Result<Vec<AudioBuffer>> {
        let total = segments.len();
        let mut buffers = Vec::with_capacity(total);

        for (i, segment) in segments.iter().enumerate() {
            let index = i + 1;
            self.notify(Progress {
                current: index,
                total,
                status: format!("Generating segment {} of {}", index, total),
            });

            let request =
                SynthesisRequest::new(segment.clone(), speaker_wav, language, params.clone());
            let buffer = self.synthesize_one(&request, index, total)?;
            debug!(
                "Segment {}/{}: {} samples at {} Hz",
                index,
                total,
                buffer.len(),
                buffer.sample_rate
            );
            buffers.push(buffer);
        }

        info!("Synthesized {} segments", total);
        Ok(buffers)
    }

    /// Run the attempt schedule for one segment
    fn synthesize_one(
        &mut self,
        request: &SynthesisRequest,
        index: usize,
        total: usize,
    ) -> Result<AudioBuffer> {
        let attempts = self.retry.attempts(request);
        let mut last_cause = String::new();

        for (attempt, shaped) in attempts.iter().enumerate() {
            match self.engine.synthesize(shaped) {
                Ok(buffer) => {
                    if attempt > 0 {
                        info!("Segment {} succeeded with reduced parameters", index);
                    }
                    return Ok(buffer);
                }
                Err(e) => {
                    warn!(
                        "Segment {} attempt {} failed: {}",
                        index,
                        attempt + 1,
                        e
                    );
                    last_cause = e.to_string();
                }
            }
        }

        Err(GovorunError::Synthesis {
            segment: index,
            total,
            cause: last_cause,
        })
    }

    fn notify(&self, progress: Progress) {
        if let Some(sender) = &self.progress {
            // Advisory: a closed receiver must not fail the run
            let _ = sender.send(progress);
        }
    }
}
