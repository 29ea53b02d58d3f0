//! End-to-end text-to-speech pipeline
//!
//! raw text -> stress annotation -> markup normalization -> sentence
//! and segment splitting -> per-segment synthesis -> assembled WAV.
//!
//! A run executes on whatever thread calls [`Pipeline::run`];
//! [`Pipeline::run_in_thread`] moves it to a dedicated worker so an
//! interactive caller stays responsive while the engine grinds through
//! segments. The only blocking points are the synthesis calls.

use crate::audio::buffer::wav_duration_secs;
use crate::audio::{AudioAssembler, RateMismatchPolicy};
use crate::config::Config;
use crate::synth::{Progress, SynthesisEngine, SynthesisOrchestrator, SynthesisParams};
use crate::text::{markup, segment, StressAnnotator};
use crate::{GovorunError, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// One pipeline invocation from the caller's side
///
/// Synthesis parameters beyond `speed` come from the config.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub text: String,
    pub speaker_wav: PathBuf,
    pub output: PathBuf,
    pub language: Option<String>,
    pub speed: Option<f32>,
}

/// The finished artifact
///
/// The WAV at `path` is written once; nothing appends to it afterward.
#[derive(Debug, Clone)]
pub struct AssembledAudio {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub samples: usize,
    pub duration_secs: f32,
    pub segments: usize,
}

pub struct Pipeline {
    annotator: StressAnnotator,
    assembler: AudioAssembler,
    max_segment_length: usize,
    default_language: String,
    default_params: SynthesisParams,
}

impl Pipeline {
    /// Build a pipeline from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let exceptions = config.load_stress_exceptions()?;
        let policy = if config.tolerate_rate_mismatch() {
            RateMismatchPolicy::Tolerate
        } else {
            RateMismatchPolicy::Reject
        };

        Ok(Self {
            annotator: StressAnnotator::with_exceptions(exceptions),
            assembler: AudioAssembler::with_policy(policy),
            max_segment_length: config.max_segment_length(),
            default_language: config.language(),
            default_params: SynthesisParams::from_config(config, None),
        })
    }

    /// Run the pipeline to completion on the current thread
    ///
    /// On any fatal error no artifact is left at the output path.
    pub fn run(
        &self,
        engine: Box<dyn SynthesisEngine>,
        request: &PipelineRequest,
        progress: Option<Sender<Progress>>,
    ) -> Result<AssembledAudio> {
        self.check_reference(&request.speaker_wav)?;

        let annotated = markup::normalize(&self.annotator.annotate(&request.text));
        debug!("Annotated text: {}", annotated);

        let segments = segment::segment_text(&annotated, self.max_segment_length);
        if segments.is_empty() {
            return Err(GovorunError::Other(
                "No speakable text in input".to_string(),
            ));
        }
        info!("Text split into {} segments", segments.len());
        notify(
            &progress,
            Progress {
                current: 0,
                total: segments.len(),
                status: format!("Processing {} segments", segments.len()),
            },
        );

        let language = request
            .language
            .clone()
            .unwrap_or_else(|| self.default_language.clone());
        let mut params = self.default_params.clone();
        if let Some(speed) = request.speed {
            params.speed = speed;
        }

        let mut orchestrator = SynthesisOrchestrator::new(engine);
        if let Some(sender) = &progress {
            orchestrator = orchestrator.with_progress(sender.clone());
        }
        let buffers =
            orchestrator.synthesize_all(&segments, &request.speaker_wav, &language, &params)?;

        notify(
            &progress,
            Progress {
                current: segments.len(),
                total: segments.len(),
                status: "Assembling audio".to_string(),
            },
        );
        let assembled = self.assembler.assemble(buffers)?;
        assembled.write_wav(&request.output)?;

        info!(
            "Assembled {:.1}s of audio ({} segments) into {:?}",
            assembled.duration_secs(),
            segments.len(),
            request.output
        );

        Ok(AssembledAudio {
            path: request.output.clone(),
            sample_rate: assembled.sample_rate,
            samples: assembled.len(),
            duration_secs: assembled.duration_secs(),
            segments: segments.len(),
        })
    }

    /// Run on a dedicated worker thread
    ///
    /// Returns the join handle for the result and the advisory progress
    /// stream. Dropping the receiver is safe.
    pub fn run_in_thread(
        self,
        engine: Box<dyn SynthesisEngine>,
        request: PipelineRequest,
    ) -> (JoinHandle<Result<AssembledAudio>>, Receiver<Progress>) {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || self.run(engine, &request, Some(tx)));
        (handle, rx)
    }

    /// Sanity-check the reference voice sample
    ///
    /// Existence is required; duration advice mirrors what the engine
    /// needs for a decent clone and is never fatal. Non-WAV references
    /// go to the engine unvalidated.
    fn check_reference(&self, speaker_wav: &Path) -> Result<()> {
        if !speaker_wav.exists() {
            return Err(GovorunError::Config(format!(
                "Reference voice sample not found: {:?}",
                speaker_wav
            )));
        }

        if speaker_wav.extension().and_then(|e| e.to_str()) == Some("wav") {
            match wav_duration_secs(speaker_wav) {
                Ok(secs) if secs < 10.0 => warn!(
                    "Reference sample is only {:.1}s; 30s or more gives a better clone",
                    secs
                ),
                Ok(secs) if secs > 300.0 => warn!(
                    "Reference sample is {:.1}s; 1-2 minutes is usually enough",
                    secs
                ),
                Ok(secs) => info!("Reference sample: {:.1}s", secs),
                Err(e) => debug!("Could not inspect reference sample: {}", e),
            }
        }

        Ok(())
    }
}

fn notify(progress: &Option<Sender<Progress>>, event: Progress) {
    if let Some(sender) = progress {
        let _ = sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBuffer;
    use crate::synth::SynthesisRequest;

    struct ConstantEngine {
        samples_per_call: usize,
    }

    impl SynthesisEngine for ConstantEngine {
        fn synthesize(&mut self, _request: &SynthesisRequest) -> Result<AudioBuffer> {
            Ok(AudioBuffer::new(vec![0.1; self.samples_per_call], 24000))
        }
    }

    struct FailingEngine;

    impl SynthesisEngine for FailingEngine {
        fn synthesize(&mut self, _request: &SynthesisRequest) -> Result<AudioBuffer> {
            Err(GovorunError::Engine("engine down".to_string()))
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline {
            annotator: StressAnnotator::new(),
            assembler: AudioAssembler::new(),
            max_segment_length: 150,
            default_language: "ru".to_string(),
            default_params: SynthesisParams::default(),
        }
    }

    fn request(dir: &Path, text: &str) -> PipelineRequest {
        let speaker = dir.join("voice.wav");
        AudioBuffer::new(vec![0.0; 24000], 24000)
            .write_wav(&speaker)
            .expect("speaker wav");
        PipelineRequest {
            text: text.to_string(),
            speaker_wav: speaker,
            output: dir.join("out.wav"),
            language: None,
            speed: None,
        }
    }

    #[test]
    fn test_run_produces_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let request = request(dir.path(), "Привет мир. Как дела?");
        let result = pipeline()
            .run(
                Box::new(ConstantEngine {
                    samples_per_call: 1000,
                }),
                &request,
                None,
            )
            .expect("run");

        assert_eq!(result.segments, 2);
        assert_eq!(result.samples, 2000);
        assert!(request.output.exists());
    }

    #[test]
    fn test_failed_run_leaves_no_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let request = request(dir.path(), "Привет мир");
        let err = pipeline()
            .run(Box::new(FailingEngine), &request, None)
            .expect_err("must fail");

        assert!(matches!(err, GovorunError::Synthesis { .. }));
        assert!(!request.output.exists());
    }

    #[test]
    fn test_missing_reference_fails_before_synthesis() {
        let dir = tempfile::tempdir().expect("tempdir");
        let request = PipelineRequest {
            text: "текст".to_string(),
            speaker_wav: dir.path().join("missing.wav"),
            output: dir.path().join("out.wav"),
            language: None,
            speed: None,
        };
        assert!(pipeline()
            .run(
                Box::new(ConstantEngine {
                    samples_per_call: 10
                }),
                &request,
                None
            )
            .is_err());
    }

    #[test]
    fn test_empty_text_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let request = request(dir.path(), "   \n ... ");
        assert!(pipeline()
            .run(
                Box::new(ConstantEngine {
                    samples_per_call: 10
                }),
                &request,
                None
            )
            .is_err());
    }
}
