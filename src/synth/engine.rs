//! Synthesis engine abstraction
//!
//! The voice-cloning engine is an external collaborator: the pipeline
//! hands it one segment of text plus a reference voice sample and gets
//! PCM audio back. Everything engine-specific lives behind the
//! [`SynthesisEngine`] trait.

use crate::audio::AudioBuffer;
use crate::config::Config;
use crate::{GovorunError, Result};
use log::info;
use std::path::PathBuf;

/// Tuning parameters for a full-quality synthesis call
///
/// Defaults match what XTTS v2 responds best to for Russian.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    pub speed: f32,
    pub temperature: f32,
    pub length_penalty: f32,
    pub repetition_penalty: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            temperature: 0.7,
            length_penalty: 1.0,
            repetition_penalty: 2.0,
            top_k: 50,
            top_p: 0.85,
        }
    }
}

impl SynthesisParams {
    /// Build parameters from config, with the caller's speed override
    pub fn from_config(config: &Config, speed: Option<f32>) -> Self {
        Self {
            speed: speed.unwrap_or_else(|| config.speed()),
            temperature: config.temperature(),
            length_penalty: config.length_penalty(),
            repetition_penalty: config.repetition_penalty(),
            top_k: config.top_k(),
            top_p: config.top_p(),
        }
    }
}

/// One synthesis call
///
/// `params: None` is the reduced form used by the degraded retry:
/// text, reference sample, and language only.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker_wav: PathBuf,
    pub language: String,
    pub params: Option<SynthesisParams>,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        speaker_wav: impl Into<PathBuf>,
        language: impl Into<String>,
        params: SynthesisParams,
    ) -> Self {
        Self {
            text: text.into(),
            speaker_wav: speaker_wav.into(),
            language: language.into(),
            params: Some(params),
        }
    }

    /// The same request with all tuning parameters dropped
    pub fn reduced(&self) -> Self {
        Self {
            text: self.text.clone(),
            speaker_wav: self.speaker_wav.clone(),
            language: self.language.clone(),
            params: None,
        }
    }
}

/// Synthesis engine trait
///
/// From the pipeline's point of view a call is a pure function of the
/// request, always returning audio at one fixed sample rate for a given
/// engine configuration. Engines are not assumed reentrant; calls are
/// issued one at a time.
pub trait SynthesisEngine: Send {
    /// Synthesize one segment of text into an audio buffer
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<AudioBuffer>;
}

/// Create the configured synthesis engine
///
/// Currently the only shipping backend drives an external CLI engine
/// through a command template (see `[engine] command` in the config).
pub fn create_engine(config: &Config) -> Result<Box<dyn SynthesisEngine>> {
    let template = config.engine_command();
    if template.trim().is_empty() {
        return Err(GovorunError::Engine(
            "No engine command configured.\n\
             Set [engine] command in ~/.govorun.cfg, e.g.:\n\
             command = xtts --text {text} --speaker-wav {speaker} \
             --language {language} --out {out}"
                .to_string(),
        ));
    }

    info!("Creating command engine: {}", template);
    let engine = super::command::CommandEngine::new(template)?;
    Ok(Box::new(engine))
}
