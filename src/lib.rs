//! Govorun - Voice-cloning text-to-speech pipeline
//!
//! Prepares free-form (primarily Russian) text for a voice-cloning
//! synthesis engine: resolves inline stress and emphasis markers, splits
//! long text into engine-sized segments, synthesizes each segment in
//! order, and assembles the audio into a single WAV.

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod synth;
pub mod text;

pub use error::{GovorunError, Result, Stage};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "govorun";
