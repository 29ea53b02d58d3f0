//! Error types for govorun

use std::io;
use thiserror::Error;

/// Pipeline stage identifiers for structured failure reporting
///
/// Callers receive these alongside the error so a front end can show
/// where a run stopped without parsing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Engine,
    Synthesis,
    Assembly,
    Io,
}

/// Main error type for govorun
#[derive(Error, Debug)]
pub enum GovorunError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("Engine error: {0}")]
    Engine(String),

    /// A segment failed synthesis after the degraded-parameter retry.
    /// Index is 1-based, matching what progress events report.
    #[error("Synthesis failed for segment {segment} of {total}: {cause}")]
    Synthesis {
        segment: usize,
        total: usize,
        cause: String,
    },

    /// Sample rate changed between segment buffers during assembly
    #[error(
        "Sample rate mismatch during assembly: segment {segment} is {found} Hz, expected {expected} Hz"
    )]
    RateMismatch {
        segment: usize,
        expected: u32,
        found: u32,
    },

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for govorun operations
pub type Result<T> = std::result::Result<T, GovorunError>;

impl GovorunError {
    /// Pipeline stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            GovorunError::Config(_) | GovorunError::IniParse(_) => Stage::Config,
            GovorunError::Engine(_) => Stage::Engine,
            GovorunError::Synthesis { .. } => Stage::Synthesis,
            GovorunError::RateMismatch { .. } | GovorunError::Audio(_) => Stage::Assembly,
            GovorunError::Wav(_) | GovorunError::Io(_) | GovorunError::Utf8(_) => Stage::Io,
            GovorunError::Other(_) => Stage::Io,
        }
    }

    /// 1-based index of the failing segment, where applicable
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            GovorunError::Synthesis { segment, .. } => Some(*segment),
            GovorunError::RateMismatch { segment, .. } => Some(*segment),
            _ => None,
        }
    }
}

impl From<String> for GovorunError {
    fn from(s: String) -> Self {
        GovorunError::Other(s)
    }
}

impl From<&str> for GovorunError {
    fn from(s: &str) -> Self {
        GovorunError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for GovorunError {
    fn from(e: serde_json::Error) -> Self {
        GovorunError::Config(format!("JSON error: {}", e))
    }
}
