//! Synthesis engine boundary and orchestration

pub mod command;
pub mod engine;
pub mod orchestrator;
pub mod preview;

pub use engine::{create_engine, SynthesisEngine, SynthesisParams, SynthesisRequest};
pub use orchestrator::{DegradedRetryPolicy, Progress, SynthesisOrchestrator};
