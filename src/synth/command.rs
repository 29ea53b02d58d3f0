//! Command-line engine backend
//!
//! Adapts any external synthesis CLI that can write a WAV file. The
//! configured command template is rendered once per segment and run as
//! a child process; the WAV it writes is read back into an
//! [`AudioBuffer`] and the scratch file is removed.
//!
//! Template placeholders:
//! - `{text}`, `{speaker}`, `{language}`, `{out}` substitute in place
//! - `{speed}`, `{temperature}`, `{length_penalty}`,
//!   `{repetition_penalty}`, `{top_k}`, `{top_p}` each expand to a
//!   `--flag value` pair on a full-parameter call and to nothing on the
//!   reduced retry, so one template serves both attempt shapes

use crate::audio::AudioBuffer;
use crate::synth::{SynthesisEngine, SynthesisRequest};
use crate::{GovorunError, Result};
use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};

pub struct CommandEngine {
    /// Whitespace-split command template tokens
    template: Vec<String>,
}

impl CommandEngine {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template: Vec<String> = template
            .into()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if template.is_empty() {
            return Err(GovorunError::Engine("Empty engine command".to_string()));
        }
        if !template.iter().any(|t| t.contains("{out}")) {
            return Err(GovorunError::Engine(
                "Engine command has no {out} placeholder; the engine's WAV output \
                 cannot be collected"
                    .to_string(),
            ));
        }

        Ok(Self { template })
    }

    /// Render the template into argv for one request
    fn render(&self, request: &SynthesisRequest, out: &Path) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.template.len());

        for token in &self.template {
            match (token.as_str(), &request.params) {
                ("{speed}", Some(p)) => {
                    argv.push("--speed".to_string());
                    argv.push(p.speed.to_string());
                }
                ("{temperature}", Some(p)) => {
                    argv.push("--temperature".to_string());
                    argv.push(p.temperature.to_string());
                }
                ("{length_penalty}", Some(p)) => {
                    argv.push("--length-penalty".to_string());
                    argv.push(p.length_penalty.to_string());
                }
                ("{repetition_penalty}", Some(p)) => {
                    argv.push("--repetition-penalty".to_string());
                    argv.push(p.repetition_penalty.to_string());
                }
                ("{top_k}", Some(p)) => {
                    argv.push("--top-k".to_string());
                    argv.push(p.top_k.to_string());
                }
                ("{top_p}", Some(p)) => {
                    argv.push("--top-p".to_string());
                    argv.push(p.top_p.to_string());
                }
                // Reduced call: tuning placeholders vanish
                (
                    "{speed}" | "{temperature}" | "{length_penalty}"
                    | "{repetition_penalty}" | "{top_k}" | "{top_p}",
                    None,
                ) => {}
                _ => {
                    let rendered = token
                        .replace("{text}", &request.text)
                        .replace("{speaker}", &request.speaker_wav.to_string_lossy())
                        .replace("{language}", &request.language)
                        .replace("{out}", &out.to_string_lossy());
                    argv.push(rendered);
                }
            }
        }

        argv
    }
}

impl SynthesisEngine for CommandEngine {
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<AudioBuffer> {
        // The engine writes here; the handle removes the file on drop
        let scratch = tempfile::Builder::new()
            .prefix("govorun-segment-")
            .suffix(".wav")
            .tempfile()?;

        let argv = self.render(request, scratch.path());
        debug!("Running engine: {:?}", argv);

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                GovorunError::Engine(format!(
                    "Failed to run engine '{}': {}\n\
                     Check [engine] command in the config and that the engine is installed",
                    argv[0], e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(GovorunError::Engine(format!(
                "Engine exited with {}: {}",
                output.status, tail
            )));
        }

        let buffer = AudioBuffer::read_wav(scratch.path())?;
        if buffer.is_empty() {
            warn!("Engine produced an empty buffer for {:?}", request.text);
        }
        debug!(
            "Engine produced {} samples at {} Hz",
            buffer.len(),
            buffer.sample_rate
        );
        Ok(buffer)
    }
}
