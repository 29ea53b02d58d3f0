//! System-voice preview via the tts crate
//!
//! Quick way to hear a text read by the platform voice (Speech
//! Dispatcher on Linux, AVFoundation on macOS) without running the
//! cloning engine. Useful for comparing the cloned output against a
//! stock voice, and for checking annotation audibly.

use crate::{GovorunError, Result};
use log::{debug, warn};
use std::time::Duration;
use tts::Tts as TtsCrate;

pub struct SystemVoice {
    tts: TtsCrate,
}

impl SystemVoice {
    /// Create a preview voice on the platform TTS backend
    pub fn new() -> Result<Self> {
        debug!("Creating system voice backend");
        let tts = TtsCrate::default()
            .map_err(|e| GovorunError::Engine(format!("Failed to initialize system TTS: {}", e)))?;
        Ok(Self { tts })
    }

    /// Scale the speaking rate by a multiplier (1.0 = platform normal)
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        let features = self.tts.supported_features();
        if !features.rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let normal = self.tts.normal_rate();
        let rate = (normal * speed).clamp(self.tts.min_rate(), self.tts.max_rate());
        debug!("Setting preview rate to {} ({}x normal)", rate, speed);
        self.tts
            .set_rate(rate)
            .map_err(|e| GovorunError::Engine(format!("Failed to set rate: {}", e)))?;
        Ok(())
    }

    /// Speak text and block until playback finishes
    pub fn speak(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        debug!("Speaking {} characters", text.chars().count());
        self.tts
            .speak(text, false)
            .map_err(|e| GovorunError::Engine(format!("Speak failed: {}", e)))?;

        // Block until the utterance drains; fall back to a length-based
        // wait where the platform cannot report speaking state
        if self.tts.supported_features().is_speaking {
            loop {
                match self.tts.is_speaking() {
                    Ok(true) => std::thread::sleep(Duration::from_millis(100)),
                    Ok(false) => break,
                    Err(e) => {
                        warn!("Cannot query speaking state: {}", e);
                        break;
                    }
                }
            }
        } else {
            let secs = (text.chars().count() as f32 / 15.0).clamp(1.0, 120.0);
            std::thread::sleep(Duration::from_secs_f32(secs));
        }

        Ok(())
    }
}
