//! PCM audio buffer with WAV I/O

use crate::Result;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::path::Path;

/// Mono PCM samples plus their sample rate
///
/// Produced by one synthesis call, consumed by the assembler. Samples
/// are normalized f32 regardless of how the engine encoded its WAV.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Read a WAV file into a mono buffer
    ///
    /// Integer formats are normalized to [-1.0, 1.0]; multi-channel
    /// audio is averaged down to mono (engines emit mono, but reference
    /// recordings are sometimes stereo).
    pub fn read_wav(path: &Path) -> Result<Self> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        debug!(
            "Reading WAV {:?}: {} Hz, {} ch, {}-bit {:?}",
            path, spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
        );

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples = if spec.channels <= 1 {
            interleaved
        } else {
            let channels = spec.channels as usize;
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    /// Write the buffer to a 32-bit float mono WAV file
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        debug!(
            "Wrote {} samples at {} Hz to {:?}",
            self.samples.len(),
            self.sample_rate,
            path
        );
        Ok(())
    }
}

/// Duration of a WAV file in seconds without decoding its samples
pub fn wav_duration_secs(path: &Path) -> Result<f32> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(0.0);
    }
    Ok(reader.duration() as f32 / spec.sample_rate as f32)
}
