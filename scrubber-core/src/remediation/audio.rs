// ============================================================================
// scrubber-core/src/remediation/audio.rs
// ============================================================================
//
// AUDIO REMEDIATION: Sample-level silence or bleep over detected ranges
//
// The remediator copies the caller's buffer and rewrites the sample ranges of
// every detection whose label is configured for remediation, unless an
// allowed segment covers it. Mono and interleaved layouts are handled alike:
// each channel of a frame receives the same value.
//
// WAV I/O for the temp files handed to the muxer lives here too (hound).

use crate::config::{AudioRemediationConfig, BLEEP_AMPLITUDE};
use crate::detection::DetectionResult;
use crate::error::{CoreError, CoreResult};
use crate::media::AudioBuffer;
use crate::segments::Segment;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What happens to a remediated sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    Silence,
    Bleep,
}

impl FromStr for AudioMode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silence" => Ok(AudioMode::Silence),
            "bleep" => Ok(AudioMode::Bleep),
            other => Err(CoreError::Config(format!(
                "invalid audio mode '{other}' (expected silence or bleep)"
            ))),
        }
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioMode::Silence => write!(f, "silence"),
            AudioMode::Bleep => write!(f, "bleep"),
        }
    }
}

/// Frame range `[start, end)` rewritten by the remediator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    pub start: usize,
    pub end: usize,
}

/// Silences or bleeps detected ranges of an audio buffer.
#[derive(Debug, Clone)]
pub struct AudioRemediator {
    enabled: bool,
    mode: AudioMode,
    categories: BTreeSet<String>,
    bleep_frequency: f64,
}

impl AudioRemediator {
    /// Validates `config` and builds the remediator.
    pub fn new(config: &AudioRemediationConfig) -> CoreResult<Self> {
        let mode = config.mode.parse::<AudioMode>()?;
        if !config.bleep_frequency.is_finite() || config.bleep_frequency <= 0.0 {
            return Err(CoreError::Config(format!(
                "bleep frequency must be positive, got {}",
                config.bleep_frequency
            )));
        }

        Ok(Self {
            enabled: config.enabled,
            mode,
            categories: config.categories.clone(),
            bleep_frequency: config.bleep_frequency,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Frame ranges that [`AudioRemediator::remediate`] would rewrite.
    ///
    /// Detections outside the configured categories, or covered by an
    /// allowed segment, are skipped. Empty ranges are dropped.
    pub fn remediated_ranges(
        &self,
        frames: usize,
        sample_rate: u32,
        detections: &[DetectionResult],
        segments: Option<&[Segment]>,
    ) -> Vec<SampleRange> {
        if !self.enabled {
            return Vec::new();
        }

        let allowed: Vec<&Segment> = segments
            .unwrap_or(&[])
            .iter()
            .filter(|segment| segment.allow())
            .collect();

        detections
            .iter()
            .filter(|detection| self.categories.contains(detection.label()))
            .filter(|detection| {
                let covered = allowed.iter().any(|segment| segment.covers(detection));
                if covered {
                    log::debug!(
                        "Skipping allowed {} detection at {:.3}s",
                        detection.label(),
                        detection.start_time()
                    );
                }
                !covered
            })
            .filter_map(|detection| {
                let start = time_to_frame(detection.start_time(), sample_rate, frames);
                let end = time_to_frame(detection.end_time(), sample_rate, frames);
                (start < end).then_some(SampleRange { start, end })
            })
            .collect()
    }

    /// Returns a remediated copy of `audio`.
    ///
    /// The caller's buffer is never modified, and the returned buffer keeps
    /// its layout. When remediation is disabled or there are no detections
    /// the copy is identical.
    pub fn remediate(
        &self,
        audio: &AudioBuffer,
        sample_rate: u32,
        detections: &[DetectionResult],
        segments: Option<&[Segment]>,
    ) -> AudioBuffer {
        let mut output = audio.clone();
        if !self.enabled || detections.is_empty() {
            return output;
        }

        let ranges = self.remediated_ranges(audio.frames(), sample_rate, detections, segments);
        for range in &ranges {
            match self.mode {
                AudioMode::Silence => output.fill_frames(range.start, range.end, |_| 0.0),
                AudioMode::Bleep => {
                    let step = 2.0 * PI * self.bleep_frequency / f64::from(sample_rate);
                    output.fill_frames(range.start, range.end, |i| {
                        BLEEP_AMPLITUDE * (step * i as f64).sin() as f32
                    });
                }
            }
        }

        log::info!(
            "Applied {} to {} audio range(s)",
            self.mode,
            ranges.len()
        );
        output
    }
}

fn time_to_frame(seconds: f64, sample_rate: u32, frames: usize) -> usize {
    let index = (seconds * f64::from(sample_rate)).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(frames)
    }
}

/// Writes `audio` as a 16-bit PCM WAV file.
pub fn write_audio(audio: &AudioBuffer, sample_rate: u32, path: &Path) -> CoreResult<()> {
    let write_error = |message: String| CoreError::AudioWrite {
        path: path.display().to_string(),
        message,
    };

    let channels = u16::try_from(audio.channels())
        .map_err(|_| write_error(format!("{} channels exceed WAV limits", audio.channels())))?;
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| write_error(e.to_string()))?;
    for &sample in audio.samples() {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer
            .write_sample(value)
            .map_err(|e| write_error(e.to_string()))?;
    }
    writer.finalize().map_err(|e| write_error(e.to_string()))?;

    log::debug!(
        "Wrote {} frame(s) of audio to {}",
        audio.frames(),
        path.display()
    );
    Ok(())
}

/// Reads a WAV file into an [`AudioBuffer`] and its sample rate.
///
/// Integer samples are scaled to `[-1, 1]`. Mono files produce a mono
/// buffer, everything else an interleaved one.
pub fn read_audio(path: &Path) -> CoreResult<(AudioBuffer, u32)> {
    let read_error = |message: String| CoreError::AudioRead {
        path: path.display().to_string(),
        message,
    };

    let mut reader = hound::WavReader::open(path).map_err(|e| read_error(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| read_error(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = 2f32.powi(i32::from(spec.bits_per_sample) - 1);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| read_error(e.to_string()))?
        }
    };

    let buffer = match spec.channels {
        1 => AudioBuffer::mono(samples),
        n => AudioBuffer::interleaved(samples, usize::from(n))
            .map_err(|e| read_error(e.to_string()))?,
    };

    log::debug!(
        "Read {} frame(s) at {} Hz from {}",
        buffer.frames(),
        spec.sample_rate,
        path.display()
    );
    Ok((buffer, spec.sample_rate))
}
