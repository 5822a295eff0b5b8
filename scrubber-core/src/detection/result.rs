//! The immutable detection value produced by detectors.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// A single (time range, label, confidence) assertion from one detector.
///
/// Invariants, checked by every constructor including deserialization:
/// both times are finite, `end_time >= start_time`, and `confidence` lies in
/// `[0, 1]`. Fields are read-only; [`DetectionResult::with_time_range`]
/// returns a re-validated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDetection")]
pub struct DetectionResult {
    start_time: f64,
    end_time: f64,
    label: String,
    confidence: f64,
    reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_data: Option<Vec<u8>>,
}

#[derive(Deserialize)]
struct RawDetection {
    start_time: f64,
    end_time: f64,
    label: String,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    frame_data: Option<Vec<u8>>,
}

impl TryFrom<RawDetection> for DetectionResult {
    type Error = CoreError;

    fn try_from(raw: RawDetection) -> CoreResult<Self> {
        let mut detection = DetectionResult::new(
            raw.start_time,
            raw.end_time,
            raw.label,
            raw.confidence,
            raw.reasoning,
        )?;
        detection.description = raw.description;
        detection.frame_data = raw.frame_data;
        Ok(detection)
    }
}

impl DetectionResult {
    /// Creates a validated detection.
    pub fn new(
        start_time: f64,
        end_time: f64,
        label: impl Into<String>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> CoreResult<Self> {
        validate_range(start_time, end_time)?;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::InvalidDetection(format!(
                "confidence {confidence} is outside [0, 1]"
            )));
        }

        Ok(Self {
            start_time,
            end_time,
            label: label.into(),
            confidence,
            reasoning: reasoning.into(),
            description: None,
            frame_data: None,
        })
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches an opaque provenance sample (e.g. an encoded thumbnail).
    #[must_use]
    pub fn with_frame_data(mut self, frame_data: Vec<u8>) -> Self {
        self.frame_data = Some(frame_data);
        self
    }

    /// Returns a copy spanning `[start_time, end_time]`, re-checking the range.
    pub fn with_time_range(&self, start_time: f64, end_time: f64) -> CoreResult<Self> {
        validate_range(start_time, end_time)?;
        Ok(Self {
            start_time,
            end_time,
            ..self.clone()
        })
    }

    /// Copy spanning a frame window already known to be finite and ordered.
    pub(crate) fn stamped(&self, start_time: f64, end_time: f64) -> Self {
        debug_assert!(start_time.is_finite() && end_time.is_finite() && end_time >= start_time);
        Self {
            start_time,
            end_time,
            ..self.clone()
        }
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Length of the range in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn frame_data(&self) -> Option<&[u8]> {
        self.frame_data.as_deref()
    }
}

fn validate_range(start_time: f64, end_time: f64) -> CoreResult<()> {
    if !start_time.is_finite() || !end_time.is_finite() {
        return Err(CoreError::InvalidDetection(format!(
            "non-finite time range [{start_time}, {end_time}]"
        )));
    }
    if end_time < start_time {
        return Err(CoreError::InvalidDetection(format!(
            "end_time {end_time} precedes start_time {start_time}"
        )));
    }
    Ok(())
}
