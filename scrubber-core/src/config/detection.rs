//! Detection configuration module
//!
//! Defines the per-detector configuration entries and the pipeline settings
//! that wrap them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for one detector instance.
///
/// `detector_type` selects the factory in the registry; `options` is passed
/// through untouched so each detector can read its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Unique name of this instance, used in logs
    pub name: String,

    /// Registered type name of the detector
    #[serde(rename = "type")]
    pub detector_type: String,

    /// Labels this detector may emit (must not be empty)
    pub categories: BTreeSet<String>,

    /// Detector-specific options
    #[serde(default)]
    pub options: serde_json::Value,
}

impl DetectorConfig {
    /// Creates a config entry with no detector-specific options.
    pub fn new<I, S>(name: &str, detector_type: &str, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            detector_type: detector_type.to_string(),
            categories: categories.into_iter().map(Into::into).collect(),
            options: serde_json::Value::Null,
        }
    }

    /// Replaces the detector-specific options.
    #[must_use]
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Span in seconds attributed to each analyzed frame
    pub frame_duration: f64,

    /// Detectors to run, in order
    pub detectors: Vec<DetectorConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_duration: super::DEFAULT_FRAME_DURATION,
            detectors: Vec::new(),
        }
    }
}
