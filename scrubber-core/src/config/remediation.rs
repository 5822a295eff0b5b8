//! Remediation configuration module
//!
//! Defines the audio and video remediation settings. Mode fields are kept as
//! the raw strings a user or config file supplied; the remediators parse and
//! validate them at construction.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Audio remediation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioRemediationConfig {
    /// Whether audio remediation runs at all
    pub enabled: bool,

    /// Remediation mode: "silence" or "bleep"
    pub mode: String,

    /// Labels whose detections are remediated
    pub categories: BTreeSet<String>,

    /// Bleep tone frequency in Hz (must be > 0)
    pub bleep_frequency: f64,
}

impl Default for AudioRemediationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: super::DEFAULT_AUDIO_MODE.to_string(),
            categories: super::DEFAULT_AUDIO_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            bleep_frequency: super::DEFAULT_BLEEP_FREQUENCY,
        }
    }
}

/// Video remediation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRemediationConfig {
    /// Whether video remediation runs at all
    pub enabled: bool,

    /// Global default mode: "blank", "cut" or "none"
    pub mode: String,

    /// Per-label default modes, consulted before the global mode
    pub category_modes: BTreeMap<String, String>,

    /// Overlay colour for blanked ranges, 3- or 6-digit hex
    pub blank_color: String,
}

impl Default for VideoRemediationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: super::DEFAULT_VIDEO_MODE.to_string(),
            category_modes: BTreeMap::new(),
            blank_color: super::DEFAULT_BLANK_COLOR.to_string(),
        }
    }
}
