//! Configuration structures and constants for the scrubber-core library.
//!
//! This module provides the configuration system for detection and
//! remediation behavior. Every struct deserializes with serde and falls back
//! to the documented defaults for missing fields; semantic validation happens
//! when the consuming component is constructed, so invalid values fail fast.

mod builder;
mod detection;
mod remediation;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use builder::CoreConfigBuilder;
pub use detection::{DetectorConfig, PipelineConfig};
pub use remediation::{AudioRemediationConfig, VideoRemediationConfig};

// Default constants

/// Default gap (seconds) below which neighbouring detections merge into one segment.
pub const DEFAULT_MERGE_THRESHOLD: f64 = 2.0;

/// Default bleep tone frequency in Hz.
pub const DEFAULT_BLEEP_FREQUENCY: f64 = 1000.0;

/// Fixed bleep tone amplitude (linear, full scale = 1.0).
pub const BLEEP_AMPLITUDE: f32 = 0.2;

/// Default audio remediation mode.
pub const DEFAULT_AUDIO_MODE: &str = "silence";

/// Default video remediation mode.
pub const DEFAULT_VIDEO_MODE: &str = "blank";

/// Default overlay colour for blanked video (black).
pub const DEFAULT_BLANK_COLOR: &str = "000000";

/// Default span (seconds) attributed to a single analyzed frame.
pub const DEFAULT_FRAME_DURATION: f64 = 1.0;

/// Labels remediated on the audio track unless configured otherwise.
pub const DEFAULT_AUDIO_CATEGORIES: &[&str] = &["Profanity"];

/// Main configuration structure for the scrubber-core library.
///
/// Holds the merge threshold, the optional temp directory, and the audio and
/// video remediation sections. Typically built by the CLI through
/// [`CoreConfigBuilder`].
///
/// # Examples
///
/// ```rust
/// use scrubber_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .audio_mode("bleep")
///     .bleep_frequency(800.0)
///     .video_mode("cut")
///     .category_mode("Nudity", "blank")
///     .build();
/// assert_eq!(config.video.mode, "cut");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Optional directory for temporary files (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Gap in seconds within which detections merge into one segment
    pub merge_threshold: f64,

    /// Audio remediation settings
    pub audio: AudioRemediationConfig,

    /// Video remediation settings
    pub video: VideoRemediationConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            audio: AudioRemediationConfig::default(),
            video: VideoRemediationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.merge_threshold, 2.0);
        assert!(config.temp_dir.is_none());
        assert!(config.audio.enabled);
        assert_eq!(config.audio.mode, "silence");
        assert!(config.audio.categories.contains("Profanity"));
        assert!(config.video.enabled);
        assert_eq!(config.video.mode, "blank");
        assert_eq!(config.video.blank_color, "000000");
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{
            "merge_threshold": 0.5,
            "audio": { "mode": "bleep" },
            "video": { "category_modes": { "Violence": "cut" } }
        }"#;
        let config: CoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.merge_threshold, 0.5);
        assert_eq!(config.audio.mode, "bleep");
        assert_eq!(config.audio.bleep_frequency, DEFAULT_BLEEP_FREQUENCY);
        assert_eq!(config.video.mode, DEFAULT_VIDEO_MODE);
        assert_eq!(config.video.category_modes.get("Violence").map(String::as_str), Some("cut"));
    }
}
