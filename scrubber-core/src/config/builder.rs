// ============================================================================
// scrubber-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent API used by the CLI to turn flags into a CoreConfig. The builder
// performs no semantic validation; the remediators reject invalid modes,
// colours and frequencies when they are constructed.

use std::path::PathBuf;

use super::CoreConfig;

/// Builder for creating [`CoreConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temporary files directory.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = Some(temp_dir);
        self
    }

    /// Sets the detection merge threshold in seconds.
    pub fn merge_threshold(mut self, threshold: f64) -> Self {
        self.config.merge_threshold = threshold;
        self
    }

    /// Enables or disables audio remediation.
    pub fn enable_audio(mut self, enabled: bool) -> Self {
        self.config.audio.enabled = enabled;
        self
    }

    /// Sets the audio remediation mode ("silence" or "bleep").
    pub fn audio_mode(mut self, mode: &str) -> Self {
        self.config.audio.mode = mode.to_string();
        self
    }

    /// Replaces the set of labels remediated on the audio track.
    pub fn audio_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.audio.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the bleep tone frequency in Hz.
    pub fn bleep_frequency(mut self, frequency: f64) -> Self {
        self.config.audio.bleep_frequency = frequency;
        self
    }

    /// Enables or disables video remediation.
    pub fn enable_video(mut self, enabled: bool) -> Self {
        self.config.video.enabled = enabled;
        self
    }

    /// Sets the global video remediation mode ("blank", "cut" or "none").
    pub fn video_mode(mut self, mode: &str) -> Self {
        self.config.video.mode = mode.to_string();
        self
    }

    /// Sets the default video mode for one label.
    pub fn category_mode(mut self, label: &str, mode: &str) -> Self {
        self.config
            .video
            .category_modes
            .insert(label.to_string(), mode.to_string());
        self
    }

    /// Sets the overlay colour used for blanked ranges.
    pub fn blank_color(mut self, color: &str) -> Self {
        self.config.video.blank_color = color.to_string();
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default_config() {
        let built = CoreConfigBuilder::new().build();
        let default = CoreConfig::default();
        assert_eq!(built.audio, default.audio);
        assert_eq!(built.video, default.video);
        assert_eq!(built.merge_threshold, default.merge_threshold);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CoreConfigBuilder::new()
            .temp_dir(PathBuf::from("/tmp/scrub"))
            .merge_threshold(0.25)
            .enable_audio(false)
            .audio_mode("bleep")
            .audio_categories(["Profanity", "Slur"])
            .bleep_frequency(440.0)
            .video_mode("cut")
            .category_mode("Nudity", "blank")
            .blank_color("#fff")
            .build();

        assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/scrub")));
        assert_eq!(config.merge_threshold, 0.25);
        assert!(!config.audio.enabled);
        assert_eq!(config.audio.mode, "bleep");
        assert_eq!(config.audio.categories.len(), 2);
        assert_eq!(config.audio.bleep_frequency, 440.0);
        assert_eq!(config.video.mode, "cut");
        assert_eq!(config.video.category_modes["Nudity"], "blank");
        assert_eq!(config.video.blank_color, "#fff");
    }
}
