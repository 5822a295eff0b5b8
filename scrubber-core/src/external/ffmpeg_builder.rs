//! FFmpeg command builder utilities
//!
//! [`FfmpegCommandBuilder`] assembles a complete ffmpeg invocation in the
//! order ffmpeg expects: global flags, per-input options with their inputs,
//! output options, then the output path. [`VideoFilterChain`] joins `-vf`
//! filters, optionally limited to a time window.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

struct InputSpec {
    options: Vec<String>,
    path: PathBuf,
}

/// Fluent builder for one ffmpeg invocation.
pub struct FfmpegCommandBuilder {
    hide_banner: bool,
    overwrite: bool,
    log_level: Option<String>,
    pending_input_options: Vec<String>,
    inputs: Vec<InputSpec>,
    output_options: Vec<String>,
}

impl Default for FfmpegCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCommandBuilder {
    /// Quiet, overwriting defaults: `-hide_banner -loglevel error -y`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hide_banner: true,
            overwrite: true,
            log_level: Some("error".to_string()),
            pending_input_options: Vec::new(),
            inputs: Vec::new(),
            output_options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hide_banner(mut self, hide: bool) -> Self {
        self.hide_banner = hide;
        self
    }

    /// Sets whether existing output files are overwritten (`-y`)
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the `-loglevel` passed to ffmpeg; `None` keeps ffmpeg's default
    #[must_use]
    pub fn with_log_level(mut self, level: Option<&str>) -> Self {
        self.log_level = level.map(str::to_string);
        self
    }

    /// Adds an option applied to the next input (e.g. `-f concat`).
    #[must_use]
    pub fn input_option(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pending_input_options.push(key.to_string());
        self.pending_input_options.push(value.into());
        self
    }

    /// Adds an input, consuming any pending input options.
    #[must_use]
    pub fn input(mut self, path: &Path) -> Self {
        self.inputs.push(InputSpec {
            options: std::mem::take(&mut self.pending_input_options),
            path: path.to_path_buf(),
        });
        self
    }

    /// Adds a `key value` output option.
    #[must_use]
    pub fn option(mut self, key: &str, value: impl Into<String>) -> Self {
        self.output_options.push(key.to_string());
        self.output_options.push(value.into());
        self
    }

    /// Adds a valueless output flag (e.g. `-vn`).
    #[must_use]
    pub fn flag(mut self, flag: &str) -> Self {
        self.output_options.push(flag.to_string());
        self
    }

    #[must_use]
    pub fn map(self, stream: &str) -> Self {
        self.option("-map", stream)
    }

    /// Sets a global metadata tag on the output.
    #[must_use]
    pub fn metadata(self, key: &str, value: &str) -> Self {
        self.option("-metadata", format!("{key}={value}"))
    }

    /// Re-encodes video with libx264 at `crf` and `preset`.
    #[must_use]
    pub fn x264(self, crf: u8, preset: &str) -> Self {
        self.option("-c:v", "libx264")
            .option("-crf", crf.to_string())
            .option("-preset", preset)
            .option("-pix_fmt", "yuv420p")
    }

    /// Full argument list for `output`, without the ffmpeg binary.
    pub fn args(&self, output: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if self.hide_banner {
            args.push("-hide_banner".to_string());
        }
        if let Some(level) = &self.log_level {
            args.push("-loglevel".to_string());
            args.push(level.clone());
        }
        if self.overwrite {
            args.push("-y".to_string());
        }
        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().into_owned());
        }
        args.extend(self.output_options.iter().cloned());
        args.push(output.to_string_lossy().into_owned());
        args
    }

    /// Builds the command writing to `output`.
    #[must_use]
    pub fn build(self, output: &Path) -> FfmpegCommand {
        if !self.pending_input_options.is_empty() {
            log::warn!(
                "Discarding input options without an input: {:?}",
                self.pending_input_options
            );
        }
        let mut cmd = FfmpegCommand::new();
        cmd.args(self.args(output));
        cmd
    }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty filters are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds a filter active only while `start <= t <= end`.
    #[must_use]
    pub fn add_timed_filter(self, filter: &str, start: f64, end: f64) -> Self {
        self.add_filter(format!(
            "{filter}:enable='between(t,{start:.3},{end:.3})'"
        ))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Joins the chain with commas; `None` when empty.
    #[must_use]
    pub fn build(self) -> Option<String> {
        (!self.filters.is_empty()).then(|| self.filters.join(","))
    }
}
