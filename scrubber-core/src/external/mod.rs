// ============================================================================
// scrubber-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Media transforms backed by ffmpeg and ffprobe
//
// The remediation code never launches processes itself. It talks to a
// `MediaTransformer`, whose production implementation drives ffmpeg through
// ffmpeg-sidecar and probes files through the ffprobe crate. Tests substitute
// the recording mocks from `mocks`.
//
// KEY COMPONENTS:
// - MediaTransformer: mux / filter / subclip / concat / probe / extract audio
// - FfmpegTransformer: ffmpeg-sidecar implementation
// - FfmpegSpawner / FfmpegProcess: process seam used by FfmpegTransformer
// - check_dependency: verifies an external command can be launched

use crate::error::{CoreError, CoreResult};
use crate::media::MediaProbe;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Command builders and the ffmpeg-backed transformer
pub mod ffmpeg;

/// Fluent ffmpeg command and filter chain builders
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Media probing through ffprobe
pub mod ffprobe_executor;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::FfmpegTransformer;
pub use ffmpeg_builder::{FfmpegCommandBuilder, VideoFilterChain};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg};
pub use ffprobe_executor::probe_media;

// ============================================================================
// MEDIA TRANSFORM ABSTRACTION
// ============================================================================

/// Title and tags written into a muxed output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuxMetadata {
    pub title: String,
    pub tags: BTreeMap<String, String>,
}

impl MuxMetadata {
    /// Metadata carrying only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Whole-file media operations used by remediation.
///
/// Every method blocks until the output is complete. Implementations must
/// leave `output` absent or incomplete only when returning an error.
pub trait MediaTransformer {
    /// Combines the video of `video` with `audio`, or with the video's own
    /// audio when `audio` is `None`.
    fn mux(
        &self,
        video: &Path,
        audio: Option<&Path>,
        metadata: &MuxMetadata,
        output: &Path,
    ) -> CoreResult<()>;

    /// Re-encodes `input` through a video filter chain.
    fn apply_filter(&self, input: &Path, filter_chain: &str, output: &Path) -> CoreResult<()>;

    /// Extracts the `[start, end)` span of `input`.
    fn extract_subclip(&self, input: &Path, start: f64, end: f64, output: &Path) -> CoreResult<()>;

    /// Concatenates `inputs` in order.
    fn concat(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<()>;

    /// Reads geometry, duration and stream layout.
    fn probe(&self, input: &Path) -> CoreResult<MediaProbe>;

    /// Decodes the first audio stream of `input` to a WAV file.
    fn extract_audio(&self, input: &Path, output: &Path, sample_rate: u32) -> CoreResult<()>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command (e.g. "ffmpeg") can be launched.
///
/// Runs `cmd_name -version` and discards its output.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
