// ============================================================================
// scrubber-core/src/detection/detector.rs
// ============================================================================
//
// DETECTOR CONTRACT: Capability interface implemented by every detector
//
// A detector turns a frame and/or audio into categorical evidence. Model
// internals are opaque to the core; the pipeline only relies on this trait.
//
// KEY COMPONENTS:
// - Detector: the capability trait
// - DetectorKind: capability marker recorded in the registry so the pipeline
//   knows which phase builds a detector before constructing it

use crate::detection::DetectionResult;
use crate::error::CoreResult;
use crate::media::{AudioBuffer, VideoFrame};
use std::collections::BTreeSet;
use std::fmt;

/// Which initialization phase a detector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    /// Analyzes the whole audio track once; loaded and released first
    FullAudio,
    /// Analyzes sampled frames; loaded after audio detectors are released
    Frame,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::FullAudio => write!(f, "full-audio"),
            DetectorKind::Frame => write!(f, "frame"),
        }
    }
}

/// Capability interface for content detectors.
///
/// Only [`Detector::name`], [`Detector::categories`] and [`Detector::detect`]
/// are required. Whole-track audio analysis is opt-in through
/// [`Detector::supports_full_audio_analysis`].
pub trait Detector {
    /// Instance name used in logs.
    fn name(&self) -> &str;

    /// Labels this detector may emit. Never empty.
    fn categories(&self) -> &BTreeSet<String>;

    /// Inspects one frame and/or audio excerpt.
    ///
    /// Time ranges on the returned results are placeholders; the pipeline
    /// overwrites them with the frame's span.
    fn detect(
        &mut self,
        frame: Option<&VideoFrame>,
        audio: Option<&AudioBuffer>,
    ) -> CoreResult<Vec<DetectionResult>>;

    /// Whether [`Detector::analyze_full_audio`] is implemented.
    fn supports_full_audio_analysis(&self) -> bool {
        false
    }

    /// Analyzes the complete audio track. Returned ranges are kept as-is.
    fn analyze_full_audio(
        &mut self,
        _audio: &AudioBuffer,
        _sample_rate: u32,
    ) -> CoreResult<Vec<DetectionResult>> {
        Ok(Vec::new())
    }

    /// Releases models and other resources held by the detector.
    fn cleanup(&mut self) -> CoreResult<()> {
        Ok(())
    }
}
