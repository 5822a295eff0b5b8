// ============================================================================
// scrubber-core/src/detection/pipeline.rs
// ============================================================================
//
// DETECTION PIPELINE: Staged detector lifecycle and result aggregation
//
// Audio-only detectors and frame detectors never share accelerator memory.
// The pipeline therefore loads them in two phases:
//
//   initialize_audio_detectors -> analyze_full_audio -> cleanup_audio_detectors
//   initialize_frame_detectors -> analyze_frame (per frame) -> cleanup
//
// Configuration is validated eagerly in `new`, detectors are constructed
// lazily per phase. A detector that fails during `detect` or
// `analyze_full_audio` is logged and contributes no results; the run goes on.

use crate::config::{DetectorConfig, PipelineConfig};
use crate::detection::{DetectionResult, Detector, DetectorKind, DetectorRegistry};
use crate::error::{CoreError, CoreResult};
use crate::media::{AudioBuffer, VideoFrame};
use std::collections::HashSet;

struct LoadedDetector {
    name: String,
    detector: Box<dyn Detector>,
}

/// Runs configured detectors in resource-constrained phases.
pub struct DetectionPipeline {
    registry: DetectorRegistry,
    configs: Vec<(DetectorConfig, DetectorKind)>,
    frame_duration: f64,
    audio_detectors: Vec<LoadedDetector>,
    frame_detectors: Vec<LoadedDetector>,
    audio_loaded: bool,
    frame_loaded: bool,
}

impl DetectionPipeline {
    /// Validates every detector config without constructing any detector.
    ///
    /// Fails when a type is not registered, a config declares no categories,
    /// two configs share a name, or `frame_duration` is not a positive
    /// finite number.
    pub fn new(
        registry: DetectorRegistry,
        configs: Vec<DetectorConfig>,
        frame_duration: f64,
    ) -> CoreResult<Self> {
        if !frame_duration.is_finite() || frame_duration <= 0.0 {
            return Err(CoreError::Config(format!(
                "frame duration must be positive, got {frame_duration}"
            )));
        }

        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(configs.len());
        for config in configs {
            let kind = registry.kind_of(&config.detector_type)?;
            if config.categories.is_empty() {
                return Err(CoreError::Config(format!(
                    "detector '{}' declares no categories",
                    config.name
                )));
            }
            if !seen.insert(config.name.clone()) {
                return Err(CoreError::Config(format!(
                    "duplicate detector name '{}'",
                    config.name
                )));
            }
            validated.push((config, kind));
        }

        log::debug!(
            "Detection pipeline configured with {} detector(s), frame duration {}s",
            validated.len(),
            frame_duration
        );

        Ok(Self {
            registry,
            configs: validated,
            frame_duration,
            audio_detectors: Vec::new(),
            frame_detectors: Vec::new(),
            audio_loaded: false,
            frame_loaded: false,
        })
    }

    /// Builds a pipeline from a deserialized [`PipelineConfig`].
    pub fn from_config(registry: DetectorRegistry, config: &PipelineConfig) -> CoreResult<Self> {
        Self::new(registry, config.detectors.clone(), config.frame_duration)
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    /// Whether any configured detector belongs to the full-audio phase.
    pub fn has_audio_detectors(&self) -> bool {
        self.configs
            .iter()
            .any(|(_, kind)| *kind == DetectorKind::FullAudio)
    }

    /// Names of detectors currently resident, in load order.
    pub fn loaded_detectors(&self) -> Vec<&str> {
        self.audio_detectors
            .iter()
            .chain(self.frame_detectors.iter())
            .map(|loaded| loaded.name.as_str())
            .collect()
    }

    /// Constructs every full-audio detector. Construction failures are fatal,
    /// including an instance that does not support full-audio analysis.
    pub fn initialize_audio_detectors(&mut self) -> CoreResult<()> {
        if self.audio_loaded {
            log::debug!("Audio detectors already initialized");
            return Ok(());
        }
        if self.frame_loaded {
            log::warn!("Releasing frame detectors before loading audio detectors");
            release_all(&mut self.frame_detectors);
            self.frame_loaded = false;
        }

        self.audio_detectors = self.construct(DetectorKind::FullAudio)?;
        self.audio_loaded = true;
        log::info!(
            "Initialized {} audio detector(s)",
            self.audio_detectors.len()
        );
        Ok(())
    }

    /// Runs whole-track analysis on every audio detector.
    ///
    /// Result time ranges are kept as reported by the detector.
    pub fn analyze_full_audio(
        &mut self,
        audio: &AudioBuffer,
        sample_rate: u32,
    ) -> CoreResult<Vec<DetectionResult>> {
        if !self.audio_loaded {
            return Err(CoreError::PipelineState(
                "audio detectors are not initialized".to_string(),
            ));
        }

        let mut results = Vec::new();
        for loaded in &mut self.audio_detectors {
            match loaded.detector.analyze_full_audio(audio, sample_rate) {
                Ok(found) => {
                    log::debug!("Detector '{}' reported {} result(s)", loaded.name, found.len());
                    results.extend(found);
                }
                Err(e) => {
                    log::error!("{} (full audio)", detector_failed(&loaded.name, e));
                }
            }
        }

        log::info!("Full-audio analysis produced {} detection(s)", results.len());
        Ok(results)
    }

    /// Releases audio detectors, in reverse load order.
    pub fn cleanup_audio_detectors(&mut self) {
        if !self.audio_detectors.is_empty() {
            log::info!("Releasing {} audio detector(s)", self.audio_detectors.len());
        }
        release_all(&mut self.audio_detectors);
        self.audio_loaded = false;
    }

    /// Constructs every frame detector, releasing resident audio detectors
    /// first.
    pub fn initialize_frame_detectors(&mut self) -> CoreResult<()> {
        if self.frame_loaded {
            log::debug!("Frame detectors already initialized");
            return Ok(());
        }
        if !self.audio_detectors.is_empty() {
            log::warn!("Audio detectors still resident; releasing them before loading frame detectors");
            self.cleanup_audio_detectors();
        }

        self.frame_detectors = self.construct(DetectorKind::Frame)?;
        self.frame_loaded = true;
        log::info!(
            "Initialized {} frame detector(s)",
            self.frame_detectors.len()
        );
        Ok(())
    }

    /// Runs every frame detector on one frame.
    ///
    /// Each returned result spans exactly
    /// `[frame.timecode, frame.timecode + frame_duration)`.
    pub fn analyze_frame(
        &mut self,
        frame: &VideoFrame,
        audio: Option<&AudioBuffer>,
    ) -> CoreResult<Vec<DetectionResult>> {
        if !self.frame_loaded {
            return Err(CoreError::PipelineState(
                "frame detectors are not initialized".to_string(),
            ));
        }
        if !frame.timecode.is_finite() {
            return Err(CoreError::InvalidDetection(format!(
                "frame timecode {} is not finite",
                frame.timecode
            )));
        }

        let start = frame.timecode;
        let end = start + self.frame_duration;
        if !end.is_finite() {
            return Err(CoreError::InvalidDetection(format!(
                "frame window starting at {start} overflows"
            )));
        }
        let mut results = Vec::new();

        for loaded in &mut self.frame_detectors {
            match loaded.detector.detect(Some(frame), audio) {
                Ok(found) => {
                    results.extend(found.iter().map(|detection| detection.stamped(start, end)));
                }
                Err(e) => {
                    log::error!(
                        "{} (frame at {:.3}s)",
                        detector_failed(&loaded.name, e),
                        frame.timecode
                    );
                }
            }
        }

        Ok(results)
    }

    /// Releases every loaded detector in reverse load order.
    ///
    /// A failing cleanup is logged and does not stop the others. Safe to
    /// call more than once.
    pub fn cleanup(&mut self) {
        release_all(&mut self.frame_detectors);
        release_all(&mut self.audio_detectors);
        self.frame_loaded = false;
        self.audio_loaded = false;
    }

    fn construct(&self, kind: DetectorKind) -> CoreResult<Vec<LoadedDetector>> {
        let mut loaded = Vec::new();
        for (config, _) in self.configs.iter().filter(|(_, k)| *k == kind) {
            match self.registry.create(&config.detector_type, config) {
                Ok(mut detector) => {
                    if kind == DetectorKind::FullAudio && !detector.supports_full_audio_analysis() {
                        if let Err(e) = detector.cleanup() {
                            log::warn!("Cleanup of detector '{}' failed: {}", config.name, e);
                        }
                        release_all(&mut loaded);
                        return Err(CoreError::DetectorInit {
                            name: config.name.clone(),
                            message: "registered for full-audio analysis but does not support it"
                                .to_string(),
                        });
                    }
                    log::debug!("Loaded {} detector '{}'", kind, config.name);
                    loaded.push(LoadedDetector {
                        name: config.name.clone(),
                        detector,
                    });
                }
                Err(e) => {
                    release_all(&mut loaded);
                    return Err(e);
                }
            }
        }
        Ok(loaded)
    }
}

fn detector_failed(name: &str, error: CoreError) -> CoreError {
    CoreError::DetectorFailed {
        name: name.to_string(),
        message: error.to_string(),
    }
}

impl Drop for DetectionPipeline {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn release_all(detectors: &mut Vec<LoadedDetector>) {
    while let Some(mut loaded) = detectors.pop() {
        if let Err(e) = loaded.detector.cleanup() {
            log::warn!("Cleanup of detector '{}' failed: {}", loaded.name, e);
        }
    }
}
