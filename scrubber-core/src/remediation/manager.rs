// ============================================================================
// scrubber-core/src/remediation/manager.rs
// ============================================================================
//
// REMEDIATION MANAGER: Fixed-order orchestration of audio, mux and video
//
// Audio remediation works on original timestamps and video cuts shift the
// timeline, so the manager always runs the stages in this order:
//
//   AudioRemediated  remediated samples written to a temp WAV
//   Muxed            (remediated or original) audio + source video -> output
//   VideoRemediated  output moved aside, remediated back into the output path
//
// Which stages run is decided up front by `plan_stages`. A failing stage
// aborts the run; a failed video stage removes the half-written output.
// Temporary files live in a per-manager directory removed by `cleanup` (or
// on drop).

use crate::config::CoreConfig;
use crate::detection::DetectionResult;
use crate::error::{CoreError, CoreResult};
use crate::external::{MediaTransformer, MuxMetadata};
use crate::media::{AudioBuffer, VideoGeometry};
use crate::remediation::audio::{AudioRemediator, write_audio};
use crate::remediation::video::{VideoOutcome, VideoRemediator};
use crate::segments::Segment;
use crate::temp_files;
use crate::utils::{censored_title, extension_or};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Tag written into every remediated output.
pub const REMEDIATION_COMMENT: &str = "Content remediated by scrubber";

/// One step of a remediation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RemediationStage {
    AudioRemediated,
    Muxed,
    VideoRemediated,
}

impl fmt::Display for RemediationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemediationStage::AudioRemediated => write!(f, "audio"),
            RemediationStage::Muxed => write!(f, "mux"),
            RemediationStage::VideoRemediated => write!(f, "video"),
        }
    }
}

/// Decides which stages run.
///
/// * `audio_ready`: audio remediation is enabled and an audio buffer exists
/// * `has_output`: an output path was given
/// * `video_ready`: video remediation is enabled and geometry is known
///
/// Video remediation needs an output to work on. Muxing happens whenever
/// there is an output and something was (or will be) remediated.
pub fn plan_stages(audio_ready: bool, has_output: bool, video_ready: bool) -> Vec<RemediationStage> {
    let video_runs = video_ready && has_output;
    let mut stages = Vec::with_capacity(3);
    if audio_ready {
        stages.push(RemediationStage::AudioRemediated);
    }
    if has_output && (audio_ready || video_runs) {
        stages.push(RemediationStage::Muxed);
    }
    if video_runs {
        stages.push(RemediationStage::VideoRemediated);
    }
    stages
}

/// Inputs of one remediation run.
#[derive(Debug, Clone, Copy)]
pub struct RemediationJob<'a> {
    input_video: &'a Path,
    output: Option<&'a Path>,
    audio: Option<(&'a AudioBuffer, u32)>,
    detections: &'a [DetectionResult],
    segments: &'a [Segment],
    geometry: Option<VideoGeometry>,
    source_title: Option<&'a str>,
}

impl<'a> RemediationJob<'a> {
    pub fn new(input_video: &'a Path) -> Self {
        Self {
            input_video,
            output: None,
            audio: None,
            detections: &[],
            segments: &[],
            geometry: None,
            source_title: None,
        }
    }

    #[must_use]
    pub fn output(mut self, output: &'a Path) -> Self {
        self.output = Some(output);
        self
    }

    /// Decoded audio of `input_video` and its sample rate.
    #[must_use]
    pub fn audio(mut self, audio: &'a AudioBuffer, sample_rate: u32) -> Self {
        self.audio = Some((audio, sample_rate));
        self
    }

    #[must_use]
    pub fn detections(mut self, detections: &'a [DetectionResult]) -> Self {
        self.detections = detections;
        self
    }

    #[must_use]
    pub fn segments(mut self, segments: &'a [Segment]) -> Self {
        self.segments = segments;
        self
    }

    #[must_use]
    pub fn geometry(mut self, geometry: VideoGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    #[must_use]
    pub fn source_title(mut self, title: &'a str) -> Self {
        self.source_title = Some(title);
        self
    }
}

/// What a remediation run did.
#[derive(Debug, Clone)]
pub struct RemediationReport {
    /// Stages completed, in execution order
    pub stages: Vec<RemediationStage>,
    /// Final output, when one was written
    pub output_path: Option<PathBuf>,
    pub video_outcome: Option<VideoOutcome>,
    /// Remediated copy of the input audio, when audio remediation ran
    pub remediated_audio: Option<AudioBuffer>,
}

/// Runs audio, mux and video remediation in a fixed order.
pub struct RemediationManager<T: MediaTransformer> {
    transformer: T,
    audio: AudioRemediator,
    video: VideoRemediator,
    temp_base: Option<PathBuf>,
    temp_dir: Option<TempDir>,
    temp_audio: Vec<PathBuf>,
}

impl<T: MediaTransformer> RemediationManager<T> {
    /// Builds the manager, validating the remediation sections of `config`.
    pub fn new(transformer: T, config: &CoreConfig) -> CoreResult<Self> {
        Ok(Self {
            transformer,
            audio: AudioRemediator::new(&config.audio)?,
            video: VideoRemediator::new(&config.video)?,
            temp_base: config.temp_dir.clone(),
            temp_dir: None,
            temp_audio: Vec::new(),
        })
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    pub fn audio_remediator(&self) -> &AudioRemediator {
        &self.audio
    }

    pub fn video_remediator(&self) -> &VideoRemediator {
        &self.video
    }

    /// Directory holding this manager's temporary files, once created.
    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Temp WAV files written so far.
    pub fn temp_audio_files(&self) -> &[PathBuf] {
        &self.temp_audio
    }

    /// Stages `job` would run with the current configuration.
    pub fn plan(&self, job: &RemediationJob<'_>) -> Vec<RemediationStage> {
        plan_stages(
            self.audio.enabled() && job.audio.is_some(),
            job.output.is_some(),
            self.video.enabled() && job.geometry.is_some(),
        )
    }

    /// Executes the planned stages for `job`.
    pub fn run(&mut self, job: &RemediationJob<'_>) -> CoreResult<RemediationReport> {
        let plan = self.plan(job);
        log::info!(
            "Remediation plan for {}: [{}]",
            job.input_video.display(),
            plan.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
        );

        let mut report = RemediationReport {
            stages: Vec::with_capacity(plan.len()),
            output_path: None,
            video_outcome: None,
            remediated_audio: None,
        };
        let mut temp_audio_path: Option<PathBuf> = None;

        for stage in plan {
            match stage {
                RemediationStage::AudioRemediated => {
                    let (buffer, sample_rate) = job.audio.ok_or_else(|| {
                        CoreError::PipelineState("audio stage planned without audio".to_string())
                    })?;
                    let remediated =
                        self.audio
                            .remediate(buffer, sample_rate, job.detections, Some(job.segments));

                    let dir = self.ensure_temp_dir()?;
                    let path = temp_files::create_temp_file_path(&dir, "remediated_audio", "wav");
                    write_audio(&remediated, sample_rate, &path)?;
                    self.temp_audio.push(path.clone());
                    temp_audio_path = Some(path);
                    report.remediated_audio = Some(remediated);
                }
                RemediationStage::Muxed => {
                    let output = required_output(job)?;
                    let metadata = self.mux_metadata(job, temp_audio_path.is_some());
                    if let Err(e) = self.transformer.mux(
                        job.input_video,
                        temp_audio_path.as_deref(),
                        &metadata,
                        output,
                    ) {
                        remove_partial_output(output);
                        return Err(e);
                    }
                    report.output_path = Some(output.to_path_buf());
                }
                RemediationStage::VideoRemediated => {
                    let output = required_output(job)?;
                    let geometry = job.geometry.ok_or_else(|| {
                        CoreError::PipelineState("video stage planned without geometry".to_string())
                    })?;
                    let outcome = self.remediate_video(job, output, geometry)?;
                    report.video_outcome = Some(outcome);
                }
            }
            log::info!("Stage complete: {}", stage);
            report.stages.push(stage);
        }

        Ok(report)
    }

    /// Removes temp audio and the temp directory. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        for path in self.temp_audio.drain(..) {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Failed to remove temp audio {}: {}", path.display(), e);
                }
            }
        }
        if let Some(dir) = self.temp_dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                log::warn!("Failed to remove temp directory {}: {}", path.display(), e);
            } else {
                log::debug!("Removed temp directory {}", path.display());
            }
        }
    }

    fn ensure_temp_dir(&mut self) -> CoreResult<PathBuf> {
        if let Some(dir) = &self.temp_dir {
            return Ok(dir.path().to_path_buf());
        }
        let dir = temp_files::create_temp_dir(self.temp_base.as_deref(), "scrubber")?;
        let path = dir.path().to_path_buf();
        log::debug!("Created temp directory {}", path.display());
        self.temp_dir = Some(dir);
        Ok(path)
    }

    fn remediate_video(
        &mut self,
        job: &RemediationJob<'_>,
        output: &Path,
        geometry: VideoGeometry,
    ) -> CoreResult<VideoOutcome> {
        let dir = self.ensure_temp_dir()?;
        let intermediate =
            temp_files::create_temp_file_path(&dir, "muxed", &extension_or(output, "mp4"));
        temp_files::move_file(output, &intermediate)?;

        match self.video.remediate(
            &self.transformer,
            &intermediate,
            output,
            job.segments,
            geometry,
            &dir,
        ) {
            Ok(VideoOutcome::Unchanged) => {
                temp_files::move_file(&intermediate, output)?;
                Ok(VideoOutcome::Unchanged)
            }
            Ok(outcome) => {
                if let Err(e) = fs::remove_file(&intermediate) {
                    log::warn!("Failed to remove {}: {}", intermediate.display(), e);
                }
                Ok(outcome)
            }
            Err(e) => {
                log::error!("Video remediation failed: {}", e);
                remove_partial_output(output);
                Err(e)
            }
        }
    }

    fn mux_metadata(&self, job: &RemediationJob<'_>, audio_remediated: bool) -> MuxMetadata {
        let censored = job.segments.iter().filter(|s| !s.allow()).count();
        let mut metadata = MuxMetadata::titled(censored_title(job.input_video, job.source_title))
            .with_tag("comment", REMEDIATION_COMMENT)
            .with_tag("scrubber_version", env!("CARGO_PKG_VERSION"))
            .with_tag("scrubber_remediated_at", chrono::Utc::now().to_rfc3339())
            .with_tag("scrubber_segments", censored.to_string());
        if audio_remediated {
            metadata = metadata.with_tag("scrubber_audio_mode", self.audio.mode().to_string());
        }
        if self.video.enabled() && job.geometry.is_some() {
            metadata = metadata.with_tag("scrubber_video_mode", self.video.mode().to_string());
        }
        metadata
    }
}

impl<T: MediaTransformer> Drop for RemediationManager<T> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn required_output<'a>(job: &RemediationJob<'a>) -> CoreResult<&'a Path> {
    job.output
        .ok_or_else(|| CoreError::PipelineState("stage planned without an output path".to_string()))
}

fn remove_partial_output(output: &Path) {
    if output.exists() {
        match fs::remove_file(output) {
            Ok(()) => log::info!("Removed partial output {}", output.display()),
            Err(e) => log::warn!("Failed to remove partial output {}: {}", output.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;
    use crate::external::mocks::{MockMediaTransformer, TransformCall};
    use super::RemediationStage::*;

    fn geometry() -> VideoGeometry {
        VideoGeometry {
            width: 640,
            height: 360,
            duration: 30.0,
        }
    }

    fn detections() -> Vec<DetectionResult> {
        vec![DetectionResult::new(1.0, 2.0, "Profanity", 0.9, "word").unwrap()]
    }

    fn segments() -> Vec<Segment> {
        vec![Segment::new(1.0, 2.0, ["Profanity"], 0.9, "word")]
    }

    fn is_subsequence(stages: &[RemediationStage]) -> bool {
        let order = [AudioRemediated, Muxed, VideoRemediated];
        let mut it = order.iter();
        stages.iter().all(|s| it.any(|o| o == s))
    }

    #[test]
    fn test_plan_stages_permutations() {
        assert_eq!(plan_stages(true, true, true), vec![AudioRemediated, Muxed, VideoRemediated]);
        assert_eq!(plan_stages(true, true, false), vec![AudioRemediated, Muxed]);
        assert_eq!(plan_stages(false, true, true), vec![Muxed, VideoRemediated]);
        assert_eq!(plan_stages(false, true, false), Vec::<RemediationStage>::new());
        assert_eq!(plan_stages(true, false, true), vec![AudioRemediated]);
        assert_eq!(plan_stages(true, false, false), vec![AudioRemediated]);
        assert!(plan_stages(false, false, true).is_empty());
        assert!(plan_stages(false, false, false).is_empty());

        for audio in [false, true] {
            for output in [false, true] {
                for video in [false, true] {
                    assert!(is_subsequence(&plan_stages(audio, output, video)));
                }
            }
        }
    }

    #[test]
    fn test_executed_stage_order_for_every_permutation() {
        let input = Path::new("/media/movie.mp4");
        let audio = AudioBuffer::mono(vec![1.0; 30 * 100]);
        let detections = detections();
        let segments = segments();

        for audio_enabled in [false, true] {
            for video_enabled in [false, true] {
                for with_output in [false, true] {
                    let dir = tempfile::tempdir().unwrap();
                    let output = dir.path().join("movie.mp4");
                    let config = CoreConfigBuilder::new()
                        .temp_dir(dir.path().to_path_buf())
                        .enable_audio(audio_enabled)
                        .enable_video(video_enabled)
                        .build();
                    let mock = MockMediaTransformer::new();
                    let mut manager = RemediationManager::new(mock.clone(), &config).unwrap();

                    let mut job = RemediationJob::new(input)
                        .audio(&audio, 100)
                        .detections(&detections)
                        .segments(&segments)
                        .geometry(geometry());
                    if with_output {
                        job = job.output(&output);
                    }

                    let report = manager.run(&job).unwrap();
                    assert!(is_subsequence(&report.stages));
                    assert_eq!(
                        report.stages,
                        plan_stages(audio_enabled, with_output, video_enabled),
                        "audio={audio_enabled} video={video_enabled} output={with_output}"
                    );

                    let ops = mock.operations();
                    if ops.contains(&"mux") {
                        assert_eq!(ops[0], "mux", "mux must precede video transforms: {ops:?}");
                    }
                    assert_eq!(with_output && (audio_enabled || video_enabled), output.exists());
                    manager.cleanup();
                }
            }
        }
    }

    #[test]
    fn test_full_run_muxes_remediated_audio_then_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clean.mp4");
        let config = CoreConfigBuilder::new()
            .temp_dir(dir.path().to_path_buf())
            .build();
        let mock = MockMediaTransformer::new();
        let mut manager = RemediationManager::new(mock.clone(), &config).unwrap();

        let audio = AudioBuffer::mono(vec![1.0; 300]);
        let detections = detections();
        let segments = segments();
        let job = RemediationJob::new(Path::new("/media/Movie Night.mp4"))
            .output(&output)
            .audio(&audio, 100)
            .detections(&detections)
            .segments(&segments)
            .geometry(geometry());

        let report = manager.run(&job).unwrap();
        assert_eq!(report.stages, vec![AudioRemediated, Muxed, VideoRemediated]);
        assert_eq!(report.video_outcome, Some(VideoOutcome::Blanked));
        assert_eq!(report.output_path.as_deref(), Some(output.as_path()));

        let remediated = report.remediated_audio.unwrap();
        assert!(remediated.samples()[100..200].iter().all(|&s| s == 0.0));
        assert!(remediated.samples()[..100].iter().all(|&s| s == 1.0));

        let calls = mock.calls();
        match &calls[0] {
            TransformCall::Mux { audio, metadata, output: muxed, .. } => {
                let audio_path = audio.as_ref().expect("remediated audio muxed");
                assert_eq!(audio_path.extension().unwrap(), "wav");
                assert_eq!(metadata.title, "Movie Night (Censored)");
                assert_eq!(metadata.tags["comment"], REMEDIATION_COMMENT);
                assert_eq!(metadata.tags["scrubber_segments"], "1");
                assert_eq!(muxed, &output);
            }
            other => panic!("expected mux first, got {other:?}"),
        }
        match &calls[1] {
            TransformCall::ApplyFilter { input, output: filtered, .. } => {
                assert_ne!(input, &output);
                assert_eq!(filtered, &output);
            }
            other => panic!("expected filter second, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&output).unwrap(), "filtered");

        let temp = manager.temp_dir().unwrap().to_path_buf();
        manager.cleanup();
        manager.cleanup();
        assert!(!temp.exists());
        assert!(output.exists());
    }

    #[test]
    fn test_video_without_audio_muxes_original_audio() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mkv");
        let config = CoreConfigBuilder::new()
            .temp_dir(dir.path().to_path_buf())
            .enable_audio(false)
            .video_mode("none")
            .build();
        let mock = MockMediaTransformer::new();
        let mut manager = RemediationManager::new(mock.clone(), &config).unwrap();
        let segments = segments();

        let job = RemediationJob::new(Path::new("in.mkv"))
            .output(&output)
            .segments(&segments)
            .geometry(geometry());
        let report = manager.run(&job).unwrap();

        assert_eq!(report.stages, vec![Muxed, VideoRemediated]);
        assert_eq!(report.video_outcome, Some(VideoOutcome::Unchanged));
        assert!(matches!(&mock.calls()[0], TransformCall::Mux { audio: None, .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "muxed");
    }

    #[test]
    fn test_failed_video_stage_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let config = CoreConfigBuilder::new()
            .temp_dir(dir.path().to_path_buf())
            .build();
        let mock = MockMediaTransformer::new();
        mock.fail_on("apply_filter");
        let mut manager = RemediationManager::new(mock.clone(), &config).unwrap();

        let audio = AudioBuffer::mono(vec![1.0; 300]);
        let detections = detections();
        let segments = segments();
        let job = RemediationJob::new(Path::new("in.mp4"))
            .output(&output)
            .audio(&audio, 100)
            .detections(&detections)
            .segments(&segments)
            .geometry(geometry());

        assert!(manager.run(&job).is_err());
        assert!(!output.exists());
        assert_eq!(mock.operations(), vec!["mux", "apply_filter"]);
    }

    #[test]
    fn test_failed_mux_stops_before_video() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let config = CoreConfigBuilder::new()
            .temp_dir(dir.path().to_path_buf())
            .build();
        let mock = MockMediaTransformer::new();
        mock.fail_on("mux");
        let mut manager = RemediationManager::new(mock.clone(), &config).unwrap();

        let audio = AudioBuffer::mono(vec![1.0; 300]);
        let job = RemediationJob::new(Path::new("in.mp4"))
            .output(&output)
            .audio(&audio, 100)
            .geometry(geometry());

        assert!(manager.run(&job).is_err());
        assert_eq!(mock.operations(), vec!["mux"]);
        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = CoreConfigBuilder::new().audio_mode("mute").build();
        assert!(RemediationManager::new(MockMediaTransformer::new(), &config).is_err());
        let config = CoreConfigBuilder::new().blank_color("black").build();
        assert!(RemediationManager::new(MockMediaTransformer::new(), &config).is_err());
    }

    #[test]
    fn test_drop_removes_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfigBuilder::new()
            .temp_dir(dir.path().to_path_buf())
            .enable_video(false)
            .build();
        let audio = AudioBuffer::mono(vec![0.5; 100]);
        let temp = {
            let mut manager = RemediationManager::new(MockMediaTransformer::new(), &config).unwrap();
            let job = RemediationJob::new(Path::new("in.mp4")).audio(&audio, 100);
            let report = manager.run(&job).unwrap();
            assert_eq!(report.stages, vec![AudioRemediated]);
            assert_eq!(manager.temp_audio_files().len(), 1);
            assert!(manager.temp_audio_files()[0].exists());
            manager.temp_dir().unwrap().to_path_buf()
        };
        assert!(!temp.exists());
    }
}
