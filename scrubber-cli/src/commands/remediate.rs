// ============================================================================
// scrubber-cli/src/commands/remediate.rs
// ============================================================================
//
// REMEDIATE COMMAND: Applies reviewed segments to a video
//
// Flow: load and review segments -> build config -> check ffmpeg/ffprobe ->
// probe input -> decode audio (when needed) -> run the remediation manager.

use crate::cli::RemediateArgs;
use crate::config::{DEFAULT_AUDIO_SAMPLE_RATE, SPINNER_TICK_MS};
use crate::error::{CliErrorContext, CliResult};

use indicatif::{ProgressBar, ProgressStyle};
use scrubber_core::external::{FfmpegTransformer, MediaTransformer, check_dependency};
use scrubber_core::remediation::{RemediationReport, read_audio};
use scrubber_core::segments::{SegmentSummary, allow_labels};
use scrubber_core::{
    AudioBuffer, CoreConfig, CoreConfigBuilder, CoreError, RemediationJob, RemediationManager,
    create_temp_dir, format_timecode, load_segments, segment_detections,
};
use std::path::Path;
use std::time::{Duration, Instant};

/// Translates remediation flags into a [`CoreConfig`].
pub fn build_config(args: &RemediateArgs) -> CoreConfig {
    let mut builder = CoreConfigBuilder::new()
        .enable_audio(!args.no_audio)
        .enable_video(!args.no_video);

    if let Some(mode) = &args.audio_mode {
        builder = builder.audio_mode(mode);
    }
    if let Some(categories) = &args.categories {
        builder = builder.audio_categories(categories.iter().map(String::as_str));
    }
    if let Some(frequency) = args.bleep_frequency {
        builder = builder.bleep_frequency(frequency);
    }
    if let Some(mode) = &args.video_mode {
        builder = builder.video_mode(mode);
    }
    for (label, mode) in &args.category_modes {
        builder = builder.category_mode(label, mode);
    }
    if let Some(color) = &args.blank_color {
        builder = builder.blank_color(color);
    }
    if let Some(dir) = &args.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    builder.build()
}

/// Runs the `remediate` command against ffmpeg and ffprobe.
pub fn run_remediate(args: RemediateArgs) -> CliResult<RemediationReport> {
    remediate_with(FfmpegTransformer::new(), args, check_tools)
}

fn check_tools() -> CliResult<()> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    log::debug!("External dependency check passed.");
    Ok(())
}

/// Runs the `remediate` command with the given transformer.
///
/// Flags are validated before `check_tools` runs and before the transformer
/// is first used.
pub fn remediate_with<T: MediaTransformer>(
    transformer: T,
    args: RemediateArgs,
    check_tools: impl FnOnce() -> CliResult<()>,
) -> CliResult<RemediationReport> {
    let started = Instant::now();

    if !args.input.is_file() {
        return Err(CoreError::OperationFailed(format!(
            "Input video '{}' does not exist",
            args.input.display()
        )));
    }
    if args.output == args.input {
        return Err(CoreError::Config(
            "output must differ from the input video".to_string(),
        ));
    }

    let config = build_config(&args);
    let mut manager = RemediationManager::new(transformer, &config)?;

    let mut segments = load_segments(&args.segments)
        .cli_with_context(|| format!("Reading segments from {}", args.segments.display()))?;
    if !args.allow_labels.is_empty() {
        allow_labels(&mut segments, &args.allow_labels);
    }
    let summary = SegmentSummary::from_segments(&segments);
    log::info!(
        "{} segment(s), {} allowed, {} to censor",
        summary.segment_count,
        summary.allowed_count,
        format_timecode(summary.censored_seconds)
    );

    check_tools()?;

    let probe = manager
        .transformer()
        .probe(&args.input)
        .cli_with_context(|| format!("Probing {}", args.input.display()))?;
    let geometry = probe.geometry();
    if geometry.is_none() && config.video.enabled {
        log::warn!(
            "Could not determine dimensions and duration of {}; skipping video remediation",
            args.input.display()
        );
    }

    let decoded = if config.audio.enabled && probe.has_audio() {
        Some(decode_audio(
            manager.transformer(),
            &args.input,
            config.temp_dir.as_deref(),
        )?)
    } else {
        if config.audio.enabled {
            log::info!("Input has no audio stream; skipping audio remediation");
        }
        None
    };

    let detections = segment_detections(&segments);
    let mut job = RemediationJob::new(&args.input)
        .output(&args.output)
        .detections(&detections)
        .segments(&segments);
    if let Some((audio, sample_rate)) = &decoded {
        job = job.audio(audio, *sample_rate);
    }
    if let Some(geometry) = geometry {
        job = job.geometry(geometry);
    }

    let spinner = spinner("Remediating");
    let result = manager.run(&job);
    spinner.finish_and_clear();
    manager.cleanup();
    let report = result.cli_with_context(|| format!("Remediating {}", args.input.display()))?;

    if report.stages.is_empty() {
        log::warn!("Nothing to do: audio and video remediation are both inactive");
    } else {
        log::info!(
            "Completed stages: {}",
            report
                .stages
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    if let Some(output) = &report.output_path {
        log::info!("Wrote {}", output.display());
    }
    log::info!(
        "Finished in {}",
        format_timecode(started.elapsed().as_secs_f64())
    );
    Ok(report)
}

fn decode_audio<T: MediaTransformer>(
    transformer: &T,
    input: &Path,
    temp_base: Option<&Path>,
) -> CliResult<(AudioBuffer, u32)> {
    let dir = create_temp_dir(temp_base, "scrubber_audio")?;
    let wav = dir.path().join("source.wav");

    let spinner = spinner("Decoding audio");
    let extracted = transformer.extract_audio(input, &wav, DEFAULT_AUDIO_SAMPLE_RATE);
    spinner.finish_and_clear();
    extracted.cli_context("Decoding audio")?;

    let (audio, sample_rate) = read_audio(&wav)?;
    log::debug!(
        "Decoded {} frame(s) x {} channel(s) at {} Hz",
        audio.frames(),
        audio.channels(),
        sample_rate
    );
    Ok((audio, sample_rate))
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    spinner
}
