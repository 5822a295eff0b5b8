//! FFmpeg command building and the ffmpeg-backed [`MediaTransformer`].
//!
//! Each transform is a pure `build_*_command` function plus a thin method on
//! [`FfmpegTransformer`] that runs it through an [`FfmpegSpawner`]. Video is
//! re-encoded with libx264 wherever frames change (filters, cuts) so cut
//! points do not depend on keyframe placement.

use super::ffmpeg_builder::FfmpegCommandBuilder;
use super::ffmpeg_executor::{FfmpegSpawner, SidecarSpawner, run_ffmpeg};
use super::{MediaTransformer, MuxMetadata, ffprobe_executor};
use crate::error::{CoreError, CoreResult};
use crate::media::MediaProbe;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const VIDEO_CRF: u8 = 18;
const VIDEO_PRESET: &str = "medium";
const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "192k";

/// Combines `video` with `audio` (or the video's own audio when `None`).
///
/// Video is stream-copied; a replacement audio track is encoded to AAC.
/// Subtitles and global metadata of the source are carried over, then the
/// provenance tags in `metadata` are applied.
pub fn build_mux_command(
    video: &Path,
    audio: Option<&Path>,
    metadata: &MuxMetadata,
    output: &Path,
) -> FfmpegCommand {
    let mut builder = FfmpegCommandBuilder::new().input(video);
    builder = match audio {
        Some(audio_path) => builder
            .input(audio_path)
            .map("0:v:0")
            .map("1:a:0")
            .map("0:s?")
            .option("-c:v", "copy")
            .option("-c:a", AUDIO_CODEC)
            .option("-b:a", AUDIO_BITRATE)
            .option("-c:s", "copy"),
        None => builder
            .map("0:v:0")
            .map("0:a?")
            .map("0:s?")
            .option("-c", "copy"),
    };

    builder = builder
        .option("-map_metadata", "0")
        .option("-map_chapters", "0")
        .metadata("title", &metadata.title);
    for (key, value) in &metadata.tags {
        builder = builder.metadata(key, value);
    }
    builder.build(output)
}

/// Re-encodes `input` through the video filter chain, copying audio.
pub fn build_filter_command(input: &Path, filter_chain: &str, output: &Path) -> FfmpegCommand {
    FfmpegCommandBuilder::new()
        .input(input)
        .option("-vf", filter_chain)
        .map("0:v:0")
        .map("0:a?")
        .x264(VIDEO_CRF, VIDEO_PRESET)
        .option("-c:a", "copy")
        .option("-map_metadata", "0")
        .build(output)
}

/// Extracts `[start, end)` of `input`, re-encoding both streams.
pub fn build_subclip_command(input: &Path, start: f64, end: f64, output: &Path) -> FfmpegCommand {
    FfmpegCommandBuilder::new()
        .input(input)
        .option("-ss", format!("{start:.3}"))
        .option("-to", format!("{end:.3}"))
        .map("0:v:0")
        .map("0:a?")
        .x264(VIDEO_CRF, VIDEO_PRESET)
        .option("-c:a", AUDIO_CODEC)
        .option("-b:a", AUDIO_BITRATE)
        .option("-avoid_negative_ts", "make_zero")
        .build(output)
}

/// Concatenates the files listed in `list_file` (concat demuxer format).
pub fn build_concat_command(list_file: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommandBuilder::new()
        .input_option("-f", "concat")
        .input_option("-safe", "0")
        .input(list_file)
        .option("-c", "copy")
        .option("-fflags", "+genpts")
        .option("-map_metadata", "0")
        .build(output)
}

/// Decodes the first audio stream of `input` to 16-bit PCM WAV.
pub fn build_extract_audio_command(input: &Path, output: &Path, sample_rate: u32) -> FfmpegCommand {
    FfmpegCommandBuilder::new()
        .input(input)
        .map("0:a:0")
        .flag("-vn")
        .option("-ar", sample_rate.to_string())
        .option("-c:a", "pcm_s16le")
        .build(output)
}

/// Writes a concat demuxer list for `inputs` to `list_file`.
pub fn write_concat_list(inputs: &[PathBuf], list_file: &Path) -> CoreResult<()> {
    let mut writer = BufWriter::new(File::create(list_file)?);
    for input in inputs {
        let absolute = if input.is_absolute() {
            input.clone()
        } else {
            std::env::current_dir()?.join(input)
        };
        let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
        writeln!(writer, "file '{escaped}'")?;
    }
    writer.flush()?;
    Ok(())
}

/// [`MediaTransformer`] backed by ffmpeg (through an [`FfmpegSpawner`]) and
/// ffprobe.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTransformer<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
}

impl FfmpegTransformer<SidecarSpawner> {
    pub fn new() -> Self {
        Self::with_spawner(SidecarSpawner)
    }
}

impl<S: FfmpegSpawner> FfmpegTransformer<S> {
    pub fn with_spawner(spawner: S) -> Self {
        Self { spawner }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }
}

impl<S: FfmpegSpawner> MediaTransformer for FfmpegTransformer<S> {
    fn mux(
        &self,
        video: &Path,
        audio: Option<&Path>,
        metadata: &MuxMetadata,
        output: &Path,
    ) -> CoreResult<()> {
        log::info!(
            "Muxing {} with {} -> {}",
            video.display(),
            audio.map_or_else(|| "original audio".to_string(), |a| a.display().to_string()),
            output.display()
        );
        run_ffmpeg(
            &self.spawner,
            build_mux_command(video, audio, metadata, output),
            "mux",
        )
    }

    fn apply_filter(&self, input: &Path, filter_chain: &str, output: &Path) -> CoreResult<()> {
        run_ffmpeg(
            &self.spawner,
            build_filter_command(input, filter_chain, output),
            "filter",
        )
    }

    fn extract_subclip(&self, input: &Path, start: f64, end: f64, output: &Path) -> CoreResult<()> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(CoreError::OperationFailed(format!(
                "invalid subclip range [{start}, {end})"
            )));
        }
        run_ffmpeg(
            &self.spawner,
            build_subclip_command(input, start, end, output),
            "subclip",
        )
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<()> {
        if inputs.is_empty() {
            return Err(CoreError::OperationFailed(
                "no inputs to concatenate".to_string(),
            ));
        }

        // Kept clips live in the caller's scratch directory; the list joins them there.
        let list_dir = inputs[0]
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(std::env::temp_dir, Path::to_path_buf);
        let list_file = tempfile::Builder::new()
            .prefix("concat_")
            .suffix(".txt")
            .tempfile_in(&list_dir)?;
        write_concat_list(inputs, list_file.path())?;

        run_ffmpeg(
            &self.spawner,
            build_concat_command(list_file.path(), output),
            "concat",
        )
    }

    fn probe(&self, input: &Path) -> CoreResult<MediaProbe> {
        ffprobe_executor::probe_media(input)
    }

    fn extract_audio(&self, input: &Path, output: &Path, sample_rate: u32) -> CoreResult<()> {
        run_ffmpeg(
            &self.spawner,
            build_extract_audio_command(input, output, sample_rate),
            "extract audio",
        )
    }
}
