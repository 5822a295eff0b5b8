//! FFprobe integration for media analysis
//!
//! This module runs ffprobe (through the `ffprobe` crate) and condenses its
//! output into a [`MediaProbe`]: frame size, duration and stream layout.
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::media::{MediaProbe, StreamSummary, StreamType};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Probes `input_path` for geometry, duration and streams.
///
/// Missing fields are left as `None`; use [`MediaProbe::geometry`] when all
/// three video properties are required.
pub fn probe_media(input_path: &Path) -> CoreResult<MediaProbe> {
    log::debug!(
        "Running ffprobe (via crate) for media info on: {}",
        input_path.display()
    );
    let metadata = ffprobe(input_path).map_err(|err| {
        log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
        map_ffprobe_error(err, "media info")
    })?;

    let duration = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);

    let mut probe = MediaProbe {
        duration,
        ..Default::default()
    };

    if let Some(video_stream) = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    {
        probe.width = non_negative(video_stream.width, "width", input_path)?;
        probe.height = non_negative(video_stream.height, "height", input_path)?;
    }

    probe.streams = metadata
        .streams
        .iter()
        .enumerate()
        .map(|(index, stream)| {
            let stream_type = stream
                .codec_type
                .as_deref()
                .map(StreamType::from)
                .unwrap_or(StreamType::Other);
            let channels = match stream_type {
                StreamType::Audio => stream.channels.and_then(|c| u32::try_from(c).ok()),
                _ => None,
            };
            StreamSummary {
                index,
                stream_type,
                channels,
            }
        })
        .collect();

    if !probe.has_audio() {
        log::warn!("No audio streams found by ffprobe for {}", input_path.display());
    }

    Ok(probe)
}

fn non_negative(value: Option<i64>, field: &str, input_path: &Path) -> CoreResult<Option<u32>> {
    match value {
        None => Ok(None),
        Some(v) => u32::try_from(v).map(Some).map_err(|_| {
            CoreError::VideoInfoError(format!(
                "Invalid video {} ({}) in {}",
                field,
                v,
                input_path.display()
            ))
        }),
    }
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::FfprobeParse(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::FfprobeParse(format!(
            "Unknown ffprobe error during {context}: {err:?}"
        )),
    }
}
