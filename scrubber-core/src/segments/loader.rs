//! Reads persisted segment JSON.
//!
//! Accepted shape:
//!
//! ```json
//! {
//!   "metadata": { "video": "movie.mkv" },
//!   "segments": [
//!     { "start_time": "00:01:02.500", "end_time": "00:01:04", "labels": ["Profanity"],
//!       "confidence": 0.93, "allow": false, "description": "...", "video_mode": "cut" }
//!   ]
//! }
//! ```
//!
//! Times may be timecode strings, bare numbers, or `start_time_seconds` /
//! `end_time_seconds` (which take precedence when present). A stored
//! `duration` is ignored and recomputed from the range. A bare top-level array
//! of segments is accepted too.

use super::Segment;
use crate::error::{CoreError, CoreResult};
use crate::utils::parse_timecode;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const INLINE_SOURCE: &str = "<inline>";
const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentDocument {
    Wrapped {
        #[serde(default)]
        #[allow(dead_code)]
        metadata: serde_json::Value,
        segments: Vec<RawSegment>,
    },
    Bare(Vec<RawSegment>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTime {
    Seconds(f64),
    Timecode(String),
}

#[derive(Deserialize)]
struct RawSegment {
    #[serde(default)]
    start_time: Option<RawTime>,
    #[serde(default)]
    end_time: Option<RawTime>,
    #[serde(default)]
    start_time_seconds: Option<f64>,
    #[serde(default)]
    end_time_seconds: Option<f64>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    allow: bool,
    #[serde(default)]
    description: String,
    #[serde(default)]
    video_mode: Option<String>,
}

/// Loads segments from a JSON file, sorted by start time.
pub fn load_segments(path: &Path) -> CoreResult<Vec<Segment>> {
    let origin = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|e| CoreError::SegmentLoad {
        path: origin.clone(),
        message: e.to_string(),
    })?;
    let segments = parse_from(&json, &origin)?;
    log::info!("Loaded {} segment(s) from {}", segments.len(), origin);
    Ok(segments)
}

/// Parses segments from a JSON string, sorted by start time.
pub fn parse_segments(json: &str) -> CoreResult<Vec<Segment>> {
    parse_from(json, INLINE_SOURCE)
}

fn parse_from(json: &str, origin: &str) -> CoreResult<Vec<Segment>> {
    let load_error = |message: String| CoreError::SegmentLoad {
        path: origin.to_string(),
        message,
    };

    let document: SegmentDocument =
        serde_json::from_str(json).map_err(|e| load_error(e.to_string()))?;
    let raw_segments = match document {
        SegmentDocument::Wrapped { segments, .. } => segments,
        SegmentDocument::Bare(segments) => segments,
    };

    let mut segments = raw_segments
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            convert(raw).map_err(|message| load_error(format!("segment {index}: {message}")))
        })
        .collect::<CoreResult<Vec<_>>>()?;

    segments.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));
    Ok(segments)
}

fn convert(raw: RawSegment) -> Result<Segment, String> {
    let start_time = resolve_time(raw.start_time_seconds, raw.start_time, "start_time")?;
    let end_time = resolve_time(raw.end_time_seconds, raw.end_time, "end_time")?;
    if end_time < start_time {
        return Err(format!(
            "end_time {end_time} precedes start_time {start_time}"
        ));
    }

    let confidence = raw.confidence.unwrap_or(1.0);
    if !(0.0..=1.0).contains(&confidence) {
        return Err(format!("confidence {confidence} is outside [0, 1]"));
    }

    let labels = if !raw.labels.is_empty() {
        raw.labels
    } else {
        vec![raw.label.unwrap_or_else(|| UNKNOWN_LABEL.to_string())]
    };

    let mut segment = Segment::new(start_time, end_time, labels, confidence, raw.description);
    if let Some(mode) = raw.video_mode {
        segment = segment.with_video_mode(mode);
    }
    segment.set_allow(raw.allow);
    Ok(segment)
}

fn resolve_time(seconds: Option<f64>, value: Option<RawTime>, field: &str) -> Result<f64, String> {
    let time = match (seconds, value) {
        (Some(secs), _) => secs,
        (None, Some(RawTime::Seconds(secs))) => secs,
        (None, Some(RawTime::Timecode(text))) => parse_timecode(&text).map_err(|e| e.to_string())?,
        (None, None) => return Err(format!("missing {field}")),
    };
    if !time.is_finite() || time < 0.0 {
        return Err(format!("{field} {time} is not a non-negative number"));
    }
    Ok(time)
}
