//! Media information types returned by probing.

use serde::{Deserialize, Serialize};

/// Kind of a container stream, as far as remediation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Other,
}

impl From<&str> for StreamType {
    /// Maps an ffprobe `codec_type`.
    fn from(codec_type: &str) -> Self {
        match codec_type {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            _ => Self::Other,
        }
    }
}

/// Summary of one stream in a probed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Position of the stream in the container
    pub index: usize,

    /// Stream type
    pub stream_type: StreamType,

    /// Audio channel count, for audio streams
    pub channels: Option<u32>,
}

/// Result of probing a media file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Width of the first video stream
    pub width: Option<u32>,

    /// Height of the first video stream
    pub height: Option<u32>,

    /// Container duration in seconds
    pub duration: Option<f64>,

    /// All streams in container order
    pub streams: Vec<StreamSummary>,
}

impl MediaProbe {
    /// Returns true if the file carries at least one audio stream.
    pub fn has_audio(&self) -> bool {
        self.streams
            .iter()
            .any(|s| s.stream_type == StreamType::Audio)
    }

    /// Returns the frame geometry and duration if all three are known.
    pub fn geometry(&self) -> Option<VideoGeometry> {
        Some(VideoGeometry {
            width: self.width?,
            height: self.height?,
            duration: self.duration?,
        })
    }
}

/// Dimensions and duration needed for video remediation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoGeometry {
    pub width: u32,
    pub height: u32,
    /// Duration in seconds
    pub duration: f64,
}
