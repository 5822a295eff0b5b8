//! Media data types shared by detectors and remediators.
//!
//! This module holds the in-memory audio buffer, the decoded video frame
//! handed to frame detectors, and the information returned by probing a
//! file.

pub mod audio_buffer;
pub mod info;

pub use audio_buffer::{AudioBuffer, AudioLayout};
pub use info::{MediaProbe, StreamSummary, StreamType, VideoGeometry};

/// A decoded video frame handed to frame detectors.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Presentation time of the frame in seconds
    pub timecode: f64,
    pub width: u32,
    pub height: u32,
    /// Packed RGB24 pixels, row-major
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    pub fn new(timecode: f64, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            timecode,
            width,
            height,
            pixels,
        }
    }
}
