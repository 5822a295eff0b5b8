//! Merged time segments
//!
//! A [`Segment`] is the unit reviewers act on and remediators consume. It is
//! produced by [`merge_segments`] from raw detections, or loaded from
//! persisted segment JSON by [`load_segments`].

pub mod loader;
pub mod merge;
pub mod summary;

pub use loader::{load_segments, parse_segments};
pub use merge::merge_segments;
pub use summary::SegmentSummary;

use crate::detection::DetectionResult;
use std::collections::BTreeSet;

/// A merged, label-aggregated time range.
///
/// `duration()` is always derived from the range. `allow` is the only field
/// that can change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start_time: f64,
    end_time: f64,
    labels: BTreeSet<String>,
    confidence: f64,
    description: String,
    frame_data: Option<Vec<u8>>,
    allow: bool,
    video_mode: Option<String>,
    detections: Vec<DetectionResult>,
}

impl Segment {
    /// Creates a segment with `allow = false`, no override and no provenance.
    pub fn new<I, S>(
        start_time: f64,
        end_time: f64,
        labels: I,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start_time,
            end_time,
            labels: labels.into_iter().map(Into::into).collect(),
            confidence,
            description: description.into(),
            frame_data: None,
            allow: false,
            video_mode: None,
            detections: Vec::new(),
        }
    }

    /// Sets the raw per-segment video mode override.
    #[must_use]
    pub fn with_video_mode(mut self, mode: impl Into<String>) -> Self {
        self.video_mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn with_frame_data(mut self, frame_data: Vec<u8>) -> Self {
        self.frame_data = Some(frame_data);
        self
    }

    #[must_use]
    pub fn with_detections(mut self, detections: Vec<DetectionResult>) -> Self {
        self.detections = detections;
        self
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn frame_data(&self) -> Option<&[u8]> {
        self.frame_data.as_deref()
    }

    pub fn allow(&self) -> bool {
        self.allow
    }

    /// Marks the segment as allowed (left untouched by remediation).
    pub fn set_allow(&mut self, allow: bool) {
        self.allow = allow;
    }

    /// Raw video mode override, validated when the mode is resolved.
    pub fn video_mode(&self) -> Option<&str> {
        self.video_mode.as_deref()
    }

    /// Detections that were merged into this segment.
    pub fn detections(&self) -> &[DetectionResult] {
        &self.detections
    }

    /// Whether this segment covers `detection`.
    ///
    /// Ranges must overlap; a zero-length detection is covered when it lies
    /// inside the segment bounds (inclusive).
    pub fn covers(&self, detection: &DetectionResult) -> bool {
        let (start, end) = (detection.start_time(), detection.end_time());
        if start == end {
            return self.start_time <= start && start <= self.end_time;
        }
        start < self.end_time && end > self.start_time
    }
}

/// Sets `allow = true` on every segment carrying one of `labels`.
///
/// Returns how many segments were changed.
pub fn allow_labels<S: AsRef<str>>(segments: &mut [Segment], labels: &[S]) -> usize {
    let mut changed = 0;
    for segment in segments.iter_mut() {
        let matches = labels
            .iter()
            .any(|label| segment.labels.contains(label.as_ref()));
        if matches && !segment.allow {
            segment.allow = true;
            changed += 1;
        }
    }
    if changed > 0 {
        log::info!("Allowed {} segment(s) by label", changed);
    }
    changed
}

/// Detections to feed audio remediation from reviewed segments.
///
/// Segments that kept their source detections return those. Segments loaded
/// from JSON carry none, so each of their labels becomes one detection
/// spanning the whole segment. Allowed segments contribute nothing.
pub fn segment_detections(segments: &[Segment]) -> Vec<DetectionResult> {
    segments
        .iter()
        .filter(|segment| !segment.allow)
        .flat_map(|segment| -> Vec<DetectionResult> {
            if !segment.detections.is_empty() {
                return segment.detections.clone();
            }
            segment
                .labels
                .iter()
                .filter_map(|label| {
                    DetectionResult::new(
                        segment.start_time,
                        segment.end_time,
                        label.as_str(),
                        segment.confidence,
                        segment.description.as_str(),
                    )
                    .map_err(|e| log::warn!("Skipping segment at {:.3}s: {}", segment.start_time, e))
                    .ok()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(start: f64, end: f64) -> DetectionResult {
        DetectionResult::new(start, end, "A", 1.0, "").unwrap()
    }

    #[test]
    fn test_duration_is_derived() {
        let segment = Segment::new(1.25, 4.0, ["Profanity"], 0.9, "word");
        assert_eq!(segment.duration(), 2.75);
        assert!(!segment.allow());
        assert!(segment.video_mode().is_none());
    }

    #[test]
    fn test_covers() {
        let segment = Segment::new(10.0, 20.0, ["A"], 1.0, "");
        assert!(segment.covers(&detection(15.0, 25.0)));
        assert!(segment.covers(&detection(5.0, 10.5)));
        assert!(!segment.covers(&detection(20.0, 21.0)));
        assert!(!segment.covers(&detection(0.0, 10.0)));
        assert!(segment.covers(&detection(10.0, 10.0)));
        assert!(segment.covers(&detection(20.0, 20.0)));
        assert!(!segment.covers(&detection(20.5, 20.5)));
    }

    #[test]
    fn test_segment_detections() {
        let mut allowed = Segment::new(6.0, 7.0, ["Profanity"], 1.0, "");
        allowed.set_allow(true);
        let segments = vec![
            Segment::new(0.0, 1.0, ["Profanity", "Slur"], 0.7, "words"),
            Segment::new(2.0, 3.0, ["Nudity"], 1.0, "")
                .with_detections(vec![detection(2.2, 2.4), detection(2.6, 2.9)]),
            allowed,
        ];

        let detections = segment_detections(&segments);
        assert_eq!(detections.len(), 4);
        assert_eq!(detections[0].label(), "Profanity");
        assert_eq!(detections[1].label(), "Slur");
        assert_eq!(detections[1].confidence(), 0.7);
        assert_eq!(detections[2].start_time(), 2.2);
        assert_eq!(detections[3].end_time(), 2.9);
    }

    #[test]
    fn test_allow_labels() {
        let mut segments = vec![
            Segment::new(0.0, 1.0, ["Profanity"], 1.0, ""),
            Segment::new(2.0, 3.0, ["Nudity", "Violence"], 1.0, ""),
            Segment::new(4.0, 5.0, ["Gore"], 1.0, ""),
        ];
        let changed = allow_labels(&mut segments, &["Violence", "Profanity"]);
        assert_eq!(changed, 2);
        assert!(segments[0].allow());
        assert!(segments[1].allow());
        assert!(!segments[2].allow());

        assert_eq!(allow_labels(&mut segments, &["Violence"]), 0);
    }
}
