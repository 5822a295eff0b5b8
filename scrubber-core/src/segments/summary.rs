use super::Segment;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate view over a list of segments, used for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment_count: usize,
    pub allowed_count: usize,
    /// Seconds covered by segments that are not allowed
    pub censored_seconds: f64,
    /// Number of segments carrying each label
    pub label_counts: BTreeMap<String, usize>,
    pub first_start: Option<f64>,
    pub last_end: Option<f64>,
}

impl SegmentSummary {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut label_counts = BTreeMap::new();
        for label in segments.iter().flat_map(|s| s.labels().iter()) {
            *label_counts.entry(label.clone()).or_insert(0) += 1;
        }

        Self {
            segment_count: segments.len(),
            allowed_count: segments.iter().filter(|s| s.allow()).count(),
            censored_seconds: segments
                .iter()
                .filter(|s| !s.allow())
                .map(Segment::duration)
                .sum(),
            label_counts,
            first_start: segments
                .iter()
                .map(Segment::start_time)
                .min_by(f64::total_cmp),
            last_end: segments.iter().map(Segment::end_time).max_by(f64::total_cmp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut allowed = Segment::new(10.0, 11.0, ["Profanity"], 1.0, "");
        allowed.set_allow(true);
        let segments = vec![
            Segment::new(0.0, 2.5, ["Profanity", "Slur"], 1.0, ""),
            allowed,
            Segment::new(20.0, 21.0, ["Nudity"], 1.0, ""),
        ];

        let summary = SegmentSummary::from_segments(&segments);
        assert_eq!(summary.segment_count, 3);
        assert_eq!(summary.allowed_count, 1);
        assert_eq!(summary.censored_seconds, 3.5);
        assert_eq!(summary.label_counts["Profanity"], 2);
        assert_eq!(summary.label_counts["Nudity"], 1);
        assert_eq!(summary.first_start, Some(0.0));
        assert_eq!(summary.last_end, Some(21.0));
    }

    #[test]
    fn test_empty_summary() {
        let summary = SegmentSummary::from_segments(&[]);
        assert_eq!(summary.segment_count, 0);
        assert_eq!(summary.censored_seconds, 0.0);
        assert!(summary.first_start.is_none());
    }
}
