//! Merges raw detections into reviewable segments.

use super::Segment;
use crate::detection::DetectionResult;
use std::collections::BTreeSet;

/// Merges detections whose ranges overlap or lie within `threshold` seconds
/// of each other.
///
/// Detections are stable-sorted by start time. A detection joins the open
/// group when `start <= group_end + max(threshold, 0)`. Each group becomes one
/// segment spanning the group's extent, carrying the sorted set of labels,
/// the mean confidence, the first non-empty description (or a generated one)
/// and the first available frame sample.
pub fn merge_segments(detections: &[DetectionResult], threshold: f64) -> Vec<Segment> {
    if detections.is_empty() {
        return Vec::new();
    }

    let gap = if threshold > 0.0 {
        threshold
    } else {
        if threshold != 0.0 {
            log::warn!("Merge threshold {} treated as 0", threshold);
        }
        0.0
    };

    let mut sorted: Vec<&DetectionResult> = detections.iter().collect();
    sorted.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));

    let mut segments = Vec::new();
    let mut group: Vec<&DetectionResult> = vec![sorted[0]];
    let mut group_end = sorted[0].end_time();

    for detection in sorted.into_iter().skip(1) {
        if detection.start_time() <= group_end + gap {
            group_end = group_end.max(detection.end_time());
            group.push(detection);
        } else {
            segments.push(build_segment(&group));
            group_end = detection.end_time();
            group = vec![detection];
        }
    }
    segments.push(build_segment(&group));

    log::debug!(
        "Merged {} detection(s) into {} segment(s)",
        detections.len(),
        segments.len()
    );
    segments
}

fn build_segment(group: &[&DetectionResult]) -> Segment {
    let start_time = group
        .iter()
        .map(|d| d.start_time())
        .fold(f64::INFINITY, f64::min);
    let end_time = group
        .iter()
        .map(|d| d.end_time())
        .fold(f64::NEG_INFINITY, f64::max);
    let labels: BTreeSet<String> = group.iter().map(|d| d.label().to_string()).collect();
    let confidence = group.iter().map(|d| d.confidence()).sum::<f64>() / group.len() as f64;

    let description = group
        .iter()
        .filter_map(|d| d.description())
        .find(|desc| !desc.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "Detected {}",
                labels.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            )
        });

    let frame_data = group.iter().find_map(|d| d.frame_data()).map(<[u8]>::to_vec);

    Segment {
        start_time,
        end_time,
        labels,
        confidence,
        description,
        frame_data,
        allow: false,
        video_mode: None,
        detections: group.iter().map(|d| (*d).clone()).collect(),
    }
}
