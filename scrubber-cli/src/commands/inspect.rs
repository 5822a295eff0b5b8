//! Implementation of the `inspect` command.
//!
//! Prints a summary of a segment file: per-label counts, censored time and
//! one line per segment. With `--json` the summary is printed as JSON.

use crate::cli::InspectArgs;
use crate::error::{CliErrorContext, CliResult};

use scrubber_core::segments::SegmentSummary;
use scrubber_core::{CoreError, Segment, format_timecode, load_segments};

/// Runs the `inspect` command, returning the text written to stdout.
pub fn run_inspect(args: &InspectArgs) -> CliResult<String> {
    let segments = load_segments(&args.segments)
        .cli_with_context(|| format!("Reading segments from {}", args.segments.display()))?;
    let summary = SegmentSummary::from_segments(&segments);

    if args.json {
        serde_json::to_string_pretty(&summary)
            .map_err(|e| CoreError::OperationFailed(format!("Serializing summary: {e}")))
    } else {
        Ok(render_text(&segments, &summary))
    }
}

/// Human-readable summary.
pub fn render_text(segments: &[Segment], summary: &SegmentSummary) -> String {
    let mut lines = vec![
        format!("Segments:  {}", summary.segment_count),
        format!("Allowed:   {}", summary.allowed_count),
        format!("Censored:  {}", format_timecode(summary.censored_seconds)),
    ];
    if let (Some(first), Some(last)) = (summary.first_start, summary.last_end) {
        lines.push(format!(
            "Span:      {} - {}",
            format_timecode(first),
            format_timecode(last)
        ));
    }

    if !summary.label_counts.is_empty() {
        lines.push("Labels:".to_string());
        lines.extend(
            summary
                .label_counts
                .iter()
                .map(|(label, count)| format!("  {label}: {count}")),
        );
    }

    if !segments.is_empty() {
        lines.push("-".repeat(40));
    }
    lines.extend(segments.iter().map(segment_line));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn segment_line(segment: &Segment) -> String {
    let labels = segment
        .labels()
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let mut line = format!(
        "{} - {}  {:<24} {:.2}",
        format_timecode(segment.start_time()),
        format_timecode(segment.end_time()),
        labels,
        segment.confidence()
    );
    if segment.allow() {
        line.push_str("  [allowed]");
    }
    if let Some(mode) = segment.video_mode() {
        line.push_str(&format!("  video={mode}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubber_core::parse_segments;

    #[test]
    fn test_render_text() {
        let segments = parse_segments(
            r#"[
                {"start_time": 1.5, "end_time": 3, "labels": ["Profanity"], "confidence": 0.9},
                {"start_time": 60, "end_time": 65, "label": "Nudity", "allow": true, "video_mode": "cut"}
            ]"#,
        )
        .unwrap();
        let summary = SegmentSummary::from_segments(&segments);
        let text = render_text(&segments, &summary);

        assert!(text.contains("Segments:  2"));
        assert!(text.contains("Allowed:   1"));
        assert!(text.contains("Censored:  00:00:01.500"));
        assert!(text.contains("Span:      00:00:01.500 - 00:01:05.000"));
        assert!(text.contains("  Nudity: 1"));
        assert!(text.contains("00:00:01.500 - 00:00:03.000  Profanity"));
        assert!(text.contains("[allowed]  video=cut"));
    }

    #[test]
    fn test_segment_line() {
        let mut segment = Segment::new(2.0, 4.5, ["Violence", "Gore"], 0.5, "");
        assert_eq!(
            segment_line(&segment),
            format!("00:00:02.000 - 00:00:04.500  {:<24} 0.50", "Gore,Violence")
        );
        segment.set_allow(true);
        assert!(segment_line(&segment.with_video_mode("blank")).ends_with("0.50  [allowed]  video=blank"));
    }

    #[test]
    fn test_empty_summary() {
        let text = render_text(&[], &SegmentSummary::from_segments(&[]));
        assert_eq!(text, "Segments:  0\nAllowed:   0\nCensored:  00:00:00.000\n");
    }
}
