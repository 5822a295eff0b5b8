// scrubber-core/tests/video_remediation_tests.rs

use scrubber_core::config::VideoRemediationConfig;
use scrubber_core::error::CoreError;
use scrubber_core::external::mocks::{MockMediaTransformer, TransformCall};
use scrubber_core::remediation::{
    TimeRange, VideoMode, VideoOutcome, VideoRemediator, extract_non_censored_segments,
};
use scrubber_core::{Segment, VideoGeometry};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

fn remediator(mode: &str, category_modes: &[(&str, &str)]) -> VideoRemediator {
    let config = VideoRemediationConfig {
        mode: mode.to_string(),
        category_modes: category_modes
            .iter()
            .map(|(label, mode)| (label.to_string(), mode.to_string()))
            .collect::<BTreeMap<_, _>>(),
        ..VideoRemediationConfig::default()
    };
    VideoRemediator::new(&config).unwrap()
}

fn geometry(duration: f64) -> VideoGeometry {
    VideoGeometry {
        width: 1280,
        height: 720,
        duration,
    }
}

fn ranges(pairs: &[(f64, f64)]) -> Vec<TimeRange> {
    pairs.iter().map(|&(s, e)| TimeRange::new(s, e)).collect()
}

#[test]
fn test_mode_resolution() {
    let video = remediator("blank", &[("Violence", "cut"), ("Profanity", "none")]);

    let plain = Segment::new(0.0, 1.0, ["Nudity"], 1.0, "");
    assert_eq!(video.resolve_segment_mode(&plain), VideoMode::Blank);

    let mixed = Segment::new(0.0, 1.0, ["Profanity", "Violence"], 1.0, "");
    assert_eq!(video.resolve_segment_mode(&mixed), VideoMode::Cut);

    let muted = Segment::new(0.0, 1.0, ["Profanity"], 1.0, "");
    assert_eq!(video.resolve_segment_mode(&muted), VideoMode::None);

    let overridden = Segment::new(0.0, 1.0, ["Violence"], 1.0, "").with_video_mode("blank");
    assert_eq!(video.resolve_segment_mode(&overridden), VideoMode::Blank);

    let bogus = Segment::new(0.0, 1.0, ["Nudity"], 1.0, "").with_video_mode("blur");
    assert_eq!(video.resolve_segment_mode(&bogus), VideoMode::Blank);
}

#[test]
fn test_non_censored_inversion() {
    assert_eq!(extract_non_censored_segments(&[], 10.0), ranges(&[(0.0, 10.0)]));
    assert_eq!(
        extract_non_censored_segments(&ranges(&[(6.0, 8.0), (2.0, 3.0)]), 10.0),
        ranges(&[(0.0, 2.0), (3.0, 6.0), (8.0, 10.0)])
    );
    assert_eq!(
        extract_non_censored_segments(&ranges(&[(0.0, 4.0), (3.0, 5.0)]), 10.0),
        ranges(&[(5.0, 10.0)])
    );
    assert_eq!(
        extract_non_censored_segments(&ranges(&[(7.0, 12.0)]), 10.0),
        ranges(&[(0.0, 7.0)])
    );
    assert!(extract_non_censored_segments(&ranges(&[(0.0, 10.0)]), 10.0).is_empty());
}

#[test]
fn test_blank_and_cut_sequence() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.mp4");
    let output = dir.path().join("out.mp4");
    fs::write(&input, "source")?;

    let video = remediator("blank", &[("Violence", "cut")]);
    let segments = vec![
        Segment::new(2.0, 3.0, ["Nudity"], 1.0, ""),
        Segment::new(5.0, 6.0, ["Violence"], 1.0, ""),
    ];
    let mock = MockMediaTransformer::new();

    let outcome = video.remediate(&mock, &input, &output, &segments, geometry(10.0), dir.path())?;
    assert_eq!(outcome, VideoOutcome::BlankedAndCut);
    assert_eq!(
        mock.operations(),
        vec!["apply_filter", "extract_subclip", "extract_subclip", "concat"]
    );

    let calls = mock.calls();
    let TransformCall::ApplyFilter { filter_chain, output: blanked, .. } = &calls[0] else {
        panic!("expected a filter first");
    };
    assert!(filter_chain.contains("drawbox=x=0:y=0:w=1280:h=720:color=0x000000"));
    assert!(filter_chain.contains("between(t,2.000,3.000)"));
    assert!(!filter_chain.contains("5.000"));
    assert!(!blanked.exists(), "intermediate removed");

    assert_eq!(fs::read_to_string(&output)?, "clip 0-5|clip 6-10");
    let leftovers: Vec<_> = fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name != "in.mp4" && name != "out.mp4")
        .collect();
    assert!(leftovers.is_empty(), "temp clips left behind: {leftovers:?}");
    Ok(())
}

#[test]
fn test_allowed_and_none_segments_leave_video_unchanged() {
    let dir = tempdir().unwrap();
    let video = remediator("blank", &[("Profanity", "none")]);
    let mut allowed = Segment::new(0.0, 1.0, ["Nudity"], 1.0, "");
    allowed.set_allow(true);
    let segments = vec![allowed, Segment::new(3.0, 4.0, ["Profanity"], 1.0, "")];
    let mock = MockMediaTransformer::new();

    let outcome = video
        .remediate(
            &mock,
            &dir.path().join("in.mp4"),
            &dir.path().join("out.mp4"),
            &segments,
            geometry(10.0),
            dir.path(),
        )
        .unwrap();

    assert_eq!(outcome, VideoOutcome::Unchanged);
    assert!(!outcome.wrote_output());
    assert!(mock.calls().is_empty());
}

#[test]
fn test_cutting_everything_is_an_error() {
    let dir = tempdir().unwrap();
    let video = remediator("cut", &[]);
    let segments = vec![Segment::new(0.0, 10.0, ["Gore"], 1.0, "")];
    let mock = MockMediaTransformer::new();

    let result = video.remediate(
        &mock,
        &dir.path().join("in.mp4"),
        &dir.path().join("out.mp4"),
        &segments,
        geometry(10.0),
        dir.path(),
    );
    assert!(matches!(result, Err(CoreError::FullyCensored { .. })));
    assert!(mock.calls().is_empty());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    for config in [
        VideoRemediationConfig {
            mode: "blur".to_string(),
            ..VideoRemediationConfig::default()
        },
        VideoRemediationConfig {
            blank_color: "#12345".to_string(),
            ..VideoRemediationConfig::default()
        },
        VideoRemediationConfig {
            category_modes: BTreeMap::from([("Gore".to_string(), "hide".to_string())]),
            ..VideoRemediationConfig::default()
        },
    ] {
        assert!(VideoRemediator::new(&config).is_err());
    }

    let short = VideoRemediator::new(&VideoRemediationConfig {
        blank_color: "#f0a".to_string(),
        ..VideoRemediationConfig::default()
    })
    .unwrap();
    assert_eq!(short.blank_color(), "FF00AA");
}

#[test]
fn test_allowed_segment_with_cut_override_is_kept() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    let video = remediator("cut", &[("Nudity", "cut")]);

    let mut allowed = Segment::new(10.0, 20.0, ["Nudity"], 1.0, "").with_video_mode("cut");
    allowed.set_allow(true);
    let segments = vec![allowed];

    let groups = video.group_segments_by_mode(&segments);
    assert!(groups.cut.is_empty());
    assert!(groups.blank.is_empty());

    let mock = MockMediaTransformer::new();
    let outcome = video.remediate(
        &mock,
        &dir.path().join("in.mp4"),
        &output,
        &segments,
        geometry(60.0),
        dir.path(),
    )?;
    assert_eq!(outcome, VideoOutcome::Unchanged);
    assert!(mock.calls().is_empty());
    Ok(())
}

#[test]
fn test_zero_length_blank_segment_remediates_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    let video = remediator("blank", &[]);
    let segments = vec![Segment::new(5.0, 5.0, ["Nudity"], 1.0, "")];

    let mock = MockMediaTransformer::new();
    let outcome = video.remediate(
        &mock,
        &dir.path().join("in.mp4"),
        &output,
        &segments,
        geometry(60.0),
        dir.path(),
    )?;
    assert_eq!(outcome, VideoOutcome::Unchanged);
    assert!(mock.operations().is_empty());
    assert!(!output.exists());
    Ok(())
}
