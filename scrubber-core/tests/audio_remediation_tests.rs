// scrubber-core/tests/audio_remediation_tests.rs

use scrubber_core::config::{AudioRemediationConfig, BLEEP_AMPLITUDE};
use scrubber_core::remediation::{AudioMode, AudioRemediator, read_audio, write_audio};
use scrubber_core::{AudioBuffer, DetectionResult, Segment};
use tempfile::tempdir;

const SAMPLE_RATE: u32 = 16_000;

fn config(mode: &str) -> AudioRemediationConfig {
    AudioRemediationConfig {
        mode: mode.to_string(),
        ..AudioRemediationConfig::default()
    }
}

fn profanity(start: f64, end: f64) -> DetectionResult {
    DetectionResult::new(start, end, "Profanity", 0.95, "word").unwrap()
}

#[test]
fn test_silence_exact_range() {
    let remediator = AudioRemediator::new(&config("silence")).unwrap();
    assert_eq!(remediator.mode(), AudioMode::Silence);

    let audio = AudioBuffer::mono(vec![1.0; SAMPLE_RATE as usize]);
    let output = remediator.remediate(&audio, SAMPLE_RATE, &[profanity(0.25, 0.5)], None);

    let samples = output.samples();
    assert!(samples[..4000].iter().all(|&s| s == 1.0));
    assert!(samples[4000..8000].iter().all(|&s| s == 0.0));
    assert!(samples[8000..].iter().all(|&s| s == 1.0));
    assert!(audio.samples().iter().all(|&s| s == 1.0), "input untouched");
}

#[test]
fn test_bleep_stays_within_amplitude() {
    let remediator = AudioRemediator::new(&config("bleep")).unwrap();
    let audio = AudioBuffer::interleaved(vec![0.5; 2 * SAMPLE_RATE as usize], 2).unwrap();
    let output = remediator.remediate(&audio, SAMPLE_RATE, &[profanity(0.1, 0.6)], None);

    assert_eq!(output.channels(), 2);
    let bleeped: Vec<f32> = (1600..9600)
        .map(|frame| output.sample(frame, 1).unwrap())
        .collect();
    assert!(bleeped.iter().all(|s| s.abs() <= 0.21));
    assert!(bleeped.iter().any(|s| (s.abs() - BLEEP_AMPLITUDE).abs() < 0.01));
    assert_eq!(output.sample(0, 0), Some(0.5));
    assert_eq!(output.sample(12_000, 1), Some(0.5));
}

#[test]
fn test_no_op_cases() {
    let audio = AudioBuffer::mono(vec![0.3; 1000]);

    let disabled = AudioRemediator::new(&AudioRemediationConfig {
        enabled: false,
        ..AudioRemediationConfig::default()
    })
    .unwrap();
    assert_eq!(disabled.remediate(&audio, 1000, &[profanity(0.0, 1.0)], None), audio);

    let enabled = AudioRemediator::new(&config("silence")).unwrap();
    assert_eq!(enabled.remediate(&audio, 1000, &[], None), audio);

    let other_label = DetectionResult::new(0.0, 1.0, "Nudity", 1.0, "frame").unwrap();
    assert_eq!(enabled.remediate(&audio, 1000, &[other_label], None), audio);

    let mut allowed = Segment::new(0.0, 1.0, ["Profanity"], 1.0, "");
    allowed.set_allow(true);
    let segments = vec![allowed];
    assert_eq!(
        enabled.remediate(&audio, 1000, &[profanity(0.2, 0.4)], Some(segments.as_slice())),
        audio
    );
}

#[test]
fn test_detection_past_the_end_is_clamped() {
    let remediator = AudioRemediator::new(&config("silence")).unwrap();
    let audio = AudioBuffer::mono(vec![1.0; 1000]);
    let ranges = remediator.remediated_ranges(audio.frames(), 1000, &[profanity(0.9, 5.0)], None);

    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].start, 900);
    assert_eq!(ranges[0].end, 1000);
    assert!(remediator
        .remediated_ranges(audio.frames(), 1000, &[profanity(2.0, 3.0)], None)
        .is_empty());
}

#[test]
fn test_remediated_audio_survives_wav_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("remediated.wav");

    let remediator = AudioRemediator::new(&config("silence"))?;
    let audio = AudioBuffer::interleaved(vec![0.5; 2 * 8000], 2)?;
    let remediated = remediator.remediate(&audio, 8000, &[profanity(0.5, 0.75)], None);
    write_audio(&remediated, 8000, &path)?;

    let (read_back, sample_rate) = read_audio(&path)?;
    assert_eq!(sample_rate, 8000);
    assert_eq!(read_back.channels(), 2);
    assert_eq!(read_back.frames(), 8000);
    assert_eq!(read_back.sample(4500, 0), Some(0.0));
    let kept = read_back.sample(100, 1).unwrap();
    assert!((kept - 0.5).abs() < 1e-3);
    Ok(())
}
