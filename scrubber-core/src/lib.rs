//! Core library for detecting and remediating objectionable content in video files.
//!
//! This crate provides pluggable content detectors, a memory-aware detection
//! pipeline, merging of raw detections into reviewable segments, and audio
//! and video remediation driven by ffmpeg and ffprobe.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use scrubber_core::{
//!     CoreConfigBuilder, FfmpegTransformer, MediaTransformer, RemediationJob,
//!     RemediationManager, load_segments, segment_detections,
//! };
//! use std::path::Path;
//!
//! let config = CoreConfigBuilder::new().video_mode("cut").build();
//! let segments = load_segments(Path::new("segments.json")).unwrap();
//! let detections = segment_detections(&segments);
//!
//! let transformer = FfmpegTransformer::new();
//! let probe = transformer.probe(Path::new("movie.mp4")).unwrap();
//! let mut manager = RemediationManager::new(transformer, &config).unwrap();
//!
//! let mut job = RemediationJob::new(Path::new("movie.mp4"))
//!     .output(Path::new("movie.clean.mp4"))
//!     .detections(&detections)
//!     .segments(&segments);
//! if let Some(geometry) = probe.geometry() {
//!     job = job.geometry(geometry);
//! }
//! let report = manager.run(&job).unwrap();
//! println!("completed stages: {:?}", report.stages);
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod external;
pub mod media;
pub mod remediation;
pub mod segments;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, DetectorConfig, PipelineConfig};
pub use detection::{
    DetectionPipeline, DetectionResult, Detector, DetectorKind, DetectorRegistry,
};
pub use error::{CoreError, CoreResult};
pub use external::{FfmpegTransformer, MediaTransformer, MuxMetadata, check_dependency};
pub use media::{AudioBuffer, MediaProbe, VideoFrame, VideoGeometry};
pub use remediation::{
    AudioMode, AudioRemediator, RemediationJob, RemediationManager, RemediationReport,
    RemediationStage, VideoMode, VideoOutcome, VideoRemediator,
};
pub use segments::{
    Segment, SegmentSummary, load_segments, merge_segments, parse_segments, segment_detections,
};
pub use temp_files::{create_temp_dir, create_temp_file_path};
pub use utils::{censored_title, format_timecode, parse_timecode};
