//! Audio and video remediation.
//!
//! [`AudioRemediator`] rewrites detected ranges of an in-memory audio buffer,
//! [`VideoRemediator`] blanks or cuts segments of a video file through a
//! [`crate::external::MediaTransformer`], and [`RemediationManager`] runs both
//! together with the mux step in a fixed order.

pub mod audio;
pub mod manager;
pub mod video;

pub use audio::{AudioMode, AudioRemediator, SampleRange, read_audio, write_audio};
pub use manager::{
    REMEDIATION_COMMENT, RemediationJob, RemediationManager, RemediationReport, RemediationStage,
    plan_stages,
};
pub use video::{
    ModeGroups, TimeRange, VideoMode, VideoOutcome, VideoRemediator, extract_non_censored_segments,
};
