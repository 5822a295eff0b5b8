// ============================================================================
// scrubber-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// This module defines the single error type used across scrubber-core along
// with a few constructors for process-related failures.
//
// KEY COMPONENTS:
// - CoreError: every failure the core can report
// - CoreResult: result alias used throughout the crate
// - command_*_error: helpers for ffmpeg/ffprobe process failures
//
// Configuration errors are raised at construction time and are always fatal.
// Per-detector failures are reported through CoreError too, but the pipeline
// logs and isolates them instead of propagating.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by scrubber-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown detector type: {0}")]
    UnknownDetectorType(String),

    #[error("Failed to initialize detector '{name}': {message}")]
    DetectorInit { name: String, message: String },

    #[error("Detector '{name}' failed: {message}")]
    DetectorFailed { name: String, message: String },

    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error("Invalid pipeline state: {0}")]
    PipelineState(String),

    #[error("Invalid timecode '{0}'")]
    Timecode(String),

    #[error("Failed to load segments from {path}: {message}")]
    SegmentLoad { path: String, message: String },

    #[error("Invalid audio buffer: {0}")]
    AudioBuffer(String),

    #[error("Failed to write audio to {path}: {message}")]
    AudioWrite { path: String, message: String },

    #[error("Failed to read audio from {path}: {message}")]
    AudioRead { path: String, message: String },

    #[error("Required external command not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed while waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{0}' failed with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("ffprobe parse error: {0}")]
    FfprobeParse(String),

    #[error("Video info error: {0}")]
    VideoInfoError(String),

    #[error("Nothing left to keep: every part of the {duration:.2}s timeline is censored")]
    FullyCensored { duration: f64 },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result alias used throughout scrubber-core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a process that could not be spawned.
pub fn command_start_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), error)
}

/// Builds a [`CoreError::CommandWait`] for a process whose exit could not be collected.
pub fn command_wait_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), error)
}

/// Builds a [`CoreError::CommandFailed`] for a process that exited unsuccessfully.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(command.into(), status, stderr.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownDetectorType("nsfw".to_string());
        assert_eq!(err.to_string(), "Unknown detector type: nsfw");

        let err = CoreError::FullyCensored { duration: 12.0 };
        assert!(err.to_string().contains("12.00s"));

        let err = command_start_error("ffmpeg (mux)", io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(matches!(err, CoreError::CommandStart(ref cmd, _) if cmd == "ffmpeg (mux)"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
