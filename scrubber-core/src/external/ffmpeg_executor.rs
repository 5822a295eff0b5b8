//! Spawning ffmpeg and waiting for it.
//!
//! [`FfmpegSpawner`] and [`FfmpegProcess`] form the seam between
//! [`FfmpegTransformer`](super::FfmpegTransformer) and a real process, so tests
//! can replay scripted event streams. [`run_ffmpeg`] drives one command to
//! completion and turns a non-zero exit into
//! [`CoreError::CommandFailed`](crate::CoreError::CommandFailed) carrying the
//! collected error output.

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

const SIDECAR: &str = "ffmpeg (sidecar)";

/// A running ffmpeg process.
pub trait FfmpegProcess {
    /// Feeds every parsed event to `handler` until the process closes its
    /// output or `handler` returns an error.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Starts ffmpeg processes.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// [`FfmpegProcess`] over an ffmpeg-sidecar child.
pub struct SidecarProcess {
    child: FfmpegChild,
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.child.iter().map_err(|e| {
            command_failed_error(SIDECAR, ExitStatus::default(), format!("no event stream: {e}"))
        })?;
        events.into_iter().try_for_each(&mut handler)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child.wait().map_err(|e| command_wait_error(SIDECAR, e))
    }
}

/// [`FfmpegSpawner`] that launches the ffmpeg found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let child = cmd.spawn().map_err(|e| command_start_error(SIDECAR, e))?;
        Ok(SidecarProcess { child })
    }
}

/// Error lines and progress seen while a command ran.
#[derive(Debug, Default)]
struct EventLog {
    errors: Vec<String>,
    last_progress_time: Option<String>,
}

impl EventLog {
    fn record(&mut self, context: &str, event: FfmpegEvent) {
        match event {
            FfmpegEvent::Error(line)
            | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                log::debug!("ffmpeg ({context}) error: {line}");
                self.errors.push(line);
            }
            FfmpegEvent::Log(LogLevel::Warning, line) => {
                log::trace!("ffmpeg ({context}) warning: {line}");
            }
            FfmpegEvent::Progress(progress) => {
                self.last_progress_time = Some(progress.time);
            }
            _ => {}
        }
    }
}

/// Runs `cmd` to completion; `context` names the operation in errors and logs.
pub fn run_ffmpeg<S: FfmpegSpawner>(spawner: &S, cmd: FfmpegCommand, context: &str) -> CoreResult<()> {
    log::debug!("Running ffmpeg ({context}): {cmd:?}");

    let mut process = spawner.spawn(cmd)?;
    let mut events = EventLog::default();
    process.handle_events(|event| {
        events.record(context, event);
        Ok(())
    })?;
    let status = process.wait()?;

    if status.success() {
        match &events.last_progress_time {
            Some(time) => log::debug!("ffmpeg ({context}) finished at {time}"),
            None => log::debug!("ffmpeg ({context}) finished"),
        }
        return Ok(());
    }

    log::error!("ffmpeg ({context}) failed: {status}");
    Err(command_failed_error(
        format!("ffmpeg ({context})"),
        status,
        events.errors.join("\n"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::external::mocks::MockFfmpegSpawner;

    #[test]
    fn test_collects_error_lines_on_failure() {
        let spawner = MockFfmpegSpawner::new();
        spawner.expect_exit(
            "broken.mp4",
            vec![
                FfmpegEvent::Log(LogLevel::Info, "Stream mapping".to_string()),
                FfmpegEvent::Log(LogLevel::Error, "moov atom not found".to_string()),
                FfmpegEvent::Error("Conversion failed!".to_string()),
            ],
            1 << 8,
        );

        let mut cmd = FfmpegCommand::new();
        cmd.input("broken.mp4").output("out.mp4");
        let err = run_ffmpeg(&spawner, cmd, "remux").unwrap_err();
        match err {
            CoreError::CommandFailed(context, _, stderr) => {
                assert_eq!(context, "ffmpeg (remux)");
                assert_eq!(stderr, "moov atom not found\nConversion failed!");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spawn_error_propagates() {
        let spawner = MockFfmpegSpawner::new();
        spawner.expect_spawn_error(
            "in.mp4",
            CoreError::OperationFailed("no ffmpeg".to_string()),
        );

        let mut cmd = FfmpegCommand::new();
        cmd.input("in.mp4").output("out.mp4");
        assert!(matches!(
            run_ffmpeg(&spawner, cmd, "test"),
            Err(CoreError::OperationFailed(_))
        ));
    }
}
