//! Test doubles for the external tool seams.
//!
//! Compiled for unit tests and with the `test-mocks` feature.
//! [`MockFfmpegSpawner`] replays scripted ffmpeg runs;
//! [`MockMediaTransformer`] records whole-file operations and writes
//! placeholder outputs.

use super::{FfmpegProcess, FfmpegSpawner, MediaTransformer, MuxMetadata};
use crate::error::{CoreError, CoreResult};
use crate::media::MediaProbe;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// A scripted ffmpeg run: the events it emits and how it exits.
#[derive(Clone)]
pub struct ScriptedProcess {
    events: Vec<FfmpegEvent>,
    status: ExitStatus,
}

impl FfmpegProcess for ScriptedProcess {
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        std::mem::take(&mut self.events).into_iter().try_for_each(handler)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.status)
    }
}

struct Script {
    pattern: String,
    outcome: CoreResult<ScriptedProcess>,
    writes_output: bool,
}

/// [`FfmpegSpawner`] answering each command from a list of scripts.
///
/// A command consumes the first script whose pattern is a substring of one
/// of its arguments. A command no script matches panics.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    scripts: Rc<RefCell<Vec<Script>>>,
    calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: &str, outcome: CoreResult<ScriptedProcess>, writes_output: bool) {
        self.scripts.borrow_mut().push(Script {
            pattern: pattern.to_string(),
            outcome,
            writes_output,
        });
    }

    /// Exits 0 after `events`; with `writes_output` the last argument is
    /// created as a placeholder file.
    pub fn expect_success(&self, pattern: &str, events: Vec<FfmpegEvent>, writes_output: bool) {
        let process = ScriptedProcess {
            events,
            status: ExitStatus::from_raw(0),
        };
        self.push(pattern, Ok(process), writes_output);
    }

    /// Exits with the raw wait status `raw_status` after `events`.
    pub fn expect_exit(&self, pattern: &str, events: Vec<FfmpegEvent>, raw_status: i32) {
        let process = ScriptedProcess {
            events,
            status: ExitStatus::from_raw(raw_status),
        };
        self.push(pattern, Ok(process), false);
    }

    pub fn expect_spawn_error(&self, pattern: &str, error: CoreError) {
        self.push(pattern, Err(error), false);
    }

    /// Arguments of every spawned command, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = ScriptedProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner_mut()
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.calls.borrow_mut().push(args.clone());

        let script = {
            let mut scripts = self.scripts.borrow_mut();
            let index = scripts
                .iter()
                .position(|script| args.iter().any(|arg| arg.contains(&script.pattern)))
                .unwrap_or_else(|| panic!("no scripted ffmpeg run matches {args:?}"));
            scripts.remove(index)
        };

        let process = script.outcome?;
        if script.writes_output {
            if let Some(output) = args.last() {
                write_dummy(Path::new(output), "ffmpeg output");
            }
        }
        Ok(process)
    }
}

/// One recorded [`MediaTransformer`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformCall {
    Mux {
        video: PathBuf,
        audio: Option<PathBuf>,
        metadata: MuxMetadata,
        output: PathBuf,
    },
    ApplyFilter {
        input: PathBuf,
        filter_chain: String,
        output: PathBuf,
    },
    ExtractSubclip {
        input: PathBuf,
        start: f64,
        end: f64,
        output: PathBuf,
    },
    Concat {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    Probe {
        input: PathBuf,
    },
    ExtractAudio {
        input: PathBuf,
        output: PathBuf,
        sample_rate: u32,
    },
}

impl TransformCall {
    /// Operation name, as accepted by [`MockMediaTransformer::fail_on`].
    pub fn operation(&self) -> &'static str {
        match self {
            TransformCall::Mux { .. } => "mux",
            TransformCall::ApplyFilter { .. } => "apply_filter",
            TransformCall::ExtractSubclip { .. } => "extract_subclip",
            TransformCall::Concat { .. } => "concat",
            TransformCall::Probe { .. } => "probe",
            TransformCall::ExtractAudio { .. } => "extract_audio",
        }
    }
}

/// Recording [`MediaTransformer`] that fabricates outputs.
///
/// Each successful call writes a small text file at its output path. A call
/// configured to fail with [`MockMediaTransformer::fail_on`] writes a
/// "partial" file first and then returns an error. Clones share state.
#[derive(Clone, Default)]
pub struct MockMediaTransformer {
    calls: Rc<RefCell<Vec<TransformCall>>>,
    failures: Rc<RefCell<HashSet<&'static str>>>,
    probe_result: Rc<RefCell<MediaProbe>>,
}

impl MockMediaTransformer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes every later call of `operation` fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.failures.borrow_mut().insert(operation);
    }

    /// Sets the value returned by `probe`.
    pub fn set_probe(&self, probe: MediaProbe) {
        *self.probe_result.borrow_mut() = probe;
    }

    pub fn calls(&self) -> Vec<TransformCall> {
        self.calls.borrow().clone()
    }

    /// Operation names of the recorded calls, in order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(TransformCall::operation).collect()
    }

    fn record(&self, call: TransformCall, output: Option<&Path>, contents: &str) -> CoreResult<()> {
        let operation = call.operation();
        self.calls.borrow_mut().push(call);

        if self.failures.borrow().contains(operation) {
            if let Some(path) = output {
                write_dummy(path, "partial");
            }
            return Err(CoreError::OperationFailed(format!(
                "mock {operation} failure"
            )));
        }

        if let Some(path) = output {
            write_dummy(path, contents);
        }
        Ok(())
    }
}

impl MediaTransformer for MockMediaTransformer {
    fn mux(
        &self,
        video: &Path,
        audio: Option<&Path>,
        metadata: &MuxMetadata,
        output: &Path,
    ) -> CoreResult<()> {
        self.record(
            TransformCall::Mux {
                video: video.to_path_buf(),
                audio: audio.map(Path::to_path_buf),
                metadata: metadata.clone(),
                output: output.to_path_buf(),
            },
            Some(output),
            "muxed",
        )
    }

    fn apply_filter(&self, input: &Path, filter_chain: &str, output: &Path) -> CoreResult<()> {
        self.record(
            TransformCall::ApplyFilter {
                input: input.to_path_buf(),
                filter_chain: filter_chain.to_string(),
                output: output.to_path_buf(),
            },
            Some(output),
            "filtered",
        )
    }

    fn extract_subclip(&self, input: &Path, start: f64, end: f64, output: &Path) -> CoreResult<()> {
        self.record(
            TransformCall::ExtractSubclip {
                input: input.to_path_buf(),
                start,
                end,
                output: output.to_path_buf(),
            },
            Some(output),
            &format!("clip {start}-{end}"),
        )
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<()> {
        let joined = inputs
            .iter()
            .map(|p| fs::read_to_string(p).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("|");
        self.record(
            TransformCall::Concat {
                inputs: inputs.to_vec(),
                output: output.to_path_buf(),
            },
            Some(output),
            &joined,
        )
    }

    fn probe(&self, input: &Path) -> CoreResult<MediaProbe> {
        self.record(
            TransformCall::Probe {
                input: input.to_path_buf(),
            },
            None,
            "",
        )?;
        Ok(self.probe_result.borrow().clone())
    }

    fn extract_audio(&self, input: &Path, output: &Path, sample_rate: u32) -> CoreResult<()> {
        self.record(
            TransformCall::ExtractAudio {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                sample_rate,
            },
            Some(output),
            "audio",
        )
    }
}

fn write_dummy(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::error!("Mock failed to create parent dir {:?}: {}", parent, e);
        }
    }
    if let Err(e) = fs::write(path, contents) {
        log::error!("Mock failed to create dummy output file {:?}: {}", path, e);
    }
}
