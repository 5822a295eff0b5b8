//! Error helpers for the CLI.
//!
//! Commands return [`CliResult`], which is the core result type. Failures
//! that cross a user-visible step are wrapped with a short description of
//! that step through [`CliErrorContext`].

use scrubber_core::{CoreError, CoreResult};
use std::fmt::Display;

pub type CliResult<T> = CoreResult<T>;

/// Prefixes an error with the step that failed, e.g.
/// `Reading segments from a.json: ...`.
pub trait CliErrorContext<T> {
    fn cli_context(self, step: impl Display) -> CliResult<T>;

    /// Like [`cli_context`](Self::cli_context), building the step only on failure.
    fn cli_with_context<D: Display>(self, step: impl FnOnce() -> D) -> CliResult<T>;
}

impl<T, E: Into<CoreError>> CliErrorContext<T> for Result<T, E> {
    fn cli_context(self, step: impl Display) -> CliResult<T> {
        self.cli_with_context(|| step)
    }

    fn cli_with_context<D: Display>(self, step: impl FnOnce() -> D) -> CliResult<T> {
        self.map_err(|e| wrap(step(), e.into()))
    }
}

fn wrap(step: impl Display, source: CoreError) -> CoreError {
    CoreError::OperationFailed(format!("{step}: {source}"))
}
