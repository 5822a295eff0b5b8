// scrubber-cli/src/lib.rs
//
// Library portion of the Scrubber CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, InspectArgs, RemediateArgs};
pub use commands::inspect::run_inspect;
pub use commands::remediate::{build_config, run_remediate};
pub use error::{CliErrorContext, CliResult};
