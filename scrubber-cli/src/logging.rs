// ============================================================================
// scrubber-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization for the CLI
//
// The library logs through the `log` facade; the CLI installs env_logger as
// the backend.
//
// USAGE:
// - RUST_LOG=info (default): stage transitions and summaries
// - RUST_LOG=debug: temp files, commands, per-detector detail
// - --verbose: forces debug regardless of RUST_LOG

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initializes the global logger. Later calls are ignored.
pub fn init_logging(verbose: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
