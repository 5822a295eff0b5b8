// scrubber-cli/src/main.rs
//
// Entry point for the `scrubber` binary: parses arguments, initializes
// logging, dispatches to the command implementations and maps failures to
// exit code 1.

use clap::Parser;
use scrubber_cli::logging::init_logging;
use scrubber_cli::{Cli, Commands, run_inspect, run_remediate};
use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Remediate(args) => run_remediate(args).map(|_| ()),
        Commands::Inspect(args) => run_inspect(&args).map(|text| println!("{}", text.trim_end())),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
