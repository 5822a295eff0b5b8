// scrubber-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Scrubber: content detection and remediation",
    long_about = "Silences or bleeps audio and blanks or cuts video for reviewed segments, using ffmpeg via scrubber-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remediates a video using a reviewed segment file
    Remediate(RemediateArgs),
    /// Summarizes a segment file
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct RemediateArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: PathBuf,

    /// Segment JSON produced by detection and review
    #[arg(short = 's', long = "segments", value_name = "SEGMENTS_JSON")]
    pub segments: PathBuf,

    /// Path of the remediated video
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: PathBuf,

    // --- Audio ---
    /// Audio remediation mode: silence or bleep
    #[arg(long, value_name = "MODE", env = "SCRUBBER_AUDIO_MODE")]
    pub audio_mode: Option<String>,

    /// Skip audio remediation
    #[arg(long)]
    pub no_audio: bool,

    /// Comma-separated labels remediated on the audio track (e.g. Profanity,Slur)
    #[arg(long, value_delimiter = ',', value_name = "LABELS")]
    pub categories: Option<Vec<String>>,

    /// Bleep tone frequency in Hz
    #[arg(long, value_name = "HZ")]
    pub bleep_frequency: Option<f64>,

    // --- Video ---
    /// Default video remediation mode: blank, cut or none
    #[arg(long, value_name = "MODE", env = "SCRUBBER_VIDEO_MODE")]
    pub video_mode: Option<String>,

    /// Skip video remediation
    #[arg(long)]
    pub no_video: bool,

    /// Per-label video mode, e.g. --category-mode Violence=cut (repeatable)
    #[arg(long = "category-mode", value_name = "LABEL=MODE", value_parser = parse_category_mode)]
    pub category_modes: Vec<(String, String)>,

    /// Overlay colour for blanked ranges, as 3- or 6-digit hex
    #[arg(long, value_name = "HEX")]
    pub blank_color: Option<String>,

    // --- Review ---
    /// Leave every segment carrying LABEL untouched (repeatable)
    #[arg(long = "allow-label", value_name = "LABEL")]
    pub allow_labels: Vec<String>,

    /// Directory for intermediate files (defaults to the system temp dir)
    #[arg(long, value_name = "DIR", env = "SCRUBBER_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Segment JSON to summarize
    #[arg(short = 's', long = "segments", value_name = "SEGMENTS_JSON")]
    pub segments: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_category_mode(raw: &str) -> Result<(String, String), String> {
    let (label, mode) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=MODE, got '{raw}'"))?;
    let (label, mode) = (label.trim(), mode.trim());
    if label.is_empty() || mode.is_empty() {
        return Err(format!("expected LABEL=MODE, got '{raw}'"));
    }
    Ok((label.to_string(), mode.to_string()))
}
