// scrubber-cli/src/config.rs
//
// Defaults used by the CLI when driving scrubber-core.

/// Sample rate audio is decoded at before remediation.
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Milliseconds between spinner redraws.
pub const SPINNER_TICK_MS: u64 = 120;
