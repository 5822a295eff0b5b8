//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// `inspect`: summarizes a segment file.
pub mod inspect;

/// `remediate`: applies reviewed segments to a video through scrubber-core.
pub mod remediate;
