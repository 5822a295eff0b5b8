//! Utility functions for timecodes and file names.
//!
//! This module provides general-purpose helpers used throughout the
//! scrubber-core library: timecode parsing and formatting, and deriving
//! the display title of a remediated file.

use crate::error::{CoreError, CoreResult};
use std::path::Path;

/// Suffix appended to the title of every remediated output.
pub const CENSORED_TITLE_SUFFIX: &str = "(Censored)";

/// Parses a timecode into seconds.
///
/// Accepts bare seconds (`"12.5"`), `MM:SS` and `HH:MM:SS`, each with an
/// optional fractional seconds part. Malformed or negative input is an error;
/// it is never coerced to zero.
pub fn parse_timecode(timecode: &str) -> CoreResult<f64> {
    let invalid = || CoreError::Timecode(timecode.to_string());
    let trimmed = timecode.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let (whole_parts, seconds_part) = parts.split_at(parts.len() - 1);
    let seconds = parse_component(seconds_part[0]).ok_or_else(invalid)?;

    let mut total = 0.0;
    for part in whole_parts {
        // Hours and minutes must be whole numbers.
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: f64 = part.parse().map_err(|_| invalid())?;
        total = total * 60.0 + value;
    }

    if !whole_parts.is_empty() && seconds >= 60.0 {
        return Err(invalid());
    }

    Ok(total * 60.0 + seconds)
}

fn parse_component(value: &str) -> Option<f64> {
    let valid_chars = value.chars().all(|c| c.is_ascii_digit() || c == '.');
    if value.is_empty() || !valid_chars || value.starts_with('.') && value.len() == 1 {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Formats seconds as `HH:MM:SS.mmm` (e.g., 3725.5 -> "01:02:05.500").
/// Returns "??:??:??.???" for invalid inputs.
#[must_use]
pub fn format_timecode(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??.???".to_string();
    }

    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Derives the title of a remediated output.
///
/// Uses the source title when one is known, otherwise the input file stem,
/// and appends " (Censored)" unless it is already present.
#[must_use]
pub fn censored_title(input: &Path, source_title: Option<&str>) -> String {
    let base = source_title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string())
        });

    if base.ends_with(CENSORED_TITLE_SUFFIX) {
        base
    } else {
        format!("{base} {CENSORED_TITLE_SUFFIX}")
    }
}

/// Returns the extension of `path`, falling back to `default` when it has none.
#[must_use]
pub fn extension_or(path: &Path, default: &str) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(default)
        .to_string()
}
