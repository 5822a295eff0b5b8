//! Temporary file management utilities.
//!
//! This module provides helper functions for creating and managing temporary
//! files and directories used while remediating a file. It leverages the
//! tempfile crate so that a work directory is removed when dropped, even on
//! error paths.

use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Creates a temporary work directory with prefix. Auto-cleaned when dropped.
///
/// The directory is created inside `base_dir` when given, otherwise inside the
/// system temporary directory.
pub fn create_temp_dir(base_dir: Option<&Path>, prefix: &str) -> CoreResult<TempDir> {
    let mut builder = TempFileBuilder::new();
    builder.prefix(prefix);

    match base_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Ok(builder.tempdir_in(dir)?)
        }
        None => Ok(builder.tempdir()?),
    }
}

/// Returns a temporary file path with random suffix. Does not create the file.
pub fn create_temp_file_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    use rand::distributions::Alphanumeric;
    use rand::{Rng, thread_rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    let filename = format!("{prefix}_{random_suffix}.{extension}");
    dir.join(filename)
}

/// Moves `from` to `to`, falling back to copy-and-remove across filesystems.
pub fn move_file(from: &Path, to: &Path) -> CoreResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    log::debug!(
        "Rename {} -> {} failed, falling back to copy",
        from.display(),
        to.display()
    );
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}
