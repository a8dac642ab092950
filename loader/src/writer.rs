//! Batch staging: serialized CSV files in a scoped temporary workspace.
//!
//! The workspace directory is created lazily on the first write and
//! removed exactly once, on every exit path, via the [`TempWorkspace`]
//! guard's `Drop`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::codec::{serialize, Table};
use crate::progress::{log_info, log_warning};

/// Write a serialized table to `path`, creating parent directories as
/// needed and overwriting any existing file.
///
/// Returns `Ok(false)` without touching the filesystem when the table has
/// no records (skip signal).
pub fn write_batch(table: &Table, path: &Path) -> io::Result<bool> {
    let Some(content) = serialize(table) else {
        log_warning(format!("No records to write for {}", path.display()));
        return Ok(false);
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    log_info(format!(
        "💾 Wrote {} records to {}",
        table.len(),
        path.display()
    ));
    Ok(true)
}

/// Scoped temporary directory for staged batch files.
///
/// Removal happens exactly once: either through [`TempWorkspace::cleanup`]
/// or on drop, whichever comes first. Normal completion, a thrown error,
/// and signal-triggered shutdown all funnel through the same guard.
#[derive(Debug)]
pub struct TempWorkspace {
    root: PathBuf,
    cleaned: bool,
}

impl TempWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cleaned: false,
        }
    }

    /// Path for one dataset's staged batch file.
    pub fn batch_path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Remove the workspace directory if it exists. Idempotent.
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        if self.root.exists() {
            log_info("🧹 Cleaning up temporary files...");
            if let Err(e) = fs::remove_dir_all(&self.root) {
                log_warning(format!(
                    "Could not remove {}: {}",
                    self.root.display(),
                    e
                ));
            }
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}
