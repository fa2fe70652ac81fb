//! Locating the external aligner executable.

use crate::error::{Result, ScaffoldError};
use std::path::{Path, PathBuf};

/// Find an executable by name
///
/// Search order:
/// 1. Explicit path, if given (must exist)
/// 2. Same directory as current executable (bundled installs)
/// 3. System PATH
pub fn find_binary(name: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ScaffoldError::FileNotFound(path.to_path_buf()));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let binary = exe_dir.join(name);
            if binary.is_file() {
                return Ok(binary);
            }
        }
    }

    if let Ok(path) = which::which(name) {
        return Ok(path);
    }

    Err(ScaffoldError::Other(format!(
        "{name} binary not found. Install it or ensure it's in PATH."
    )))
}
