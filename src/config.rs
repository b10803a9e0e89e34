//! Runtime configuration: where the settings and ledger documents live and
//! which IPFS daemon to talk to.

use crate::error::{CidSignError, Result};
use crate::net::client::DEFAULT_API_URL;
use crate::storage::ledger::LEDGER_FILENAME;
use crate::storage::settings::SETTINGS_FILENAME;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locations of the persisted documents and the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub settings_path: PathBuf,
    pub ledger_path: PathBuf,
    pub ipfs_api: String,
    /// Overall deadline for a single IPFS request; `None` waits indefinitely.
    pub ipfs_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(SETTINGS_FILENAME),
            ledger_path: PathBuf::from(LEDGER_FILENAME),
            ipfs_api: DEFAULT_API_URL.to_string(),
            ipfs_timeout: None,
        }
    }
}

impl Config {
    /// Default filenames placed under `directory`.
    pub fn in_dir(directory: &Path) -> Self {
        Self {
            settings_path: directory.join(SETTINGS_FILENAME),
            ledger_path: directory.join(LEDGER_FILENAME),
            ..Self::default()
        }
    }
}

/// Check that `path` names an existing, writable directory.
///
/// Returns the trimmed path on success.
pub fn validate_download_dir(path: &str) -> Result<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(CidSignError::InvalidPathError(
            "the path cannot be empty".to_string(),
        ));
    }

    let dir = PathBuf::from(trimmed);
    let metadata = fs::metadata(&dir).map_err(|_| {
        CidSignError::InvalidPathError(format!("'{}' does not exist", dir.display()))
    })?;

    if !metadata.is_dir() {
        return Err(CidSignError::InvalidPathError(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    tempfile::tempfile_in(&dir).map_err(|_| {
        CidSignError::InvalidPathError(format!("cannot write to '{}'", dir.display()))
    })?;

    Ok(dir)
}
