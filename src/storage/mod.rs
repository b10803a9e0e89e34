//! Persistent state: the settings record, the keystore it feeds, and the
//! ledger of ingested files.

pub mod keystore;
pub mod ledger;
pub mod metadata;
pub mod settings;

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` so readers see either the old or the new
/// document, never a partial one.
///
/// The data goes to a temporary file in the same directory, is synced, and
/// is then renamed over the target.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
