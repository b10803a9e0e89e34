//! The metadata ledger: every ingested file, in ingest order.
//!
//! The ledger is a single JSON array on disk. Each append loads the whole
//! array, pushes the record, and rewrites the whole document. That keeps the
//! on-disk format trivially compatible but grows linearly with the ledger,
//! so it is meant for the hundreds-of-files scale of a single operator.

use crate::error::{CidSignError, Result};
use crate::storage::metadata::FileRecord;
use crate::storage::write_atomic;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Default ledger filename.
pub const LEDGER_FILENAME: &str = "files.json";

/// Ordered, append-only list of file records backed by a JSON file.
///
/// Appends within one process are serialized. Separate processes writing the
/// same file are last-writer-wins.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Ledger {
    /// Open the ledger stored at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the ledger document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, rewriting the whole document.
    ///
    /// An existing document that does not parse as a record list fails with
    /// [`CidSignError::JsonError`] and is left as it is.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cidsign::storage::ledger::Ledger;
    /// use cidsign::storage::metadata::FileRecord;
    ///
    /// # fn example() -> cidsign::error::Result<()> {
    /// let ledger = Ledger::new("files.json");
    /// ledger.append(FileRecord::new("a.txt".into(), 10, "QmCid".into(), "c2ln".into()))?;
    /// assert!(ledger.find_by_cid("QmCid")?.is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub fn append(&self, record: FileRecord) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load()?;
        let cid = record.cid.clone();
        records.push(record);

        let json = serde_json::to_string_pretty(&records).map_err(CidSignError::JsonError)?;
        write_atomic(&self.path, json.as_bytes())?;

        tracing::info!(cid = %cid, records = records.len(), "ledger record appended");
        Ok(())
    }

    /// All records in insertion order.
    ///
    /// A missing document is an empty ledger. One that exists but does not
    /// parse is a [`CidSignError::JsonError`].
    pub fn list_all(&self) -> Result<Vec<FileRecord>> {
        self.load()
    }

    /// The first record with the given CID, or `None`.
    pub fn find_by_cid(&self, cid: &str) -> Result<Option<FileRecord>> {
        Ok(self.load()?.into_iter().find(|record| record.cid == cid))
    }

    fn load(&self) -> Result<Vec<FileRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CidSignError::StorageError(e)),
        };

        serde_json::from_str(&contents).map_err(CidSignError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, cid: &str) -> FileRecord {
        FileRecord::new(name.to_string(), 4, cid.to_string(), "c2ln".to_string())
    }

    fn ledger_in(temp_dir: &TempDir) -> Ledger {
        Ledger::new(temp_dir.path().join(LEDGER_FILENAME))
    }

    #[test]
    fn test_missing_ledger_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = ledger_in(&temp_dir);

        assert!(ledger.list_all().unwrap().is_empty());
        assert_eq!(ledger.find_by_cid("anything").unwrap(), None);
        assert!(!ledger.path().exists());
    }

    #[test]
    fn test_append_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = ledger_in(&temp_dir);

        ledger.append(record("one", "cid-1")).unwrap();
        ledger.append(record("two", "cid-2")).unwrap();
        ledger.append(record("three", "cid-3")).unwrap();

        let names: Vec<String> = ledger
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_find_by_cid_returns_first_match() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = ledger_in(&temp_dir);

        ledger.append(record("first", "shared")).unwrap();
        ledger.append(record("other", "unique")).unwrap();
        ledger.append(record("second", "shared")).unwrap();

        let found = ledger.find_by_cid("shared").unwrap().unwrap();
        assert_eq!(found.name, "first");
        assert_eq!(ledger.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_ledger_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let ledger = ledger_in(&temp_dir);
            ledger.append(record("kept", "cid-kept")).unwrap();
        }

        {
            let ledger = ledger_in(&temp_dir);
            assert_eq!(
                ledger.find_by_cid("cid-kept").unwrap(),
                Some(record("kept", "cid-kept"))
            );
        }
    }

    #[test]
    fn test_corrupt_ledger_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = ledger_in(&temp_dir);
        fs::write(ledger.path(), "{ not an array").unwrap();

        assert!(matches!(ledger.list_all(), Err(CidSignError::JsonError(_))));
        assert!(matches!(ledger.find_by_cid("cid"), Err(CidSignError::JsonError(_))));

        // A failed append leaves the document untouched
        assert!(matches!(
            ledger.append(record("lost", "cid")),
            Err(CidSignError::JsonError(_))
        ));
        assert_eq!(fs::read_to_string(ledger.path()).unwrap(), "{ not an array");
    }

    #[test]
    fn test_append_fails_when_directory_missing() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::new(temp_dir.path().join("missing").join(LEDGER_FILENAME));

        let result = ledger.append(record("a", "b"));
        assert!(matches!(result, Err(CidSignError::StorageError(_))));
    }

    #[test]
    fn test_reads_documents_written_by_hand() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = ledger_in(&temp_dir);
        fs::write(
            ledger.path(),
            r#"[{"name": "a.txt", "size": 10, "cid": "QmA", "signature": "c2ln"}]"#,
        )
        .unwrap();

        let records = ledger.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].size, 10);
    }
}
