//! Ingest, verify, and download orchestration.
//!
//! [`IntegrityWorkflow`] is the context object owning the keystore, the
//! settings and ledger documents, and the content store. Each operation runs
//! to completion or fails without leaving intermediate state behind.

use crate::config::Config;
use crate::crypto::signature::SignatureEngine;
use crate::error::{CidSignError, Result};
use crate::net::content_store::ContentStore;
use crate::storage::keystore::KeyStore;
use crate::storage::ledger::Ledger;
use crate::storage::metadata::FileRecord;
use crate::storage::settings::SettingsStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Signs, registers, verifies, and retrieves files against a content store.
pub struct IntegrityWorkflow<S> {
    settings: SettingsStore,
    keys: KeyStore,
    ledger: Ledger,
    store: S,
    download_path: String,
}

impl<S: ContentStore> IntegrityWorkflow<S> {
    /// Load (or create) the settings and keys named by `config` and bind
    /// them to `store`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cidsign::config::Config;
    /// use cidsign::net::memory::MemoryStore;
    /// use cidsign::workflow::IntegrityWorkflow;
    ///
    /// # fn example() -> cidsign::error::Result<()> {
    /// let workflow = IntegrityWorkflow::open(&Config::default(), MemoryStore::new())?;
    /// let record = workflow.ingest("a.txt", b"0123456789")?;
    /// assert!(workflow.verify(&record.cid, &record.signature)?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(config: &Config, store: S) -> Result<Self> {
        let settings = SettingsStore::new(&config.settings_path);
        let mut keys = KeyStore::new();

        settings.ensure_settings(&mut keys)?;
        let download_path = settings.load_download_path(&mut keys)?;

        Ok(Self {
            settings,
            keys,
            ledger: Ledger::new(&config.ledger_path),
            store,
            download_path,
        })
    }

    /// The keystore holding the active signing pair.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// The ledger of ingested files.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The content store backing ingest and retrieval.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Directory downloads are written to; empty means the current directory.
    pub fn download_path(&self) -> &str {
        &self.download_path
    }

    fn signer(&self) -> SignatureEngine<'_> {
        SignatureEngine::new(&self.keys)
    }

    /// Read a local file and ingest it under its file name.
    pub fn ingest_file(&self, path: &Path) -> Result<FileRecord> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CidSignError::InvalidPathError(format!("'{}' has no file name", path.display()))
            })?;

        let content = fs::read(path)?;
        self.ingest(&name, &content)
    }

    /// Sign `content`, add it to the store, and record it in the ledger.
    ///
    /// Nothing reaches the store if signing fails, and nothing reaches the
    /// ledger if the store rejects the content.
    pub fn ingest(&self, name: &str, content: &[u8]) -> Result<FileRecord> {
        let signature = self.signer().sign(content)?;
        let cid = self.store.put(content)?;

        let record = FileRecord::new(name.to_string(), content.len() as u64, cid, signature);
        self.ledger.append(record.clone())?;

        tracing::info!(name = %record.name, cid = %record.cid, size = record.size, "file ingested");
        Ok(record)
    }

    /// Every ingested file, oldest first.
    pub fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.ledger.list_all()
    }

    /// The ledger record for `cid`, if one exists.
    pub fn file_info(&self, cid: &str) -> Result<Option<FileRecord>> {
        self.ledger.find_by_cid(cid)
    }

    /// Raw content stored under `cid`.
    pub fn retrieve_content(&self, cid: &str) -> Result<Vec<u8>> {
        self.store.get(cid)
    }

    /// Fetch `cid` and check `signature` against it.
    ///
    /// A mismatch is `Ok(false)`; only a failed fetch is an error.
    pub fn verify(&self, cid: &str, signature: &str) -> Result<bool> {
        let content = self.store.get(cid)?;
        let valid = self.signer().verify(&content, signature);

        tracing::info!(cid, valid, "integrity check");
        Ok(valid)
    }

    /// Write the content of `cid` to the download directory under its
    /// recorded name, replacing any existing file of that name.
    pub fn download(&self, cid: &str) -> Result<PathBuf> {
        let record = self
            .ledger
            .find_by_cid(cid)?
            .ok_or_else(|| CidSignError::NotFoundError(format!("no file recorded for CID '{}'", cid)))?;

        let file_name = Path::new(&record.name).file_name().ok_or_else(|| {
            CidSignError::InvalidPathError(format!("recorded name '{}' is not a file name", record.name))
        })?;

        let directory = if self.download_path.is_empty() {
            Path::new(".")
        } else {
            Path::new(&self.download_path)
        };
        let target = directory.join(file_name);

        let mut staging = NamedTempFile::new_in(directory)?;
        let written = self.store.get_into(cid, &mut staging)?;
        staging.persist(&target).map_err(|e| e.error)?;

        tracing::info!(cid, path = %target.display(), bytes = written, "file downloaded");
        Ok(target)
    }

    /// Persist a new download directory.
    pub fn set_download_path(&mut self, path: &str) -> Result<()> {
        self.settings.update_download_path(path)?;
        self.download_path = path.to_string();
        Ok(())
    }
}
