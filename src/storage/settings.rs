//! The settings document: download path plus the PEM-encoded keypair.
//!
//! The file is a flat JSON object with the fields `downloadpath`,
//! `privateKey` and `publicKey`. Older installations wrote only
//! `downloadpath`; such files, and any file missing a field, are healed by
//! regenerating the record in place while keeping the download path.

use crate::error::{CidSignError, Result};
use crate::storage::keystore::KeyStore;
use crate::storage::write_atomic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default settings filename.
pub const SETTINGS_FILENAME: &str = "settings.json";

const DOWNLOAD_PATH_FIELD: &str = "downloadpath";
const PRIVATE_KEY_FIELD: &str = "privateKey";
const PUBLIC_KEY_FIELD: &str = "publicKey";

/// The persisted settings record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(rename = "downloadpath")]
    pub download_path: String,

    #[serde(rename = "privateKey")]
    pub private_key: String,

    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// Reads and writes the settings document at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Bind to the settings document at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure a complete settings record exists on disk.
    ///
    /// A missing file is created with an empty download path. A file missing
    /// any field is rewritten with the existing download path (if any) and
    /// the keystore's keypair, generated here when none is active.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cidsign::storage::keystore::KeyStore;
    /// use cidsign::storage::settings::SettingsStore;
    ///
    /// # fn example() -> cidsign::error::Result<()> {
    /// let mut keys = KeyStore::new();
    /// let store = SettingsStore::new("settings.json");
    /// let settings = store.ensure_settings(&mut keys)?;
    /// assert!(settings.public_key.contains("PUBLIC KEY"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn ensure_settings(&self, keys: &mut KeyStore) -> Result<Settings> {
        let document = match self.read_document()? {
            Some(document) => document,
            None => {
                tracing::info!(path = %self.path.display(), "creating settings file");
                return self.write_default(String::new(), keys);
            }
        };

        let download_path = string_field(&document, DOWNLOAD_PATH_FIELD);
        let private_key = string_field(&document, PRIVATE_KEY_FIELD);
        let public_key = string_field(&document, PUBLIC_KEY_FIELD);

        match (download_path, private_key, public_key) {
            (Some(download_path), Some(private_key), Some(public_key)) => Ok(Settings {
                download_path: download_path.to_string(),
                private_key: private_key.to_string(),
                public_key: public_key.to_string(),
            }),
            (download_path, _, _) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "settings file is incomplete, regenerating defaults"
                );
                self.write_default(download_path.unwrap_or_default().to_string(), keys)
            }
        }
    }

    /// Read the download path and load the persisted keys into `keys`.
    ///
    /// A missing file or field yields an empty path. Keys are loaded only
    /// when both are present; a decode failure leaves `keys` untouched.
    pub fn load_download_path(&self, keys: &mut KeyStore) -> Result<String> {
        let document = match fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str::<Map<String, Value>>(&contents)
                    .map_err(CidSignError::JsonError)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => return Err(CidSignError::StorageError(e)),
        };

        if let (Some(private_key), Some(public_key)) = (
            string_field(&document, PRIVATE_KEY_FIELD),
            string_field(&document, PUBLIC_KEY_FIELD),
        ) {
            keys.load_encoded(private_key, public_key)?;
        }

        Ok(string_field(&document, DOWNLOAD_PATH_FIELD)
            .unwrap_or_default()
            .to_string())
    }

    /// Rewrite the download path, keeping every other field as it is.
    pub fn update_download_path(&self, new_path: &str) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let mut document: Map<String, Value> =
            serde_json::from_str(&contents).map_err(CidSignError::JsonError)?;

        document.insert(
            DOWNLOAD_PATH_FIELD.to_string(),
            Value::String(new_path.to_string()),
        );

        let json = serde_json::to_string_pretty(&document).map_err(CidSignError::JsonError)?;
        write_atomic(&self.path, json.as_bytes())?;

        tracing::info!(download_path = new_path, "download path updated");
        Ok(())
    }

    /// Load the settings object. `None` if the file does not exist; an
    /// unparseable or non-object document reads as an empty object.
    fn read_document(&self) -> Result<Option<Map<String, Value>>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CidSignError::StorageError(e)),
        };

        match serde_json::from_str::<Map<String, Value>>(&contents) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings file is malformed");
                Ok(Some(Map::new()))
            }
        }
    }

    fn write_default(&self, download_path: String, keys: &mut KeyStore) -> Result<Settings> {
        let encoded = keys.encode()?;
        let settings = Settings {
            download_path,
            private_key: encoded.private_key,
            public_key: encoded.public_key,
        };

        let json = serde_json::to_string_pretty(&settings).map_err(CidSignError::JsonError)?;
        write_atomic(&self.path, json.as_bytes())?;

        Ok(settings)
    }
}

fn string_field<'a>(document: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}
