//! In-memory content store (for tests and offline use)

use crate::crypto::signature::content_digest;
use crate::error::{CidSignError, Result};
use crate::net::content_store::ContentStore;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Prefix of the identifiers handed out by [`MemoryStore`].
pub const MEMORY_CID_PREFIX: &str = "sha256-";

/// Content store backed by a map. Not persistent; data is lost on drop.
///
/// Identifiers are the hex SHA-256 digest of the content, so adding the
/// same bytes twice yields the same CID.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier this store assigns to `content`.
    pub fn cid_for(content: &[u8]) -> String {
        format!("{}{}", MEMORY_CID_PREFIX, hex::encode(content_digest(content)))
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for MemoryStore {
    fn put(&self, content: &[u8]) -> Result<String> {
        let cid = Self::cid_for(content);
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cid.clone(), content.to_vec());
        Ok(cid)
    }

    fn get(&self, cid: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cid)
            .cloned()
            .ok_or_else(|| CidSignError::TransportError(format!("no content for CID '{}'", cid)))
    }
}
