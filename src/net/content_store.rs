//! The content-addressed store the workflow talks to.

use crate::error::Result;
use std::io::Write;

/// A content-addressed blob store.
///
/// Every failure, whether the store is unreachable or it rejects the
/// request, surfaces as [`crate::error::CidSignError::TransportError`] and
/// is terminal for the operation in progress.
pub trait ContentStore {
    /// Store `content` and return its content identifier.
    fn put(&self, content: &[u8]) -> Result<String>;

    /// Fetch the content stored under `cid`.
    fn get(&self, cid: &str) -> Result<Vec<u8>>;

    /// Stream the content stored under `cid` into `writer`, returning the
    /// number of bytes written.
    fn get_into(&self, cid: &str, writer: &mut dyn Write) -> Result<u64> {
        let content = self.get(cid)?;
        writer.write_all(&content)?;
        Ok(content.len() as u64)
    }
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn put(&self, content: &[u8]) -> Result<String> {
        (**self).put(content)
    }

    fn get(&self, cid: &str) -> Result<Vec<u8>> {
        (**self).get(cid)
    }

    fn get_into(&self, cid: &str, writer: &mut dyn Write) -> Result<u64> {
        (**self).get_into(cid, writer)
    }
}

impl<S: ContentStore + ?Sized> ContentStore for Box<S> {
    fn put(&self, content: &[u8]) -> Result<String> {
        (**self).put(content)
    }

    fn get(&self, cid: &str) -> Result<Vec<u8>> {
        (**self).get(cid)
    }

    fn get_into(&self, cid: &str, writer: &mut dyn Write) -> Result<u64> {
        (**self).get_into(cid, writer)
    }
}
