//! Error types for the cidsign library.
//!
//! Every failure a caller may want to render differently has its own
//! variant. A negative signature verification is not an error: it is a
//! `false` returned from [`crate::crypto::signature::SignatureEngine::verify`].

use thiserror::Error;

/// The main error type for cidsign operations.
#[derive(Error, Debug)]
pub enum CidSignError {
    /// Settings, ledger, or local file I/O failed
    #[error("Storage I/O error: {0}")]
    StorageError(#[from] std::io::Error),

    /// A persisted JSON document could not be parsed or written
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Persisted key material is malformed or inconsistent
    #[error("Key decode error: {0}")]
    KeyDecodeError(String),

    /// An in-memory key could not be serialized for persistence
    #[error("Key encode error: {0}")]
    KeyEncodeError(String),

    /// Signing was attempted with no active keypair
    #[error("No active keypair")]
    KeyUnavailableError,

    /// The content store was unreachable or rejected the request
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The CID is not recorded in the ledger
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// A download directory failed validation
    #[error("Invalid path: {0}")]
    InvalidPathError(String),
}

/// A specialized Result type for cidsign operations.
pub type Result<T> = std::result::Result<T, CidSignError>;

impl From<reqwest::Error> for CidSignError {
    fn from(err: reqwest::Error) -> Self {
        CidSignError::TransportError(err.to_string())
    }
}
