//! Content store backends.
//!
//! The workflow only sees the [`content_store::ContentStore`] trait. The
//! IPFS client is what the CLI uses; the in-memory store backs tests.

pub mod client;
pub mod content_store;
pub mod memory;
