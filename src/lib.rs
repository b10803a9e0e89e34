//! cidsign: signed file registration for content-addressed storage
//!
//! This library lets a single operator:
//!
//! - Keep one Ed25519 signing keypair, persisted as PEM in a settings file
//! - Sign file content and add it to an IPFS node, recording name, size,
//!   CID and signature in a JSON ledger
//! - Verify content fetched by CID against a signature
//! - Download ledger entries back to disk under their original names
//!
//! # Architecture
//!
//! [`workflow::IntegrityWorkflow`] owns all state (keystore, settings,
//! ledger, content store) as an explicit context object; there are no
//! process-wide globals. All operations return `Result` types with distinct
//! error variants; a failed signature check is `Ok(false)`, not an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use cidsign::config::Config;
//! use cidsign::error::Result;
//! use cidsign::net::client::IpfsClient;
//! use cidsign::workflow::IntegrityWorkflow;
//!
//! fn example() -> Result<()> {
//!     let config = Config::default();
//!     let ipfs = IpfsClient::new(&config.ipfs_api)?;
//!     let workflow = IntegrityWorkflow::open(&config, ipfs)?;
//!
//!     let record = workflow.ingest_file("report.pdf".as_ref())?;
//!     println!("Added {} as {}", record.name, record.cid);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod net;
pub mod storage;
pub mod workflow;

// Re-export commonly used types
pub use error::{CidSignError, Result};
