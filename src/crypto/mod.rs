//! Cryptographic operations module.
//!
//! - Ed25519 key generation and PEM encoding with legacy decode fallbacks
//! - Signing and verification of file content over its SHA-256 digest
//!
//! # Example
//!
//! ```rust
//! use cidsign::crypto::keys::{decode_keypair, encode_private_key_pem, encode_public_key_pem};
//! use cidsign::storage::keystore::KeyStore;
//! use cidsign::crypto::signature::SignatureEngine;
//!
//! # fn example() -> cidsign::error::Result<()> {
//! let mut keys = KeyStore::new();
//! let keypair = keys.generate_keypair().clone();
//!
//! let private_pem = encode_private_key_pem(&keypair)?;
//! let public_pem = encode_public_key_pem(&keypair.public)?;
//! let restored = decode_keypair(&private_pem, &public_pem)?;
//!
//! let signature = SignatureEngine::new(&keys).sign(b"file content")?;
//! assert!(SignatureEngine::new(&KeyStore::with_keypair(restored)).verify(b"file content", &signature));
//! # Ok(())
//! # }
//! ```

pub mod keys;
pub mod signature;
