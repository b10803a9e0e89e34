//! Signing and verification of file content.
//!
//! Content is reduced to a SHA-256 digest and the digest is signed with the
//! active Ed25519 key. Signatures travel as standard base64 text, which is
//! what the ledger stores and what users paste back in to verify.

use crate::error::{CidSignError, Result};
use crate::storage::keystore::KeyStore;
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::Signature;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `content`.
pub fn content_digest(content: &[u8]) -> [u8; 32] {
    Sha256::digest(content).into()
}

/// Signs and verifies content with the keys held by a [`KeyStore`].
#[derive(Debug, Clone, Copy)]
pub struct SignatureEngine<'a> {
    keys: &'a KeyStore,
}

impl<'a> SignatureEngine<'a> {
    /// Sign and verify with the active keypair of `keys`.
    pub fn new(keys: &'a KeyStore) -> Self {
        Self { keys }
    }

    /// Sign the digest of `content` and return the base64 signature.
    ///
    /// # Example
    ///
    /// ```
    /// use cidsign::crypto::signature::SignatureEngine;
    /// use cidsign::storage::keystore::KeyStore;
    ///
    /// let mut keys = KeyStore::new();
    /// keys.generate_keypair();
    ///
    /// let engine = SignatureEngine::new(&keys);
    /// let signature = engine.sign(b"hello").unwrap();
    /// assert!(engine.verify(b"hello", &signature));
    /// ```
    pub fn sign(&self, content: &[u8]) -> Result<String> {
        let keypair = self.keys.active().ok_or(CidSignError::KeyUnavailableError)?;
        let digest = content_digest(content);
        let signature = keypair.sign(&digest);

        Ok(STANDARD.encode(signature.to_bytes()))
    }

    /// Check a base64 signature against `content`.
    ///
    /// Any malformed input, missing key, or mismatch yields `false`.
    pub fn verify(&self, content: &[u8], signature: &str) -> bool {
        let Some(keypair) = self.keys.active() else {
            return false;
        };

        let Ok(raw) = STANDARD.decode(signature.trim()) else {
            return false;
        };

        let Ok(signature) = Signature::from_slice(&raw) else {
            return false;
        };

        keypair.verify(&content_digest(content), &signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn active_keys() -> KeyStore {
        let mut keys = KeyStore::new();
        keys.generate_keypair();
        keys
    }

    #[test]
    fn test_sign_without_keypair() {
        let keys = KeyStore::new();
        let engine = SignatureEngine::new(&keys);

        let result = engine.sign(b"content");
        assert!(matches!(result, Err(CidSignError::KeyUnavailableError)));
        assert!(!engine.verify(b"content", "AAAA"));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let keys = active_keys();
        let engine = SignatureEngine::new(&keys);

        assert_eq!(engine.sign(b"same").unwrap(), engine.sign(b"same").unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_signature() {
        let keys = active_keys();
        let engine = SignatureEngine::new(&keys);

        assert!(!engine.verify(b"content", "not base64!"));
        assert!(!engine.verify(b"content", &STANDARD.encode([0u8; 12])));
        assert!(!engine.verify(b"content", ""));
    }

    #[test]
    fn test_verify_rejects_other_keypair() {
        let keys1 = active_keys();
        let keys2 = active_keys();

        let signature = SignatureEngine::new(&keys1).sign(b"content").unwrap();
        assert!(!SignatureEngine::new(&keys2).verify(b"content", &signature));
    }

    #[test]
    fn test_content_digest_known_value() {
        assert_eq!(
            hex::encode(content_digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    proptest! {
        #[test]
        fn sign_then_verify_holds(content in proptest::collection::vec(any::<u8>(), 0..512)) {
            let keys = active_keys();
            let engine = SignatureEngine::new(&keys);
            let signature = engine.sign(&content).unwrap();
            prop_assert!(engine.verify(&content, &signature));
        }

        #[test]
        fn single_bit_flip_fails_verification(
            content in proptest::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let keys = active_keys();
            let engine = SignatureEngine::new(&keys);
            let signature = engine.sign(&content).unwrap();

            let mut mutated = content.clone();
            let i = index.index(mutated.len());
            mutated[i] ^= 1 << bit;

            prop_assert!(!engine.verify(&mutated, &signature));
        }
    }
}
