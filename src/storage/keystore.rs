//! Custody of the installation's single signing keypair.
//!
//! The keystore holds at most one active keypair. It never replaces an
//! active pair by generating a new one; a pair is only swapped out when a
//! complete, consistent pair is loaded from persisted settings.

use crate::crypto::keys::{
    decode_keypair, encode_private_key_pem, encode_public_key_pem, generate_keypair, Keypair,
};
use crate::error::Result;

/// PEM text of both halves of a keypair, as persisted in the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedKeys {
    pub private_key: String,
    pub public_key: String,
}

/// Holder of the active keypair.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    active: Option<Keypair>,
}

impl KeyStore {
    /// Create a keystore with no active keypair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keystore around an existing keypair.
    pub fn with_keypair(keypair: Keypair) -> Self {
        Self {
            active: Some(keypair),
        }
    }

    /// The active keypair, if any.
    pub fn active(&self) -> Option<&Keypair> {
        self.active.as_ref()
    }

    /// Whether a keypair is loaded.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Generate a keypair unless one is already active, and return the active pair.
    ///
    /// # Example
    ///
    /// ```
    /// use cidsign::storage::keystore::KeyStore;
    ///
    /// let mut keys = KeyStore::new();
    /// let first = keys.generate_keypair().public_bytes();
    /// let second = keys.generate_keypair().public_bytes();
    /// assert_eq!(first, second);
    /// ```
    pub fn generate_keypair(&mut self) -> &Keypair {
        self.active.get_or_insert_with(|| {
            tracing::info!("generated new signing keypair");
            generate_keypair()
        })
    }

    /// Encode the active keypair, generating one first if none is active.
    pub fn encode(&mut self) -> Result<EncodedKeys> {
        let keypair = self.generate_keypair();

        Ok(EncodedKeys {
            private_key: encode_private_key_pem(keypair)?,
            public_key: encode_public_key_pem(&keypair.public)?,
        })
    }

    /// Decode persisted keys and make them the active pair.
    ///
    /// On any decode failure the previously active pair is left in place.
    pub fn load_encoded(&mut self, private_pem: &str, public_pem: &str) -> Result<()> {
        let keypair = decode_keypair(private_pem, public_pem)?;
        self.active = Some(keypair);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CidSignError;

    #[test]
    fn test_new_keystore_is_empty() {
        let keys = KeyStore::new();
        assert!(!keys.is_active());
        assert!(keys.active().is_none());
    }

    #[test]
    fn test_generate_keypair_is_idempotent() {
        let mut keys = KeyStore::new();
        let first = keys.generate_keypair().public_bytes();
        let second = keys.generate_keypair().public_bytes();

        assert!(keys.is_active());
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_keypair_keeps_existing_pair() {
        let existing = generate_keypair();
        let mut keys = KeyStore::with_keypair(existing.clone());

        assert_eq!(keys.generate_keypair().public_bytes(), existing.public_bytes());
    }

    #[test]
    fn test_encode_then_load_roundtrip() {
        let mut keys = KeyStore::new();
        let encoded = keys.encode().unwrap();
        let public = keys.active().unwrap().public_bytes();

        let mut restored = KeyStore::new();
        restored
            .load_encoded(&encoded.private_key, &encoded.public_key)
            .unwrap();

        assert_eq!(restored.active().unwrap().public_bytes(), public);
    }

    #[test]
    fn test_load_encoded_failure_leaves_active_pair() {
        let mut keys = KeyStore::new();
        let public = keys.generate_keypair().public_bytes();

        let result = keys.load_encoded("garbage", "garbage");

        match result {
            Err(CidSignError::KeyDecodeError(_)) => {}
            other => panic!("Expected KeyDecodeError, got {:?}", other),
        }
        assert_eq!(keys.active().unwrap().public_bytes(), public);
    }
}
