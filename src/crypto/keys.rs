//! Ed25519 keypairs and their PEM encodings.
//!
//! Keys are persisted as PEM text: the private key as PKCS#8, the public key
//! as SubjectPublicKeyInfo. Older settings files carry "bare" encodings
//! (the raw 32-byte seed or point inside a PEM block), so every decoder tries
//! the richer structure first and then falls back to the bare form.

use crate::error::{CidSignError, Result};
use ed25519_dalek::pkcs8::spki::{DecodePublicKey, EncodePublicKey};
use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

/// PEM label written for private keys.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// PEM label written for public keys.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// PEM label used by the bare legacy public key encoding.
pub const BARE_PUBLIC_KEY_LABEL: &str = "ED25519 PUBLIC KEY";

const KEY_LENGTH: usize = 32;

/// An Ed25519 keypair consisting of a secret key and public key.
#[derive(Debug, Clone)]
pub struct Keypair {
    pub secret: SigningKey,
    pub public: VerifyingKey,
}

impl Keypair {
    /// Create a new keypair from a signing key.
    pub fn from_secret(secret: SigningKey) -> Self {
        let public = secret.verifying_key();
        Self { secret, public }
    }

    /// Get the public key as bytes.
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message)
    }

    /// Check a signature against the public half.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public.verify(message, signature).is_ok()
    }
}

/// Outcome of decoding a persisted public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyDecoding {
    /// The key was recognised in one of the supported encodings.
    Decoded(VerifyingKey),
    /// Neither the SPKI nor the bare encoding matched.
    Unrecognized,
}

/// Generate a new Ed25519 keypair from the operating system RNG.
///
/// # Example
///
/// ```
/// use cidsign::crypto::keys::generate_keypair;
///
/// let keypair = generate_keypair();
/// assert_eq!(keypair.public_bytes().len(), 32);
/// ```
pub fn generate_keypair() -> Keypair {
    let secret = SigningKey::generate(&mut OsRng);
    Keypair::from_secret(secret)
}

fn encode_error(format: &str, err: impl std::fmt::Display) -> CidSignError {
    CidSignError::KeyEncodeError(format!("{} encoding failed: {}", format, err))
}

/// Encode the private half as a PKCS#8 PEM document.
pub fn encode_private_key_pem(keypair: &Keypair) -> Result<String> {
    let der = keypair
        .secret
        .to_pkcs8_der()
        .map_err(|e| encode_error("PKCS#8", e))?;

    Ok(pem::encode(&pem::Pem::new(
        PRIVATE_KEY_LABEL,
        der.as_bytes().to_vec(),
    )))
}

/// Encode a public key as a SubjectPublicKeyInfo PEM document.
pub fn encode_public_key_pem(public: &VerifyingKey) -> Result<String> {
    let der = public
        .to_public_key_der()
        .map_err(|e| encode_error("SPKI", e))?;

    Ok(pem::encode(&pem::Pem::new(
        PUBLIC_KEY_LABEL,
        der.as_bytes().to_vec(),
    )))
}

/// Encode a public key in the bare legacy form: the raw point in a PEM block.
pub fn encode_public_key_bare_pem(public: &VerifyingKey) -> String {
    pem::encode(&pem::Pem::new(
        BARE_PUBLIC_KEY_LABEL,
        public.to_bytes().to_vec(),
    ))
}

/// Decode a public key, trying SPKI first and the bare encoding second.
///
/// # Example
///
/// ```
/// use cidsign::crypto::keys::{
///     decode_public_key, encode_public_key_pem, generate_keypair, PublicKeyDecoding,
/// };
///
/// let keypair = generate_keypair();
/// let pem = encode_public_key_pem(&keypair.public).unwrap();
/// assert_eq!(decode_public_key(&pem), PublicKeyDecoding::Decoded(keypair.public));
/// ```
pub fn decode_public_key(pem_text: &str) -> PublicKeyDecoding {
    let block = match pem::parse(pem_text) {
        Ok(block) => block,
        Err(_) => return PublicKeyDecoding::Unrecognized,
    };

    if let Ok(public) = VerifyingKey::from_public_key_der(block.contents()) {
        return PublicKeyDecoding::Decoded(public);
    }

    tracing::debug!(label = block.tag(), "public key is not SPKI, trying bare encoding");

    match <[u8; KEY_LENGTH]>::try_from(block.contents()) {
        Ok(bytes) => match VerifyingKey::from_bytes(&bytes) {
            Ok(public) => PublicKeyDecoding::Decoded(public),
            Err(_) => PublicKeyDecoding::Unrecognized,
        },
        Err(_) => PublicKeyDecoding::Unrecognized,
    }
}

/// Decode a private key, trying PKCS#8 first and a bare 32-byte seed second.
pub fn decode_private_key(pem_text: &str) -> Result<SigningKey> {
    let block = pem::parse(pem_text)
        .map_err(|e| CidSignError::KeyDecodeError(format!("invalid private key PEM: {}", e)))?;

    if let Ok(secret) = SigningKey::from_pkcs8_der(block.contents()) {
        return Ok(secret);
    }

    tracing::debug!(label = block.tag(), "private key is not PKCS#8, trying bare encoding");

    let bytes = <[u8; KEY_LENGTH]>::try_from(block.contents()).map_err(|_| {
        CidSignError::KeyDecodeError(format!(
            "Expected PKCS#8 or {} bytes for private key, got {}",
            KEY_LENGTH,
            block.contents().len()
        ))
    })?;

    Ok(SigningKey::from_bytes(&bytes))
}

/// Decode both halves and check that they belong together.
pub fn decode_keypair(private_pem: &str, public_pem: &str) -> Result<Keypair> {
    let secret = decode_private_key(private_pem)?;

    let public = match decode_public_key(public_pem) {
        PublicKeyDecoding::Decoded(public) => public,
        PublicKeyDecoding::Unrecognized => {
            return Err(CidSignError::KeyDecodeError(
                "invalid public key PEM".to_string(),
            ))
        }
    };

    if secret.verifying_key() != public {
        return Err(CidSignError::KeyDecodeError(
            "public key does not match private key".to_string(),
        ));
    }

    Ok(Keypair { secret, public })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair_produces_different_keys() {
        let keypair1 = generate_keypair();
        let keypair2 = generate_keypair();

        assert_ne!(keypair1.public_bytes(), keypair2.public_bytes());
    }

    #[test]
    fn test_encode_failures_are_encode_errors() {
        match encode_error("SPKI", "unsupported algorithm") {
            CidSignError::KeyEncodeError(msg) => {
                assert_eq!(msg, "SPKI encoding failed: unsupported algorithm")
            }
            other => panic!("Expected KeyEncodeError, got {:?}", other),
        }
    }

    #[test]
    fn test_keypair_encoding_roundtrip() {
        let keypair = generate_keypair();
        let private_pem = encode_private_key_pem(&keypair).unwrap();
        let public_pem = encode_public_key_pem(&keypair.public).unwrap();

        assert!(private_pem.contains("BEGIN PRIVATE KEY"));
        assert!(public_pem.contains("BEGIN PUBLIC KEY"));

        let decoded = decode_keypair(&private_pem, &public_pem).unwrap();
        assert_eq!(decoded.public_bytes(), keypair.public_bytes());

        // Signatures are interchangeable between the original and decoded pair
        let message = b"interchangeable";
        assert!(keypair.verify(message, &decoded.sign(message)));
        assert!(decoded.verify(message, &keypair.sign(message)));
    }

    #[test]
    fn test_decode_public_key_bare_fallback() {
        let keypair = generate_keypair();
        let bare = encode_public_key_bare_pem(&keypair.public);

        assert_eq!(
            decode_public_key(&bare),
            PublicKeyDecoding::Decoded(keypair.public)
        );
    }

    #[test]
    fn test_decode_public_key_unrecognized() {
        assert_eq!(decode_public_key("not pem"), PublicKeyDecoding::Unrecognized);

        let junk = pem::encode(&pem::Pem::new(PUBLIC_KEY_LABEL, vec![1, 2, 3]));
        assert_eq!(decode_public_key(&junk), PublicKeyDecoding::Unrecognized);
    }

    #[test]
    fn test_decode_private_key_bare_seed() {
        let keypair = generate_keypair();
        let bare = pem::encode(&pem::Pem::new(
            "ED25519 PRIVATE KEY",
            keypair.secret.to_bytes().to_vec(),
        ));

        let secret = decode_private_key(&bare).unwrap();
        assert_eq!(secret.verifying_key(), keypair.public);
    }

    #[test]
    fn test_decode_private_key_invalid_length() {
        let junk = pem::encode(&pem::Pem::new(PRIVATE_KEY_LABEL, vec![0u8; 16]));

        match decode_private_key(&junk) {
            Err(CidSignError::KeyDecodeError(msg)) => assert!(msg.contains("got 16")),
            other => panic!("Expected KeyDecodeError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_keypair_rejects_mismatched_halves() {
        let keypair1 = generate_keypair();
        let keypair2 = generate_keypair();

        let private_pem = encode_private_key_pem(&keypair1).unwrap();
        let public_pem = encode_public_key_pem(&keypair2.public).unwrap();

        let result = decode_keypair(&private_pem, &public_pem);
        assert!(matches!(result, Err(CidSignError::KeyDecodeError(_))));
    }
}
