//! Authenticated encryption transforms.
//!
//! Output layout is `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! A fresh nonce is drawn from the OS RNG for every forward call, so two
//! encryptions of the same plaintext never produce the same bytes.

use std::fmt;

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Nonce};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use sha2::{Digest, Sha256};

use super::{Transform, TransformError, TransformKind};

/// Size of the symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// An AEAD cipher usable as a transform.
pub trait AeadAlgorithm: Aead + KeyInit + Send + Sync + 'static {
    const NAME: &'static str;
}

impl AeadAlgorithm for Aes256Gcm {
    const NAME: &'static str = "aes";
}

impl AeadAlgorithm for ChaCha20Poly1305 {
    const NAME: &'static str = "chacha20";
}

pub struct AeadTransform<C> {
    cipher: C,
}

pub type AesGcmTransform = AeadTransform<Aes256Gcm>;
pub type ChaChaTransform = AeadTransform<ChaCha20Poly1305>;

impl<C: AeadAlgorithm> AeadTransform<C> {
    /// Derive the key as `SHA-256(secret)`.
    pub fn from_secret(secret: &str) -> Result<Self, TransformError> {
        if secret.is_empty() {
            return Err(TransformError::Configuration(format!(
                "{} secret must not be empty",
                C::NAME
            )));
        }
        let key = Sha256::digest(secret.as_bytes());
        Self::from_key_bytes(&key)
    }

    /// Use raw key material, which must be exactly [`KEY_SIZE`] bytes.
    pub fn from_key_bytes(key: &[u8]) -> Result<Self, TransformError> {
        if key.len() != KEY_SIZE {
            return Err(TransformError::Configuration(format!(
                "{} key must be {} bytes, got {}",
                C::NAME,
                KEY_SIZE,
                key.len()
            )));
        }
        let cipher = C::new_from_slice(key)
            .map_err(|e| TransformError::Configuration(format!("{}: {}", C::NAME, e)))?;
        Ok(Self { cipher })
    }

    fn nonce_size() -> usize {
        <C as AeadCore>::NonceSize::USIZE
    }
}

impl<C> fmt::Debug for AeadTransform<C>
where
    C: AeadAlgorithm,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        f.debug_struct("AeadTransform")
            .field("algorithm", &C::NAME)
            .finish_non_exhaustive()
    }
}

impl<C: AeadAlgorithm> Transform for AeadTransform<C> {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Encryption
    }

    fn forward(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut nonce = Nonce::<C>::default();
        getrandom::getrandom(nonce.as_mut_slice()).map_err(|e| TransformError::Forward {
            transform: C::NAME,
            reason: format!("failed to generate nonce: {}", e),
        })?;

        let ciphertext = self
            .cipher
            .encrypt(&nonce, input)
            .map_err(|_| TransformError::Forward {
                transform: C::NAME,
                reason: "encrypt error".to_string(),
            })?;

        let mut out = Vec::with_capacity(nonce.len() + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn reverse(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let nonce_size = Self::nonce_size();
        if input.len() < nonce_size {
            return Err(TransformError::corrupt(
                C::NAME,
                format!(
                    "input of {} bytes is shorter than the {} byte nonce",
                    input.len(),
                    nonce_size
                ),
            ));
        }

        let (nonce, ciphertext) = input.split_at(nonce_size);
        self.cipher
            .decrypt(Nonce::<C>::from_slice(nonce), ciphertext)
            .map_err(|_| TransformError::corrupt(C::NAME, "authentication failed"))
    }
}
