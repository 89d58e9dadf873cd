//! Paste key generation and validation.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Default length of generated keys.
pub const DEFAULT_KEY_LENGTH: usize = 6;
/// Shortest key length we allow in configuration.
pub const MIN_KEY_LENGTH: usize = 4;
/// Longest key accepted anywhere (configuration or lookup).
pub const MAX_KEY_LENGTH: usize = 64;
/// How many fresh keys a backend tries before giving up on a put.
pub const MAX_KEY_ATTEMPTS: usize = 8;

/// Generates random alphanumeric keys of a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenerator {
    length: usize,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_KEY_LENGTH,
        }
    }
}

impl KeyGenerator {
    /// Create a generator producing keys of `length` characters.
    pub fn new(length: usize) -> Result<Self> {
        if !(MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&length) {
            return Err(StoreError::InvalidConfig(format!(
                "key length must be between {} and {}, got {}",
                MIN_KEY_LENGTH, MAX_KEY_LENGTH, length
            )));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw a new key from the thread-local CSPRNG.
    pub fn generate(&self) -> String {
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Check that a key could have been produced by a [`KeyGenerator`].
///
/// Backends call this before touching the medium so that lookups like
/// `../etc/passwd` never reach a filesystem path or a query.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LENGTH && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Reject keys that fail [`is_valid_key`] as not found.
pub(crate) fn ensure_valid_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(StoreError::NotFound(key.to_string()))
    }
}
