//! Reversible byte transforms.
//!
//! A [`Transform`] is a pair of functions over whole buffers where
//! `reverse(forward(x)) == x` for every `x` that `forward` accepts.
//! Transforms are built once at startup and shared read-only between
//! sessions, so implementations hold only immutable parameters.

mod aead;
mod base64;
mod gzip;

use std::fmt;

pub use self::aead::{AeadAlgorithm, AeadTransform, AesGcmTransform, ChaChaTransform, KEY_SIZE};
pub use self::base64::Base64Transform;
pub use self::gzip::{GzipTransform, DEFAULT_GZIP_LEVEL};

/// Broad family a transform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Encryption,
    Compression,
    Encoding,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformKind::Encryption => "encryption",
            TransformKind::Compression => "compression",
            TransformKind::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Invalid parameters; only raised while building transforms.
    #[error("invalid transform configuration: {0}")]
    Configuration(String),

    /// Input to `reverse` was malformed, truncated or failed authentication.
    #[error("corrupt payload in {transform}: {reason}")]
    CorruptPayload {
        transform: &'static str,
        reason: String,
    },

    #[error("failed to read input stream: {0}")]
    StreamRead(#[from] std::io::Error),

    #[error("{transform} forward failed: {reason}")]
    Forward {
        transform: &'static str,
        reason: String,
    },
}

impl TransformError {
    pub(crate) fn corrupt(transform: &'static str, reason: impl fmt::Display) -> Self {
        TransformError::CorruptPayload {
            transform,
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt_payload(&self) -> bool {
        matches!(self, TransformError::CorruptPayload { .. })
    }
}

pub trait Transform: Send + Sync + fmt::Debug {
    /// Name used to reference the transform in configuration.
    fn name(&self) -> &'static str;

    fn kind(&self) -> TransformKind;

    fn forward(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;

    fn reverse(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}
