use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{Transform, TransformError, TransformKind};

const NAME: &str = "base64";

/// Standard alphabet, padded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Transform;

impl Transform for Base64Transform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Encoding
    }

    fn forward(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(STANDARD.encode(input).into_bytes())
    }

    fn reverse(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        STANDARD
            .decode(input)
            .map_err(|e| TransformError::corrupt(NAME, e))
    }
}
