use std::io::{Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::{Transform, TransformError, TransformKind};

pub const DEFAULT_GZIP_LEVEL: u32 = 6;
const MAX_GZIP_LEVEL: u32 = 9;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const NAME: &str = "gzip";

/// Wraps the payload in a gzip container.
#[derive(Debug, Clone)]
pub struct GzipTransform {
    level: u32,
    /// Upper bound on reverse output, guards against decompression bombs
    max_decompressed_bytes: Option<u64>,
}

impl Default for GzipTransform {
    fn default() -> Self {
        Self {
            level: DEFAULT_GZIP_LEVEL,
            max_decompressed_bytes: None,
        }
    }
}

impl GzipTransform {
    pub fn new(level: u32, max_decompressed_bytes: Option<u64>) -> Result<Self, TransformError> {
        if level > MAX_GZIP_LEVEL {
            return Err(TransformError::Configuration(format!(
                "gzip level must be between 0 and {}, got {}",
                MAX_GZIP_LEVEL, level
            )));
        }
        Ok(Self {
            level,
            max_decompressed_bytes,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Transform for GzipTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Compression
    }

    fn forward(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity(input.len() / 2 + 32),
            Compression::new(self.level),
        );
        encoder
            .write_all(input)
            .and_then(|_| encoder.finish())
            .map_err(|e| TransformError::Forward {
                transform: NAME,
                reason: e.to_string(),
            })
    }

    fn reverse(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        if !input.starts_with(&GZIP_MAGIC) {
            return Err(TransformError::corrupt(NAME, "missing gzip header"));
        }

        let mut out = Vec::new();
        // bytes after a member must be another member
        let mut decoder = MultiGzDecoder::new(input);
        let read = match self.max_decompressed_bytes {
            Some(limit) => (&mut decoder)
                .take(limit.saturating_add(1))
                .read_to_end(&mut out),
            None => decoder.read_to_end(&mut out),
        };
        read.map_err(|e| TransformError::corrupt(NAME, e))?;

        if let Some(limit) = self.max_decompressed_bytes {
            if out.len() as u64 > limit {
                return Err(TransformError::corrupt(
                    NAME,
                    format!("decompressed size exceeds {} bytes", limit),
                ));
            }
        }
        Ok(out)
    }
}
