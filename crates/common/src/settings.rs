use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transform::DEFAULT_GZIP_LEVEL;

/// Everything needed to build a [`TransformChain`](crate::chain::TransformChain).
///
/// Deserializes from the top level of the config file:
///
/// ```toml
/// transforms = ["aes", "gzip", "base64"]
///
/// [aes]
/// key = "correct horse battery staple"
///
/// [gzip]
/// level = 9
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Transform names in forward order
    #[serde(default)]
    pub transforms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aes: Option<CipherSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chacha20: Option<CipherSettings>,

    #[serde(default)]
    pub gzip: GzipSettings,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CipherSettings {
    /// Secret the cipher key is derived from
    pub key: String,
}

impl fmt::Debug for CipherSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSettings")
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GzipSettings {
    #[serde(default = "default_gzip_level")]
    pub level: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_decompressed_bytes: Option<u64>,
}

impl Default for GzipSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_GZIP_LEVEL,
            max_decompressed_bytes: None,
        }
    }
}

fn default_gzip_level() -> u32 {
    DEFAULT_GZIP_LEVEL
}
