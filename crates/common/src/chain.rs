//! Ordered composition of transforms.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::settings::TransformSettings;
use crate::transform::{
    AesGcmTransform, Base64Transform, ChaChaTransform, GzipTransform, Transform, TransformError,
};

/// Applies transforms in declared order on the way in and in exactly the
/// reverse order on the way out. An empty chain is the identity.
#[derive(Debug, Default)]
pub struct TransformChain {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn from_settings(settings: &TransformSettings) -> Result<Self, TransformError> {
        Self::from_names(&settings.transforms, settings)
    }

    /// Build from configuration names (case-insensitive). Unknown names and
    /// encryption transforms without a configured secret are rejected.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        settings: &TransformSettings,
    ) -> Result<Self, TransformError> {
        let transforms = names
            .iter()
            .map(|name| build_transform(name.as_ref(), settings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(transforms))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn forward(&self, input: Vec<u8>) -> Result<Vec<u8>, TransformError> {
        self.transforms.iter().try_fold(input, |data, transform| {
            let out = transform.forward(&data)?;
            tracing::trace!(
                transform = transform.name(),
                input = data.len(),
                output = out.len(),
                "forward"
            );
            Ok(out)
        })
    }

    pub fn reverse(&self, input: Vec<u8>) -> Result<Vec<u8>, TransformError> {
        self.transforms.iter().rev().try_fold(input, |data, transform| {
            let out = transform.reverse(&data)?;
            tracing::trace!(
                transform = transform.name(),
                input = data.len(),
                output = out.len(),
                "reverse"
            );
            Ok(out)
        })
    }

    /// Drain `reader` to EOF and reverse what was read.
    pub async fn reverse_reader<R>(&self, reader: &mut R) -> Result<Vec<u8>, TransformError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut stored = Vec::new();
        reader.read_to_end(&mut stored).await?;
        self.reverse(stored)
    }
}

fn build_transform(
    name: &str,
    settings: &TransformSettings,
) -> Result<Box<dyn Transform>, TransformError> {
    let normalized = name.trim().to_ascii_lowercase();
    let transform: Box<dyn Transform> = match normalized.as_str() {
        "aes" => {
            let cipher = settings.aes.as_ref().ok_or_else(|| {
                TransformError::Configuration("aes transform requires an [aes] key".to_string())
            })?;
            Box::new(AesGcmTransform::from_secret(&cipher.key)?)
        }
        "chacha20" => {
            let cipher = settings.chacha20.as_ref().ok_or_else(|| {
                TransformError::Configuration(
                    "chacha20 transform requires a [chacha20] key".to_string(),
                )
            })?;
            Box::new(ChaChaTransform::from_secret(&cipher.key)?)
        }
        "gzip" => Box::new(GzipTransform::new(
            settings.gzip.level,
            settings.gzip.max_decompressed_bytes,
        )?),
        "base64" => Box::new(Base64Transform),
        _ => {
            return Err(TransformError::Configuration(format!(
                "unknown transform '{}'",
                name
            )))
        }
    };
    Ok(transform)
}
