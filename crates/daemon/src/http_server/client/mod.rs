mod error;

use reqwest::{Client, StatusCode};
use url::Url;

pub use error::ApiError;

/// HTTP client for a running daemon's retrieve server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;

        // keys are joined onto the base, which must therefore end in a slash
        let mut remote = remote.clone();
        if !remote.path().ends_with('/') {
            let path = format!("{}/", remote.path());
            remote.set_path(&path);
        }

        Ok(Self { remote, client })
    }

    /// Fetch the original bytes of a paste.
    pub async fn fetch_paste(&self, key: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.remote.join(key)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.bytes().await?.to_vec()),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(key.to_string())),
            status => Err(ApiError::HttpStatus(status, response.text().await?)),
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
