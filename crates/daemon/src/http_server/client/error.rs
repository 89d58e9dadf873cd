use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to daemon failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid daemon URL: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("no paste stored under '{0}'")]
    NotFound(String),
    #[error("daemon answered {0}: {1}")]
    HttpStatus(StatusCode, String),
}
