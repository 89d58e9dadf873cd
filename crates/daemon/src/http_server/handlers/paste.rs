use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use common::prelude::PipelineError;

use super::not_found::not_found_response;
use crate::ServiceState;

const RETRIEVE_FAILED_MSG: &str = "Error retrieving paste";

/// `GET /{key}`: run the retrieve pipeline to completion, then answer.
///
/// The body is only produced after the pipeline resolved, so a failure can
/// never follow a 200 status line.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, PasteError> {
    let payload = state
        .retrieve()
        .fetch(&key)
        .await
        .map_err(|source| PasteError { source, headers })?;

    let content_type = content_type_for(&payload);
    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], payload).into_response())
}

/// Pastes carry no metadata, so sniff text vs binary.
fn content_type_for(payload: &[u8]) -> &'static str {
    if std::str::from_utf8(payload).is_ok() {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

#[derive(Debug)]
pub struct PasteError {
    source: PipelineError,
    headers: HeaderMap,
}

impl IntoResponse for PasteError {
    fn into_response(self) -> Response {
        if self.source.is_not_found() {
            return not_found_response(&self.headers);
        }

        tracing::error!(error = %self.source, "failed to retrieve paste");
        (StatusCode::INTERNAL_SERVER_ERROR, RETRIEVE_FAILED_MSG).into_response()
    }
}
