use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use common::prelude::build_info;

mod data_source;
mod liveness;
mod readiness;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(liveness::handler))
        .route("/readyz", get(readiness::handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

async fn version_handler() -> impl IntoResponse {
    Json(build_info())
}
