//! Configuration endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::server::AppState;
use crate::remote_config::RemoteConfigError;

/// `GET /config/{version}`: the variant of each file the app version should
/// download.
pub async fn get_config(
    State(state): State<AppState>,
    Path(version): Path<String>,
) -> Response {
    let app_version = version.trim();

    match state.store.lookup(app_version) {
        Ok(files) => Json(files).into_response(),
        Err(RemoteConfigError::NotInitialized) => {
            tracing::warn!(version = %app_version, "Lookup before configuration was loaded");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        Err(e) => {
            tracing::error!(version = %app_version, error = %e, "Lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /config/refresh`: reload the document now.
///
/// Failures are logged by the store; clients only see the status.
pub async fn refresh_config(State(state): State<AppState>) -> StatusCode {
    match state.store.refresh().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
