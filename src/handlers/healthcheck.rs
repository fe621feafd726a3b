use axum::{extract::State, http::StatusCode};
use serde_json::json;

use crate::api::write_json;
use crate::error::{envelope, ApiResult};
use crate::AppState;

/// GET /v1/healthcheck
pub async fn healthcheck(State(state): State<AppState>) -> ApiResult {
    let system_info = json!({
        "environment": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
    });
    let data = envelope("status", "available")?.with("system_info", &system_info)?;
    write_json(StatusCode::OK, &data, None)
}
