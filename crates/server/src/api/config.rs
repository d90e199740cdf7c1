use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use catalog::{CatalogError, StorageConfig, StorageConfigUpdate};
use tracing::warn;

use crate::config::save_config;
use crate::state::{AppState, JsonResult, StorageConfigResponse};
use crate::utils::json_error;

pub async fn get_storage_config(State(state): State<AppState>) -> Json<StorageConfig> {
    Json(state.catalog.config().as_ref().clone())
}

pub async fn update_storage_config(
    State(state): State<AppState>,
    Json(update): Json<StorageConfigUpdate>,
) -> JsonResult<StorageConfigResponse> {
    // Held across swap and save so the file always matches the live configuration.
    let mut config = state.config.write();
    let next = state.catalog.update_config(update).map_err(|err| match err {
        CatalogError::ConfigurationInvalid(_) => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        other => json_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;
    config.storage = next.as_ref().clone();
    if let Err(err) = save_config(&state.config_path, &config) {
        warn!("Failed to persist storage config: {}", err);
    }
    drop(config);

    Ok(Json(StorageConfigResponse {
        status: "success",
        config: next.as_ref().clone(),
    }))
}
