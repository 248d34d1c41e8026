use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared_types::{AppConfig, EnvConfig, Store};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    dto::SuccessResponse,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// GET /configs
/// Every application's configuration; empty object when nothing is stored
#[instrument(skip(state))]
pub async fn get_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Store>> {
    Ok(Json(state.provider.get_all().await?))
}

/// DELETE /configs/clear
/// Delete every configuration
#[instrument(skip(state))]
pub async fn clear(State(state): State<Arc<AppState>>) -> ApiResult<Json<SuccessResponse>> {
    info!("Clearing all configurations");
    state.provider.clear().await?;
    Ok(Json(SuccessResponse {
        message: "All configurations deleted".to_string(),
    }))
}

/// GET /configs/:app
#[instrument(skip(state))]
pub async fn get_app_config(
    State(state): State<Arc<AppState>>,
    Path(app): Path<String>,
) -> ApiResult<Json<AppConfig>> {
    match state.provider.get_app_config(&app).await? {
        Some(config) => Ok(Json(config)),
        None => Err(ApiError::NotFound(format!("application '{app}' not found"))),
    }
}

/// POST /configs/:app
/// Full replace of the application's configuration
#[instrument(skip(state, config))]
pub async fn set_app_config(
    State(state): State<Arc<AppState>>,
    Path(app): Path<String>,
    Json(config): Json<AppConfig>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    info!("Replacing configuration of application {}", app);
    state.provider.set_app_config(&app, &config).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse {
            message: format!("Configuration of '{app}' replaced"),
        }),
    ))
}

/// DELETE /configs/:app
#[instrument(skip(state))]
pub async fn delete_app_config(
    State(state): State<Arc<AppState>>,
    Path(app): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    info!("Deleting configuration of application {}", app);
    state.provider.delete_app_config(&app).await?;
    Ok(Json(SuccessResponse {
        message: format!("Configuration of '{app}' deleted"),
    }))
}

/// GET /configs/:app/:env
#[instrument(skip(state))]
pub async fn get_env_config(
    State(state): State<Arc<AppState>>,
    Path((app, env)): Path<(String, String)>,
) -> ApiResult<Json<EnvConfig>> {
    match state.provider.get_env_config(&app, &env).await? {
        Some(block) => Ok(Json(block)),
        None => Err(ApiError::NotFound(format!(
            "environment '{app}/{env}' not found"
        ))),
    }
}

/// POST /configs/:app/:env
/// Full replace of one environment block
#[instrument(skip(state, block))]
pub async fn set_env_config(
    State(state): State<Arc<AppState>>,
    Path((app, env)): Path<(String, String)>,
    Json(block): Json<EnvConfig>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    info!("Replacing environment {}/{}", app, env);
    state.provider.set_env_config(&app, &env, &block).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse {
            message: format!("Environment '{app}/{env}' replaced"),
        }),
    ))
}

/// DELETE /configs/:app/:env
#[instrument(skip(state))]
pub async fn delete_env_config(
    State(state): State<Arc<AppState>>,
    Path((app, env)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse>> {
    info!("Deleting environment {}/{}", app, env);
    state.provider.delete_env_config(&app, &env).await?;
    Ok(Json(SuccessResponse {
        message: format!("Environment '{app}/{env}' deleted"),
    }))
}

/// GET /configs/:app/:env/:key
/// Single value, returned as plain text
#[instrument(skip(state))]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path((app, env, key)): Path<(String, String, String)>,
) -> ApiResult<String> {
    match state.provider.get_config(&app, &env, &key).await? {
        Some(value) => Ok(value),
        None => Err(ApiError::NotFound(format!(
            "key '{key}' not found in '{app}/{env}'"
        ))),
    }
}

/// POST /configs/:app/:env/:key
/// Set one value; the body is the raw value text
#[instrument(skip(state, value))]
pub async fn set_config(
    State(state): State<Arc<AppState>>,
    Path((app, env, key)): Path<(String, String, String)>,
    value: String,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    info!("Setting {}/{}/{}", app, env, key);
    state.provider.set_config(&app, &env, &key, &value).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse {
            message: format!("Key '{key}' set in '{app}/{env}'"),
        }),
    ))
}

/// DELETE /configs/:app/:env/:key
#[instrument(skip(state))]
pub async fn delete_config(
    State(state): State<Arc<AppState>>,
    Path((app, env, key)): Path<(String, String, String)>,
) -> ApiResult<Json<SuccessResponse>> {
    info!("Deleting {}/{}/{}", app, env, key);
    state.provider.delete_config(&app, &env, &key).await?;
    Ok(Json(SuccessResponse {
        message: format!("Key '{key}' deleted from '{app}/{env}'"),
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "open-env-config",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
