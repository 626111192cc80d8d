use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::services::generation::{prepare_device, GenerateResponse, PairReport, ValidationReport};
use crate::AppState;

use super::ApiError;

/// Body of the single-device endpoints
#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    pub config: Value,
}

/// Supported `vendor/firmware` pairs of the template store
pub async fn list_vendors(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.generator.renderer().store().vendors().await)
}

/// Validate a device document without rendering it
pub async fn validate_config(Json(req): Json<ConfigRequest>) -> Json<ValidationReport> {
    Json(prepare_device(req.config).report())
}

/// Validate and render a device document
pub async fn generate_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigRequest>,
) -> (StatusCode, Json<GenerateResponse>) {
    let response = state.generator.generate_device(req.config).await;
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(response))
}

/// Render a device document and return the text as a download
pub async fn generate_raw(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigRequest>,
) -> Result<Response, ApiError> {
    let response = state.generator.generate_device(req.config).await;
    match (response.config, response.filename) {
        (Some(text), Some(filename)) if response.success => Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
            ],
            text,
        )
            .into_response()),
        _ => {
            let mut message = response.error.unwrap_or_else(|| "Generation failed".to_string());
            if let Some(errors) = response.validation_errors {
                let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
                message = format!("{}: {}", message, details.join("; "));
            }
            Err(ApiError::bad_request(message))
        }
    }
}

/// Build both TORs of a rack from a pair request
pub async fn generate_pair(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Value>,
) -> Result<(StatusCode, Json<PairReport>), ApiError> {
    let report = state.generator.generate_pair(req).await?;
    let status = if report.validation.valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(report)))
}
