//! Request handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::payload::{GenerateBody, GenerateResponse};
use super::AppState;

/// `POST /api/generate`: run one generation to completion
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> (StatusCode, Json<GenerateResponse>) {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected malformed generate request: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(GenerateResponse::failure(rejection.body_text())),
            );
        }
    };

    let request = match body.into_request() {
        Ok(request) => request,
        Err(message) => {
            warn!("Rejected invalid generate request: {}", message);
            return (
                StatusCode::BAD_REQUEST,
                Json(GenerateResponse::failure(message)),
            );
        }
    };

    info!("Accepted generate request: {:?}", request);
    let response = GenerateResponse::from(state.orchestrator.run(request).await);
    let status = if response.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": datagen_core::VERSION,
    }))
}
