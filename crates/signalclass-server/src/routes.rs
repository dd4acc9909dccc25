//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use signalclass_core::{Error, PredictRequest, PredictionResult};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, warn};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::map_response(wrap_payload_too_large))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model": state.engine.model_id(),
        "device": state.engine.device_kind(),
        "labels": state.engine.labels().as_slice(),
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Classify a single text
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    metrics::counter!("signalclass_requests_total").increment(1);

    let Json(req) = payload.map_err(AppError::from)?;
    debug!("Received predict request ({} bytes)", req.text.len());

    let start = Instant::now();
    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || engine.predict(&req.text))
        .await
        .map_err(|e| AppError::Internal(format!("prediction task failed: {e}")))?
        .map_err(AppError::Engine)?;

    let elapsed_us = start.elapsed().as_micros() as f64;
    metrics::histogram!("signalclass_predict_latency_us").record(elapsed_us);
    metrics::counter!("signalclass_predictions_total", "label" => result.label.clone())
        .increment(1);

    debug!(
        "Predicted {} ({:.4}) in {:.0}us",
        result.label, result.confidence, elapsed_us
    );

    Ok(Json(result))
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// The body limit layer answers oversized requests in plain text
async fn wrap_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        AppError::PayloadTooLarge.into_response()
    } else {
        response
    }
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    /// The body was not a valid `{"text": ...}` request
    InvalidRequest(StatusCode, String),
    Engine(Error),
    PayloadTooLarge,
    NotFound,
    Internal(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(..) => "invalid_request_error",
            AppError::Engine(err) => err.kind(),
            AppError::PayloadTooLarge => "payload_too_large",
            AppError::NotFound => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        metrics::counter!("signalclass_errors_total", "kind" => kind).increment(1);

        let (status, message) = match self {
            AppError::InvalidRequest(status, msg) => {
                warn!("Rejected request: {}", msg);
                (status, msg)
            }
            AppError::Engine(err) if err.is_client_error() => {
                warn!("Rejected input: {}", err);
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            // Details stay in the log; candle errors can carry backtraces.
            AppError::Engine(err) => {
                error!("Prediction failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction failed".to_string(),
                )
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
