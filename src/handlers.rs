use axum::{
    Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use metrics::counter;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::classify::{classify, validate};
use crate::error::{ApiError, ServiceError};
use crate::provider::LlmProvider;
use crate::types::{ClassificationResult, HealthResponse};

#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn LlmProvider>,
    expose_error_details: bool,
}

impl AppState {
    pub fn new(provider: Arc<dyn LlmProvider>, expose_error_details: bool) -> Self {
        Self {
            provider,
            expose_error_details,
        }
    }
}

/// Served by the binary once the Prometheus recorder is installed.
pub const METRICS_PATH: &str = "/metrics";

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

struct Endpoint {
    method: &'static str,
    path: &'static str,
    description: &'static str,
    request: Option<&'static str>,
    response: &'static str,
}

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "POST",
        path: "/classify",
        description: "Extract zip, brand, category and time preference from free text",
        request: Some(r#"{ "text": string }"#),
        response: r#"{ "zip": string|null, "brand": string|null, "category": string|null, "time_pref": string|null }"#,
    },
    Endpoint {
        method: "GET",
        path: "/health",
        description: "Liveness check",
        request: None,
        response: r#"{ "status": "ok", "timestamp": string }"#,
    },
    Endpoint {
        method: "GET",
        path: "/",
        description: "This documentation",
        request: None,
        response: "object",
    },
    Endpoint {
        method: "GET",
        path: METRICS_PATH,
        description: "Prometheus metrics",
        request: None,
        response: "text/plain exposition format",
    },
];

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(docs_handler))
        .route("/health", get(health_handler))
        .route("/classify", post(classify_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[tracing::instrument(
    skip(state, payload),
    fields(request_id = %uuid::Uuid::new_v4().simple())
)]
async fn classify_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ClassificationResult>, ApiError> {
    counter!("classification_requests_total").increment(1);

    let validated = match &payload {
        Ok(Json(value)) => validate(Some(value)),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ServiceError::PayloadTooLarge)
        }
        Err(rejection) => {
            tracing::debug!(rejection = %rejection, "Request body is not usable JSON");
            validate(None)
        }
    };

    let outcome = match validated {
        Ok(request) => {
            tracing::info!(text_len = request.text.len(), "Processing classification request");
            classify(state.provider.as_ref(), &request).await
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(result) => {
            tracing::info!("Classification completed successfully");
            Ok(Json(result))
        }
        Err(err) => {
            counter!("classification_failures_total", "kind" => err.kind()).increment(1);
            if err.status().is_server_error() {
                tracing::error!(kind = err.kind(), error = %err, "Classification failed");
            } else {
                tracing::warn!(kind = err.kind(), error = %err, "Classification rejected");
            }
            Err(ApiError::new(err, state.expose_error_details))
        }
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn docs_handler() -> Json<Value> {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|e| {
            json!({
                "method": e.method,
                "path": e.path,
                "description": e.description,
                "request": e.request,
                "response": e.response,
            })
        })
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
        "errors": { "error": "string", "message": "string (development only)" },
    }))
}
