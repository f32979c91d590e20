use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::ErrorBody;

pub const MISSING_TEXT: &str = "Field \"text\" is required and must be a string";
pub const EMPTY_TEXT: &str = "Text cannot be empty";

/// Failures reported by an [`crate::provider::LlmProvider`]. Vendor-specific
/// error shapes are folded into these kinds by the client implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider rejected the API credentials")]
    Authentication,

    #[error("provider rate limit reached")]
    RateLimited,

    #[error("provider quota or billing limit exhausted")]
    QuotaExceeded,

    #[error("provider returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("provider request failed: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("request body exceeds the size limit")]
    PayloadTooLarge,

    #[error("authentication with the LLM provider failed")]
    AuthenticationFailure,

    #[error("LLM provider rate limit exceeded")]
    RateLimited,

    #[error("LLM provider quota exceeded")]
    QuotaExceeded,

    #[error("response did not match the output schema: {0}")]
    SchemaValidationFailure(String),

    #[error("classification failed: {0}")]
    Internal(String),
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Authentication => ServiceError::AuthenticationFailure,
            ProviderError::RateLimited => ServiceError::RateLimited,
            ProviderError::QuotaExceeded => ServiceError::QuotaExceeded,
            ProviderError::InvalidResponse(detail) => ServiceError::SchemaValidationFailure(detail),
            ProviderError::Unavailable(detail) => ServiceError::Internal(detail),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            ServiceError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            ServiceError::SchemaValidationFailure(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label used for logs and the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::PayloadTooLarge => "payload_too_large",
            ServiceError::AuthenticationFailure => "authentication",
            ServiceError::RateLimited => "rate_limited",
            ServiceError::QuotaExceeded => "quota_exceeded",
            ServiceError::SchemaValidationFailure(_) => "schema_validation",
            ServiceError::Internal(_) => "internal",
        }
    }

    /// Client-facing summary. Safe to return in every environment.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(message) => *message,
            ServiceError::PayloadTooLarge => "Request body too large",
            ServiceError::AuthenticationFailure => "Invalid API key",
            ServiceError::RateLimited => "Rate limit exceeded",
            ServiceError::QuotaExceeded => "API quota exceeded",
            ServiceError::SchemaValidationFailure(_) => {
                "Invalid response from classification model"
            }
            ServiceError::Internal(_) => "Failed to classify text",
        }
    }
}

/// A [`ServiceError`] on its way out of a handler, together with whether the
/// diagnostic detail may be shown to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub expose_details: bool,
}

impl ApiError {
    pub fn new(error: ServiceError, expose_details: bool) -> Self {
        Self {
            error,
            expose_details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self.error {
            ServiceError::InvalidInput(_) | ServiceError::PayloadTooLarge => None,
            other if self.expose_details => Some(other.to_string()),
            _ => None,
        };

        let body = ErrorBody {
            error: self.error.public_message().to_string(),
            message,
        };

        (self.error.status(), Json(body)).into_response()
    }
}
