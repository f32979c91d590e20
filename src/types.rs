use serde::{Deserialize, Serialize};

/// Validated inbound request. Only ever built by [`crate::classify::validate`].
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub text: String,
}

/// The four extraction targets. Absent values serialize as `null`, never skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub zip: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub time_pref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Provider-neutral description of one schema-constrained completion.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub schema_name: &'static str,
    pub schema: serde_json::Value,
}
