use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ProviderError;
use crate::provider::LlmProvider;
use crate::types::StructuredRequest;

/// OpenAI chat-completions client using strict `json_schema` structured output.
///
/// Intentionally not `Debug`: it holds the API key.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

impl ErrorDetail {
    fn is_quota(&self) -> bool {
        [self.code.as_deref(), self.kind.as_deref()]
            .into_iter()
            .flatten()
            .any(|tag| tag == "insufficient_quota" || tag.starts_with("billing"))
    }
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

/// Folds an OpenAI error status and body into a [`ProviderError`].
fn classify_failure(status: u16, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error);
    let is_quota = detail.as_ref().is_some_and(ErrorDetail::is_quota);

    match status {
        401 => ProviderError::Authentication,
        402 => ProviderError::QuotaExceeded,
        429 if is_quota => ProviderError::QuotaExceeded,
        429 => ProviderError::RateLimited,
        _ => {
            let (code, message) = detail.map(|d| (d.code, d.message)).unwrap_or_default();
            let message = message.unwrap_or_else(|| body.to_string());
            let code = code.map(|c| format!(" ({c})")).unwrap_or_default();
            ProviderError::Unavailable(format!("status {status}{code}: {message}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    #[tracing::instrument(skip(self, request), fields(model = %self.model))]
    async fn complete_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<serde_json::Value, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "LLM request failed");
                ProviderError::Unavailable(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            let err = classify_failure(status.as_u16(), &body_text);
            tracing::warn!(status = status.as_u16(), error = %err, "LLM provider returned an error");
            return Err(err);
        }

        let api_response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("malformed completion: {e}")))?;

        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ProviderError::InvalidResponse("completion had no choices".into()))?;

        if let Some(refusal) = message.refusal {
            return Err(ProviderError::InvalidResponse(format!(
                "model refused: {refusal}"
            )));
        }

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("completion was empty".into()))?;

        tracing::debug!(content_len = content.len(), "LLM completion received");

        serde_json::from_str(&content)
            .map_err(|e| ProviderError::InvalidResponse(format!("content is not JSON: {e}")))
    }
}
