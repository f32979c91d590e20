use serde_json::Value;

use crate::error::{EMPTY_TEXT, MISSING_TEXT, ServiceError};
use crate::prompt::{PROMPT_VERSION, build_request};
use crate::provider::LlmProvider;
use crate::schema::parse_result;
use crate::types::{ClassificationRequest, ClassificationResult};

/// Validates an inbound body. `None` stands for a body that was absent or not
/// parseable as JSON.
pub fn validate(payload: Option<&Value>) -> Result<ClassificationRequest, ServiceError> {
    let text = payload
        .and_then(|body| body.get("text"))
        .and_then(Value::as_str)
        .ok_or(ServiceError::InvalidInput(MISSING_TEXT))?;

    if text.trim().is_empty() {
        return Err(ServiceError::InvalidInput(EMPTY_TEXT));
    }

    Ok(ClassificationRequest {
        text: text.to_string(),
    })
}

/// Runs one extraction: exactly one provider call, then schema enforcement.
pub async fn classify(
    provider: &dyn LlmProvider,
    request: &ClassificationRequest,
) -> Result<ClassificationResult, ServiceError> {
    let structured = build_request(&request.text);
    tracing::debug!(prompt_version = PROMPT_VERSION, "Calling LLM provider");

    let value = provider.complete_structured(&structured).await?;

    parse_result(value).map_err(ServiceError::SchemaValidationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::test_support::MockProvider;
    use serde_json::json;

    #[test]
    fn missing_or_non_string_text_is_rejected() {
        let cases = [
            None,
            Some(json!({})),
            Some(json!({ "text": null })),
            Some(json!({ "text": 42 })),
            Some(json!({ "text": ["a"] })),
            Some(json!({ "text": { "value": "a" } })),
            Some(json!("just a string")),
            Some(json!({ "body": "Order pizza" })),
        ];

        for payload in cases {
            assert_eq!(
                validate(payload.as_ref()).unwrap_err(),
                ServiceError::InvalidInput(MISSING_TEXT),
                "payload: {payload:?}"
            );
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        for text in ["", " ", "\t\n  \r"] {
            let payload = json!({ "text": text });
            assert_eq!(
                validate(Some(&payload)).unwrap_err(),
                ServiceError::InvalidInput(EMPTY_TEXT)
            );
        }
    }

    #[test]
    fn text_is_kept_untrimmed() {
        let payload = json!({ "text": "  Hello there " });
        assert_eq!(validate(Some(&payload)).unwrap().text, "  Hello there ");
    }

    #[tokio::test]
    async fn makes_one_provider_call() {
        let provider = MockProvider::returning(json!({
            "zip": null, "brand": "Nike", "category": "clothing", "time_pref": null
        }));
        let request = ClassificationRequest {
            text: "New Nike shoes".to_string(),
        };

        let result = classify(&provider, &request).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(result.brand.as_deref(), Some("Nike"));
        assert_eq!(result.category.as_deref(), Some("clothing"));
        let sent = provider.last_request().unwrap();
        assert_eq!(sent.user, "New Nike shoes");
        assert_eq!(sent.temperature, 0.3);
    }

    #[tokio::test]
    async fn nonconforming_provider_output_is_schema_failure() {
        let provider = MockProvider::returning(json!({ "zip": "90210" }));
        let request = ClassificationRequest {
            text: "90210".to_string(),
        };

        let err = classify(&provider, &request).await.unwrap_err();
        assert!(matches!(err, ServiceError::SchemaValidationFailure(_)));
    }

    #[tokio::test]
    async fn provider_errors_are_translated() {
        let provider = MockProvider::failing(ProviderError::RateLimited);
        let request = ClassificationRequest {
            text: "anything".to_string(),
        };

        let err = classify(&provider, &request).await.unwrap_err();
        assert_eq!(err, ServiceError::RateLimited);
        assert_eq!(provider.calls(), 1);
    }
}
