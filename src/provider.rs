use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::StructuredRequest;

/// Single point of outbound dependency. Implementations make one
/// schema-constrained completion per call and never retry.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<serde_json::Value, ProviderError>;
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies with the same scripted outcome on every call and counts calls.
    pub struct MockProvider {
        reply: Result<serde_json::Value, ProviderError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<StructuredRequest>>,
    }

    impl MockProvider {
        pub fn returning(value: serde_json::Value) -> Self {
            Self::new(Ok(value))
        }

        pub fn failing(err: ProviderError) -> Self {
            Self::new(Err(err))
        }

        fn new(reply: Result<serde_json::Value, ProviderError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<StructuredRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn complete_structured(
            &self,
            request: &StructuredRequest,
        ) -> Result<serde_json::Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply.clone()
        }
    }
}
