//! Mock LLM provider for testing
//!
//! Returns a canned answer or a canned failure and records what it was asked,
//! so callers can be tested without network access.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

enum Outcome {
    Succeed(String),
    Fail(fn() -> LlmError),
}

/// A mock provider with a fixed outcome
pub struct MockProvider {
    outcome: Outcome,
    call_count: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockProvider {
    /// Create a provider that always answers with `response`
    pub fn always_succeeds(response: &str) -> Self {
        Self::with_outcome(Outcome::Succeed(response.to_string()))
    }

    /// Create a provider that always fails with the error built by `make_error`
    pub fn always_fails(make_error: fn() -> LlmError) -> Self {
        Self::with_outcome(Outcome::Fail(make_error))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            call_count: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let input_tokens = request.prompt.split_whitespace().count() as u32;
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request);

        match &self.outcome {
            Outcome::Succeed(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "mock-model".to_string(),
                usage: Some(TokenUsage {
                    input_tokens,
                    output_tokens: content.split_whitespace().count() as u32,
                }),
            }),
            Outcome::Fail(make_error) => Err(make_error()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds_records_request() {
        let provider = MockProvider::always_succeeds("success");
        assert!(provider.last_request().is_none());

        let result = provider
            .complete(LlmRequest::new("two words").with_json_output())
            .await
            .unwrap();
        assert_eq!(result.content, "success");
        assert_eq!(result.usage.map(|u| u.input_tokens), Some(2));
        assert_eq!(provider.call_count(), 1);

        let recorded = provider.last_request().unwrap();
        assert_eq!(recorded.prompt, "two words");
        assert!(recorded.json_output);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(|| LlmError::RateLimited { retry_after: None });

        for _ in 0..3 {
            let result = provider.complete(LlmRequest::new("test")).await;
            assert!(matches!(result, Err(LlmError::RateLimited { .. })));
        }
        assert_eq!(provider.call_count(), 3);
    }
}
