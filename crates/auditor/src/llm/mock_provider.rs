//! Canned AI provider for exercising the pipeline without the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::AuditError;
use crate::llm::provider::AiProvider;
use crate::llm::request::AuditRequest;

pub struct MockAiProvider {
    response: String,
    call_count: AtomicUsize,
    should_fail: bool,
    last_request: Mutex<Option<AuditRequest>>,
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    /// Answers every request with a fully valid audit result.
    pub fn new() -> Self {
        Self {
            response: Self::sample_result_json(),
            call_count: AtomicUsize::new(0),
            should_fail: false,
            last_request: Mutex::new(None),
        }
    }

    /// Fails every request at the transport level.
    pub fn failing() -> Self {
        let mut provider = Self::new();
        provider.should_fail = true;
        provider
    }

    /// Answers every request with the given raw text instead.
    pub fn with_response(mut self, raw: impl Into<String>) -> Self {
        self.response = raw.into();
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request received, for part-order assertions.
    pub fn last_request(&self) -> Option<AuditRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn sample_result_json() -> String {
        json!({
            "score": 85,
            "recommendation": "Safe to proceed after addressing the medium finding.",
            "summary": "One medium severity issue; tokenomics are sound.",
            "vulnerabilities": [{
                "name": "Unchecked return value",
                "severity": "Medium",
                "description": "transfer() return value is ignored in claim()."
            }],
            "tokenomics": {
                "analysis": "Fixed supply, no privileged mint path.",
                "passedAuditStandards": true
            },
            "exchangeRedFlags": []
        })
        .to_string()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, request: &AuditRequest) -> Result<String, AuditError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if self.should_fail {
            return Err(AuditError::Upstream(
                "Mock provider configured to fail".to_string(),
            ));
        }

        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::request::build_audit_request;
    use crate::schemas::parse_analysis;

    #[tokio::test]
    async fn test_mock_answers_with_valid_result() {
        let provider = MockAiProvider::new();
        let request = build_audit_request("contract A{}", None, 0.1);

        let raw = provider.generate(&request).await.unwrap();
        let result = parse_analysis(&raw).unwrap();
        assert_eq!(result.score, 85.0);
    }

    #[tokio::test]
    async fn test_mock_counts_calls_and_records_request() {
        let provider = MockAiProvider::new();
        assert_eq!(provider.call_count(), 0);

        let request = build_audit_request("contract A{}", None, 0.1);
        provider.generate(&request).await.unwrap();
        provider.generate(&request).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_request().unwrap().parts, request.parts);
    }

    #[tokio::test]
    async fn test_failing_mock_fails_upstream() {
        let provider = MockAiProvider::failing();
        let request = build_audit_request("contract A{}", None, 0.1);

        let result = provider.generate(&request).await;
        assert!(matches!(result, Err(AuditError::Upstream(_))));
        assert_eq!(provider.call_count(), 1);
    }
}
