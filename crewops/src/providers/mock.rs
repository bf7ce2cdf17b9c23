//! Mock provider for testing.
//!
//! Returns predefined responses in sequence, cycling through them, so crews
//! can be exercised without network access or credentials.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, TokenUsage};
use crate::error::{LlmError, Result};

/// A canned-response provider.
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockProvider::new(vec!["first".into(), "second".into()]);
/// // First call returns "first", second "second", third "first" again...
/// ```
#[derive(Debug, Default)]
pub struct MockProvider {
    responses: Vec<String>,
    scripted: Vec<ChatResponse>,
    next: AtomicUsize,
    fail_attempts: usize,
}

impl MockProvider {
    /// Create a mock that cycles through the given responses.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            scripted: Vec::new(),
            next: AtomicUsize::new(0),
            fail_attempts: 0,
        }
    }

    /// Create a mock that plays back full responses in order, repeating the
    /// last one when the script runs out.
    ///
    /// Unlike [`MockProvider::new`] this carries tool calls, so it can drive
    /// the executor's tool loop.
    #[must_use]
    pub fn scripted(scripted: Vec<ChatResponse>) -> Self {
        Self {
            responses: Vec::new(),
            scripted,
            next: AtomicUsize::new(0),
            fail_attempts: 0,
        }
    }

    /// Fail the first `n` calls with a rate-limit error before succeeding.
    ///
    /// Lets tests exercise the executor's retry/backoff path.
    #[must_use]
    pub const fn fail_first(mut self, n: usize) -> Self {
        self.fail_attempts = n;
        self
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        if index < self.fail_attempts {
            return Err(LlmError::rate_limited("mock", "simulated rate limit").into());
        }
        let index = index - self.fail_attempts;
        if !self.scripted.is_empty() {
            let mut response = self.scripted[index.min(self.scripted.len() - 1)].clone();
            response.usage = TokenUsage::new(10, 5);
            return Ok(response);
        }
        let content = self
            .responses
            .get(index % self.responses.len().max(1))
            .cloned()
            .unwrap_or_default();
        Ok(ChatResponse {
            content,
            tool_calls: Vec::new(),
            usage: TokenUsage::new(10, 5),
            model: Some("mock-model".to_string()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_cycle() {
        let mock = MockProvider::new(vec!["first".into(), "second".into()]);
        let request = ChatRequest::new("mock-model");

        assert_eq!(mock.chat(&request).await.unwrap().content, "first");
        assert_eq!(mock.chat(&request).await.unwrap().content, "second");
        assert_eq!(mock.chat(&request).await.unwrap().content, "first");
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn scripted_responses_play_in_order_then_repeat() {
        use crate::chat::{FunctionCall, ToolCall};

        let calls = vec![ToolCall {
            id: "call_1".into(),
            function: FunctionCall { name: "read_notes".into(), arguments: "{}".into() },
        }];
        let mock = MockProvider::scripted(vec![
            ChatResponse::text("").with_tool_calls(calls),
            ChatResponse::text("done"),
        ]);
        let request = ChatRequest::new("mock-model");

        let first = mock.chat(&request).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);

        let second = mock.chat(&request).await.unwrap();
        assert!(second.tool_calls.is_empty());
        assert_eq!(second.content, "done");

        // Script exhausted: the last entry repeats.
        assert_eq!(mock.chat(&request).await.unwrap().content, "done");
    }

    #[tokio::test]
    async fn fail_first_errors_then_recovers() {
        let mock = MockProvider::new(vec!["ok".into()]).fail_first(2);
        let request = ChatRequest::new("mock-model");

        assert!(mock.chat(&request).await.is_err());
        assert!(mock.chat(&request).await.is_err());
        assert_eq!(mock.chat(&request).await.unwrap().content, "ok");
    }
}
