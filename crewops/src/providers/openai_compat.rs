//! OpenAI-compatible chat completions provider.
//!
//! Posts to `{base_url}/chat/completions` with an optional bearer credential.
//! Covers hosted services (Groq, OpenAI) and local servers (Ollama exposes
//! the same endpoint shape) through a configurable base address.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, TokenUsage, ToolCall};
use crate::error::{LlmError, Result};

/// HTTP provider for the OpenAI-compatible wire format.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    name: &'static str,
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Wire shape of a chat completions response.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiCompatProvider {
    /// Create a provider for the given endpoint.
    ///
    /// `name` is the provider family name used in logs and errors; the
    /// credential is optional for local servers.
    #[must_use]
    pub fn new(name: &'static str, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            name,
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                LlmError::invalid_request(format!(
                    "API key for '{}' contains characters that are not valid in a header; \
                     check the env file for stray quotes",
                    self.name
                ))
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn parse_response(&self, wire: WireResponse) -> Result<ChatResponse> {
        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices"))?;

        let usage = wire
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice.message.tool_calls,
            usage,
            model: wire.model,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();
        debug!(provider = self.name, model = %request.model, "sending chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::network(self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(self.name, status.as_u16(), &body).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(self.name, e.to_string()))?;
        let wire: WireResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::response_format("a chat completions body", format!("parse error: {e}"))
        })?;

        self.parse_response(wire)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmErrorKind;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::new("groq", "https://api.groq.com/openai/v1/", None)
    }

    #[test]
    fn chat_url_strips_trailing_slash() {
        assert_eq!(
            provider().chat_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn malformed_key_fails_header_construction() {
        let p = OpenAiCompatProvider::new("groq", "http://x", Some("\"gsk\nbad\"".into()));
        let err = p.headers().unwrap_err();
        assert!(err.to_string().contains("stray quotes"));
    }

    #[test]
    fn response_parsing_extracts_text_and_usage() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "model": "llama-3.1-8b-instant",
                "choices": [{"message": {"role": "assistant", "content": "hello"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3}
            }"#,
        )
        .unwrap();
        let response = provider().parse_response(wire).unwrap();
        assert_eq!(response.content, "hello");
        assert_eq!(response.usage.total(), 15);
        assert_eq!(response.model.as_deref(), Some("llama-3.1-8b-instant"));
    }

    #[test]
    fn tool_calls_are_parsed_from_the_wire() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": null,
                    "tool_calls": [{"id": "call_1", "type": "function",
                        "function": {"name": "add_note", "arguments": "{\"message\":\"hi\"}"}}]}}]
            }"#,
        )
        .unwrap();
        let response = provider().parse_response(wire).unwrap();
        assert!(response.content.is_empty());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].function.name, "add_note");
    }

    #[tokio::test]
    async fn connection_failure_is_a_retryable_network_error() {
        // Port 9 (discard) is not listening; the connect attempt is refused
        // locally without touching the network.
        let p = OpenAiCompatProvider::new("groq", "http://127.0.0.1:9", None);
        let err = p.chat(&ChatRequest::new("m")).await.unwrap_err();
        match err {
            crate::Error::Llm(llm) => {
                assert_eq!(llm.kind, LlmErrorKind::Network);
                assert!(llm.is_retryable());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_choices_is_a_format_error() {
        let wire: WireResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = provider().parse_response(wire).unwrap_err();
        match err {
            crate::Error::Llm(llm) => assert_eq!(llm.kind, LlmErrorKind::ResponseFormat),
            other => panic!("unexpected error: {other}"),
        }
    }
}
