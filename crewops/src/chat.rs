//! Chat types and the provider seam.
//!
//! This module provides:
//! - [`Message`] / [`Role`]: conversation messages
//! - [`ChatRequest`] / [`ChatResponse`]: completion request and response
//! - [`ChatProvider`]: the trait every model endpoint implements
//! - [`TokenUsage`]: input/output token accounting
//!
//! # Example
//!
//! ```rust,ignore
//! let request = ChatRequest::new("llama-3.1-8b-instant")
//!     .system("You are a research assistant.")
//!     .user("Summarize recent market trends.")
//!     .temperature(0.7);
//!
//! let response = provider.chat(&request).await?;
//! println!("{}", response.content);
//! ```

use std::ops::Add;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tool::ToolDefinition;

/// The role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// A tool invocation result.
    Tool,
}

/// A tool invocation requested by the model, OpenAI function-calling shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool result message.
    pub id: String,
    /// The function to invoke.
    pub function: FunctionCall,
}

/// The function half of a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name, matching a [`ToolDefinition`] sent with the request.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// A single conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Text content.
    pub content: String,
    /// Tool invocations carried by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// The call this message answers, for [`Role::Tool`] messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message carrying tool invocations.
    #[must_use]
    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Create a tool result message answering the given call.
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A chat completion request.
///
/// Aligned with the OpenAI-compatible wire shape so one provider
/// implementation covers hosted and local endpoints alike.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "llama-3.1-8b-instant").
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<Message>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the model may invoke, in OpenAI function-calling format.
    #[serde(default, skip_serializing_if = "Vec::is_empty", skip_deserializing)]
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    /// Create a request for the given model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into(), ..Self::default() }
    }

    /// Append a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Append a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Append an arbitrary message.
    #[must_use]
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of generated tokens.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Offer the given tools to the model.
    #[must_use]
    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        self.tools.extend(tools);
        self
    }
}

/// Token accounting for a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub input_tokens: u64,
    /// Tokens generated by the model.
    #[serde(default)]
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Create a usage record.
    #[must_use]
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self { input_tokens, output_tokens }
    }

    /// Total tokens, input plus output.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input_tokens: self.input_tokens + rhs.input_tokens,
            output_tokens: self.output_tokens + rhs.output_tokens,
        }
    }
}

/// A chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text.
    pub content: String,
    /// Tool invocations the model requested instead of (or alongside) text.
    pub tool_calls: Vec<ToolCall>,
    /// Token accounting, when the provider reports it.
    pub usage: TokenUsage,
    /// Model that actually served the request.
    pub model: Option<String>,
}

impl ChatResponse {
    /// Create a plain text response, for scripted mocks and tests.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
            model: None,
        }
    }

    /// Attach tool calls to the response.
    #[must_use]
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }
}

/// Core trait for model endpoints.
///
/// Object-safe so bindings can hold `Arc<dyn ChatProvider>` and tests can
/// inject a [`MockProvider`](crate::providers::MockProvider).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a chat completion request and receive a complete response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Llm`](crate::Error::Llm) with the provider's failure
    /// category (authentication, rate limit, ...) on any request failure.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Name of this provider, used in error messages and logging.
    fn provider_name(&self) -> &'static str;
}

/// Type alias for an Arc-wrapped [`ChatProvider`].
pub type SharedChatProvider = Arc<dyn ChatProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_orders_messages() {
        let request = ChatRequest::new("m").system("sys").user("hello").temperature(0.2);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn request_with_tools_serializes_function_calling_shape() {
        let request = ChatRequest::new("m").tools([ToolDefinition::new(
            "read_notes",
            "Read all notes",
            serde_json::json!({"type": "object", "properties": {}}),
        )]);
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], "read_notes");

        // Requests without tools omit the field entirely.
        let bare = serde_json::to_value(ChatRequest::new("m")).unwrap();
        assert!(bare.get("tools").is_none());
    }

    #[test]
    fn tool_result_messages_carry_the_call_id() {
        let message = Message::tool("call_1", "Note saved!");
        let wire = serde_json::to_value(&message).unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
        assert!(wire.get("tool_calls").is_none());
    }

    #[test]
    fn usage_adds_componentwise() {
        let total = TokenUsage::new(100, 50) + TokenUsage::new(200, 100);
        assert_eq!(total.input_tokens, 300);
        assert_eq!(total.output_tokens, 150);
        assert_eq!(total.total(), 450);
    }
}
