//! Agent-callable tools.
//!
//! A [`Tool`] is a capability the model can invoke during a task: the tool's
//! [`ToolDefinition`] travels with the chat request in OpenAI function-calling
//! format, the model answers with tool calls, and the executor feeds each
//! result back as a [`Role::Tool`](crate::chat::Role::Tool) message before
//! asking again.
//!
//! The trait is object-safe, like [`ChatProvider`](crate::chat::ChatProvider):
//! agents hold `Arc<dyn Tool>` handles. Built-in tools live in [`builtin`].

mod builtin;

pub use builtin::{AddNote, FetchWeather, ReadNotes, SearchNews};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::error::Result;

/// Type alias for an Arc-wrapped [`Tool`].
pub type SharedTool = Arc<dyn Tool>;

/// Definition of a tool, serialized in OpenAI function-calling format:
///
/// ```json
/// {"type": "function", "function": {"name": ..., "description": ..., "parameters": ...}}
/// ```
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Tool name, snake_case, unique within a request.
    pub name: String,
    /// What the tool does; the model uses this to decide when to call it.
    pub description: String,
    /// JSON schema for the arguments object.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self { name: name.into(), description: description.into(), parameters }
    }
}

#[derive(Serialize)]
struct FunctionBody<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

impl Serialize for ToolDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "function")?;
        map.serialize_entry(
            "function",
            &FunctionBody {
                name: &self.name,
                description: &self.description,
                parameters: &self.parameters,
            },
        )?;
        map.end()
    }
}

/// A capability the model may invoke during a task.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The definition sent to the model.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the model's JSON arguments.
    ///
    /// The return value is fed back to the model verbatim, so tools should
    /// answer in plain text (or compact JSON).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`](crate::Error::Tool) when the arguments are
    /// malformed or the underlying operation fails.
    async fn invoke(&self, args: Value) -> Result<String>;
}
