//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crewops::prelude::*;
//! ```

pub use crate::binding::{ModelBinding, ModelBindingBuilder, ProviderKind, SharedModelBinding};
pub use crate::callback::{CrewHooks, LogLevel, LoggingHooks, NoopHooks, SharedCrewHooks};
pub use crate::chat::{
    ChatProvider, ChatRequest, ChatResponse, FunctionCall, Message, Role, SharedChatProvider,
    TokenUsage, ToolCall,
};
pub use crate::config::{ConfigIssue, EnvFile, IssueLevel, Settings, diagnose_key, redact};
pub use crate::crew::{
    Agent, Crew, CrewBuilder, CrewIssue, CrewOutput, Process, RetryPolicy, Task, TaskOutput,
};
pub use crate::error::{ConfigError, Error, LlmError, LlmErrorKind, Result, TraceError};
pub use crate::pipeline;
pub use crate::providers::{MockProvider, OpenAiCompatProvider};
pub use crate::tool::{
    AddNote, FetchWeather, ReadNotes, SearchNews, SharedTool, Tool, ToolDefinition,
};
pub use crate::trace::{EndState, SessionState, TraceClient, TraceEvent, TraceSession};
