//! Concrete [`ChatProvider`](crate::chat::ChatProvider) implementations.
//!
//! Every supported endpoint family speaks the OpenAI-compatible chat
//! completions format, so a single HTTP provider covers Groq, OpenAI, and a
//! local Ollama server. [`MockProvider`] exists for tests.

mod mock;
mod openai_compat;

pub use mock::MockProvider;
pub use openai_compat::OpenAiCompatProvider;
