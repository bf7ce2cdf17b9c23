//! Crewops - traced, explicitly-bound crew orchestration for LLM agents.
//!
//! This crate turns the usual multi-agent wiring checklist into enforced
//! structure: configuration is loaded once with quote-safe parsing, the trace
//! session is started before any agent or crew exists, every agent and the
//! crew manager carries an explicit model binding (no silent default-provider
//! fallback), and the session is ended exactly once on success and failure
//! paths alike.

pub mod binding;
pub mod callback;
pub mod chat;
pub mod config;
pub mod crew;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod providers;
pub mod tool;
pub mod trace;

pub use error::{ConfigError, Error, LlmError, Result, TraceError};
