//! Crew lifecycle hooks.
//!
//! An object-safe observation seam for crew execution. Every method has a
//! default no-op implementation, so listeners override only the events they
//! care about.
//!
//! # Lifecycle Events
//!
//! 1. **`on_crew_start`**: the crew begins executing
//! 2. **Task loop** (once per task, in order):
//!    `on_task_start`, the provider call(s), then `on_task_end`
//! 3. **`on_crew_end`**: final output produced, or **`on_error`** on failure

use async_trait::async_trait;

use crate::chat::TokenUsage;
use crate::crew::TaskOutput;
use crate::error::Error;

/// A shared, thread-safe [`CrewHooks`] trait object.
pub type SharedCrewHooks = std::sync::Arc<dyn CrewHooks>;

/// Lifecycle hooks observing a crew run.
#[async_trait]
pub trait CrewHooks: Send + Sync {
    /// Called before the first task starts.
    async fn on_crew_start(&self, _crew_name: &str, _tasks: usize) {}

    /// Called before a task's provider call.
    async fn on_task_start(&self, _task_name: &str, _agent_role: &str) {}

    /// Called after a task completes.
    async fn on_task_end(&self, _output: &TaskOutput) {}

    /// Called after the final task completes.
    async fn on_crew_end(&self, _crew_name: &str, _usage: TokenUsage) {}

    /// Called when an error stops the run.
    async fn on_error(&self, _crew_name: &str, _error: &Error) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl CrewHooks for NoopHooks {}

/// Log verbosity level for hook events.
///
/// Maps directly to `tracing` levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug-level logging.
    Debug,
    /// Info-level logging (default).
    #[default]
    Info,
}

/// Emit a log event at the specified level using `tracing` macros.
macro_rules! log_at_level {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            LogLevel::Debug => tracing::debug!($($arg)*),
            LogLevel::Info => tracing::info!($($arg)*),
        }
    };
}

/// A [`CrewHooks`] implementation that logs lifecycle events via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHooks {
    level: LogLevel,
}

impl LoggingHooks {
    /// Create logging hooks at the default level (INFO).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create logging hooks at a custom level.
    #[must_use]
    pub const fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

#[async_trait]
impl CrewHooks for LoggingHooks {
    async fn on_crew_start(&self, crew_name: &str, tasks: usize) {
        log_at_level!(self.level, crew = crew_name, tasks, "crew started");
    }

    async fn on_task_start(&self, task_name: &str, agent_role: &str) {
        log_at_level!(self.level, task = task_name, agent = agent_role, "task started");
    }

    async fn on_task_end(&self, output: &TaskOutput) {
        log_at_level!(
            self.level,
            task = %output.name,
            agent = %output.agent_role,
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            attempts = output.attempts,
            "task completed"
        );
    }

    async fn on_crew_end(&self, crew_name: &str, usage: TokenUsage) {
        log_at_level!(
            self.level,
            crew = crew_name,
            total_tokens = usage.total(),
            "crew completed"
        );
    }

    async fn on_error(&self, crew_name: &str, error: &Error) {
        tracing::error!(crew = crew_name, "crew run failed: {error}");
    }
}
