//! Crew execution results.

use serde::Serialize;

use crate::chat::TokenUsage;

/// The result of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    /// Task name.
    pub name: String,
    /// Role of the agent that executed it.
    pub agent_role: String,
    /// Raw model output.
    pub raw: String,
    /// Token usage for this task (summed across retries).
    pub usage: TokenUsage,
    /// Attempts needed (1 means the first call succeeded).
    pub attempts: u32,
}

/// The result of a full crew run.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    /// Final output: the manager consolidation when one ran, otherwise the
    /// last task's raw output.
    pub raw: String,
    /// Per-task outputs, in execution order.
    pub task_outputs: Vec<TaskOutput>,
    /// Cumulative token usage across all tasks.
    pub usage: TokenUsage,
}

impl CrewOutput {
    /// Output of a task by name, if it ran.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&TaskOutput> {
        self.task_outputs.iter().find(|t| t.name == name)
    }
}
