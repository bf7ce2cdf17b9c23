//! Agent configuration.

use std::fmt;

use crate::binding::SharedModelBinding;
use crate::tool::{SharedTool, ToolDefinition};

/// A pure configuration struct defining an agent.
///
/// `Agent` contains no execution logic; it describes who the agent is and
/// which model binding it speaks through. The executor handles the rest.
///
/// The binding is optional at construction time so crews can be assembled
/// declaratively, but [`CrewBuilder::build`](super::CrewBuilder::build)
/// rejects any agent still unbound; there is no default-provider fallback.
pub struct Agent {
    pub(crate) role: String,
    pub(crate) goal: String,
    pub(crate) backstory: String,
    pub(crate) binding: Option<SharedModelBinding>,
    pub(crate) tools: Vec<SharedTool>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("backstory", &self.backstory)
            .field("bound", &self.binding.is_some())
            .field("tools", &self.tools.iter().map(|t| t.definition().name).collect::<Vec<_>>())
            .finish()
    }
}

impl Agent {
    /// Create a new agent with the given role.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: String::new(),
            backstory: String::new(),
            binding: None,
            tools: Vec::new(),
        }
    }

    /// Set the agent's goal. Supports `{key}` placeholders filled in from
    /// kickoff inputs.
    #[must_use]
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Set the agent's backstory.
    #[must_use]
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Assign the model binding this agent speaks through.
    ///
    /// Pass the same shared handle to every agent (and the manager) unless a
    /// heterogeneous crew is genuinely intended.
    #[must_use]
    pub fn binding(mut self, binding: SharedModelBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Give the agent a callable tool.
    ///
    /// The tool's definition is offered with every request this agent makes;
    /// the executor runs requested calls and feeds results back to the model.
    #[must_use]
    pub fn tool(mut self, tool: SharedTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Returns the agent's role.
    #[must_use]
    pub fn get_role(&self) -> &str {
        &self.role
    }

    /// Returns `true` if a model binding is assigned.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Look up one of this agent's tools by definition name.
    pub(crate) fn tool_named(&self, name: &str) -> Option<&SharedTool> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    /// Definitions of every tool this agent carries.
    pub(crate) fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Render the system prompt for this agent, with inputs interpolated.
    pub(crate) fn system_prompt(&self, interpolate: impl Fn(&str) -> String) -> String {
        let mut prompt = format!("You are {}.", self.role);
        if !self.backstory.is_empty() {
            prompt.push(' ');
            prompt.push_str(&interpolate(&self.backstory));
        }
        if !self.goal.is_empty() {
            prompt.push_str("\nYour personal goal is: ");
            prompt.push_str(&interpolate(&self.goal));
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_includes_role_goal_backstory() {
        let agent = Agent::new("Data Analyst")
            .goal("Analyze data trends in the market")
            .backstory("An experienced data analyst with a background in economics.");

        let prompt = agent.system_prompt(str::to_string);
        assert!(prompt.starts_with("You are Data Analyst."));
        assert!(prompt.contains("background in economics"));
        assert!(prompt.contains("Your personal goal is: Analyze data trends"));
    }

    #[test]
    fn new_agent_is_unbound() {
        let agent = Agent::new("Market Researcher");
        assert!(!agent.is_bound());
        assert_eq!(agent.get_role(), "Market Researcher");
    }
}
