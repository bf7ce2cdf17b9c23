//! Task configuration.

/// A unit of work assigned to one agent.
///
/// Descriptions and expected outputs support `{key}` placeholders filled in
/// from kickoff inputs.
#[derive(Debug, Clone)]
pub struct Task {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) expected_output: String,
    pub(crate) agent_role: String,
}

impl Task {
    /// Create a task with a name and description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: String::new(),
            agent_role: String::new(),
        }
    }

    /// Describe what a good result looks like; included in the prompt.
    #[must_use]
    pub fn expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    /// Assign the task to an agent by role.
    ///
    /// The role must match an agent added to the crew, or assembly fails.
    #[must_use]
    pub fn agent(mut self, role: impl Into<String>) -> Self {
        self.agent_role = role.into();
        self
    }

    /// Returns the task name.
    #[must_use]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Render the user prompt for this task, with inputs interpolated and
    /// prior task output appended as context.
    pub(crate) fn user_prompt(
        &self,
        context: &str,
        interpolate: impl Fn(&str) -> String,
    ) -> String {
        let mut prompt = interpolate(&self.description);
        if !self.expected_output.is_empty() {
            prompt.push_str("\n\nExpected output: ");
            prompt.push_str(&interpolate(&self.expected_output));
        }
        if !context.is_empty() {
            prompt.push_str("\n\nContext from previous tasks:\n");
            prompt.push_str(context);
        }
        prompt
    }
}
