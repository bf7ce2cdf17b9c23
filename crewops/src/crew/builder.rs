//! Crew assembly and the completeness checklist.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::binding::SharedModelBinding;
use crate::callback::{NoopHooks, SharedCrewHooks};
use crate::config::{ConfigIssue, IssueLevel};
use crate::error::{Error, Result, TraceError};
use crate::trace::TraceSession;

use super::executor::RetryPolicy;
use super::{Agent, Task};

/// How the crew's tasks are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Process {
    /// Tasks run strictly in order; each output feeds the next task's
    /// context. The safer choice under rate limits.
    #[default]
    Sequential,
    /// Tasks still run in order, then the manager binding produces a
    /// consolidated final output from all task results.
    Hierarchical,
}

/// An issue found during crew assembly.
pub type CrewIssue = ConfigIssue;

/// An assembled, validated crew.
///
/// Created through [`Crew::builder`]; a `Crew` that exists has already passed
/// the completeness checklist.
pub struct Crew {
    pub(crate) name: String,
    pub(crate) agents: Vec<Agent>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) process: Process,
    pub(crate) manager_binding: SharedModelBinding,
    pub(crate) hooks: SharedCrewHooks,
    pub(crate) retry: RetryPolicy,
}

impl fmt::Debug for Crew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crew")
            .field("name", &self.name)
            .field("agents", &self.agents.iter().map(|a| &a.role).collect::<Vec<_>>())
            .field("tasks", &self.tasks.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("process", &self.process)
            .finish()
    }
}

impl Crew {
    /// Create a crew builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CrewBuilder {
        CrewBuilder {
            name: name.into(),
            agents: Vec::new(),
            tasks: Vec::new(),
            process: Process::default(),
            manager_binding: None,
            hooks: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Returns the crew name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Builder for [`Crew`].
///
/// [`CrewBuilder::build`] runs the completeness checklist; see the
/// [module docs](super) for the rules.
pub struct CrewBuilder {
    name: String,
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    process: Process,
    manager_binding: Option<SharedModelBinding>,
    hooks: Option<SharedCrewHooks>,
    retry: RetryPolicy,
}

impl fmt::Debug for CrewBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrewBuilder")
            .field("name", &self.name)
            .field("agents", &self.agents.len())
            .field("tasks", &self.tasks.len())
            .field("manager_bound", &self.manager_binding.is_some())
            .finish()
    }
}

impl CrewBuilder {
    /// Add an agent.
    #[must_use]
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add a task.
    #[must_use]
    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Set the execution process.
    #[must_use]
    pub const fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// Assign the manager's model binding.
    ///
    /// Required regardless of process: manager operations must never fall
    /// through to a default provider.
    #[must_use]
    pub fn manager_binding(mut self, binding: SharedModelBinding) -> Self {
        self.manager_binding = Some(binding);
        self
    }

    /// Set lifecycle hooks for the run.
    #[must_use]
    pub fn hooks(mut self, hooks: SharedCrewHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Override the retry policy used for provider calls.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the completeness checklist without building.
    ///
    /// Returns every issue found; error-level issues would fail
    /// [`CrewBuilder::build`].
    #[must_use]
    pub fn check(&self) -> Vec<CrewIssue> {
        let mut issues = Vec::new();

        if self.tasks.is_empty() {
            issues.push(CrewIssue::error("crew has no tasks"));
        }
        if self.agents.is_empty() {
            issues.push(CrewIssue::error("crew has no agents"));
        }

        for agent in &self.agents {
            if !agent.is_bound() {
                issues.push(CrewIssue::error(format!(
                    "agent '{}' has no model binding; call .binding() on it",
                    agent.role
                )));
            }
        }
        if self.manager_binding.is_none() {
            issues.push(CrewIssue::error(
                "crew manager has no model binding; call .manager_binding()",
            ));
        }

        for task in &self.tasks {
            if task.agent_role.is_empty() {
                issues.push(CrewIssue::error(format!(
                    "task '{}' is not assigned to an agent",
                    task.name
                )));
            } else if !self.agents.iter().any(|a| a.role == task.agent_role) {
                issues.push(CrewIssue::error(format!(
                    "task '{}' names unknown agent '{}'",
                    task.name, task.agent_role
                )));
            }
        }

        // One handle shared by reference is the intended pattern; several
        // distinct bindings usually means someone constructed the handle
        // more than once.
        let mut distinct: Vec<&SharedModelBinding> = Vec::new();
        for binding in self
            .agents
            .iter()
            .filter_map(|a| a.binding.as_ref())
            .chain(self.manager_binding.as_ref())
        {
            if !distinct.iter().any(|b| Arc::ptr_eq(b, binding)) {
                distinct.push(binding);
            }
        }
        if distinct.len() > 1 {
            issues.push(CrewIssue::warning(format!(
                "{} distinct model bindings in one crew; construct the binding once and share it \
                 unless a heterogeneous crew is intended",
                distinct.len()
            )));
        }

        issues
    }

    /// Validate and assemble the crew.
    ///
    /// The trace session must already be active: agents and crews created
    /// before the session exist as orphans on the observability backend.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::NotStarted`] when the session is not active, or
    /// [`Error::Assembly`] listing every error-level checklist issue.
    pub fn build(self, session: &TraceSession) -> Result<Crew> {
        if !session.is_active() {
            return Err(TraceError::NotStarted.into());
        }

        let issues = self.check();
        let mut errors = Vec::new();
        for issue in issues {
            match issue.level {
                IssueLevel::Error => errors.push(issue.message),
                IssueLevel::Warning => warn!(crew = %self.name, "{}", issue.message),
            }
        }
        if !errors.is_empty() {
            return Err(Error::assembly(errors));
        }

        let manager_binding = self.manager_binding.expect("manager binding checked above");

        Ok(Crew {
            name: self.name,
            agents: self.agents,
            tasks: self.tasks,
            process: self.process,
            manager_binding,
            hooks: self.hooks.unwrap_or_else(|| Arc::new(NoopHooks)),
            retry: self.retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{ModelBinding, ProviderKind};
    use crate::chat::SharedChatProvider;
    use crate::providers::MockProvider;
    use crate::trace::EndState;

    fn mock_binding() -> SharedModelBinding {
        let provider: SharedChatProvider = Arc::new(MockProvider::new(vec!["done".into()]));
        ModelBinding::builder(ProviderKind::Groq, "mock-model")
            .provider(provider)
            .connect()
            .expect("mock binding")
    }

    fn minimal_builder(binding: &SharedModelBinding) -> CrewBuilder {
        Crew::builder("test-crew")
            .agent(Agent::new("Analyst").goal("analyze").binding(binding.clone()))
            .task(Task::new("t1", "do analysis").agent("Analyst"))
            .manager_binding(binding.clone())
    }

    #[test]
    fn unbound_agent_is_flagged_before_execution() {
        let binding = mock_binding();
        let builder = Crew::builder("c")
            .agent(Agent::new("Analyst"))
            .task(Task::new("t", "d").agent("Analyst"))
            .manager_binding(binding);

        let issues = builder.check();
        assert!(
            issues
                .iter()
                .any(|i| i.level == IssueLevel::Error && i.message.contains("'Analyst'"))
        );
    }

    #[test]
    fn missing_manager_binding_is_an_error() {
        let binding = mock_binding();
        let builder = Crew::builder("c")
            .agent(Agent::new("Analyst").binding(binding))
            .task(Task::new("t", "d").agent("Analyst"));

        let issues = builder.check();
        assert!(issues.iter().any(|i| i.message.contains("manager")));
    }

    #[test]
    fn unknown_task_agent_is_an_error() {
        let binding = mock_binding();
        let builder = minimal_builder(&binding).task(Task::new("t2", "d").agent("Ghost"));
        let issues = builder.check();
        assert!(issues.iter().any(|i| i.message.contains("unknown agent 'Ghost'")));
    }

    #[test]
    fn shared_handle_produces_no_warning() {
        let binding = mock_binding();
        let issues = minimal_builder(&binding).check();
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn distinct_bindings_warn() {
        let a = mock_binding();
        let b = mock_binding();
        let builder = Crew::builder("c")
            .agent(Agent::new("Analyst").binding(a))
            .task(Task::new("t", "d").agent("Analyst"))
            .manager_binding(b);

        let issues = builder.check();
        assert!(
            issues
                .iter()
                .any(|i| i.level == IssueLevel::Warning && i.message.contains("distinct"))
        );
    }

    #[tokio::test]
    async fn build_requires_an_active_session() {
        let binding = mock_binding();
        let session = TraceSession::disabled();
        session.end(EndState::Success).await.unwrap();

        let err = minimal_builder(&binding).build(&session).unwrap_err();
        assert!(matches!(err, Error::Trace(TraceError::NotStarted)));
    }

    #[test]
    fn build_succeeds_with_active_session() {
        let binding = mock_binding();
        let session = TraceSession::disabled();
        let crew = minimal_builder(&binding).build(&session).expect("valid crew");
        assert_eq!(crew.agent_count(), 1);
        assert_eq!(crew.task_count(), 1);
    }
}
