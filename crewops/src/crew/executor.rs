//! Crew execution.
//!
//! Tasks run strictly in order. Each task's prompt is assembled from its
//! agent's identity, the interpolated description, and the accumulated output
//! of earlier tasks; the provider call is wrapped in a retry loop with
//! exponential backoff because hosted free tiers shed load aggressively.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::binding::SharedModelBinding;
use crate::chat::{ChatRequest, ChatResponse, Message, TokenUsage, ToolCall};
use crate::error::{Error, Result};
use crate::trace::{TraceEvent, TraceSession};

use super::builder::Process;
use super::output::{CrewOutput, TaskOutput};
use super::{Agent, Crew, Task};

/// Upper bound on model-requested tool rounds per task.
const MAX_TOOL_ROUNDS: usize = 4;

/// Retry policy for provider calls.
///
/// Delay doubles per attempt starting at `base_delay` (1s, 2s, 4s, ... by
/// default). Non-retryable errors (authentication, request shape) fail
/// immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per task, including the first. Clamped to at least
    /// one at execution time, so every task gets a provider call.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    /// Delay before the retry following attempt number `attempt` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1_u32 << attempt.min(16))
    }
}

/// Interpolate `{key}` placeholders from kickoff inputs.
fn interpolate(text: &str, inputs: &HashMap<String, String>) -> String {
    let mut out = text.to_string();
    for (key, value) in inputs {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

impl Crew {
    /// Execute the crew against an active trace session.
    ///
    /// Tasks run strictly sequentially. `inputs` fills `{key}` placeholders
    /// in goals, descriptions, and expected outputs. The session records
    /// task activity; it is **not** ended here, since ending exactly once is the
    /// caller's (or [`pipeline::run`](crate::pipeline::run)'s) job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetriesExhausted`] when a task keeps failing past the
    /// retry budget, or the underlying error directly when it is not
    /// retryable (authentication, request shape).
    pub async fn kickoff(
        &self,
        session: &TraceSession,
        inputs: &HashMap<String, String>,
    ) -> Result<CrewOutput> {
        let span = info_span!("crew_run", crew = %self.name);
        async move {
            info!(
                agents = self.agents.len(),
                tasks = self.tasks.len(),
                "starting crew kickoff"
            );
            self.hooks.on_crew_start(&self.name, self.tasks.len()).await;
            session
                .record_event(TraceEvent::CrewStarted {
                    agents: self.agents.len(),
                    tasks: self.tasks.len(),
                })
                .await;

            let result = self.run_tasks(session, inputs).await;
            match &result {
                Ok(output) => {
                    self.hooks.on_crew_end(&self.name, output.usage).await;
                    session
                        .record_event(TraceEvent::CrewCompleted { usage: output.usage })
                        .await;
                    info!(total_tokens = output.usage.total(), "crew kickoff completed");
                }
                Err(e) => {
                    self.hooks.on_error(&self.name, e).await;
                    session.record_event(TraceEvent::Error { message: e.to_string() }).await;
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_tasks(
        &self,
        session: &TraceSession,
        inputs: &HashMap<String, String>,
    ) -> Result<CrewOutput> {
        let mut task_outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut usage = TokenUsage::default();
        let mut context = String::new();

        for task in &self.tasks {
            let agent = self
                .agents
                .iter()
                .find(|a| a.role == task.agent_role)
                .expect("task agents resolved at assembly time");
            let binding = agent
                .binding
                .as_ref()
                .expect("agent bindings checked at assembly time");

            self.hooks.on_task_start(&task.name, &agent.role).await;
            session
                .record_event(TraceEvent::TaskStarted {
                    name: task.name.clone(),
                    agent: agent.role.clone(),
                })
                .await;

            let system = agent.system_prompt(|s| interpolate(s, inputs));
            let user = task.user_prompt(&context, |s| interpolate(s, inputs));
            let request = ChatRequest::new(binding.model())
                .system(system)
                .user(user)
                .tools(agent.tool_definitions());

            let (content, attempts, attempt_usage) =
                self.run_agent_turn(agent, binding, request, task).await?;

            usage = usage + attempt_usage;
            if !context.is_empty() {
                context.push_str("\n\n");
            }
            context.push_str(&content);

            let output = TaskOutput {
                name: task.name.clone(),
                agent_role: agent.role.clone(),
                raw: content,
                usage: attempt_usage,
                attempts,
            };
            self.hooks.on_task_end(&output).await;
            session
                .record_event(TraceEvent::TaskCompleted {
                    name: output.name.clone(),
                    agent: output.agent_role.clone(),
                    usage: output.usage,
                    attempts: output.attempts,
                })
                .await;
            task_outputs.push(output);
        }

        let raw = match self.process {
            Process::Sequential => task_outputs.last().map(|t| t.raw.clone()).unwrap_or_default(),
            Process::Hierarchical => {
                let (consolidated, manager_usage) =
                    self.consolidate(&task_outputs, inputs).await?;
                usage = usage + manager_usage;
                consolidated
            }
        };

        Ok(CrewOutput { raw, task_outputs, usage })
    }

    /// One agent turn: the provider call plus any tool rounds the model asks
    /// for, each result fed back as a tool message before asking again.
    async fn run_agent_turn(
        &self,
        agent: &Agent,
        binding: &SharedModelBinding,
        mut request: ChatRequest,
        task: &Task,
    ) -> Result<(String, u32, TokenUsage)> {
        let mut usage = TokenUsage::default();
        let mut attempts_total = 0;
        let mut round = 0;

        loop {
            let (response, attempts, call_usage) =
                self.call_with_retry(binding, &request, task).await?;
            usage = usage + call_usage;
            attempts_total += attempts;

            if response.tool_calls.is_empty() {
                return Ok((response.content, attempts_total, usage));
            }
            if round == MAX_TOOL_ROUNDS {
                warn!(task = %task.name, "tool round limit reached, returning last answer");
                return Ok((response.content, attempts_total, usage));
            }
            round += 1;

            request.messages.push(Message::assistant_with_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let result = Self::invoke_tool(agent, call).await;
                request.messages.push(Message::tool(&call.id, result));
            }
        }
    }

    /// Run one requested tool call. Failures are reported back to the model
    /// as text rather than aborting the task.
    async fn invoke_tool(agent: &Agent, call: &ToolCall) -> String {
        let Some(tool) = agent.tool_named(&call.function.name) else {
            return format!("unknown tool '{}'", call.function.name);
        };
        let args = serde_json::from_str(&call.function.arguments)
            .unwrap_or(serde_json::Value::Null);
        debug!(tool = %call.function.name, agent = %agent.role, "invoking tool");
        match tool.invoke(args).await {
            Ok(result) => result,
            Err(e) => format!("tool call failed: {e}"),
        }
    }

    /// Manager step for hierarchical crews: fold every task output into one
    /// consolidated result through the manager binding.
    async fn consolidate(
        &self,
        task_outputs: &[TaskOutput],
        inputs: &HashMap<String, String>,
    ) -> Result<(String, TokenUsage)> {
        let mut briefing = String::from("Task results, in execution order:\n");
        for output in task_outputs {
            briefing.push_str(&format!("\n## {} ({})\n{}\n", output.name, output.agent_role, output.raw));
        }
        briefing.push_str("\nConsolidate these results into a single final deliverable.");

        let request = ChatRequest::new(self.manager_binding.model())
            .system(interpolate(
                "You are the crew manager. You combine your team's work into one coherent result.",
                inputs,
            ))
            .user(briefing);

        debug!("running manager consolidation");
        let response = self.manager_binding.chat(&request).await?;
        Ok((response.content, response.usage))
    }

    async fn call_with_retry(
        &self,
        binding: &SharedModelBinding,
        request: &ChatRequest,
        task: &Task,
    ) -> Result<(ChatResponse, u32, TokenUsage)> {
        let mut usage = TokenUsage::default();
        let mut last_error = String::new();
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 0..max_attempts {
            match binding.chat(request).await {
                Ok(response) => {
                    usage = usage + response.usage;
                    return Ok((response, attempt + 1, usage));
                }
                Err(Error::Llm(e)) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        task = %task.name,
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs(),
                        "provider call failed, retrying: {e}"
                    );
                    last_error = e.to_string();
                    tokio::time::sleep(delay).await;
                }
                Err(Error::Llm(e)) if e.is_retryable() => {
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::RetriesExhausted { attempts: max_attempts, last_error })
    }
}
