//! Integration tests for the crewops crate.

#![allow(clippy::unwrap_used, clippy::panic, clippy::print_stdout)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crewops::prelude::*;

fn binding_over(provider: Arc<MockProvider>) -> SharedModelBinding {
    ModelBinding::builder(ProviderKind::Groq, "mock-model")
        .provider(provider)
        .connect()
        .unwrap()
}

fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn sequential_kickoff_chains_task_outputs() {
    let provider = Arc::new(MockProvider::new(vec![
        "trend report".to_string(),
        "market analysis".to_string(),
    ]));
    let binding = binding_over(provider.clone());
    let session = TraceSession::disabled();

    let crew = Crew::builder("market-crew")
        .agent(
            Agent::new("Data Analyst")
                .goal("Analyze data trends in {topic}")
                .backstory("An experienced data analyst.")
                .binding(binding.clone()),
        )
        .agent(
            Agent::new("Market Researcher")
                .goal("Gather information on {topic}")
                .binding(binding.clone()),
        )
        .task(
            Task::new("collect", "Collect recent data about {topic}.")
                .expected_output("A report summarizing key trends.")
                .agent("Data Analyst"),
        )
        .task(
            Task::new("research", "Research factors affecting {topic}.")
                .agent("Market Researcher"),
        )
        .manager_binding(binding.clone())
        .build(&session)
        .unwrap();

    let output = crew
        .kickoff(&session, &inputs(&[("topic", "the market")]))
        .await
        .unwrap();

    assert_eq!(output.task_outputs.len(), 2);
    assert_eq!(output.task_outputs[0].raw, "trend report");
    assert_eq!(output.task_outputs[1].raw, "market analysis");
    // Sequential process: final output is the last task's output.
    assert_eq!(output.raw, "market analysis");
    // Two provider calls, one per task.
    assert_eq!(provider.calls(), 2);
    // Usage accumulates across tasks (mock reports 10+5 per call).
    assert_eq!(output.usage.total(), 30);

    session.end(EndState::Success).await.unwrap();
}

#[tokio::test]
async fn hierarchical_process_runs_manager_consolidation() {
    let provider = Arc::new(MockProvider::new(vec![
        "finding A".to_string(),
        "finding B".to_string(),
        "executive summary".to_string(),
    ]));
    let binding = binding_over(provider.clone());
    let session = TraceSession::disabled();

    let crew = Crew::builder("managed-crew")
        .agent(Agent::new("Researcher").binding(binding.clone()))
        .task(Task::new("one", "First task.").agent("Researcher"))
        .task(Task::new("two", "Second task.").agent("Researcher"))
        .manager_binding(binding.clone())
        .process(Process::Hierarchical)
        .build(&session)
        .unwrap();

    let output = crew.kickoff(&session, &HashMap::new()).await.unwrap();

    // Two task calls plus one manager call.
    assert_eq!(provider.calls(), 3);
    assert_eq!(output.raw, "executive summary");
    assert_eq!(output.task("one").unwrap().raw, "finding A");

    session.end(EndState::Success).await.unwrap();
}

#[tokio::test]
async fn retryable_failures_are_retried_with_backoff() {
    let provider = Arc::new(MockProvider::new(vec!["recovered".to_string()]).fail_first(2));
    let binding = binding_over(provider.clone());
    let session = TraceSession::disabled();

    let crew = Crew::builder("retry-crew")
        .agent(Agent::new("Analyst").binding(binding.clone()))
        .task(Task::new("t", "analyze").agent("Analyst"))
        .manager_binding(binding.clone())
        .retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        })
        .build(&session)
        .unwrap();

    let output = crew.kickoff(&session, &HashMap::new()).await.unwrap();
    assert_eq!(output.raw, "recovered");
    assert_eq!(output.task_outputs[0].attempts, 3);
    assert_eq!(provider.calls(), 3);

    session.end(EndState::Success).await.unwrap();
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_error() {
    let provider = Arc::new(MockProvider::new(vec!["never".to_string()]).fail_first(10));
    let binding = binding_over(provider);
    let session = TraceSession::disabled();

    let crew = Crew::builder("doomed-crew")
        .agent(Agent::new("Analyst").binding(binding.clone()))
        .task(Task::new("t", "analyze").agent("Analyst"))
        .manager_binding(binding.clone())
        .retry(RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        })
        .build(&session)
        .unwrap();

    let err = crew.kickoff(&session, &HashMap::new()).await.unwrap_err();
    match err {
        Error::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("unexpected error: {other}"),
    }

    session.end(EndState::Fail).await.unwrap();
}

#[tokio::test]
async fn crew_cannot_be_built_after_the_session_ended() {
    let binding = binding_over(Arc::new(MockProvider::new(vec!["x".to_string()])));
    let session = TraceSession::disabled();
    session.end(EndState::Success).await.unwrap();

    let err = Crew::builder("late-crew")
        .agent(Agent::new("Analyst").binding(binding.clone()))
        .task(Task::new("t", "analyze").agent("Analyst"))
        .manager_binding(binding)
        .build(&session)
        .unwrap_err();

    assert!(matches!(err, Error::Trace(TraceError::NotStarted)));
}

#[tokio::test]
async fn pipeline_ends_the_session_exactly_once_on_both_paths() {
    // Success path: the pipeline owns the session, so a double-end inside it
    // would surface as a panic or logged error; we assert the run result.
    let binding = binding_over(Arc::new(MockProvider::new(vec!["done".to_string()])));
    let client = TraceClient::new(&Settings::default());

    let output = pipeline::run(
        &client,
        &[],
        |session| {
            assert_eq!(session.state(), SessionState::Active);
            Crew::builder("piped")
                .agent(Agent::new("Analyst").binding(binding.clone()))
                .task(Task::new("t", "analyze").agent("Analyst"))
                .manager_binding(binding.clone())
                .build(session)
        },
        &HashMap::new(),
    )
    .await
    .unwrap();
    assert_eq!(output.raw, "done");

    // Failure path: execution fails, the pipeline still ends the session and
    // propagates the error.
    let failing = binding_over(Arc::new(
        MockProvider::new(vec!["never".to_string()]).fail_first(10),
    ));
    let err = pipeline::run(
        &client,
        &[],
        |session| {
            Crew::builder("piped-fail")
                .agent(Agent::new("Analyst").binding(failing.clone()))
                .task(Task::new("t", "analyze").agent("Analyst"))
                .manager_binding(failing.clone())
                .retry(RetryPolicy {
                    max_attempts: 1,
                    base_delay: Duration::from_millis(1),
                })
                .build(session)
        },
        &HashMap::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::RetriesExhausted { .. }));
}

#[tokio::test]
async fn kickoff_interpolates_inputs_into_prompts() {
    // The mock ignores prompts, so interpolation is observed indirectly: a
    // crew whose placeholders resolve runs cleanly end to end.
    let binding = binding_over(Arc::new(MockProvider::new(vec!["ok".to_string()])));
    let session = TraceSession::disabled();

    let crew = Crew::builder("topical")
        .agent(
            Agent::new("Senior Researcher")
                .goal("Uncover groundbreaking information about {topic}")
                .binding(binding.clone()),
        )
        .task(
            Task::new("analysis", "Conduct a comprehensive analysis on {topic}.")
                .expected_output("A detailed report about {topic}.")
                .agent("Senior Researcher"),
        )
        .manager_binding(binding.clone())
        .build(&session)
        .unwrap();

    let output = crew
        .kickoff(&session, &inputs(&[("topic", "The Future of AI Agents")]))
        .await
        .unwrap();
    assert_eq!(output.raw, "ok");

    session.end(EndState::Success).await.unwrap();
}

#[tokio::test]
async fn agent_tools_run_and_feed_back_into_the_answer() {
    let notes = std::env::temp_dir().join(format!("crewops-itest-notes-{}.txt", std::process::id()));
    std::fs::remove_file(&notes).ok();

    // First response asks for a tool call; the follow-up answers in text.
    let provider = Arc::new(MockProvider::scripted(vec![
        ChatResponse::text("").with_tool_calls(vec![ToolCall {
            id: "call_1".to_string(),
            function: FunctionCall {
                name: "add_note".to_string(),
                arguments: "{\"message\":\"tool note\"}".to_string(),
            },
        }]),
        ChatResponse::text("noted and done"),
    ]));
    let binding = binding_over(provider.clone());
    let session = TraceSession::disabled();

    let crew = Crew::builder("note-crew")
        .agent(
            Agent::new("Note Taker")
                .goal("Keep notes on findings")
                .binding(binding.clone())
                .tool(Arc::new(AddNote::new(&notes))),
        )
        .task(Task::new("note", "Record the key finding.").agent("Note Taker"))
        .manager_binding(binding.clone())
        .build(&session)
        .unwrap();

    let output = crew.kickoff(&session, &HashMap::new()).await.unwrap();

    assert_eq!(output.raw, "noted and done");
    // One initial call plus one follow-up after the tool round.
    assert_eq!(provider.calls(), 2);
    let written = std::fs::read_to_string(&notes).unwrap();
    assert_eq!(written, "tool note\n");

    session.end(EndState::Success).await.unwrap();
    std::fs::remove_file(&notes).ok();
}

#[tokio::test]
async fn zero_max_attempts_still_makes_one_call() {
    let provider = Arc::new(MockProvider::new(vec!["once".to_string()]));
    let binding = binding_over(provider.clone());
    let session = TraceSession::disabled();

    let crew = Crew::builder("clamped")
        .agent(Agent::new("Analyst").binding(binding.clone()))
        .task(Task::new("t", "analyze").agent("Analyst"))
        .manager_binding(binding.clone())
        .retry(RetryPolicy { max_attempts: 0, base_delay: Duration::from_millis(1) })
        .build(&session)
        .unwrap();

    let output = crew.kickoff(&session, &HashMap::new()).await.unwrap();
    assert_eq!(output.raw, "once");
    assert_eq!(output.task_outputs[0].attempts, 1);
    assert_eq!(provider.calls(), 1);

    session.end(EndState::Success).await.unwrap();
}

#[test]
fn env_file_scenario_from_the_field() {
    // The classic broken .env: quoted credential. The loader must hand the
    // unquoted value downstream.
    let env = EnvFile::parse("GROQ_API_KEY=\"gsk_abc123\"\nCREWOPS_TRACE_API_KEY=tk_1\n");
    assert_eq!(env.get("GROQ_API_KEY"), Some("gsk_abc123"));
    assert!(diagnose_key("GROQ_API_KEY", env.get("GROQ_API_KEY")).is_empty());
}
