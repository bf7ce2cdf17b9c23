//! Fully traced crew run through the pipeline.
//!
//! Loads credentials from `.env` (quote-safe), starts the trace session
//! before any agent exists, and ends it exactly once whatever happens. If
//! the trace backend is unreachable the run continues without tracking.
//!
//! ```bash
//! cat > .env <<EOF
//! GROQ_API_KEY=gsk_...
//! CREWOPS_TRACE_API_KEY=tk_...
//! EOF
//! cargo run --example crew_traced_run
//! ```

#![allow(clippy::print_stdout)]

use std::collections::HashMap;

use crewops::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Read credentials from the env file map directly; no process-global
    // mutation needed once the runtime is up.
    let env = EnvFile::load(".env").unwrap_or_default();

    let mut binding = ModelBinding::builder(ProviderKind::Groq, "llama-3.1-8b-instant");
    if let Some(key) = env.get("GROQ_API_KEY") {
        binding = binding.api_key(key);
    }
    let binding = binding.connect()?;

    let client = TraceClient::new(&Settings {
        trace_api_key: env.get("CREWOPS_TRACE_API_KEY").map(str::to_string),
        trace_endpoint: env.get("CREWOPS_TRACE_ENDPOINT").map(str::to_string),
    });

    let mut inputs = HashMap::new();
    inputs.insert("topic".to_string(), "open-source LLM tooling".to_string());

    let output = pipeline::run(
        &client,
        &["crew".to_string(), "example".to_string()],
        |session| {
            if let Some(url) = session.url() {
                println!("view this run at: {url}");
            }
            Crew::builder("traced-crew")
                .agent(
                    Agent::new("Tech Content Strategist")
                        .goal("Craft compelling content on {topic}")
                        .backstory("Known for simplifying complex topics.")
                        .binding(binding.clone()),
                )
                .task(
                    Task::new("write", "Write an engaging blog post about {topic}.")
                        .expected_output("A blog post of at least 4 paragraphs.")
                        .agent("Tech Content Strategist"),
                )
                .manager_binding(binding.clone())
                .hooks(std::sync::Arc::new(LoggingHooks::new()))
                .build(session)
        },
        &inputs,
    )
    .await?;

    println!("{}", output.raw);
    Ok(())
}
