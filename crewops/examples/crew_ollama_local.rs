//! Crew example against a local Ollama server.
//!
//! Local bindings need no credential; the base address defaults to
//! `http://localhost:11434/v1` and can be overridden with `OLLAMA_BASE_URL`.
//!
//! ```bash
//! ollama pull llama3.1
//! cargo run --example crew_ollama_local
//! ```

#![allow(clippy::print_stdout)]

use std::collections::HashMap;

use crewops::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let binding = ModelBinding::from_env(ProviderKind::Ollama, "llama3.1")?;

    let session = TraceSession::disabled();
    let crew = Crew::builder("local-crew")
        .agent(
            Agent::new("Senior Researcher")
                .goal("Uncover groundbreaking information about {topic}")
                .backstory("Driven by curiosity, at the forefront of innovation.")
                .binding(binding.clone()),
        )
        .task(
            Task::new("analysis", "Conduct a comprehensive analysis on {topic}.")
                .expected_output("A detailed report summarizing key findings.")
                .agent("Senior Researcher"),
        )
        .manager_binding(binding)
        .build(&session)?;

    let mut inputs = HashMap::new();
    inputs.insert("topic".to_string(), "The Future of AI Agents".to_string());

    let output = crew.kickoff(&session, &inputs).await?;
    session.end(EndState::Success).await?;

    println!("{}", output.raw);
    Ok(())
}
