//! Crew example with agent-callable tools.
//!
//! The reporter agent can search Google News (via Serper), look up current
//! weather, and keep notes in a local file. Tool definitions travel with the
//! chat request in function-calling format; requested calls are executed and
//! fed back to the model.
//!
//! ```bash
//! export GROQ_API_KEY=gsk_...
//! export SERPER_API_KEY=...
//! export WEATHER_API_KEY=...
//! cargo run --example crew_tool_agent
//! ```

#![allow(clippy::print_stdout)]

use std::collections::HashMap;
use std::sync::Arc;

use crewops::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let binding = ModelBinding::from_env(ProviderKind::Groq, "llama-3.1-8b-instant")?;

    let mut reporter = Agent::new("Field Reporter")
        .goal("Report current conditions and news for {city}")
        .backstory("A reporter who checks sources before writing a word.")
        .binding(binding.clone())
        .tool(Arc::new(AddNote::new("mynotes.txt")))
        .tool(Arc::new(ReadNotes::new("mynotes.txt")));

    // Remote tools are optional; skip them when the credentials are absent.
    if let Ok(search) = SearchNews::from_env() {
        reporter = reporter.tool(Arc::new(search));
    }
    if let Ok(weather) = FetchWeather::from_env() {
        reporter = reporter.tool(Arc::new(weather));
    }

    let session = TraceSession::disabled();
    let crew = Crew::builder("field-report")
        .agent(reporter)
        .task(
            Task::new(
                "report",
                "Check the current weather and recent news for {city}, note the highlights, \
                 and write a short situational report.",
            )
            .expected_output("A report of 2-3 paragraphs with a note saved for each source used.")
            .agent("Field Reporter"),
        )
        .manager_binding(binding)
        .build(&session)?;

    let mut inputs = HashMap::new();
    inputs.insert("city".to_string(), "Rotterdam".to_string());

    let output = crew.kickoff(&session, &inputs).await?;
    session.end(EndState::Success).await?;

    println!("{}", output.raw);
    Ok(())
}
