//! Basic crew example using a Groq-hosted model.
//!
//! One shared binding, two agents, two sequential tasks.
//!
//! ```bash
//! export GROQ_API_KEY=gsk_...
//! cargo run --example crew_groq_basic
//! ```

#![allow(clippy::print_stdout)]

use std::collections::HashMap;

use crewops::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Construct the binding ONCE and share the handle everywhere.
    let binding = ModelBinding::from_env(ProviderKind::Groq, "llama-3.1-8b-instant")?;

    let session = TraceSession::disabled();
    let crew = Crew::builder("market-analysis")
        .agent(
            Agent::new("Data Analyst")
                .goal("Analyze data trends in the market")
                .backstory("An experienced data analyst with a background in economics.")
                .binding(binding.clone()),
        )
        .agent(
            Agent::new("Market Researcher")
                .goal("Gather information on market dynamics")
                .backstory("A diligent researcher with a keen eye for detail.")
                .binding(binding.clone()),
        )
        .task(
            Task::new("collect-data", "Collect recent market data and identify trends.")
                .expected_output("A report summarizing key trends in the market.")
                .agent("Data Analyst"),
        )
        .task(
            Task::new("research", "Research factors affecting market dynamics.")
                .expected_output("An analysis of factors influencing the market.")
                .agent("Market Researcher"),
        )
        .manager_binding(binding)
        .build(&session)?;

    let output = crew.kickoff(&session, &HashMap::new()).await?;
    session.end(EndState::Success).await?;

    println!("{}", output.raw);
    Ok(())
}
