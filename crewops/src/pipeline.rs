//! The linear run pipeline.
//!
//! The control flow of a traced crew run is strictly sequential:
//!
//! ```text
//! load config → start trace → assemble crew → execute → end trace
//! ```
//!
//! [`run`] encodes the two ordering rules structurally instead of leaving
//! them to discipline:
//!
//! - the assembly closure receives the already-active [`TraceSession`], so a
//!   crew cannot be built before the session exists;
//! - the session is ended exactly once, with [`EndState::Success`] or
//!   [`EndState::Fail`], whichever path the run takes.
//!
//! A trace backend that cannot be reached degrades to a disabled session
//! with a warning; observability never takes the run down.
//!
//! # Example
//!
//! ```rust,ignore
//! use crewops::prelude::*;
//!
//! EnvFile::load(".env")?.export();
//! let binding = ModelBinding::from_env(ProviderKind::Groq, "llama-3.1-8b-instant")?;
//!
//! let output = pipeline::run(
//!     &TraceClient::from_env(),
//!     &["crewai".into(), "market-analysis".into()],
//!     |session| {
//!         Crew::builder("market-crew")
//!             .agent(Agent::new("Data Analyst")
//!                 .goal("Analyze data trends in the market")
//!                 .binding(binding.clone()))
//!             .task(Task::new("collect", "Collect recent market data and identify trends.")
//!                 .agent("Data Analyst"))
//!             .manager_binding(binding.clone())
//!             .build(session)
//!     },
//!     &HashMap::new(),
//! )
//! .await?;
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::crew::{Crew, CrewOutput};
use crate::error::Result;
use crate::trace::{EndState, TraceClient, TraceSession};

/// Run a crew under a trace session, end to end.
///
/// Starts the session (degrading to a disabled one when the backend is
/// unavailable), assembles the crew through `assemble` against the active
/// session, kicks off, and ends the session exactly once with the status of
/// whichever path the run took.
///
/// # Errors
///
/// Propagates assembly and execution errors after the session has been
/// ended with [`EndState::Fail`].
pub async fn run<F>(
    client: &TraceClient,
    tags: &[String],
    assemble: F,
    inputs: &HashMap<String, String>,
) -> Result<CrewOutput>
where
    F: FnOnce(&TraceSession) -> Result<Crew>,
{
    let session = client.start_trace_or_disabled(tags).await;

    let result = match assemble(&session) {
        Ok(crew) => crew.kickoff(&session, inputs).await,
        Err(e) => Err(e),
    };

    let status = if result.is_ok() { EndState::Success } else { EndState::Fail };
    if let Err(e) = session.end(status).await {
        // Only reachable if the assembly closure ended the session itself,
        // which it should not do.
        debug!("pipeline end call: {e}");
    }

    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::binding::{ModelBinding, ProviderKind, SharedModelBinding};
    use crate::chat::SharedChatProvider;
    use crate::config::Settings;
    use crate::crew::{Agent, Task};
    use crate::error::Error;
    use crate::providers::MockProvider;

    fn mock_binding(responses: Vec<String>) -> SharedModelBinding {
        let provider: SharedChatProvider = Arc::new(MockProvider::new(responses));
        ModelBinding::builder(ProviderKind::Groq, "mock-model")
            .provider(provider)
            .connect()
            .expect("mock binding")
    }

    fn unconfigured_client() -> TraceClient {
        TraceClient::new(&Settings::default())
    }

    #[tokio::test]
    async fn success_path_ends_session_and_returns_output() {
        let binding = mock_binding(vec!["analysis done".into()]);
        let output = run(
            &unconfigured_client(),
            &[],
            |session| {
                Crew::builder("c")
                    .agent(Agent::new("Analyst").binding(binding.clone()))
                    .task(Task::new("t", "analyze").agent("Analyst"))
                    .manager_binding(binding.clone())
                    .build(session)
            },
            &HashMap::new(),
        )
        .await
        .expect("run should succeed");

        assert_eq!(output.raw, "analysis done");
    }

    #[tokio::test]
    async fn assembly_failure_still_ends_the_session() {
        let binding = mock_binding(vec!["unused".into()]);
        let err = run(
            &unconfigured_client(),
            &[],
            |session| {
                // Unbound agent: fails the checklist.
                Crew::builder("c")
                    .agent(Agent::new("Analyst"))
                    .task(Task::new("t", "analyze").agent("Analyst"))
                    .manager_binding(binding.clone())
                    .build(session)
            },
            &HashMap::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Assembly { .. }));
    }
}
