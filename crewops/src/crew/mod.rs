//! Agents, tasks, and the assembled crew.
//!
//! The types here separate *what* a crew is from *how* it runs:
//!
//! - **[`Agent`]** and **[`Task`]** are pure configuration.
//! - **[`CrewBuilder`]** runs the completeness checklist at build time: every
//!   agent and the manager must hold an explicit
//!   [`ModelBinding`](crate::binding::ModelBinding) reference, every task
//!   must name a known agent, and the trace session
//!   must already be active. An unbound entity fails assembly *before*
//!   execution: a framework that quietly falls back to a default paid
//!   provider turns a config typo into a surprise quota error on a provider
//!   the user never chose.
//! - **[`Crew::kickoff`]** executes tasks strictly in order, feeding each
//!   task's output into the context of the next.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use crewops::prelude::*;
//!
//! let binding = ModelBinding::from_env(ProviderKind::Groq, "llama-3.1-8b-instant")?;
//!
//! let researcher = Agent::new("Senior Researcher")
//!     .goal("Uncover groundbreaking information about {topic}")
//!     .backstory("Driven by curiosity, at the forefront of innovation.")
//!     .binding(binding.clone());
//!
//! let crew = Crew::builder("research-crew")
//!     .agent(researcher)
//!     .task(Task::new("analysis", "Conduct a comprehensive analysis on {topic}.")
//!         .expected_output("A detailed report summarizing key findings.")
//!         .agent("Senior Researcher"))
//!     .manager_binding(binding)
//!     .build(&session)?;
//!
//! let inputs = HashMap::from([("topic".to_string(), "Rust agents".to_string())]);
//! let output = crew.kickoff(&session, &inputs).await?;
//! ```

mod agent;
mod builder;
mod executor;
mod output;
mod task;

pub use agent::Agent;
pub use builder::{Crew, CrewBuilder, CrewIssue, Process};
pub use executor::RetryPolicy;
pub use output::{CrewOutput, TaskOutput};
pub use task::Task;
