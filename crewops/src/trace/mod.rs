//! Trace session initialization and lifecycle.
//!
//! A [`TraceClient`] talks to a remote observability backend; starting a trace
//! yields a [`TraceSession`] that agent and crew activity is recorded under.
//!
//! Two rules from hard-won operational experience are enforced here:
//!
//! 1. **Start before assembly.** The session must be active before any agent
//!    or crew is constructed, or later spans land on the backend orphaned and
//!    the dashboard reports "trace not found".
//!    [`CrewBuilder::build`](crate::crew::CrewBuilder::build) checks the
//!    session state for exactly this reason.
//! 2. **End exactly once.** [`TraceSession::end`] must run on success *and*
//!    failure paths; a second call is [`TraceError::AlreadyEnded`]. The
//!    [`pipeline`](crate::pipeline) module takes care of both rules.
//!
//! Upload failures never interrupt execution. Constrained (free) service
//! tiers reject detail-metric uploads with 401/403; those are logged at debug
//! level and swallowed.

mod session;

pub use session::{EndState, SessionState, TraceSession};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::TokenUsage;
use crate::config::Settings;
use crate::error::{Result, TraceError};

/// Default backend endpoint.
pub const DEFAULT_TRACE_ENDPOINT: &str = "https://trace.crewops.dev/v1";

/// Default dashboard base for session links.
pub const DEFAULT_TRACE_APP_URL: &str = "https://app.crewops.dev/sessions";

/// An event recorded against an active trace session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A crew started executing.
    CrewStarted {
        /// Number of agents in the crew.
        agents: usize,
        /// Number of tasks in the crew.
        tasks: usize,
    },
    /// A task started executing.
    TaskStarted {
        /// Task name.
        name: String,
        /// Role of the executing agent.
        agent: String,
    },
    /// A task completed.
    TaskCompleted {
        /// Task name.
        name: String,
        /// Role of the executing agent.
        agent: String,
        /// Token usage for the task.
        usage: TokenUsage,
        /// Attempts needed (1 means no retries).
        attempts: u32,
    },
    /// The crew produced its final output.
    CrewCompleted {
        /// Cumulative token usage.
        usage: TokenUsage,
    },
    /// An error interrupted execution.
    Error {
        /// Error description.
        message: String,
    },
}

/// Client for the tracing backend.
///
/// Holds the credential and endpoint; cheap to construct, does no I/O until
/// [`TraceClient::start_trace`].
#[derive(Clone)]
pub struct TraceClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl std::fmt::Debug for TraceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    run_id: Uuid,
    tags: &'a [String],
}

#[derive(Debug, serde::Deserialize)]
struct StartResponse {
    session_id: String,
    #[serde(default)]
    url: Option<String>,
}

impl TraceClient {
    /// Create a client from gathered [`Settings`].
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: settings.trace_api_key.clone(),
            endpoint: settings
                .trace_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_TRACE_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Create a client straight from process environment state.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(&Settings::from_env())
    }

    /// Returns `true` if a credential is configured.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Start a trace session on the backend.
    ///
    /// On success the remote session identifier and dashboard URL are logged
    /// for later lookup.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::StartFailed`] when no credential is configured
    /// or the backend rejects the request. Callers that prefer to continue
    /// without tracking can use [`TraceClient::start_trace_or_disabled`].
    pub async fn start_trace(&self, tags: &[String]) -> Result<TraceSession> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(TraceError::StartFailed("no trace credential configured".into()).into());
        };

        let run_id = Uuid::new_v4();
        let response = self
            .http
            .post(format!("{}/sessions", self.endpoint))
            .bearer_auth(&api_key)
            .json(&StartRequest { run_id, tags })
            .send()
            .await
            .map_err(|e| TraceError::StartFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TraceError::StartFailed(format!(
                "backend returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(256).collect::<String>()
            ))
            .into());
        }

        let started: StartResponse = response
            .json()
            .await
            .map_err(|e| TraceError::StartFailed(format!("malformed start response: {e}")))?;

        let url = started
            .url
            .unwrap_or_else(|| format!("{DEFAULT_TRACE_APP_URL}/{}", started.session_id));
        info!(session_id = %started.session_id, "trace session started; view this run at {url}");

        Ok(TraceSession::active(
            self.http.clone(),
            self.endpoint.clone(),
            api_key,
            started.session_id,
            url,
        ))
    }

    /// Start a trace session, degrading to a disabled session on failure.
    ///
    /// A missing credential or a backend rejection is reported as a warning
    /// and the run continues without tracking, matching the behavior users
    /// expect from an observability layer: it never takes the run down.
    pub async fn start_trace_or_disabled(&self, tags: &[String]) -> TraceSession {
        match self.start_trace(tags).await {
            Ok(session) => session,
            Err(e) => {
                warn!("trace start failed: {e}; continuing without tracking");
                TraceSession::disabled()
            }
        }
    }
}
