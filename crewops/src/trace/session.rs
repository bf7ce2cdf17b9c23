//! The trace session handle and its lifecycle.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, TraceError};

use super::TraceEvent;

/// Observable lifecycle state of a session handle.
///
/// The "not started" phase of the lifecycle is represented by the absence of
/// a [`TraceSession`] value; once a handle exists it is either active or
/// ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The session is accepting events.
    Active,
    /// The session has been ended and must not be used again.
    Ended,
}

/// Terminal status reported when ending a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndState {
    /// The run completed successfully.
    Success,
    /// The run failed.
    Fail,
    /// The outcome could not be determined.
    Indeterminate,
}

impl EndState {
    /// Status string sent to the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Fail => "Fail",
            Self::Indeterminate => "Indeterminate",
        }
    }
}

impl fmt::Display for EndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Phase {
    Active,
    Ended(EndState),
}

/// An active (or ended) trace session.
///
/// Created by [`TraceClient::start_trace`](super::TraceClient::start_trace),
/// or as a no-op via [`TraceSession::disabled`]. Shared by reference with the
/// crew builder (ordering check) and executor (event recording).
pub struct TraceSession {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    session_id: String,
    url: Option<String>,
    enabled: bool,
    phase: Mutex<Phase>,
}

impl fmt::Debug for TraceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSession")
            .field("session_id", &self.session_id)
            .field("enabled", &self.enabled)
            .field("state", &self.state())
            .finish()
    }
}

impl TraceSession {
    pub(super) fn active(
        http: reqwest::Client,
        endpoint: String,
        api_key: String,
        session_id: String,
        url: String,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            session_id,
            url: Some(url),
            enabled: true,
            phase: Mutex::new(Phase::Active),
        }
    }

    /// Create a no-op session.
    ///
    /// State transitions behave normally (active until ended, exactly once)
    /// but nothing is uploaded. Used when tracing is unconfigured or the
    /// backend refused to start a session.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: String::new(),
            api_key: String::new(),
            session_id: format!("local-{}", uuid::Uuid::new_v4()),
            url: None,
            enabled: false,
            phase: Mutex::new(Phase::Active),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match *self.phase.lock().expect("session phase lock poisoned") {
            Phase::Active => SessionState::Active,
            Phase::Ended(_) => SessionState::Ended,
        }
    }

    /// Returns `true` if the session is accepting events.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Returns `true` if events are actually uploaded.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The session identifier (remote, or locally generated when disabled).
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Dashboard URL for this session, when known.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Record an event against this session.
    ///
    /// Never fails the caller: upload errors are logged and swallowed.
    /// Authorization rejections (the constrained-tier case) go to debug,
    /// everything else to warn. Events against an ended or disabled session
    /// are dropped silently.
    pub async fn record_event(&self, event: TraceEvent) {
        if !self.enabled || !self.is_active() {
            return;
        }
        match self.upload(&event).await {
            Ok(()) => {}
            Err(e) if e.is_benign() => {
                debug!("metric upload rejected by constrained service tier: {e}");
            }
            Err(e) => warn!("trace event upload failed: {e}"),
        }
    }

    async fn upload(&self, event: &TraceEvent) -> std::result::Result<(), TraceError> {
        let url = format!("{}/sessions/{}/events", self.endpoint, self.session_id);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(event)
            .send()
            .await
            .map_err(|e| TraceError::Backend { status: 0, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TraceError::Backend {
                status: status.as_u16(),
                message: message.chars().take(256).collect(),
            });
        }
        Ok(())
    }

    /// End the session with the given status.
    ///
    /// Must be called exactly once per run, on success and failure paths
    /// alike. The remote termination call itself is best-effort: a backend
    /// failure is logged at debug and does not fail the caller, matching the
    /// non-fatal contract of the whole trace layer.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::AlreadyEnded`] if the session was ended before.
    pub async fn end(&self, status: EndState) -> Result<()> {
        {
            let mut phase = self.phase.lock().expect("session phase lock poisoned");
            if let Phase::Ended(previous) = *phase {
                return Err(TraceError::AlreadyEnded { status: previous.as_str().into() }.into());
            }
            *phase = Phase::Ended(status);
        }

        if self.enabled {
            let url = format!("{}/sessions/{}/end", self.endpoint, self.session_id);
            let result = self
                .http
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&serde_json::json!({ "status": status.as_str() }))
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => {
                    info!(session_id = %self.session_id, %status, "trace session ended");
                }
                Ok(response) => {
                    debug!(
                        status = response.status().as_u16(),
                        "trace end call rejected by backend"
                    );
                }
                Err(e) => debug!("trace end call failed: {e}"),
            }
        } else {
            debug!(session_id = %self.session_id, %status, "disabled trace session ended");
        }
        Ok(())
    }

    /// End the session with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::AlreadyEnded`] if the session was ended before.
    #[deprecated(since = "0.3.0", note = "renamed to `end`")]
    pub async fn end_session(&self, status: EndState) -> Result<()> {
        self.end(status).await
    }
}

impl Drop for TraceSession {
    fn drop(&mut self) {
        if let Ok(phase) = self.phase.lock()
            && matches!(*phase, Phase::Active)
            && self.enabled
        {
            warn!(
                session_id = %self.session_id,
                "trace session dropped without end(); remote session left open"
            );
        }
    }
}
