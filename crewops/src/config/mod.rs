//! Configuration management for crewops.
//!
//! Settings are loaded in two steps:
//!
//! 1. [`EnvFile::load`] reads a `KEY=VALUE` file and (optionally) exports it
//!    into process environment state.
//! 2. [`Settings::from_env`] gathers the variables this crate consumes: the
//!    tracing credential/endpoint and any provider credentials.
//!
//! [`diagnose_key`] exists because the single most common support issue with
//! this kind of wiring is a credential that was pasted into the file with its
//! quotes still attached.

mod envfile;

pub use envfile::{EnvFile, strip_quotes};

use tracing::debug;

/// Environment variable holding the tracing backend credential.
pub const TRACE_API_KEY_VAR: &str = "CREWOPS_TRACE_API_KEY";

/// Environment variable overriding the tracing backend endpoint.
pub const TRACE_ENDPOINT_VAR: &str = "CREWOPS_TRACE_ENDPOINT";

/// Settings gathered from process environment state.
///
/// Provider credentials are resolved per provider kind by
/// [`ModelBinding`](crate::binding::ModelBinding), not here; this struct only
/// carries what the trace layer needs.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Tracing backend credential, if configured.
    pub trace_api_key: Option<String>,
    /// Tracing backend endpoint override, if configured.
    pub trace_endpoint: Option<String>,
}

impl Settings {
    /// Gather settings from process environment state.
    #[must_use]
    pub fn from_env() -> Self {
        let settings = Self {
            trace_api_key: std::env::var(TRACE_API_KEY_VAR).ok(),
            trace_endpoint: std::env::var(TRACE_ENDPOINT_VAR).ok(),
        };
        debug!(
            trace_key = settings.trace_api_key.is_some(),
            trace_endpoint = settings.trace_endpoint.as_deref(),
            "gathered settings from environment"
        );
        settings
    }

    /// Returns `true` if a tracing credential is available.
    #[must_use]
    pub const fn tracing_configured(&self) -> bool {
        self.trace_api_key.is_some()
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// The configuration will not work.
    Error,
    /// The configuration is suspicious but may work.
    Warning,
}

/// A single issue found while validating configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Severity.
    pub level: IssueLevel,
    /// Human-readable description.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: IssueLevel::Error, message: message.into() }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: IssueLevel::Warning, message: message.into() }
    }
}

/// Check a credential for the classic paste mistakes.
///
/// Flags embedded quote characters (usually a `KEY="value"` line that never
/// went through [`strip_quotes`]) and whitespace. A missing key is reported
/// as an error; format oddities are warnings since some backends tolerate
/// them.
#[must_use]
pub fn diagnose_key(name: &str, key: Option<&str>) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let Some(key) = key else {
        issues.push(ConfigIssue::error(format!("{name} is not set")));
        return issues;
    };
    if key.is_empty() {
        issues.push(ConfigIssue::error(format!("{name} is empty")));
        return issues;
    }
    if key.contains('"') || key.contains('\'') {
        issues.push(ConfigIssue::warning(format!(
            "{name} contains quote characters; remove the quotes from the env file"
        )));
    }
    if key.chars().any(char::is_whitespace) {
        issues.push(ConfigIssue::warning(format!("{name} contains whitespace")));
    }
    issues
}

/// Render a credential for logs as `prefix…suffix`.
///
/// Short keys are fully masked rather than leaking most of their content.
/// Counts characters rather than bytes: pasted keys are exactly where
/// multi-byte characters (smart quotes and the like) show up.
#[must_use]
pub fn redact(key: &str) -> String {
    let count = key.chars().count();
    if count <= 14 {
        return "****".to_string();
    }
    let prefix: String = key.chars().take(10).collect();
    let suffix: String = key.chars().skip(count - 4).collect();
    format!("{prefix}...{suffix}")
}
