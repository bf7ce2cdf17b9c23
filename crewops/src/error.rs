//! Unified error types for the crewops crate.
//!
//! Errors fall into two operational categories:
//!
//! - **Fatal**: a missing or malformed provider credential, an unbound agent
//!   or manager, an authentication failure from the model provider. These
//!   abort the run with a clear message.
//! - **Benign**: upload failures from the tracing backend, most notably
//!   authorization rejections under a constrained service tier. These are
//!   caught inside the trace layer, logged at low severity, and never change
//!   the outcome of a run. See [`TraceError::is_benign`].

use std::fmt;

/// Result type alias for crewops operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the crewops crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Trace session error.
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Crew assembly failed the completeness checklist.
    ///
    /// Carries every error-level issue found, so the caller sees the full
    /// checklist result rather than the first failure.
    #[error("crew assembly failed: {}", issues.join("; "))]
    Assembly {
        /// Human-readable descriptions of each error-level issue.
        issues: Vec<String>,
    },

    /// All retry attempts were exhausted during crew execution.
    #[error("crew execution failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Message of the final attempt's error.
        last_error: String,
    },

    /// A tool invocation failed.
    #[error("tool '{tool}' failed: {message}")]
    Tool {
        /// Name of the failing tool.
        tool: String,
        /// What went wrong.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an assembly error from a list of issue descriptions.
    #[must_use]
    pub fn assembly(issues: Vec<String>) -> Self {
        Self::Assembly { issues }
    }

    /// Create a tool invocation error.
    #[must_use]
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }
}

/// Error type for LLM provider operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "groq", "ollama").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional HTTP status from the provider.
    pub status: Option<u16>,
}

/// Categories of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Missing credential at binding construction time.
    MissingCredential,
    /// Rate limit or quota exceeded.
    RateLimited,
    /// Invalid request parameters.
    InvalidRequest,
    /// Response did not match the expected format.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// Provider-side error.
    Provider,
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Auth,
            provider: Some(provider.into()),
            message: message.into(),
            status: None,
        }
    }

    /// Create a missing-credential error.
    ///
    /// Raised when a remote binding is constructed without an API key. This
    /// is the fatal path: aborting here is what prevents the surrounding
    /// machinery from ever falling back to a default paid provider.
    #[must_use]
    pub fn missing_credential(provider: impl Into<String>, env_var: &str) -> Self {
        let provider = provider.into();
        Self {
            message: format!(
                "no API key configured for provider '{provider}' (set {env_var} or pass \
                 .api_key() on the binding builder)"
            ),
            kind: LlmErrorKind::MissingCredential,
            provider: Some(provider),
            status: None,
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            provider: Some(provider.into()),
            message: message.into(),
            status: Some(429),
        }
    }

    /// Create an invalid-request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::InvalidRequest,
            provider: None,
            message: message.into(),
            status: None,
        }
    }

    /// Create a network error for a transport-level failure.
    ///
    /// Connection resets and refused connections are transient, so this kind
    /// is retryable.
    #[must_use]
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            provider: Some(provider.into()),
            message: message.into(),
            status: None,
        }
    }

    /// Create a response-format error.
    #[must_use]
    pub fn response_format(expected: &str, got: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ResponseFormat,
            provider: None,
            message: format!("expected {expected}, got {}", got.into()),
            status: None,
        }
    }

    /// Create a provider-side error from an HTTP status and body.
    #[must_use]
    pub fn from_status(provider: impl Into<String>, status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => LlmErrorKind::Auth,
            429 => LlmErrorKind::RateLimited,
            400..=499 => LlmErrorKind::InvalidRequest,
            _ => LlmErrorKind::Provider,
        };
        Self {
            kind,
            provider: Some(provider.into()),
            message: body.chars().take(512).collect(),
            status: Some(status),
        }
    }

    /// Returns `true` if retrying the request may succeed.
    ///
    /// Authentication and request-shape failures are deterministic; retrying
    /// them only burns the backoff budget.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            LlmErrorKind::RateLimited | LlmErrorKind::Network | LlmErrorKind::Provider
        )
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

/// Error type for trace session operations.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum TraceError {
    /// An operation required an active session, but the session was never
    /// started. Observed failure mode when ordering is violated: spans land
    /// on the backend with no parent and the dashboard reports "trace not
    /// found".
    #[error("trace session is not active; start the session before constructing agents or crews")]
    NotStarted,

    /// `end` was called more than once.
    #[error("trace session already ended with status '{status}'")]
    AlreadyEnded {
        /// The status the session was originally ended with.
        status: String,
    },

    /// The backend rejected a request.
    #[error("trace backend returned HTTP {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        message: String,
    },

    /// The session could not be started at all.
    #[error("failed to start trace session: {0}")]
    StartFailed(String),
}

impl TraceError {
    /// Returns `true` for failures that are expected under a constrained
    /// service tier and must never interrupt execution.
    ///
    /// Free-tier accounts reject detail-metric uploads with 401/403; the
    /// session itself keeps working, so these are logged at debug level and
    /// swallowed.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::Backend { status: 401 | 403, .. })
    }
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// IO error while reading the configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    /// A value failed validation.
    #[error("invalid config value for {key}: {reason}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}
