//! Model bindings.
//!
//! A [`ModelBinding`] is the one opaque handle to a configured language-model
//! endpoint: provider kind, model identifier, optional credential, optional
//! base address, and the connected [`ChatProvider`] it routes to.
//!
//! The handle is constructed **once** and shared as [`SharedModelBinding`]
//! across every agent and the crew manager. Construction is fallible: a remote
//! provider kind with no credential is rejected immediately with a clear
//! message instead of surfacing later as an opaque 401 or, worse, a silent
//! fallback to some default provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use crewops::binding::{ModelBinding, ProviderKind};
//!
//! // Credential resolved from GROQ_API_KEY.
//! let binding = ModelBinding::builder(ProviderKind::Groq, "llama-3.1-8b-instant")
//!     .connect()?;
//!
//! // Local server, no credential required.
//! let local = ModelBinding::builder(ProviderKind::Ollama, "llama3.1")
//!     .base_url("http://localhost:11434/v1")
//!     .connect()?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::chat::{ChatRequest, ChatResponse, SharedChatProvider};
use crate::config::{diagnose_key, redact};
use crate::error::{LlmError, Result};
use crate::providers::OpenAiCompatProvider;

/// Type alias for an Arc-wrapped [`ModelBinding`].
pub type SharedModelBinding = Arc<ModelBinding>;

/// Supported model endpoint families.
///
/// All of them speak the OpenAI-compatible chat completions wire format, so
/// the kind mostly determines the default base address and which environment
/// variable holds the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderKind {
    /// Groq hosted inference.
    Groq,
    /// OpenAI hosted inference.
    OpenAi,
    /// Ollama local server (OpenAI-compatible endpoint).
    Ollama,
}

impl ProviderKind {
    /// Stable lowercase name, used in logs and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Environment variable the credential is resolved from.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Ollama => "OLLAMA_API_KEY",
        }
    }

    /// Environment variable overriding the base address.
    #[must_use]
    pub const fn base_url_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_BASE_URL",
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::Ollama => "OLLAMA_BASE_URL",
        }
    }

    /// Default base address.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Whether this kind requires a credential at connect time.
    #[must_use]
    pub const fn requires_credential(self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque, shareable handle to a configured model endpoint.
///
/// Read-only after construction; agents and the crew manager hold it by
/// reference through [`SharedModelBinding`].
pub struct ModelBinding {
    kind: ProviderKind,
    model: String,
    base_url: String,
    provider: SharedChatProvider,
}

impl fmt::Debug for ModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinding")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

impl ModelBinding {
    /// Create a binding builder for the given provider kind and model.
    #[must_use]
    pub fn builder(kind: ProviderKind, model: impl Into<String>) -> ModelBindingBuilder {
        ModelBindingBuilder {
            kind,
            model: model.into(),
            api_key: None,
            base_url: None,
            provider: None,
        }
    }

    /// Connect using credentials from the environment, with defaults for
    /// everything else.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::missing_credential`] (fatal) when the kind
    /// requires a credential and none is configured.
    pub fn from_env(kind: ProviderKind, model: impl Into<String>) -> Result<SharedModelBinding> {
        Self::builder(kind, model).connect()
    }

    /// Provider kind of this binding.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Model identifier of this binding.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Base address requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat request through this binding's provider.
    ///
    /// The request's model field is filled in from the binding when empty.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`LlmError`].
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        if request.model.is_empty() {
            let mut request = request.clone();
            request.model = self.model.clone();
            self.provider.chat(&request).await
        } else {
            self.provider.chat(request).await
        }
    }
}

/// Builder for [`ModelBinding`].
pub struct ModelBindingBuilder {
    kind: ProviderKind,
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
    provider: Option<SharedChatProvider>,
}

impl fmt::Debug for ModelBindingBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBindingBuilder")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("provider", &self.provider.as_ref().map(|p| p.provider_name()))
            .finish()
    }
}

impl ModelBindingBuilder {
    /// Set the credential explicitly instead of reading the environment.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the base address (hosted proxies, non-default local ports).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Route the binding through an existing provider.
    ///
    /// Used by tests to inject a mock; credential resolution is skipped.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Resolve credentials, validate them, and build the shared binding.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::missing_credential`] when the provider kind
    /// requires a credential and neither the builder nor the environment
    /// supplies one.
    pub fn connect(self) -> Result<SharedModelBinding> {
        let env_api_key = std::env::var(self.kind.api_key_var()).ok();
        self.connect_with(env_api_key)
    }

    fn connect_with(self, env_api_key: Option<String>) -> Result<SharedModelBinding> {
        let kind = self.kind;
        let base_url = self
            .base_url
            .or_else(|| std::env::var(kind.base_url_var()).ok())
            .unwrap_or_else(|| kind.default_base_url().to_string());
        Url::parse(&base_url).map_err(|e| {
            LlmError::invalid_request(format!(
                "base URL '{base_url}' for provider '{}' is not a valid URL: {e}",
                kind.name()
            ))
        })?;

        if let Some(provider) = self.provider {
            return Ok(Arc::new(ModelBinding {
                kind,
                model: self.model,
                base_url,
                provider,
            }));
        }

        let api_key = self.api_key.or(env_api_key);
        if api_key.is_none() && kind.requires_credential() {
            return Err(LlmError::missing_credential(kind.name(), kind.api_key_var()).into());
        }

        if let Some(key) = api_key.as_deref() {
            // A quoted or space-laden key will still "work" locally and only
            // fail at the remote edge, so surface it here.
            for issue in diagnose_key(kind.api_key_var(), Some(key)) {
                warn!("{}", issue.message);
            }
            debug!(
                provider = kind.name(),
                key = %redact(key),
                base_url = %base_url,
                "connected model binding"
            );
        }

        let provider: SharedChatProvider =
            Arc::new(OpenAiCompatProvider::new(kind.name(), &base_url, api_key));

        Ok(Arc::new(ModelBinding {
            kind,
            model: self.model,
            base_url,
            provider,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;

    #[test]
    fn remote_kind_without_credential_is_fatal() {
        let err = ModelBinding::builder(ProviderKind::Groq, "llama-3.1-8b-instant")
            .base_url("https://example.invalid/v1")
            .connect_with(None)
            .unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn local_kind_connects_without_credential() {
        let binding = ModelBinding::builder(ProviderKind::Ollama, "llama3.1")
            .base_url("http://localhost:11434/v1")
            .connect_with(None)
            .expect("local binding should not require a credential");
        assert_eq!(binding.kind(), ProviderKind::Ollama);
        assert_eq!(binding.model(), "llama3.1");
    }

    #[test]
    fn injected_provider_skips_credential_resolution() {
        let mock: SharedChatProvider = Arc::new(MockProvider::new(vec!["ok".into()]));
        let binding = ModelBinding::builder(ProviderKind::Groq, "test-model")
            .provider(mock)
            .connect()
            .expect("injected provider needs no credential");
        assert_eq!(binding.model(), "test-model");
    }

    #[test]
    fn builder_debug_elides_the_credential() {
        let builder =
            ModelBinding::builder(ProviderKind::Groq, "m").api_key("gsk_secret_value");
        let rendered = format!("{builder:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("gsk_secret_value"));
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let err = ModelBinding::builder(ProviderKind::Ollama, "llama3.1")
            .base_url("not a url")
            .connect_with(None)
            .unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));
    }

    #[test]
    fn default_base_urls_are_wired_per_kind() {
        assert!(ProviderKind::Groq.default_base_url().contains("groq"));
        assert!(ProviderKind::Ollama.default_base_url().contains("11434"));
        assert!(!ProviderKind::Ollama.requires_credential());
        assert!(ProviderKind::Groq.requires_credential());
    }
}
