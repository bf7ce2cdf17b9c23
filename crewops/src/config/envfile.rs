//! Environment file loading.
//!
//! Reads newline-delimited `KEY=VALUE` pairs from a file, the format used for
//! credentials in this crate. Values must not be quoted in the file; when they
//! are, the surrounding quote pair is stripped so a quoted credential does not
//! travel downstream and break authentication in a way that is miserable to
//! diagnose (the request simply comes back 401 with a key that "looks right").

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// A parsed environment file.
///
/// Primary access is through [`EnvFile::get`]; [`EnvFile::export`] pushes the
/// entries into process-wide environment state for code that reads
/// `std::env::var` directly.
///
/// # Example
///
/// ```rust,ignore
/// let env = EnvFile::load(".env")?;
/// let key = env.get("GROQ_API_KEY");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    entries: BTreeMap<String, String>,
}

impl EnvFile {
    /// Load and parse an environment file.
    ///
    /// Blank lines and lines starting with `#` are skipped. An optional
    /// `export ` prefix is accepted. Lines without a `=` or with an empty key
    /// are skipped with a warning rather than failing the whole load.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let file = Self::parse(&content);
        debug!(path = %path.display(), entries = file.len(), "loaded env file");
        Ok(file)
    }

    /// Parse env-file content from a string.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                warn!(line = lineno + 1, "skipping env line without '='");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                warn!(line = lineno + 1, "skipping env line with empty key");
                continue;
            }
            entries.insert(key.to_string(), strip_quotes(value.trim()).to_string());
        }
        Self { entries }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the file contained no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Write every entry into process-wide environment state, overriding
    /// variables that already exist.
    ///
    /// This is a one-shot operation for process start. `std::env::set_var` is
    /// not thread-safe: call this before spawning any threads or the async
    /// runtime.
    #[allow(unsafe_code)]
    pub fn export(&self) {
        for (key, value) in &self.entries {
            // Safety: the documented contract above confines this to
            // single-threaded process startup.
            unsafe { std::env::set_var(key, value) };
        }
        debug!(entries = self.len(), "exported env file into process environment");
    }
}

/// Strip one pair of matching surrounding quote characters from a value.
///
/// `"value"` and `'value'` both yield `value`; a lone or mismatched quote is
/// left alone, as are quotes inside the value.
#[must_use]
pub fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_quoted_value_is_unwrapped() {
        let env = EnvFile::parse("KEY=\"value\"\n");
        assert_eq!(env.get("KEY"), Some("value"));
    }

    #[test]
    fn single_quoted_value_is_unwrapped() {
        let env = EnvFile::parse("KEY='value'\n");
        assert_eq!(env.get("KEY"), Some("value"));
    }

    #[test]
    fn unquoted_value_is_verbatim() {
        let env = EnvFile::parse("GROQ_API_KEY=gsk_abc123\n");
        assert_eq!(env.get("GROQ_API_KEY"), Some("gsk_abc123"));
    }

    #[test]
    fn inner_and_mismatched_quotes_survive() {
        assert_eq!(strip_quotes("ab\"cd"), "ab\"cd");
        assert_eq!(strip_quotes("\"open"), "\"open");
        assert_eq!(strip_quotes("'mixed\""), "'mixed\"");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn comments_blanks_and_export_prefix() {
        let env = EnvFile::parse(
            "# credentials\n\nexport TRACE_KEY=abc\nWEIRD LINE\nMODEL_BASE=http://localhost:11434\n",
        );
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("TRACE_KEY"), Some("abc"));
        assert_eq!(env.get("MODEL_BASE"), Some("http://localhost:11434"));
    }

    #[test]
    fn split_is_on_first_equals_only() {
        let env = EnvFile::parse("URL=http://host/path?a=b\n");
        assert_eq!(env.get("URL"), Some("http://host/path?a=b"));
    }

    #[test]
    fn later_entries_override_earlier_ones() {
        let env = EnvFile::parse("K=one\nK=two\n");
        assert_eq!(env.get("K"), Some("two"));
    }
}
