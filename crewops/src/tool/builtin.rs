//! Built-in tools: note storage, news search, weather lookup.
//!
//! The note tools append to and read from a plain text file. The remote tools
//! return the service's response body verbatim; the model extracts what it
//! needs.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConfigError, Error, Result};

use super::{Tool, ToolDefinition};

/// Environment variable holding the Serper credential.
pub const SERPER_API_KEY_VAR: &str = "SERPER_API_KEY";

/// Environment variable holding the WeatherAPI credential.
pub const WEATHER_API_KEY_VAR: &str = "WEATHER_API_KEY";

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| Error::tool(tool, format!("invalid arguments: {e}")))
}

/// Appends a note to a text file.
#[derive(Debug, Clone)]
pub struct AddNote {
    path: PathBuf,
}

#[derive(Deserialize)]
struct AddNoteArgs {
    message: String,
}

impl AddNote {
    /// Create the tool over the given note file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Tool for AddNote {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "add_note",
            "Append a new note to the note file.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string", "description": "The note content to be added"}
                },
                "required": ["message"]
            }),
        )
    }

    async fn invoke(&self, args: Value) -> Result<String> {
        let args: AddNoteArgs = parse_args("add_note", args)?;
        let mut content = std::fs::read_to_string(&self.path).unwrap_or_default();
        content.push_str(&args.message);
        content.push('\n');
        std::fs::write(&self.path, content)
            .map_err(|e| Error::tool("add_note", e.to_string()))?;
        Ok("Note saved!".to_string())
    }
}

/// Reads every note from the note file.
#[derive(Debug, Clone)]
pub struct ReadNotes {
    path: PathBuf,
}

impl ReadNotes {
    /// Create the tool over the given note file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Tool for ReadNotes {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "read_notes",
            "Read and return all notes from the note file.",
            serde_json::json!({"type": "object", "properties": {}}),
        )
    }

    async fn invoke(&self, _args: Value) -> Result<String> {
        let content = std::fs::read_to_string(&self.path).unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            Ok("No notes yet.".to_string())
        } else {
            Ok(content.to_string())
        }
    }
}

/// Fetches search results from Google News via Serper.
#[derive(Clone)]
pub struct SearchNews {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for SearchNews {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNews").field("api_key", &"[REDACTED]").finish()
    }
}

#[derive(Deserialize)]
struct SearchNewsArgs {
    query: String,
}

impl SearchNews {
    /// Create the tool with an explicit credential.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), api_key: api_key.into() }
    }

    /// Create the tool with the credential from `SERPER_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when the variable is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(SERPER_API_KEY_VAR)
            .map_err(|_| ConfigError::MissingVar(SERPER_API_KEY_VAR.to_string()))?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl Tool for SearchNews {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "search_news",
            "Fetch search results from Google News via Serper.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "The search query"}
                },
                "required": ["query"]
            }),
        )
    }

    async fn invoke(&self, args: Value) -> Result<String> {
        let args: SearchNewsArgs = parse_args("search_news", args)?;
        let response = self
            .http
            .post("https://google.serper.dev/news")
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({"q": args.query, "num": 10}))
            .send()
            .await
            .map_err(|e| Error::tool("search_news", e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| Error::tool("search_news", e.to_string()))
    }
}

/// Fetches current weather for a city via WeatherAPI.
#[derive(Clone)]
pub struct FetchWeather {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for FetchWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchWeather").field("api_key", &"[REDACTED]").finish()
    }
}

#[derive(Deserialize)]
struct FetchWeatherArgs {
    city: String,
}

impl FetchWeather {
    /// Create the tool with an explicit credential.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), api_key: api_key.into() }
    }

    /// Create the tool with the credential from `WEATHER_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when the variable is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(WEATHER_API_KEY_VAR)
            .map_err(|_| ConfigError::MissingVar(WEATHER_API_KEY_VAR.to_string()))?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl Tool for FetchWeather {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fetch_weather",
            "Fetch current weather for a city.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "The city to look up"}
                },
                "required": ["city"]
            }),
        )
    }

    async fn invoke(&self, args: Value) -> Result<String> {
        let args: FetchWeatherArgs = parse_args("fetch_weather", args)?;
        let response = self
            .http
            .get("http://api.weatherapi.com/v1/current.json")
            .query(&[("key", self.api_key.as_str()), ("q", &args.city), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| Error::tool("fetch_weather", e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| Error::tool("fetch_weather", e.to_string()))
    }
}
