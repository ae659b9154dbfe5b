//! Configuration resolved once at startup from CLI arguments and the process
//! environment (after the optional `.env` file has been loaded).

use crate::groq_client::DEFAULT_BASE_URL;

pub const DEFAULT_PROVIDER: &str = "Groq (Free)";
pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";

/// LLM settings for the chat agent.
#[derive(Clone)]
pub struct AgentConfig {
    pub provider: String,
    pub model_name: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl AgentConfig {
    /// Explicit values win; otherwise `MODEL_NAME`, `GROQ_API_KEY` and
    /// `GROQ_BASE_URL` are read from the environment. An empty key counts as
    /// missing.
    pub fn resolve(
        api_key: Option<String>,
        provider: Option<String>,
        model_name: Option<String>,
    ) -> Self {
        Self {
            provider: provider.unwrap_or_else(|| DEFAULT_PROVIDER.to_owned()),
            model_name: model_name
                .or_else(|| non_empty_env("MODEL_NAME"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            api_key: api_key
                .filter(|k| !k.trim().is_empty())
                .or_else(|| non_empty_env("GROQ_API_KEY")),
            base_url: env_or("GROQ_BASE_URL", DEFAULT_BASE_URL),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Runtime configuration for the HTTP API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// JSON song dataset (default: `"data/songs.json"`).
    pub dataset_path: String,

    /// Comma-separated allowed CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// Emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("VIBECHECK_BIND", "0.0.0.0:8000"),
            dataset_path: env_or("VIBECHECK_DATASET", "data/songs.json"),
            cors_allowed_origins: non_empty_env("VIBECHECK_CORS_ORIGINS"),
            log_level: env_or("VIBECHECK_LOG", "info"),
            log_json: std::env::var("VIBECHECK_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

pub fn default_api_url() -> String {
    env_or("VIBECHECK_API_URL", "http://localhost:8000")
}

fn env_or(key: &str, default: &str) -> String {
    non_empty_env(key).unwrap_or_else(|| default.to_owned())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
