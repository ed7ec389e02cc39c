//! Environment-derived configuration with local-mode defaults.

use once_cell::sync::Lazy;

pub static HTTP_PORT: Lazy<u16> = Lazy::new(|| {
    std::env::var("FLOATCHAT_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000)
});

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";

/// Connection settings for the local inference daemon.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
        )
    }
}
