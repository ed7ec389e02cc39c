//! Provider-facing chat types and the streaming provider seam.

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// One role/content turn sent to the inference daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Outbound chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// One increment read from the daemon's response stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingChunk {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

pub type StreamingResponse =
    Pin<Box<dyn Stream<Item = Result<StreamingChunk, ProviderError>> + Send>>;

/// Failures from the upstream daemon, distinct from pre-stream HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The liveness probe failed; the daemon is down or unreachable.
    #[error("{0}")]
    ServiceUnavailable(String),
    /// The chat endpoint answered with a non-success status.
    #[error("upstream error {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Model identifier sent upstream for each turn.
    fn model(&self) -> &str;

    /// Open a cancellable stream of completion chunks for one chat turn.
    async fn chat_stream(&self, request: ChatRequest) -> Result<StreamingResponse, ProviderError>;

    /// Provider name for logging and diagnostics.
    fn provider_name(&self) -> &'static str;
}
