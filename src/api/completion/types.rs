//! Request validation and SSE event payload types for the completion relay.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::utils::normalize_markdown_content;
use crate::ai::providers::ChatMessage;

/// Inbound completion body before validation. Every field is optional so a
/// malformed or empty body still deserializes and fails validation with
/// field-level diagnostics instead of a generic parse error.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCompletionRequest {
    pub thread_id: Option<String>,
    pub thread_item_id: Option<String>,
    pub parent_thread_item_id: Option<String>,
    pub prompt: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub mode: Option<String>,
}

impl RawCompletionRequest {
    /// Check required fields, collecting per-field diagnostics. `threadId` and
    /// `threadItemId` are required for event correlation; at least one of
    /// `prompt`/`messages` must carry the turn's content.
    pub fn validate(self) -> Result<CompletionRequest, Value> {
        let mut details = serde_json::Map::new();

        if self.thread_id.as_deref().map_or(true, |v| v.trim().is_empty()) {
            details.insert("threadId".to_string(), json!(["Required"]));
        }
        if self
            .thread_item_id
            .as_deref()
            .map_or(true, |v| v.trim().is_empty())
        {
            details.insert("threadItemId".to_string(), json!(["Required"]));
        }

        let has_prompt = self.prompt.as_deref().is_some_and(|p| !p.trim().is_empty());
        let has_messages = self.messages.as_ref().is_some_and(|m| !m.is_empty());
        if !has_prompt && !has_messages {
            details.insert(
                "prompt".to_string(),
                json!(["Either prompt or messages is required"]),
            );
        }

        if !details.is_empty() {
            return Err(Value::Object(details));
        }

        Ok(CompletionRequest {
            thread_id: self.thread_id.unwrap_or_default(),
            thread_item_id: self.thread_item_id.unwrap_or_default(),
            parent_thread_item_id: self.parent_thread_item_id,
            prompt: self.prompt,
            messages: self.messages,
            mode: self.mode,
        })
    }
}

/// One validated chat turn. Immutable for the lifetime of its relay session.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub thread_id: String,
    pub thread_item_id: String,
    pub parent_thread_item_id: Option<String>,
    pub prompt: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub mode: Option<String>,
}

impl CompletionRequest {
    /// Messages for the upstream call, falling back to a single user turn
    /// built from the prompt when no message list was supplied.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        match &self.messages {
            Some(messages) if !messages.is_empty() => messages.clone(),
            _ => vec![ChatMessage::user(self.prompt.clone().unwrap_or_default())],
        }
    }

    /// Correlation fields attached to every emitted event.
    pub fn scope(&self) -> EventScope {
        EventScope {
            thread_id: self.thread_id.clone(),
            thread_item_id: self.thread_item_id.clone(),
            parent_thread_item_id: self.parent_thread_item_id.clone(),
        }
    }
}

// ============================================
// SSE Event Data Structures
// ============================================

/// Identifiers every event carries so the client can correlate deltas to its
/// thread state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScope {
    pub thread_id: String,
    pub thread_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_thread_item_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
    #[serde(flatten)]
    pub scope: EventScope,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerText {
    pub text: String,
}

/// Cumulative answer snapshot. The client replaces its displayed text on each
/// event rather than appending, so a dropped frame never corrupts the output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerData {
    #[serde(flatten)]
    pub scope: EventScope,
    pub answer: AnswerText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl AnswerData {
    pub fn new(request: &CompletionRequest, text: &str) -> Self {
        Self {
            scope: request.scope(),
            answer: AnswerText {
                text: normalize_markdown_content(text),
            },
            query: request.prompt.clone(),
            mode: request.mode.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoneStatus {
    Complete,
    Aborted,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoneData {
    #[serde(flatten)]
    pub scope: EventScope,
    pub status: DoneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================
// SSE Event Enum
// ============================================

crate::sse_event_enum! {
    #[derive(Debug, Clone, Serialize)]
    pub enum CompletionStreamEvent {
        Start(StartData),
        Answer(AnswerData),
        Done(DoneData),
    }
}
