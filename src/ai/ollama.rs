//! Ollama upstream adapter: liveness probe plus the newline-delimited JSON
//! chat stream decoder.

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::json;

use super::providers::{AIProvider, ChatRequest, ProviderError, StreamingChunk, StreamingResponse};
use crate::config::OllamaConfig;

const SERVICE_UNAVAILABLE: &str = "Ollama service is not running or not accessible";

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Probe the daemon before the main call so connection failures surface as
    /// a descriptive error instead of an ambiguous timeout. Any 2xx is alive.
    async fn check_health(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                if let Ok(version) = response.text().await {
                    tracing::debug!(%version, "daemon version probe ok");
                }
                Ok(())
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "daemon version probe returned non-success");
                Err(ProviderError::ServiceUnavailable(SERVICE_UNAVAILABLE.to_string()))
            }
            Err(err) => {
                tracing::warn!(error = %err, "daemon version probe failed");
                Err(ProviderError::ServiceUnavailable(SERVICE_UNAVAILABLE.to_string()))
            }
        }
    }
}

#[async_trait]
impl AIProvider for OllamaProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<StreamingResponse, ProviderError> {
        self.check_health().await?;

        tracing::debug!(model = %request.model, messages = request.messages.len(), "opening chat stream");
        let body = json!({
            "model": request.model,
            "messages": request.messages,
            "stream": true,
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.config.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UpstreamStatus { status, body });
        }

        let byte_stream = response.bytes_stream().map_err(ProviderError::from);
        Ok(Box::pin(decode_chat_stream(byte_stream)))
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

/// Split a byte stream into newline-delimited JSON records and decode each
/// independently. Blank lines are skipped; a malformed line is logged and
/// skipped so protocol noise cannot kill a healthy session. A record with
/// `done: true` ends the stream.
fn decode_chat_stream<S>(byte_stream: S) -> impl Stream<Item = Result<StreamingChunk, ProviderError>> + Send
where
    S: Stream<Item = Result<Bytes, ProviderError>> + Send + 'static,
{
    try_stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut buffer = String::new();
        let mut finished = false;

        'read: while let Some(bytes) = byte_stream.next().await {
            let bytes = bytes?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim().to_string();
                buffer.drain(..=newline);
                if line.is_empty() {
                    continue;
                }
                match parse_chat_line(&line) {
                    Some(chunk) => {
                        finished = chunk.finish_reason.is_some();
                        yield chunk;
                        if finished {
                            break 'read;
                        }
                    }
                    None => tracing::warn!(%line, "skipping malformed upstream line"),
                }
            }
        }

        if !finished {
            let tail = buffer.trim().to_string();
            if !tail.is_empty() {
                match parse_chat_line(&tail) {
                    Some(chunk) => yield chunk,
                    None => tracing::warn!(line = %tail, "skipping malformed upstream line"),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatStreamLine {
    message: Option<ChatLineMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChatLineMessage {
    content: Option<String>,
}

/// Decode one record. Empty content is treated as no content, matching the
/// daemon's idle keep-alive records.
fn parse_chat_line(line: &str) -> Option<StreamingChunk> {
    let parsed: ChatStreamLine = serde_json::from_str(line).ok()?;
    Some(StreamingChunk {
        content: parsed
            .message
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty()),
        finish_reason: parsed.done.then(|| "stop".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunked(parts: &[&str]) -> impl Stream<Item = Result<Bytes, ProviderError>> + Send {
        let parts: Vec<Result<Bytes, ProviderError>> = parts
            .iter()
            .map(|part| Ok(Bytes::from(part.to_string())))
            .collect();
        stream::iter(parts)
    }

    async fn collect_chunks(
        byte_stream: impl Stream<Item = Result<Bytes, ProviderError>> + Send + 'static,
    ) -> Vec<StreamingChunk> {
        decode_chat_stream(byte_stream)
            .map(|result| result.expect("stream should not fail"))
            .collect()
            .await
    }

    #[test]
    fn parses_content_record() {
        let chunk = parse_chat_line(r#"{"message":{"content":"Hi"}}"#).unwrap();
        assert_eq!(chunk.content.as_deref(), Some("Hi"));
        assert!(chunk.finish_reason.is_none());
    }

    #[test]
    fn parses_done_record() {
        let chunk = parse_chat_line(r#"{"done":true}"#).unwrap();
        assert!(chunk.content.is_none());
        assert_eq!(chunk.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn empty_content_is_dropped() {
        let chunk = parse_chat_line(r#"{"message":{"content":""}}"#).unwrap();
        assert!(chunk.content.is_none());
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(parse_chat_line("not json").is_none());
    }

    #[tokio::test]
    async fn yields_deltas_until_done_marker() {
        let chunks = collect_chunks(chunked(&[
            "{\"message\":{\"content\":\"Hi\"}}\n",
            "{\"message\":{\"content\":\" there\"},\"done\":true}\n",
        ]))
        .await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.as_deref(), Some("Hi"));
        assert_eq!(chunks[1].content.as_deref(), Some(" there"));
        assert_eq!(chunks[1].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn malformed_line_does_not_end_the_stream() {
        let chunks = collect_chunks(chunked(&[
            "{\"message\":{\"content\":\"a\"}}\n{not json}\n{\"message\":{\"content\":\"b\"}}\n",
        ]))
        .await;

        let contents: Vec<_> = chunks.iter().filter_map(|c| c.content.as_deref()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn reassembles_records_split_across_chunks() {
        let chunks = collect_chunks(chunked(&[
            "{\"message\":{\"con",
            "tent\":\"Hello\"}}\n",
        ]))
        .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn skips_blank_lines() {
        let chunks = collect_chunks(chunked(&[
            "\n\n{\"message\":{\"content\":\"x\"}}\n\n",
        ]))
        .await;

        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn records_after_done_marker_are_ignored() {
        let chunks = collect_chunks(chunked(&[
            "{\"done\":true}\n{\"message\":{\"content\":\"late\"}}\n",
        ]))
        .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn flushes_trailing_record_without_newline() {
        let chunks = collect_chunks(chunked(&["{\"message\":{\"content\":\"tail\"}}"])).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.as_deref(), Some("tail"));
    }
}
