//! HTTP entry points for the completion relay.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Extension;
use futures_util::{Stream, StreamExt};
use serde_json::{json, Value};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::streaming::execute_stream;
use super::types::RawCompletionRequest;
use super::utils::client_ip;
use crate::ai::providers::AIProvider;
use crate::api::errors::{ApiResult, AppError};

/// Keeps idle SSE connections alive through proxies during slow generation.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Relay one chat turn from the local inference daemon as an SSE stream.
///
/// The body is parsed leniently: anything that is not JSON validates like an
/// empty object, so schema failures always come back as one 400 with
/// field-level details rather than a transport-level parse error.
pub async fn completion_stream(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Extension(provider): Extension<Arc<dyn AIProvider>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let parsed: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));
    let raw: RawCompletionRequest = match serde_json::from_value(parsed) {
        Ok(raw) => raw,
        Err(err) => {
            return Err((
                StatusCode::BAD_REQUEST,
                AppError::invalid_request("Invalid request body")
                    .with_details(json!({ "_errors": [err.to_string()] })),
            ))
        }
    };
    let request = match raw.validate() {
        Ok(request) => request,
        Err(details) => {
            return Err((
                StatusCode::BAD_REQUEST,
                AppError::invalid_request("Invalid request body").with_details(details),
            ))
        }
    };

    let client = client_ip(&headers, peer);
    tracing::info!(
        thread_id = %request.thread_id,
        thread_item_id = %request.thread_item_id,
        provider = provider.provider_name(),
        %client,
        "starting completion relay",
    );

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let thread_id = request.thread_id.clone();
    tokio::spawn(execute_stream(
        tx,
        request,
        provider,
        Some(Box::new(move || {
            tracing::debug!(%thread_id, "completion relay teardown hook ran");
        })),
    ));

    let stream =
        UnboundedReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(Event::from(event)));

    Ok((
        StatusCode::OK,
        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(HEARTBEAT_INTERVAL)
                .text("heartbeat"),
        ),
    ))
}

/// Preflight probe for the streaming endpoint: declared headers, no body.
pub async fn completion_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
    )
}
