//! User feedback intake. Entries live in a single-process, in-memory store
//! with no durability guarantees; acceptable for the local build only.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::completion::utils::client_ip;
use crate::api::errors::ApiResult;

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub user_id: String,
    pub feedback: String,
    pub metadata: FeedbackMetadata,
}

/// Request metadata stored alongside the feedback text; the client address
/// stands in for a hosted geolocation lookup.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackMetadata {
    pub client: String,
    pub received_at: DateTime<Utc>,
}

static FEEDBACK_STORE: Lazy<RwLock<Vec<FeedbackEntry>>> = Lazy::new(|| RwLock::new(Vec::new()));

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

pub async fn submit_feedback(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<Json<Value>> {
    // Local mode: no accounts, a fixed user id stands in.
    let entry = FeedbackEntry {
        id: Uuid::new_v4(),
        user_id: "local-user".to_string(),
        feedback: request.feedback,
        metadata: FeedbackMetadata {
            client: client_ip(&headers, peer),
            received_at: Utc::now(),
        },
    };

    tracing::info!(id = %entry.id, "feedback received");
    FEEDBACK_STORE.write().await.push(entry);

    Ok((StatusCode::OK, Json(json!({ "message": "Feedback received" }))))
}
