use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::ai::providers::AIProvider;
use crate::api;

/// Assemble the REST router. All application routes live under /api; the
/// inference provider is injected so handlers stay testable.
pub fn create_router(provider: Arc<dyn AIProvider>) -> Router {
    let api_routes = Router::new()
        .route(
            "/completion",
            post(api::completion::completion_stream).options(api::completion::completion_preflight),
        )
        .route("/feedback", post(api::feedback::submit_feedback))
        .route(
            "/db",
            get(api::records::list_records).post(api::records::ingest_records),
        )
        .route("/messages/remaining", get(api::quota::remaining_messages))
        .route("/health", get(health))
        .layer(Extension(provider));

    Router::new().nest("/api", api_routes)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "floatchat server is running"
    }))
}
