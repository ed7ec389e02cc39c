//! In-memory ingestion endpoint for ARGO float records.
//!
//! The store stands in for a database while prototyping: append-only, single
//! process, lost on restart. Entries are validated for field presence only,
//! matching the ingestion contract rather than a typed schema.

use axum::http::StatusCode;
use axum::Json;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::api::errors::{ApiResult, AppError};

/// Fields every ARGO float record must carry.
const REQUIRED_FIELDS: [&str; 5] = ["float_id", "timestamp", "lat", "lon", "depth"];

/// How many ingested entries the response echoes back.
const PREVIEW_LEN: usize = 3;

pub type Record = Map<String, Value>;

#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<Record>>,
}

#[derive(Debug)]
pub struct IngestSummary {
    pub ingested_count: usize,
    pub errors: Vec<String>,
    pub preview: Vec<Record>,
}

impl RecordStore {
    /// Keep entries that carry all required fields; report the rest by index.
    pub async fn ingest(&self, data: Vec<Value>) -> IngestSummary {
        let mut errors = Vec::new();
        let mut valid: Vec<Record> = Vec::new();

        for (idx, entry) in data.into_iter().enumerate() {
            let Some(entry) = entry.as_object().cloned() else {
                errors.push(format!("Entry {} is not an object", idx));
                continue;
            };
            let missing: Vec<&str> = REQUIRED_FIELDS
                .iter()
                .copied()
                .filter(|field| !entry.contains_key(*field))
                .collect();
            if missing.is_empty() {
                valid.push(entry);
            } else {
                errors.push(format!("Entry {} missing fields: {}", idx, missing.join(", ")));
            }
        }

        let preview: Vec<Record> = valid.iter().take(PREVIEW_LEN).cloned().collect();
        let ingested_count = valid.len();
        self.records.write().await.extend(valid);

        IngestSummary {
            ingested_count,
            errors,
            preview,
        }
    }

    pub async fn all(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }
}

static RECORD_STORE: Lazy<RecordStore> = Lazy::new(RecordStore::default);

/// POST /api/db — validate and store a batch of float records.
pub async fn ingest_records(Json(body): Json<Value>) -> ApiResult<Json<Value>> {
    let meta = body.get("meta").cloned();
    let data = match body.get("data") {
        Some(Value::Array(items)) => items.clone(),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                AppError::invalid_request("Request body must have a data array."),
            ))
        }
    };

    let summary = RECORD_STORE.ingest(data).await;
    tracing::info!(
        ingested = summary.ingested_count,
        rejected = summary.errors.len(),
        "record batch ingested",
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "ingested_count": summary.ingested_count,
            "errors": summary.errors,
            "preview": summary.preview,
            "meta": meta.unwrap_or(Value::Null),
        })),
    ))
}

/// GET /api/db — return everything stored so far.
pub async fn list_records() -> ApiResult<Json<Value>> {
    Ok((
        StatusCode::OK,
        Json(json!({ "storedData": RECORD_STORE.all().await })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(float_id: &str) -> Value {
        json!({
            "float_id": float_id,
            "timestamp": "2024-03-01T00:00:00Z",
            "lat": -31.5,
            "lon": 72.4,
            "depth": 1000.0,
            "temperature": 4.2,
        })
    }

    #[tokio::test]
    async fn stores_valid_entries_and_reports_invalid_ones() {
        let store = RecordStore::default();
        let summary = store
            .ingest(vec![
                record("argo-1"),
                json!({"float_id": "argo-2", "timestamp": "2024-03-01T00:00:00Z"}),
                record("argo-3"),
            ])
            .await;

        assert_eq!(summary.ingested_count, 2);
        assert_eq!(summary.errors, vec!["Entry 1 missing fields: lat, lon, depth"]);
        assert_eq!(store.all().await.len(), 2);
    }

    #[tokio::test]
    async fn preview_is_capped() {
        let store = RecordStore::default();
        let batch = (0..5).map(|i| record(&format!("argo-{i}"))).collect();
        let summary = store.ingest(batch).await;

        assert_eq!(summary.ingested_count, 5);
        assert_eq!(summary.preview.len(), 3);
    }

    #[tokio::test]
    async fn non_object_entries_are_rejected() {
        let store = RecordStore::default();
        let summary = store.ingest(vec![json!(42), record("argo-1")]).await;

        assert_eq!(summary.ingested_count, 1);
        assert_eq!(summary.errors, vec!["Entry 0 is not an object"]);
    }
}
