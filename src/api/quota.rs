//! Message-quota info. The local build has no billing; limits are static and
//! generous, and the reset clock still follows the original daily cadence.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Local, LocalResult, NaiveTime};
use serde_json::json;

const DAILY_CREDITS: u64 = 1_000_000;

/// GET /api/messages/remaining
pub async fn remaining_messages() -> impl IntoResponse {
    let reset = next_reset_time();

    let mut headers = HeaderMap::new();
    headers.insert("x-credits-limit", HeaderValue::from(DAILY_CREDITS));
    headers.insert("x-credits-remaining", HeaderValue::from(DAILY_CREDITS));
    headers.insert(
        "x-credits-reset",
        HeaderValue::from(reset.timestamp_millis() as u64),
    );

    (
        StatusCode::OK,
        headers,
        Json(json!({
            "remaining": DAILY_CREDITS,
            "maxLimit": DAILY_CREDITS,
            "reset": reset.to_rfc3339(),
            "isAuthenticated": false,
        })),
    )
}

/// Midnight at the start of the next local day.
fn next_reset_time() -> DateTime<Local> {
    let now = Local::now();
    let tomorrow = now.date_naive().succ_opt().unwrap_or(now.date_naive());
    match tomorrow.and_time(NaiveTime::MIN).and_local_timezone(Local) {
        LocalResult::Single(reset) | LocalResult::Ambiguous(reset, _) => reset,
        // A DST gap at midnight leaves no reset instant today; fall back.
        LocalResult::None => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn reset_is_the_upcoming_midnight() {
        let reset = next_reset_time();
        assert!(reset > Local::now());
        assert_eq!(reset.hour(), 0);
        assert_eq!(reset.minute(), 0);
        assert_eq!(reset.second(), 0);
    }
}
