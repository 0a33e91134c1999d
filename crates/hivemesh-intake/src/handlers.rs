use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use hivemesh_common::{error_response, IntakeRecord, QueuedRequest, ValidatedJson};

use crate::state::AppState;

pub async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Stamps the receipt time and appends. The answer carries the store size so
/// callers can watch the queue grow.
pub async fn receive_request(
    State(st): State<AppState>,
    ValidatedJson(payload): ValidatedJson<QueuedRequest>,
) -> Response {
    let record = IntakeRecord {
        request: payload,
        received_at: Utc::now(),
    };
    match st.requests.append_request(record).await {
        Ok(stored_count) => {
            Json(json!({"status": "ok", "stored_count": stored_count})).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "request append failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to store request",
            )
            .into_response()
        }
    }
}

/// Everything stored so far, in arrival order. Unpaginated by design.
pub async fn list_requests(State(st): State<AppState>) -> Response {
    match st.requests.list_requests().await {
        Ok(requests) => Json(requests).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "request listing failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to list requests",
            )
            .into_response()
        }
    }
}
