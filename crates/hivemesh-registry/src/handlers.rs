use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use hivemesh_common::{
    error_response, liveness_cutoff, IntakeRecord, NodeRecord, NodeStatus, QueuedRequest,
    ValidatedJson,
};

use crate::state::AppState;

pub async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Stamps the receipt time and upserts by `node_id`; a repeat heartbeat fully
/// replaces the previous record.
pub async fn heartbeat(
    State(st): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NodeStatus>,
) -> Response {
    let node_id = payload.node_id.clone();
    let record = NodeRecord {
        status: payload,
        last_heartbeat: Utc::now(),
    };
    match st.nodes.upsert_node(record).await {
        Ok(()) => {
            tracing::debug!(node_id = %node_id, "heartbeat stored");
            Json(json!({"status": "heartbeat_received"})).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, node_id = %node_id, "heartbeat upsert failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to persist heartbeat",
            )
            .into_response()
        }
    }
}

pub async fn receive_request(
    State(st): State<AppState>,
    ValidatedJson(payload): ValidatedJson<QueuedRequest>,
) -> Response {
    if payload.node_id.is_none() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "node_id is required",
        )
        .into_response();
    }

    let record = IntakeRecord {
        request: payload,
        received_at: Utc::now(),
    };
    match st.requests.append_request(record).await {
        Ok(_) => Json(json!({"status": "request_stored"})).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "request append failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to persist request",
            )
            .into_response()
        }
    }
}

/// Active nodes only: `last_heartbeat` strictly after `now - 60s`. Order is
/// store-defined; an empty array is a normal answer.
pub async fn list_active_nodes(State(st): State<AppState>) -> Response {
    match st.nodes.nodes_seen_since(liveness_cutoff(Utc::now())).await {
        Ok(nodes) => Json(nodes).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "active-node query failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to query nodes",
            )
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hivemesh_common::{
        HardwareInfo, HostInfo, LimitsInfo, Message, ModelInfo, NetworkInfo,
    };
    use hivemesh_store::{MemoryStore, NodeStore, RequestStore};
    use serde_json::{Map, Value};

    fn make_state() -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let st = AppState {
            nodes: Arc::new(store.clone()),
            requests: Arc::new(store.clone()),
        };
        (st, store)
    }

    fn make_status(node_id: &str, status: &str) -> NodeStatus {
        NodeStatus {
            node_id: node_id.to_string(),
            status: status.to_string(),
            uptime_seconds: 900,
            hardware: HardwareInfo {
                cpu: Some("m2".to_string()),
                gpu: None,
                gpu_vram_gb: None,
                ram_gb: Some(16),
            },
            network: NetworkInfo {
                bandwidth_mbps: Some(500),
                latency_ms: None,
            },
            limits: LimitsInfo {
                max_tokens_per_message: None,
                max_messages_per_minute: None,
            },
            model: ModelInfo {
                name: "qwen2.5-0.5b".to_string(),
                quantization: Some("q4".to_string()),
                context_length: None,
            },
            host_info: HostInfo {
                username: Some("ada".to_string()),
                public_display: Some(true),
            },
            planned_shutdown: None,
        }
    }

    fn make_request(node_id: Option<&str>) -> QueuedRequest {
        QueuedRequest {
            node_id: node_id.map(|s| s.to_string()),
            request_id: "req-1".to_string(),
            user_id: "u-1".to_string(),
            model_name: "qwen2.5-0.5b".to_string(),
            current_message: Message {
                role: "user".to_string(),
                content: "hello".to_string(),
            },
            recent_history: Vec::new(),
            summarized_history: String::new(),
            hypervars: Map::new(),
            temperature: 0.7,
            max_tokens: 512,
            stream: false,
        }
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn heartbeat_acknowledges_and_stores_one_record() {
        let (st, store) = make_state();

        let resp = heartbeat(State(st.clone()), ValidatedJson(make_status("n1", "online"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"status": "heartbeat_received"}));

        let first = {
            let nodes = store.nodes_seen_since(liveness_cutoff(Utc::now())).await.unwrap();
            assert_eq!(nodes.len(), 1);
            nodes[0].clone()
        };

        // Second heartbeat for the same node replaces, never duplicates.
        let resp = heartbeat(State(st), ValidatedJson(make_status("n1", "busy"))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let nodes = store.nodes_seen_since(liveness_cutoff(Utc::now())).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].status.status, "busy");
        assert!(nodes[0].last_heartbeat >= first.last_heartbeat);
    }

    #[tokio::test]
    async fn request_without_node_id_is_rejected_before_storage() {
        let (st, store) = make_state();
        let resp = receive_request(State(st), ValidatedJson(make_request(None))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "validation_error");

        assert!(store.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_with_node_id_is_stored() {
        let (st, store) = make_state();
        let resp = receive_request(State(st), ValidatedJson(make_request(Some("n1")))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"status": "request_stored"}));

        let stored = store.list_requests().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].request.node_id.as_deref(), Some("n1"));
    }

    #[tokio::test]
    async fn nodes_endpoint_returns_empty_array_when_nothing_is_active() {
        let (st, _store) = make_state();
        let resp = list_active_nodes(State(st)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));
    }
}
