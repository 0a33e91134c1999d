use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Inference request as submitted by a caller.
///
/// `node_id` is required by the registry variant and absent in the intake
/// variant, so it is optional at the type level and enforced per service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub request_id: String,
    pub user_id: String,
    pub model_name: String,
    pub current_message: Message,
    pub recent_history: Vec<Message>,
    /// Oldest context already compacted away; empty when nothing was summarized.
    #[serde(default)]
    pub summarized_history: String,
    pub hypervars: Map<String, Value>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub stream: bool,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

/// A stored request: the accepted payload plus the server-assigned receipt
/// time. Append-only; never mutated or deleted by this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntakeRecord {
    #[serde(flatten)]
    pub request: QueuedRequest,
    pub received_at: DateTime<Utc>,
}
