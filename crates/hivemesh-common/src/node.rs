use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A node is "active" while its last heartbeat is younger than this window.
pub const LIVENESS_WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HardwareInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_vram_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_gb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_mbps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitsInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens_per_message: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_messages_per_minute: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// The model served by this node (e.g., "Qwen/Qwen2.5-0.5B-Instruct")
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_display: Option<bool>,
}

/// Heartbeat payload as reported by a community node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    pub node_id: String,
    pub status: String,
    pub uptime_seconds: u64,
    pub hardware: HardwareInfo,
    pub network: NetworkInfo,
    pub limits: LimitsInfo,
    pub model: ModelInfo,
    pub host_info: HostInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_shutdown: Option<String>,
}

/// A stored heartbeat: the reported status plus the server-assigned receipt time.
/// One record per `node_id`; each heartbeat fully replaces the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRecord {
    #[serde(flatten)]
    pub status: NodeStatus,
    pub last_heartbeat: DateTime<Utc>,
}

impl NodeRecord {
    /// Strict comparison: a node whose heartbeat is exactly
    /// `LIVENESS_WINDOW_SECS` old is no longer active.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.last_heartbeat > liveness_cutoff(now)
    }
}

pub fn liveness_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::seconds(LIVENESS_WINDOW_SECS)
}
