use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use hivemesh_common::{IntakeRecord, NodeRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("integer value out of range for storage: {0}")]
    OutOfRange(#[from] std::num::TryFromIntError),
}

/// Heartbeat records, keyed by `node_id`. At most one record per node; an
/// upsert fully replaces the previous record (last write wins, no merge).
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn upsert_node(&self, record: NodeRecord) -> Result<(), StoreError>;

    /// All records with `last_heartbeat` strictly after `cutoff`, in
    /// store-defined order. Empty when none qualify.
    async fn nodes_seen_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<NodeRecord>, StoreError>;
}

/// Append-only request log. Appends are atomic per record and keep arrival
/// order; records are never mutated or deleted here.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Appends one record and returns the number of records stored afterwards.
    async fn append_request(&self, record: IntakeRecord) -> Result<u64, StoreError>;

    async fn list_requests(&self) -> Result<Vec<IntakeRecord>, StoreError>;
}
