use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use hivemesh_common::{IntakeRecord, NodeRecord};

use crate::types::{NodeStore, RequestStore, StoreError};

/// Process-local store. The write lock is the single mutual-exclusion section:
/// upserts are atomic per key and appends keep arrival order under concurrent
/// callers.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<String, NodeRecord>,
    requests: Vec<IntakeRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn upsert_node(&self, record: NodeRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.nodes.insert(record.status.node_id.clone(), record);
        Ok(())
    }

    async fn nodes_seen_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<NodeRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .nodes
            .values()
            .filter(|r| r.last_heartbeat > cutoff)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn append_request(&self, record: IntakeRecord) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        inner.requests.push(record);
        Ok(inner.requests.len() as u64)
    }

    async fn list_requests(&self) -> Result<Vec<IntakeRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.requests.clone())
    }
}
