use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
    PgPool, Row,
};

use hivemesh_common::{
    HardwareInfo, HostInfo, IntakeRecord, LimitsInfo, Message, ModelInfo, NetworkInfo, NodeRecord,
    NodeStatus, QueuedRequest,
};

use crate::types::{NodeStore, RequestStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS node_status (
    node_id            TEXT PRIMARY KEY,
    status             TEXT NOT NULL,
    uptime_seconds     BIGINT NOT NULL,
    hardware           JSONB NOT NULL,
    network            JSONB NOT NULL,
    limits             JSONB NOT NULL,
    model              JSONB NOT NULL,
    host_info          JSONB NOT NULL,
    planned_shutdown   TEXT,
    last_heartbeat     TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS request_queue (
    id                 BIGSERIAL PRIMARY KEY,
    node_id            TEXT,
    request_id         TEXT NOT NULL,
    user_id            TEXT NOT NULL,
    model_name         TEXT NOT NULL,
    current_message    JSONB NOT NULL,
    recent_history     JSONB NOT NULL,
    summarized_history TEXT NOT NULL,
    hypervars          JSONB NOT NULL,
    temperature        REAL NOT NULL,
    max_tokens         BIGINT NOT NULL,
    stream             BOOLEAN NOT NULL,
    received_at        TIMESTAMPTZ NOT NULL
);
"#;

/// Hosted-database backend. The endpoint URL and the access credential arrive
/// separately; both are required before the service binds its socket.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, password: &str) -> Result<Self, StoreError> {
        let opts = PgConnectOptions::from_str(database_url)?.password(password);
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Postgres BIGINT is signed; a u64 above `i64::MAX` cannot be stored.
    fn db_bigint(value: u64) -> Result<i64, StoreError> {
        Ok(i64::try_from(value)?)
    }
}

#[async_trait]
impl NodeStore for PgStore {
    async fn upsert_node(&self, record: NodeRecord) -> Result<(), StoreError> {
        let s = &record.status;
        sqlx::query(
            r#"
            INSERT INTO node_status
                (node_id, status, uptime_seconds, hardware, network, limits,
                 model, host_info, planned_shutdown, last_heartbeat)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (node_id) DO UPDATE SET
                status = EXCLUDED.status,
                uptime_seconds = EXCLUDED.uptime_seconds,
                hardware = EXCLUDED.hardware,
                network = EXCLUDED.network,
                limits = EXCLUDED.limits,
                model = EXCLUDED.model,
                host_info = EXCLUDED.host_info,
                planned_shutdown = EXCLUDED.planned_shutdown,
                last_heartbeat = EXCLUDED.last_heartbeat
            "#,
        )
        .bind(&s.node_id)
        .bind(&s.status)
        .bind(Self::db_bigint(s.uptime_seconds)?)
        .bind(Json(&s.hardware))
        .bind(Json(&s.network))
        .bind(Json(&s.limits))
        .bind(Json(&s.model))
        .bind(Json(&s.host_info))
        .bind(&s.planned_shutdown)
        .bind(record.last_heartbeat)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn nodes_seen_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<NodeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT node_id, status, uptime_seconds, hardware, network, limits,
                   model, host_info, planned_shutdown, last_heartbeat
            FROM node_status
            WHERE last_heartbeat > $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(NodeRecord {
                status: NodeStatus {
                    node_id: row.try_get("node_id")?,
                    status: row.try_get("status")?,
                    uptime_seconds: row.try_get::<i64, _>("uptime_seconds")? as u64,
                    hardware: row.try_get::<Json<HardwareInfo>, _>("hardware")?.0,
                    network: row.try_get::<Json<NetworkInfo>, _>("network")?.0,
                    limits: row.try_get::<Json<LimitsInfo>, _>("limits")?.0,
                    model: row.try_get::<Json<ModelInfo>, _>("model")?.0,
                    host_info: row.try_get::<Json<HostInfo>, _>("host_info")?.0,
                    planned_shutdown: row.try_get("planned_shutdown")?,
                },
                last_heartbeat: row.try_get("last_heartbeat")?,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl RequestStore for PgStore {
    async fn append_request(&self, record: IntakeRecord) -> Result<u64, StoreError> {
        let r = &record.request;
        sqlx::query(
            r#"
            INSERT INTO request_queue
                (node_id, request_id, user_id, model_name, current_message,
                 recent_history, summarized_history, hypervars, temperature,
                 max_tokens, stream, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&r.node_id)
        .bind(&r.request_id)
        .bind(&r.user_id)
        .bind(&r.model_name)
        .bind(Json(&r.current_message))
        .bind(Json(&r.recent_history))
        .bind(&r.summarized_history)
        .bind(Json(&r.hypervars))
        .bind(r.temperature)
        .bind(r.max_tokens as i64)
        .bind(r.stream)
        .bind(record.received_at)
        .execute(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM request_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn list_requests(&self) -> Result<Vec<IntakeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT node_id, request_id, user_id, model_name, current_message,
                   recent_history, summarized_history, hypervars, temperature,
                   max_tokens, stream, received_at
            FROM request_queue
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(IntakeRecord {
                request: QueuedRequest {
                    node_id: row.try_get("node_id")?,
                    request_id: row.try_get("request_id")?,
                    user_id: row.try_get("user_id")?,
                    model_name: row.try_get("model_name")?,
                    current_message: row.try_get::<Json<Message>, _>("current_message")?.0,
                    recent_history: row.try_get::<Json<Vec<Message>>, _>("recent_history")?.0,
                    summarized_history: row.try_get("summarized_history")?,
                    hypervars: row
                        .try_get::<Json<serde_json::Map<String, serde_json::Value>>, _>(
                            "hypervars",
                        )?
                        .0,
                    temperature: row.try_get("temperature")?,
                    max_tokens: row.try_get::<i64, _>("max_tokens")? as u32,
                    stream: row.try_get("stream")?,
                },
                received_at: row.try_get("received_at")?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigint_conversion_rejects_values_beyond_i64() {
        assert_eq!(PgStore::db_bigint(0).unwrap(), 0);
        assert_eq!(PgStore::db_bigint(3600).unwrap(), 3600);
        assert_eq!(PgStore::db_bigint(i64::MAX as u64).unwrap(), i64::MAX);
        assert!(matches!(
            PgStore::db_bigint(i64::MAX as u64 + 1),
            Err(StoreError::OutOfRange(_))
        ));
        assert!(matches!(
            PgStore::db_bigint(u64::MAX),
            Err(StoreError::OutOfRange(_))
        ));
    }
}
