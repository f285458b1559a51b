//! Resume storage: keeps the latest compiled text of each resume so it can be
//! re-analyzed or used as assistant context.
//!
//! `AppState` holds an `Arc<dyn ResumeStore>`: Redis when `REDIS_URL` is set,
//! an in-process map otherwise.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub mod handlers;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt stored resume: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResume {
    pub resume_id: Uuid,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn fetch(&self, resume_id: Uuid) -> Result<Option<StoredResume>, StoreError>;

    /// Inserts or replaces the text for `resume_id`.
    async fn save(&self, resume_id: Uuid, text: String) -> Result<StoredResume, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RedisResumeStore {
    conn: MultiplexedConnection,
}

impl RedisResumeStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to Redis...");
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis connection established");
        Ok(Self { conn })
    }
}

fn redis_key(resume_id: Uuid) -> String {
    format!("resume:{resume_id}")
}

#[async_trait]
impl ResumeStore for RedisResumeStore {
    async fn fetch(&self, resume_id: Uuid) -> Result<Option<StoredResume>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(redis_key(resume_id)).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, resume_id: Uuid, text: String) -> Result<StoredResume, StoreError> {
        let record = StoredResume {
            resume_id,
            text,
            updated_at: Utc::now(),
        };
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(redis_key(resume_id), serde_json::to_string(&record)?)
            .await?;
        debug!(%resume_id, "Stored resume in Redis");
        Ok(record)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryResumeStore {
    resumes: RwLock<HashMap<Uuid, StoredResume>>,
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn fetch(&self, resume_id: Uuid) -> Result<Option<StoredResume>, StoreError> {
        Ok(self.resumes.read().await.get(&resume_id).cloned())
    }

    async fn save(&self, resume_id: Uuid, text: String) -> Result<StoredResume, StoreError> {
        let record = StoredResume {
            resume_id,
            text,
            updated_at: Utc::now(),
        };
        self.resumes.write().await.insert(resume_id, record.clone());
        Ok(record)
    }
}
