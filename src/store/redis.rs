//! Redis durable store adapter.
//!
//! [`RedisStore`] implements [`DurableStore`] over a redis server. The
//! mapping is plain -- one JSON string value per task, one
//! counter integer -- because the registry core, not the store, owns all
//! domain logic.
//!
//! # Key Schema
//!
//! | Key Pattern | Type | Purpose |
//! |-------------|------|---------|
//! | `{prefix}:task:{task_id}` | String (JSON) | Serialized [`StoredTask`] |
//! | `{prefix}:last_task_id` | String (u64) | Last-allocated identifier |
//!
//! Identifier allocation is `INCR` on the counter key, which is atomic
//! across connections and therefore across process replicas sharing the
//! server. Expiry is native `EXPIRE`; an expired record simply stops
//! existing, and a subsequent `save` (plain `SET`) clears any pending TTL.
//!
//! # Connection Model
//!
//! `RedisStore` holds a [`MultiplexedConnection`], which is designed to be
//! cloned cheaply -- all clones share one TCP connection. Each operation
//! clones the handle, uses it, and drops it on every exit path.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gateway_tasks::store::redis::RedisStore;
//!
//! # async fn example() {
//! let store = RedisStore::new("redis://127.0.0.1:6379").await.unwrap();
//! # }
//! ```

use std::collections::BTreeMap;

use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use async_trait::async_trait;

use crate::constants::{COUNTER_KEY, DEFAULT_KEY_PREFIX};
use crate::domain::StoredTask;
use crate::store::{parse_task_id, DurableStore, StoreError};
use crate::types::task::ServiceKind;

/// Redis-backed [`DurableStore`].
///
/// # Examples
///
/// ```rust,no_run
/// use gateway_tasks::store::redis::RedisStore;
///
/// # async fn example() {
/// // Connect with the default "tasks" key prefix:
/// let store = RedisStore::new("redis://127.0.0.1:6379").await.unwrap();
///
/// // Or isolate under a custom prefix (e.g. per test run):
/// let store = RedisStore::new("redis://127.0.0.1:6379")
///     .await
///     .unwrap()
///     .with_prefix("staging");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisStore {
    /// Connects to redis at the given URL.
    ///
    /// The URL format is `redis://[:<password>@]<host>:<port>[/<db>]`.
    /// Fails fast if the connection cannot be established.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the client cannot be created or the
    /// connection cannot be established.
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let client = ::redis::Client::open(url).map_err(|e| StoreError::Unavailable {
            message: format!("failed to create redis client: {e}"),
            source: Some(Box::new(e)),
        })?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to connect to redis: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        })
    }

    /// Creates a store over a pre-built multiplexed connection.
    ///
    /// Useful when the caller manages connection lifecycle or needs custom
    /// connection configuration.
    pub fn with_connection(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Sets a custom key prefix (builder pattern).
    ///
    /// Each deployment -- or each test run -- can use its own prefix to
    /// avoid key collisions on a shared server.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn counter_key(&self) -> String {
        format!("{}:{}", self.key_prefix, COUNTER_KEY)
    }

    fn task_key(&self, task_id: u64) -> String {
        format!("{}:{}", self.key_prefix, super::task_key(task_id))
    }

    fn task_pattern(&self) -> String {
        format!("{}:task:*", self.key_prefix)
    }

    /// Recovers the task identifier from a fully-prefixed redis key.
    fn task_id_from_key(&self, key: &str) -> Option<u64> {
        key.strip_prefix(&self.key_prefix)
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(parse_task_id)
    }

    fn decode(key: &str, raw: &str) -> Result<StoredTask, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn encode(key: &str, record: &StoredTask) -> Result<String, StoreError> {
        serde_json::to_string(record).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: format!("failed to serialize record: {e}"),
        })
    }

    /// Fetches and decodes every record whose key matches the task
    /// pattern, keyed by task identifier.
    async fn load_matching(&self) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(self.task_pattern())
            .await
            .map_err(|e| map_redis_error(e, "task key scan"))?;

        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }

        let values: Vec<Option<String>> = conn
            .mget(&keys)
            .await
            .map_err(|e| map_redis_error(e, "task record fetch"))?;

        let mut records = BTreeMap::new();
        for (key, value) in keys.iter().zip(values) {
            // A record can expire between the scan and the fetch.
            let Some(raw) = value else { continue };
            let Some(task_id) = self.task_id_from_key(key) else {
                continue;
            };
            records.insert(task_id, Self::decode(key, &raw)?);
        }
        Ok(records)
    }
}

/// Maps a redis error to [`StoreError::Unavailable`].
fn map_redis_error(err: ::redis::RedisError, context: &str) -> StoreError {
    StoreError::Unavailable {
        message: format!("redis error during {context}: {err}"),
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl DurableStore for RedisStore {
    async fn ensure_counter(&self) -> Result<(), StoreError> {
        let key = self.counter_key();
        let mut conn = self.conn.clone();
        let _created: bool = conn
            .set_nx(&key, 0u64)
            .await
            .map_err(|e| map_redis_error(e, "counter initialization"))?;
        Ok(())
    }

    async fn allocate_next_id(&self) -> Result<u64, StoreError> {
        let key = self.counter_key();
        let mut conn = self.conn.clone();
        conn.incr(&key, 1u64)
            .await
            .map_err(|e| map_redis_error(e, "identifier allocation"))
    }

    async fn save(&self, task_id: u64, record: &StoredTask) -> Result<(), StoreError> {
        let key = self.task_key(task_id);
        let json = Self::encode(&key, record)?;
        let mut conn = self.conn.clone();
        // Plain SET: overwrites the value and clears any pending TTL.
        conn.set::<_, _, ()>(&key, json)
            .await
            .map_err(|e| map_redis_error(e, "record save"))
    }

    async fn load(&self, task_id: u64) -> Result<Option<StoredTask>, StoreError> {
        let key = self.task_key(task_id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| map_redis_error(e, "record load"))?;
        raw.map(|r| Self::decode(&key, &r)).transpose()
    }

    async fn delete(&self, task_id: u64) -> Result<bool, StoreError> {
        let key = self.task_key(task_id);
        let mut conn = self.conn.clone();
        let removed: u64 = conn
            .del(&key)
            .await
            .map_err(|e| map_redis_error(e, "record delete"))?;
        Ok(removed == 1)
    }

    async fn load_all(&self) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        self.load_matching().await
    }

    async fn load_by_service(
        &self,
        service: ServiceKind,
    ) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        let mut records = self.load_matching().await?;
        records.retain(|_, record| record.service == service);
        Ok(records)
    }

    async fn set_expiry(&self, task_id: u64, secs: u64) -> Result<bool, StoreError> {
        let key = self.task_key(task_id);
        let mut conn = self.conn.clone();
        conn.expire(&key, secs as i64)
            .await
            .map_err(|e| map_redis_error(e, "record expiry"))
    }
}

// ---------------------------------------------------------------------------
// Integration tests -- run against a real redis instance
// ---------------------------------------------------------------------------
