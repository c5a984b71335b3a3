//! Durable store adapter: trait, error type, and key helpers.
//!
//! The [`DurableStore`] trait is the contract the registry core consumes.
//! It exposes the capabilities of an external crash-surviving key-value
//! service -- atomic counter increment, record storage, per-key expiry --
//! and owns **no business logic**: ownership checks, status validation,
//! and the registry discipline all live above it.
//!
//! # Implementations
//!
//! - [`memory::InMemoryStore`] -- `DashMap`-backed store for tests and
//!   embedded use.
//! - [`redis::RedisStore`] -- production adapter over a redis server,
//!   behind the default-on `redis` cargo feature.
//!
//! # Key Structure
//!
//! Task records live under a composite key `{segment}:{task_id}` where the
//! id is the store-allocated integer; a separate counter key holds the
//! last-allocated identifier. Adapters prepend their own namespace prefix.
//!
//! # Failure Semantics
//!
//! "The store cannot be reached" and "the record is not there" are
//! different facts: the former is [`StoreError::Unavailable`] (retryable,
//! fatal at bootstrap), the latter is an in-band `Option`/`bool` result.
//! Callers choose fatal-at-boot vs recoverable-at-request-time handling on
//! that basis.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StoredTask;
use crate::types::task::ServiceKind;

/// Errors surfaced by durable store adapters.
///
/// # Examples
///
/// ```
/// use gateway_tasks::StoreError;
///
/// let err = StoreError::unavailable("connection refused");
/// assert!(err.to_string().contains("connection refused"));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the operation.
    ///
    /// Retryable at request time; fatal at bootstrap.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored value could not be encoded or decoded.
    ///
    /// Indicates a record written by an incompatible version or external
    /// tampering; not retryable.
    #[error("corrupt record at {key}: {message}")]
    Corrupt {
        /// The durable key holding the offending value.
        key: String,
        /// What failed to round-trip.
        message: String,
    },
}

impl StoreError {
    /// Shorthand for an [`Unavailable`](StoreError::Unavailable) error
    /// without an underlying cause.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }
}

/// Composes the durable key for a task record.
///
/// # Examples
///
/// ```
/// use gateway_tasks::store::task_key;
///
/// assert_eq!(task_key(7), "task:7");
/// ```
pub fn task_key(task_id: u64) -> String {
    format!("{}:{task_id}", crate::constants::TASK_KEY_SEGMENT)
}

/// Recovers the integer task identifier from a composite durable key.
///
/// Returns `None` for keys outside the task namespace.
///
/// # Examples
///
/// ```
/// use gateway_tasks::store::parse_task_id;
///
/// assert_eq!(parse_task_id("task:7"), Some(7));
/// assert_eq!(parse_task_id("task:"), None);
/// assert_eq!(parse_task_id("last_task_id"), None);
/// ```
pub fn parse_task_id(key: &str) -> Option<u64> {
    let (segment, id) = key.split_once(':')?;
    if segment != crate::constants::TASK_KEY_SEGMENT {
        return None;
    }
    id.parse().ok()
}

/// Durable key-value service consumed by the task registry.
///
/// Implementations are dumb record stores: they persist, fetch, and expire
/// [`StoredTask`] values and maintain the identifier counter. All domain
/// intelligence lives in the registry and service layers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; operations are invoked from many
/// request handlers concurrently and by multiple process replicas sharing
/// one store.
///
/// # Connections
///
/// Adapters acquire whatever connection handle they need per logical
/// operation and release it on every exit path; nothing is held across
/// calls.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Idempotently initializes the identifier counter key.
    ///
    /// Safe to call on every startup and before any allocation; never
    /// resets an existing counter.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn ensure_counter(&self) -> Result<(), StoreError>;

    /// Atomically increments and returns the next task identifier.
    ///
    /// Concurrent callers -- including callers in other process replicas
    /// sharing the same store -- always observe pairwise distinct values.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn allocate_next_id(&self) -> Result<u64, StoreError>;

    /// Persists the record for `task_id`, overwriting any previous value
    /// and clearing any pending expiry.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn save(&self, task_id: u64, record: &StoredTask) -> Result<(), StoreError>;

    /// Fetches the record for `task_id`; `None` if absent (never written,
    /// deleted, or expired).
    ///
    /// # Errors
    ///
    /// - [`StoreError::Unavailable`] if the store cannot be reached.
    /// - [`StoreError::Corrupt`] if a present value fails to decode.
    async fn load(&self, task_id: u64) -> Result<Option<StoredTask>, StoreError>;

    /// Removes the record for `task_id`.
    ///
    /// Returns `true` if a record existed and was removed, `false` if
    /// there was nothing to remove (idempotent).
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn delete(&self, task_id: u64) -> Result<bool, StoreError>;

    /// Fetches every persisted task record, keyed by task identifier.
    ///
    /// Used only at bootstrap to reconstruct the in-memory registry.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Unavailable`] if the store cannot be reached.
    /// - [`StoreError::Corrupt`] if any present value fails to decode.
    async fn load_all(&self) -> Result<BTreeMap<u64, StoredTask>, StoreError>;

    /// Fetches every persisted record created by `service`, keyed by task
    /// identifier.
    ///
    /// Used for the internal reconciliation listing a collaborating
    /// service requests to rehydrate its own view.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Unavailable`] if the store cannot be reached.
    /// - [`StoreError::Corrupt`] if any present value fails to decode.
    async fn load_by_service(
        &self,
        service: ServiceKind,
    ) -> Result<BTreeMap<u64, StoredTask>, StoreError>;

    /// Sets a time-to-live on the record for `task_id`; the store discards
    /// the record autonomously once it elapses.
    ///
    /// Returns `true` if the record existed and the expiry was set,
    /// `false` if there was no record to expire.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn set_expiry(&self, task_id: u64, secs: u64) -> Result<bool, StoreError>;
}

// Shared handles delegate, so a store can be held by the service facade
// and inspected by its creator at the same time.
#[async_trait]
impl<S: DurableStore + ?Sized> DurableStore for std::sync::Arc<S> {
    async fn ensure_counter(&self) -> Result<(), StoreError> {
        (**self).ensure_counter().await
    }

    async fn allocate_next_id(&self) -> Result<u64, StoreError> {
        (**self).allocate_next_id().await
    }

    async fn save(&self, task_id: u64, record: &StoredTask) -> Result<(), StoreError> {
        (**self).save(task_id, record).await
    }

    async fn load(&self, task_id: u64) -> Result<Option<StoredTask>, StoreError> {
        (**self).load(task_id).await
    }

    async fn delete(&self, task_id: u64) -> Result<bool, StoreError> {
        (**self).delete(task_id).await
    }

    async fn load_all(&self) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        (**self).load_all().await
    }

    async fn load_by_service(
        &self,
        service: ServiceKind,
    ) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        (**self).load_by_service(service).await
    }

    async fn set_expiry(&self, task_id: u64, secs: u64) -> Result<bool, StoreError> {
        (**self).set_expiry(task_id, secs).await
    }
}
