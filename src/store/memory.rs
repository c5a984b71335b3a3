//! In-memory durable store adapter.
//!
//! [`InMemoryStore`] implements [`DurableStore`] over a [`DashMap`] with an
//! atomic identifier counter and per-record expiry instants. It exists for
//! tests and embedded single-process use; it survives nothing, but it
//! honors the full adapter contract -- including TTL semantics, which are
//! enforced lazily at read time.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::StoredTask;
use crate::store::{DurableStore, StoreError};
use crate::types::task::ServiceKind;

/// A stored record plus its optional expiry deadline.
#[derive(Debug, Clone)]
struct Entry {
    record: StoredTask,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Thread-safe in-memory [`DurableStore`].
///
/// Records live in a [`DashMap`] keyed by the integer task identifier; the
/// counter is an [`AtomicU64`], so identifier allocation is race-free
/// within the process. Expired records are treated as absent and removed
/// lazily on the read path.
///
/// # Examples
///
/// ```
/// use gateway_tasks::store::memory::InMemoryStore;
/// use gateway_tasks::store::DurableStore;
///
/// # async fn example() {
/// let store = InMemoryStore::new();
/// let id = store.allocate_next_id().await.unwrap();
/// assert_eq!(id, 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<u64, Entry>,
    counter: AtomicU64,
}

impl InMemoryStore {
    /// Creates an empty store with the counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (non-expired) records.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::store::memory::InMemoryStore;
    ///
    /// let store = InMemoryStore::new();
    /// assert_eq!(store.len(), 0);
    /// assert!(store.is_empty());
    /// ```
    pub fn len(&self) -> usize {
        self.records.iter().filter(|e| !e.value().is_expired()).count()
    }

    /// Returns `true` if the store holds no live records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops an entry if it has expired; returns whether a live entry
    /// remains.
    fn prune_if_expired(&self, task_id: u64) -> bool {
        if let Some(entry) = self.records.get(&task_id) {
            if entry.value().is_expired() {
                drop(entry);
                self.records.remove(&task_id);
                return false;
            }
            return true;
        }
        false
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    /// No-op: the counter is intrinsic to the store and always present.
    async fn ensure_counter(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn allocate_next_id(&self) -> Result<u64, StoreError> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn save(&self, task_id: u64, record: &StoredTask) -> Result<(), StoreError> {
        self.records.insert(
            task_id,
            Entry {
                record: record.clone(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn load(&self, task_id: u64) -> Result<Option<StoredTask>, StoreError> {
        if !self.prune_if_expired(task_id) {
            return Ok(None);
        }
        Ok(self.records.get(&task_id).map(|e| e.value().record.clone()))
    }

    async fn delete(&self, task_id: u64) -> Result<bool, StoreError> {
        if !self.prune_if_expired(task_id) {
            return Ok(false);
        }
        Ok(self.records.remove(&task_id).is_some())
    }

    async fn load_all(&self) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|e| !e.value().is_expired())
            .map(|e| (*e.key(), e.value().record.clone()))
            .collect())
    }

    async fn load_by_service(
        &self,
        service: ServiceKind,
    ) -> Result<BTreeMap<u64, StoredTask>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|e| !e.value().is_expired() && e.value().record.service == service)
            .map(|e| (*e.key(), e.value().record.clone()))
            .collect())
    }

    async fn set_expiry(&self, task_id: u64, secs: u64) -> Result<bool, StoreError> {
        if !self.prune_if_expired(task_id) {
            return Ok(false);
        }
        match self.records.get_mut(&task_id) {
            Some(mut entry) => {
                // An unrepresentable deadline (absurdly large TTL) means
                // the record never expires.
                entry.value_mut().expires_at =
                    Instant::now().checked_add(Duration::from_secs(secs));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
