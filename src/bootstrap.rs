//! Registry reconstruction from the durable store at process start.
//!
//! Bootstrapping is the only moment a store failure is fatal rather than
//! degraded: a registry whose durability guarantee cannot be established
//! must not serve, so [`hydrate`] propagates any [`StoreError`] and the
//! process is expected to refuse to start.
//!
//! [`StoreError`]: crate::store::StoreError

use crate::domain::TaskRecord;
use crate::error::TaskError;
use crate::registry::TaskRegistry;
use crate::store::DurableStore;

/// Rebuilds a [`TaskRegistry`] from every record in the durable store.
///
/// Initializes the identifier counter (idempotent), loads all persisted
/// records, reconstructs a task per record -- the identifier comes from
/// the durable key, so this path never allocates -- and registers each.
///
/// # Errors
///
/// - [`TaskError::Store`] if the store is unreachable or any record fails
///   to decode. Fatal: there is no safe way to serve without a verified
///   durable layer.
///
/// # Examples
///
/// ```
/// use gateway_tasks::bootstrap::hydrate;
/// use gateway_tasks::store::memory::InMemoryStore;
///
/// # async fn example() {
/// let store = InMemoryStore::new();
/// let registry = hydrate(&store).await.unwrap();
/// assert!(registry.is_empty());
/// # }
/// ```
pub async fn hydrate<S: DurableStore + ?Sized>(store: &S) -> Result<TaskRegistry, TaskError> {
    store.ensure_counter().await?;

    let records = store.load_all().await?;
    let registry = TaskRegistry::new();
    for (task_id, stored) in records {
        registry.insert(TaskRecord::from_stored(task_id, stored))?;
    }

    tracing::info!(tasks = registry.len(), "registry hydrated from durable store");
    Ok(registry)
}
