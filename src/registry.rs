//! In-memory task registry -- the single source of truth for reads.
//!
//! [`TaskRegistry`] maps public identifiers to live [`TaskRecord`]s. The
//! map is shard-guarded ([`DashMap`]) and every entry is wrapped in its own
//! [`tokio::sync::Mutex`], so:
//!
//! - reads never observe a partially-constructed task (records are inserted
//!   whole and cloned out whole);
//! - mutations to the *same* task serialize on the entry lock, which the
//!   service layer holds across its persist-then-apply window;
//! - mutations to *different* tasks proceed in parallel.
//!
//! Soft deletion keeps the map entry: a deleted task's record stays
//! resolvable (with the `deleted` status) for the remainder of the process
//! lifetime, and is dropped naturally at the next bootstrap once its
//! durable record is gone.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::TaskRecord;
use crate::error::TaskError;
use crate::types::task::{ServiceKind, TaskSummary};

/// Shared handle to a single registered task.
pub(crate) type TaskEntry = Arc<Mutex<TaskRecord>>;

/// Authoritative in-memory mapping from public identifier to task.
///
/// # Examples
///
/// ```
/// use gateway_tasks::{ServiceKind, TaskRecord, TaskRegistry};
///
/// # async fn example() {
/// let registry = TaskRegistry::new();
/// registry
///     .insert(TaskRecord::new(1, "alice".to_string(), ServiceKind::Compute))
///     .unwrap();
///
/// let record = registry.get("1").await.unwrap();
/// assert_eq!(record.owner, "alice");
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: DashMap<String, TaskEntry>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fully-constructed record under its public identifier.
    ///
    /// Used by the create path (after identifier allocation and the
    /// durable write) and by the bootstrap path (identifier already
    /// known). Public identifiers are unique across live tasks, so an
    /// occupied slot is refused rather than overwritten.
    ///
    /// # Errors
    ///
    /// [`TaskError::DuplicateTask`] if a task with the same public
    /// identifier is already registered.
    pub fn insert(&self, record: TaskRecord) -> Result<(), TaskError> {
        use dashmap::mapref::entry::Entry;

        match self.tasks.entry(record.public_id.clone()) {
            Entry::Occupied(occupied) => Err(TaskError::DuplicateTask {
                public_id: occupied.key().clone(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(record)));
                Ok(())
            }
        }
    }

    /// Returns a clone of the current record for `public_id`, or `None`.
    pub async fn get(&self, public_id: &str) -> Option<TaskRecord> {
        let entry = self.entry(public_id)?;
        let record = entry.lock().await;
        Some(record.clone())
    }

    /// Returns the mutation handle for `public_id`.
    ///
    /// The service layer locks it across validate -> persist -> apply so
    /// concurrent mutations of one task serialize. The shard guard is
    /// dropped before the caller ever awaits the lock.
    pub(crate) fn entry(&self, public_id: &str) -> Option<TaskEntry> {
        self.tasks.get(public_id).map(|e| Arc::clone(e.value()))
    }

    /// Returns `public_id -> summary` for every task owned by `owner`.
    ///
    /// Deleted tasks are included (with the `deleted` status); they remain
    /// visible until the process restarts.
    pub async fn list_by_owner(&self, owner: &str) -> HashMap<String, TaskSummary> {
        let mut summaries = HashMap::new();
        for entry in self.snapshot_entries() {
            let record = entry.lock().await;
            if record.owner == owner {
                summaries.insert(record.public_id.clone(), record.to_summary());
            }
        }
        summaries
    }

    /// Returns `public_id -> summary` for every task created by `service`.
    pub async fn list_by_service(&self, service: ServiceKind) -> HashMap<String, TaskSummary> {
        let mut summaries = HashMap::new();
        for entry in self.snapshot_entries() {
            let record = entry.lock().await;
            if record.service == service {
                summaries.insert(record.public_id.clone(), record.to_summary());
            }
        }
        summaries
    }

    /// Number of registered tasks (deleted markers included).
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Clones every entry handle out of the map so iteration never holds a
    /// shard guard across an `await`.
    fn snapshot_entries(&self) -> Vec<TaskEntry> {
        self.tasks.iter().map(|e| Arc::clone(e.value())).collect()
    }
}
