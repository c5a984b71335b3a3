//! Service facade: the operations the transport layer calls into.
//!
//! [`TaskService`] combines the registry, the durable store, and access
//! control into the create/read/list/update/delete/expire operations of
//! the task API, plus the health acknowledgment and the service-scoped
//! reconciliation listing.
//!
//! # Write Discipline
//!
//! Every write follows the same two-phase shape: **validate** (status
//! code, ownership, existence) before touching anything, then **persist to
//! the durable store first and apply to the registry only on success** --
//! all under the task's entry lock, so concurrent mutations of one task
//! serialize and the persisted record always matches the most recently
//! applied in-memory state. A persistence failure fails the operation with
//! the in-memory view unchanged, and the registry can never contain a task
//! that was never durably recorded.

use std::collections::HashMap;

use crate::bootstrap;
use crate::constants::{DEFAULT_TASK_EXPIRY_SECS, HEALTH_ACK};
use crate::domain::TaskRecord;
use crate::error::TaskError;
use crate::registry::TaskRegistry;
use crate::security::{check_owner, ownership_exempt, require_identity};
use crate::store::DurableStore;
use crate::types::task::{ServiceKind, TaskStatus, TaskSummary};

/// Tunables for the service facade.
///
/// # Defaults
///
/// | Setting | Default | Description |
/// |---------|---------|-------------|
/// | `default_expiry_secs` | 300 | TTL applied by the expiry operation when the caller supplies none |
///
/// # Examples
///
/// ```
/// use gateway_tasks::ServiceConfig;
///
/// let config = ServiceConfig::default().with_default_expiry_secs(600);
/// assert_eq!(config.default_expiry_secs, 600);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// TTL, in seconds, given to a task's durable record when the expiry
    /// operation is invoked without an explicit duration.
    pub default_expiry_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_expiry_secs: DEFAULT_TASK_EXPIRY_SECS,
        }
    }
}

impl ServiceConfig {
    /// Sets the default expiry duration (builder pattern).
    pub fn with_default_expiry_secs(mut self, secs: u64) -> Self {
        self.default_expiry_secs = secs;
        self
    }
}

/// The task registry service.
///
/// Holds the in-memory [`TaskRegistry`] (the source of truth for reads)
/// and the [`DurableStore`] (crash recovery and cross-restart survival),
/// and enforces the validation, ownership, and persist-first discipline
/// described in the module docs.
///
/// # Construction
///
/// [`bootstrap`](TaskService::bootstrap) is the only constructor: it
/// rebuilds the registry from the durable store and **fails if the store
/// is unreachable** -- the process must refuse to start rather than serve
/// an unverifiable registry.
///
/// # Examples
///
/// ```
/// use gateway_tasks::store::memory::InMemoryStore;
/// use gateway_tasks::{ServiceConfig, TaskService, TaskStatus};
///
/// # async fn example() -> Result<(), gateway_tasks::TaskError> {
/// let service = TaskService::bootstrap(InMemoryStore::new())
///     .await?
///     .with_config(ServiceConfig::default());
///
/// let created = service.create_task("alice", "compute").await?;
/// assert_eq!(created.status, TaskStatus::Queued);
///
/// let fetched = service.get_task(&created.task_id, "alice").await?;
/// assert_eq!(fetched.task_id, created.task_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TaskService<S: DurableStore> {
    registry: TaskRegistry,
    store: S,
    config: ServiceConfig,
}

impl<S: DurableStore> TaskService<S> {
    /// Builds the service by hydrating the registry from `store`.
    ///
    /// # Errors
    ///
    /// [`TaskError::Store`] if the store is unreachable or holds a corrupt
    /// record. Startup must not proceed past this failure.
    pub async fn bootstrap(store: S) -> Result<Self, TaskError> {
        let registry = bootstrap::hydrate(&store).await?;
        Ok(Self {
            registry,
            store,
            config: ServiceConfig::default(),
        })
    }

    /// Sets the facade configuration (builder pattern).
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Read-only access to the in-memory registry.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Creates a task owned by `owner` on behalf of `service_name`.
    ///
    /// Allocates a fresh identifier from the durable counter, persists the
    /// record, and only then registers it -- if allocation or persistence
    /// fails, the whole operation fails and no partial task is ever
    /// visible. The new task starts `queued` with the canonical message.
    ///
    /// # Errors
    ///
    /// - [`TaskError::Unauthenticated`] if `owner` is empty.
    /// - [`TaskError::UnknownService`] if `service_name` is not a
    ///   recognized internal service.
    /// - [`TaskError::Store`] if allocation or persistence fails.
    pub async fn create_task(
        &self,
        owner: &str,
        service_name: &str,
    ) -> Result<TaskSummary, TaskError> {
        let owner = require_identity(Some(owner))?;
        let service =
            ServiceKind::from_name(service_name).ok_or_else(|| TaskError::UnknownService {
                service: service_name.to_string(),
            })?;

        self.store.ensure_counter().await?;
        let task_id = self.store.allocate_next_id().await?;

        let record = TaskRecord::new(task_id, owner.to_string(), service);
        self.store.save(task_id, &record.to_stored()).await?;

        let summary = record.to_summary();
        self.registry.insert(record)?;

        tracing::info!(
            public_id = %summary.task_id,
            owner = owner,
            service = %service,
            "task created"
        );
        Ok(summary)
    }

    /// Returns the status summary of a task the caller owns.
    ///
    /// Soft-deleted tasks still resolve, carrying the `deleted` status.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the identifier is unknown.
    /// - [`TaskError::OwnerMismatch`] if the caller does not own the task.
    pub async fn get_task(&self, public_id: &str, caller: &str) -> Result<TaskSummary, TaskError> {
        let record = self
            .registry
            .get(public_id)
            .await
            .ok_or_else(|| TaskError::NotFound {
                public_id: public_id.to_string(),
            })?;
        check_owner(&record, caller)?;
        Ok(record.to_summary())
    }

    /// Returns `public_id -> summary` for every task owned by `caller`.
    ///
    /// # Errors
    ///
    /// [`TaskError::Unauthenticated`] if `caller` is empty.
    pub async fn list_tasks_for_owner(
        &self,
        caller: &str,
    ) -> Result<HashMap<String, TaskSummary>, TaskError> {
        let caller = require_identity(Some(caller))?;
        Ok(self.registry.list_by_owner(caller).await)
    }

    /// Returns `public_id -> summary` for every task created by the named
    /// service, read from the durable store.
    ///
    /// This is the reconciliation listing a collaborating service uses to
    /// rehydrate its own view after a restart, so it reflects the
    /// crash-surviving record set rather than this process's registry.
    ///
    /// # Errors
    ///
    /// - [`TaskError::UnknownService`] if `service_name` is not recognized.
    /// - [`TaskError::Store`] if the store cannot be read.
    pub async fn list_tasks_for_service(
        &self,
        service_name: &str,
    ) -> Result<HashMap<String, TaskSummary>, TaskError> {
        let service =
            ServiceKind::from_name(service_name).ok_or_else(|| TaskError::UnknownService {
                service: service_name.to_string(),
            })?;

        let records = self.store.load_by_service(service).await?;
        Ok(records
            .into_iter()
            .map(|(task_id, stored)| {
                let record = TaskRecord::from_stored(task_id, stored);
                (record.public_id.clone(), record.to_summary())
            })
            .collect())
    }

    /// Applies a reported status to a task.
    ///
    /// The raw `status_code` is validated against the recognized set
    /// before anything else; the status graph is open (any recognized
    /// code may follow any other), with `deleted` reserved for
    /// the delete operation. Ownership is enforced unless the code is
    /// system-terminal, in which case `caller` may be `None` -- those
    /// reports come from trusted internal workers gated by origin in the
    /// transport layer. A missing `message` defaults to the code's
    /// canonical message.
    ///
    /// # Errors
    ///
    /// - [`TaskError::UnrecognizedStatus`] for a code outside the set.
    /// - [`TaskError::ReservedStatus`] for `deleted`.
    /// - [`TaskError::NotFound`] if the identifier is unknown or the task
    ///   is already deleted (deleted tasks never become mutable again).
    /// - [`TaskError::Unauthenticated`] / [`TaskError::OwnerMismatch`] for
    ///   non-system-terminal codes without a valid owning caller.
    /// - [`TaskError::Store`] if persistence fails; the in-memory status
    ///   is unchanged in that case.
    pub async fn update_task_status(
        &self,
        public_id: &str,
        caller: Option<&str>,
        status_code: &str,
        message: Option<String>,
    ) -> Result<TaskSummary, TaskError> {
        let status =
            TaskStatus::from_code(status_code).ok_or_else(|| TaskError::UnrecognizedStatus {
                code: status_code.to_string(),
            })?;
        if status == TaskStatus::Deleted {
            return Err(TaskError::ReservedStatus { status });
        }

        let entry = self
            .registry
            .entry(public_id)
            .ok_or_else(|| TaskError::NotFound {
                public_id: public_id.to_string(),
            })?;
        let mut record = entry.lock().await;

        if !ownership_exempt(status) {
            let caller = require_identity(caller)?;
            check_owner(&record, caller)?;
        }

        if record.status == TaskStatus::Deleted {
            return Err(TaskError::NotFound {
                public_id: public_id.to_string(),
            });
        }

        let message = message.unwrap_or_else(|| status.default_message().to_string());

        let mut next = record.clone();
        next.apply_status(status, message);
        self.store.save(next.task_id, &next.to_stored()).await?;
        *record = next;

        tracing::info!(
            public_id = %record.public_id,
            status = %record.status,
            "task status updated"
        );
        Ok(record.to_summary())
    }

    /// Soft-deletes a task the caller owns.
    ///
    /// Removes the durable record, then marks the in-memory entry
    /// `deleted`; the entry is retained, so subsequent reads resolve to
    /// the deleted marker until the next restart evicts it. Deleting an
    /// already-deleted task is a no-op.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the identifier is unknown.
    /// - [`TaskError::Unauthenticated`] / [`TaskError::OwnerMismatch`] if
    ///   the caller does not own the task.
    /// - [`TaskError::Store`] if the store is unreachable; the task stays
    ///   live in that case.
    pub async fn delete_task(&self, public_id: &str, caller: &str) -> Result<(), TaskError> {
        let caller = require_identity(Some(caller))?;
        let entry = self
            .registry
            .entry(public_id)
            .ok_or_else(|| TaskError::NotFound {
                public_id: public_id.to_string(),
            })?;
        let mut record = entry.lock().await;
        check_owner(&record, caller)?;

        if record.status == TaskStatus::Deleted {
            return Ok(());
        }

        // An absent durable record means the goal state already holds;
        // only store unavailability fails the operation.
        let removed = self.store.delete(record.task_id).await?;
        if !removed {
            tracing::warn!(
                public_id = %record.public_id,
                "durable record was already gone at delete"
            );
        }

        let mut next = record.clone();
        next.apply_status(
            TaskStatus::Deleted,
            TaskStatus::Deleted.default_message().to_string(),
        );
        *record = next;

        tracing::info!(public_id = %record.public_id, "task deleted");
        Ok(())
    }

    /// Sets a time-to-live on a task's durable record.
    ///
    /// Uses `secs`, or the configured default when `None`. The in-memory
    /// entry is untouched: expiration only bounds how long
    /// the durable record survives for polling purposes, and the registry
    /// reconciles at the next restart.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the identifier is unknown or the task
    ///   is deleted.
    /// - [`TaskError::Unauthenticated`] / [`TaskError::OwnerMismatch`] if
    ///   the caller does not own the task.
    /// - [`TaskError::Store`] if the store is unreachable.
    pub async fn set_task_expiry(
        &self,
        public_id: &str,
        caller: &str,
        secs: Option<u64>,
    ) -> Result<(), TaskError> {
        let caller = require_identity(Some(caller))?;
        let entry = self
            .registry
            .entry(public_id)
            .ok_or_else(|| TaskError::NotFound {
                public_id: public_id.to_string(),
            })?;
        let record = entry.lock().await;
        check_owner(&record, caller)?;

        if record.status == TaskStatus::Deleted {
            return Err(TaskError::NotFound {
                public_id: public_id.to_string(),
            });
        }

        let secs = secs.unwrap_or(self.config.default_expiry_secs);
        let applied = self.store.set_expiry(record.task_id, secs).await?;
        if applied {
            tracing::info!(
                public_id = %record.public_id,
                secs = secs,
                "expiry set on durable record"
            );
        } else {
            // Already expired or deleted durably: the record is gone,
            // which is the state the caller asked to reach eventually.
            tracing::warn!(
                public_id = %record.public_id,
                "durable record was already gone at expiry"
            );
        }
        Ok(())
    }

    /// Liveness acknowledgment for the status-checking service.
    ///
    /// Origin gating is the transport layer's job; the facade only
    /// confirms it is alive.
    pub fn health(&self) -> &'static str {
        HEALTH_ACK
    }
}
