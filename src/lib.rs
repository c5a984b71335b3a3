//! Asynchronous task registry core for an HPC gateway.
//!
//! Client-facing and internal services submit long-running operations
//! (transfers, compute submissions) and poll or push updates for their
//! progress. This crate maintains the consistent, queryable view of task
//! lifecycle state behind that API:
//!
//! - a fast in-memory [`TaskRegistry`] answers all reads;
//! - a durable key-value store ([`DurableStore`]: atomic counter
//!   increment, per-key TTL) provides crash recovery and cross-restart
//!   survival;
//! - access is ownership-scoped, with machine-originated status reports
//!   ([`TaskStatus::is_system_terminal`]) exempt from end-user identity.
//!
//! The HTTP transport, credential validation, and origin allow-listing
//! live outside this crate; [`TaskService`] is what that layer calls into.
//!
//! # Module Organization
//!
//! - [`types`] -- status codes, service origins, wire summaries
//! - [`domain`] -- the task record and its durable form
//! - [`store`] -- the durable store contract plus in-memory and redis
//!   adapters
//! - [`registry`] -- the shard-guarded in-memory registry
//! - [`security`] -- ownership checks and the system-terminal exemption
//! - [`bootstrap`] -- registry reconstruction at startup (fatal on store
//!   failure)
//! - [`service`] -- the facade combining all of the above
//!
//! # Example
//!
//! ```
//! use gateway_tasks::store::memory::InMemoryStore;
//! use gateway_tasks::{TaskService, TaskStatus};
//!
//! # async fn example() -> Result<(), gateway_tasks::TaskError> {
//! let service = TaskService::bootstrap(InMemoryStore::new()).await?;
//!
//! let task = service.create_task("alice", "storage").await?;
//! service
//!     .update_task_status(&task.task_id, Some("alice"), "running", None)
//!     .await?;
//!
//! let current = service.get_task(&task.task_id, "alice").await?;
//! assert_eq!(current.status, TaskStatus::Running);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod constants;
pub mod domain;
pub mod error;
pub mod registry;
pub mod security;
pub mod service;
pub mod store;
pub mod types;

pub use domain::{StoredTask, TaskRecord};
pub use error::TaskError;
pub use registry::TaskRegistry;
pub use service::{ServiceConfig, TaskService};
pub use store::{DurableStore, StoreError};
pub use types::{ServiceKind, TaskStatus, TaskSummary};
