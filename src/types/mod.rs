//! Wire types shared across the registry: statuses, service origins, and
//! task summaries.

pub mod task;

pub use task::{ServiceKind, TaskStatus, TaskSummary};
