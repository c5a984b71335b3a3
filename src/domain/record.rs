//! Task record -- the registry's internal representation of a task, and
//! the durable record shape persisted for it.
//!
//! [`TaskRecord`] is what lives in the in-memory registry; [`StoredTask`]
//! is the value written to the durable store under the task's integer
//! identifier (a separate counter key holds the last-allocated id).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::task::{ServiceKind, TaskStatus, TaskSummary};

/// Internal representation of a tracked task.
///
/// Constructed once per task -- either on creation (fresh id from the
/// durable counter) or on bootstrap (id recovered from the durable key) --
/// and then mutated only through [`apply_status`](TaskRecord::apply_status).
/// `task_id`, `public_id`, `owner`, `service`, and `created_at` never
/// change after construction.
///
/// # Examples
///
/// ```
/// use gateway_tasks::{ServiceKind, TaskRecord, TaskStatus};
///
/// let record = TaskRecord::new(7, "alice".to_string(), ServiceKind::Storage);
/// assert_eq!(record.public_id, "7");
/// assert_eq!(record.status, TaskStatus::Queued);
/// assert_eq!(record.message, "Task queued");
/// ```
#[derive(Debug, Clone)]
pub struct TaskRecord {
    /// Store-assigned monotonically increasing identifier. Immutable.
    pub task_id: u64,

    /// Externally exposed identifier: the literal decimal rendering of
    /// `task_id`. Identifiers are sequential and predictable; the gateway
    /// fronting this service owns any opacity requirement.
    pub public_id: String,

    /// Identity of the creating caller. Immutable.
    pub owner: String,

    /// Which internal service family created the task. Immutable.
    pub service: ServiceKind,

    /// Current lifecycle status.
    pub status: TaskStatus,

    /// Status detail; the status code's canonical message when the
    /// reporter supplied none.
    pub message: String,

    /// When the task was created.
    pub created_at: DateTime<Utc>,

    /// When the last status change was applied.
    pub last_updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Creates a record for a freshly allocated identifier, in the
    /// `Queued` state with the canonical queued message.
    pub fn new(task_id: u64, owner: String, service: ServiceKind) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            public_id: task_id.to_string(),
            owner,
            service,
            status: TaskStatus::Queued,
            message: TaskStatus::Queued.default_message().to_string(),
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Reconstructs a record from its durable form at bootstrap.
    ///
    /// The identifier comes from the durable key, everything else from the
    /// stored value; no identifier allocation happens on this path.
    pub fn from_stored(task_id: u64, stored: StoredTask) -> Self {
        Self {
            task_id,
            public_id: task_id.to_string(),
            owner: stored.owner,
            service: stored.service,
            status: stored.status,
            message: stored.message,
            created_at: stored.created_at,
            last_updated_at: stored.last_updated_at,
        }
    }

    /// Applies a status change in place, stamping `last_updated_at`.
    ///
    /// Callers have already validated the status and defaulted the message;
    /// this is the single mutation point for a registered task.
    pub fn apply_status(&mut self, status: TaskStatus, message: String) {
        self.status = status;
        self.message = message;
        self.last_updated_at = Utc::now();
    }

    /// Produces the wire summary for this record.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::{ServiceKind, TaskRecord};
    ///
    /// let record = TaskRecord::new(3, "bob".to_string(), ServiceKind::Compute);
    /// let summary = record.to_summary();
    /// assert_eq!(summary.task_id, "3");
    /// assert!(summary.created_at.ends_with('Z'));
    /// ```
    pub fn to_summary(&self) -> TaskSummary {
        TaskSummary {
            task_id: self.public_id.clone(),
            status: self.status,
            description: self.message.clone(),
            service: self.service,
            created_at: wire_timestamp(self.created_at),
            last_updated_at: wire_timestamp(self.last_updated_at),
        }
    }

    /// Produces the durable form of this record.
    pub fn to_stored(&self) -> StoredTask {
        StoredTask {
            status: self.status,
            owner: self.owner.clone(),
            message: self.message.clone(),
            service: self.service,
            created_at: self.created_at,
            last_updated_at: self.last_updated_at,
        }
    }
}

/// Formats a timestamp the way summaries carry it (RFC 3339, millisecond
/// precision, `Z` suffix).
fn wire_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The durable record persisted for a task.
///
/// Keyed in the store by the integer task identifier; the identifier
/// itself is therefore not repeated in the value. Serialized as camelCase
/// JSON.
///
/// # Examples
///
/// ```
/// use gateway_tasks::{ServiceKind, StoredTask, TaskRecord};
///
/// let record = TaskRecord::new(9, "carol".to_string(), ServiceKind::Storage);
/// let stored = record.to_stored();
/// let json = serde_json::to_value(&stored).unwrap();
/// assert_eq!(json["status"], "queued");
/// assert_eq!(json["owner"], "carol");
/// assert_eq!(json["service"], "storage");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    /// Current lifecycle status.
    pub status: TaskStatus,

    /// Identity of the creating caller.
    pub owner: String,

    /// Status detail.
    pub message: String,

    /// Which internal service family created the task. Persisted so the
    /// store can answer service-scoped reconciliation listings.
    pub service: ServiceKind,

    /// When the task was created.
    pub created_at: DateTime<Utc>,

    /// When the last status change was applied.
    pub last_updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_queued_with_canonical_message() {
        let record = TaskRecord::new(1, "alice".to_string(), ServiceKind::Compute);
        assert_eq!(record.status, TaskStatus::Queued);
        assert_eq!(record.message, TaskStatus::Queued.default_message());
        assert_eq!(record.created_at, record.last_updated_at);
    }

    #[test]
    fn public_id_is_decimal_alias_of_task_id() {
        let record = TaskRecord::new(1234, "alice".to_string(), ServiceKind::Storage);
        assert_eq!(record.public_id, "1234");
        assert_eq!(record.task_id, 1234);
    }

    #[test]
    fn apply_status_updates_status_message_and_timestamp() {
        let mut record = TaskRecord::new(2, "bob".to_string(), ServiceKind::Compute);
        let created = record.created_at;

        record.apply_status(TaskStatus::Running, "halfway".to_string());

        assert_eq!(record.status, TaskStatus::Running);
        assert_eq!(record.message, "halfway");
        assert!(record.last_updated_at >= created);
        assert_eq!(record.created_at, created);
    }

    #[test]
    fn apply_status_never_touches_identity_fields() {
        let mut record = TaskRecord::new(3, "bob".to_string(), ServiceKind::Storage);
        record.apply_status(TaskStatus::Failed, "boom".to_string());
        assert_eq!(record.owner, "bob");
        assert_eq!(record.public_id, "3");
        assert_eq!(record.service, ServiceKind::Storage);
    }

    #[test]
    fn stored_round_trip_preserves_fields() {
        let mut record = TaskRecord::new(4, "carol".to_string(), ServiceKind::Storage);
        record.apply_status(TaskStatus::UploadFinished, "done".to_string());

        let stored = record.to_stored();
        let bytes = serde_json::to_vec(&stored).unwrap();
        let back: StoredTask = serde_json::from_slice(&bytes).unwrap();

        let rebuilt = TaskRecord::from_stored(4, back);
        assert_eq!(rebuilt.public_id, "4");
        assert_eq!(rebuilt.owner, "carol");
        assert_eq!(rebuilt.status, TaskStatus::UploadFinished);
        assert_eq!(rebuilt.message, "done");
        assert_eq!(rebuilt.service, ServiceKind::Storage);
        assert_eq!(rebuilt.created_at, record.created_at);
    }

    #[test]
    fn summary_reflects_record_state() {
        let record = TaskRecord::new(5, "dave".to_string(), ServiceKind::Compute);
        let summary = record.to_summary();
        assert_eq!(summary.task_id, "5");
        assert_eq!(summary.status, TaskStatus::Queued);
        assert_eq!(summary.description, "Task queued");
        assert_eq!(summary.service, ServiceKind::Compute);
    }

    #[test]
    fn wire_timestamps_are_rfc3339_millis() {
        let record = TaskRecord::new(6, "erin".to_string(), ServiceKind::Storage);
        let summary = record.to_summary();
        let parsed = chrono::DateTime::parse_from_rfc3339(&summary.created_at).unwrap();
        assert_eq!(parsed.with_timezone(&Utc).timestamp(), record.created_at.timestamp());
        assert!(summary.created_at.ends_with('Z'));
    }
}
