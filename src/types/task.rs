//! Core task wire types: status codes, service origins, and summaries.
//!
//! This module defines [`TaskStatus`] (the recognized status-code set),
//! [`ServiceKind`] (which internal caller family a task belongs to), and
//! [`TaskSummary`] (the status summary returned to callers).
//!
//! # Serialization
//!
//! Status codes and service names serialize as `snake_case` strings;
//! [`TaskSummary`] uses `camelCase` field naming with RFC 3339 timestamp
//! strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Status reports originate from independent, loosely-coordinated callers
/// (a transfer worker may report completion or failure without ever having
/// reported `running`), so the machine enforces **no ordering** between
/// codes: any recognized code is a legal successor of any other. Two groups
/// are structurally distinguished:
///
/// - [`Deleted`](TaskStatus::Deleted) is reachable only through the explicit
///   delete operation, never through a generic status update.
/// - The four **system-terminal** codes (`DownloadFinished`, `DownloadError`,
///   `UploadFinished`, `UploadError`) are produced by automated internal
///   workers rather than end users; updates carrying them are exempt from
///   ownership verification (the transport layer gates them by origin
///   instead).
///
/// # Examples
///
/// ```
/// use gateway_tasks::TaskStatus;
///
/// assert_eq!(TaskStatus::from_code("queued"), Some(TaskStatus::Queued));
/// assert_eq!(TaskStatus::from_code("paused"), None);
/// assert!(TaskStatus::DownloadFinished.is_system_terminal());
/// assert!(!TaskStatus::Running.is_system_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task accepted and waiting to run.
    Queued,
    /// Task is in progress.
    Running,
    /// Task finished successfully.
    Completed,
    /// Task failed.
    Failed,
    /// Server-to-object-storage download finished (system-terminal).
    DownloadFinished,
    /// Server-to-object-storage download failed (system-terminal).
    DownloadError,
    /// Object-storage-to-server upload finished (system-terminal).
    UploadFinished,
    /// Object-storage-to-server upload failed (system-terminal).
    UploadError,
    /// Soft-delete marker, set only by the delete operation.
    Deleted,
}

/// Every recognized status, in wire-code order.
const ALL_STATUSES: [TaskStatus; 9] = [
    TaskStatus::Queued,
    TaskStatus::Running,
    TaskStatus::Completed,
    TaskStatus::Failed,
    TaskStatus::DownloadFinished,
    TaskStatus::DownloadError,
    TaskStatus::UploadFinished,
    TaskStatus::UploadError,
    TaskStatus::Deleted,
];

const ALL_CODES: [&str; 9] = [
    "queued",
    "running",
    "completed",
    "failed",
    "download_finished",
    "download_error",
    "upload_finished",
    "upload_error",
    "deleted",
];

impl TaskStatus {
    /// All recognized statuses.
    pub const ALL: [Self; 9] = ALL_STATUSES;

    /// Returns the wire code for this status.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::DownloadFinished.code(), "download_finished");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::DownloadFinished => "download_finished",
            Self::DownloadError => "download_error",
            Self::UploadFinished => "upload_finished",
            Self::UploadError => "upload_error",
            Self::Deleted => "deleted",
        }
    }

    /// The full recognized-code list, used in validation error messages so
    /// callers are told definitively which codes exist.
    pub fn recognized_codes() -> &'static [&'static str] {
        &ALL_CODES
    }

    /// Parses a raw wire code into a status.
    ///
    /// Returns `None` for anything outside the recognized set; the caller
    /// turns that into a validation failure before mutating any state.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::from_code("upload_error"), Some(TaskStatus::UploadError));
    /// assert_eq!(TaskStatus::from_code(""), None);
    /// assert_eq!(TaskStatus::from_code("QUEUED"), None); // codes are exact
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        ALL_CODES
            .iter()
            .position(|&c| c == code)
            .map(|i| ALL_STATUSES[i])
    }

    /// Returns `true` for the four codes reported by automated internal
    /// workers, which exempt a status update from ownership verification.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::TaskStatus;
    ///
    /// assert!(TaskStatus::UploadError.is_system_terminal());
    /// assert!(!TaskStatus::Completed.is_system_terminal());
    /// assert!(!TaskStatus::Deleted.is_system_terminal());
    /// ```
    pub fn is_system_terminal(&self) -> bool {
        matches!(
            self,
            Self::DownloadFinished | Self::DownloadError | Self::UploadFinished | Self::UploadError
        )
    }

    /// The canonical message applied when a status report carries none.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Queued.default_message(), "Task queued");
    /// ```
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Queued => "Task queued",
            Self::Running => "Task in progress",
            Self::Completed => "Task completed",
            Self::Failed => "Task failed",
            Self::DownloadFinished => "Download to object storage finished",
            Self::DownloadError => "Download to object storage failed",
            Self::UploadFinished => "Upload from object storage finished",
            Self::UploadError => "Upload from object storage failed",
            Self::Deleted => "Task deleted",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which internal caller family created and owns a task.
///
/// Tasks are only ever created by a recognized internal service; the name
/// arrives as a header value from the transport layer and anything outside
/// this set is an authorization failure.
///
/// # Examples
///
/// ```
/// use gateway_tasks::ServiceKind;
///
/// assert_eq!(ServiceKind::from_name("storage"), Some(ServiceKind::Storage));
/// assert_eq!(ServiceKind::from_name("archive"), None);
/// assert_eq!(ServiceKind::Compute.to_string(), "compute");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// The storage service (transfers to and from object storage).
    Storage,
    /// The compute service (scheduler job submissions and queries).
    Compute,
}

impl ServiceKind {
    /// Returns the wire name for this service.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Compute => "compute",
        }
    }

    /// Parses a service name; `None` for unrecognized services.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "storage" => Some(Self::Storage),
            "compute" => Some(Self::Compute),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The status summary returned to callers for a single task.
///
/// This is the wire shape for reads and listings; the transport layer
/// wraps it in its own response envelope and derives the canonical task
/// URL from `task_id`.
///
/// # Examples
///
/// ```
/// use gateway_tasks::{ServiceKind, TaskStatus, TaskSummary};
///
/// let summary = TaskSummary {
///     task_id: "7".to_string(),
///     status: TaskStatus::Queued,
///     description: "Task queued".to_string(),
///     service: ServiceKind::Compute,
///     created_at: "2026-08-06T10:30:00.000Z".to_string(),
///     last_updated_at: "2026-08-06T10:30:00.000Z".to_string(),
/// };
///
/// let json = serde_json::to_value(&summary).unwrap();
/// assert_eq!(json["taskId"], "7");
/// assert_eq!(json["status"], "queued");
/// assert_eq!(json["createdAt"], "2026-08-06T10:30:00.000Z");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// The public task identifier.
    pub task_id: String,

    /// Current lifecycle status.
    pub status: TaskStatus,

    /// Human-readable status detail (canonical message when the reporter
    /// supplied none).
    pub description: String,

    /// Which internal service family owns the task.
    pub service: ServiceKind,

    /// RFC 3339 timestamp of task creation.
    pub created_at: String,

    /// RFC 3339 timestamp of the last applied status change.
    pub last_updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_matches_code() {
        for status in TaskStatus::ALL {
            assert_eq!(status.to_string(), status.code());
        }
    }

    #[test]
    fn status_serde_matches_code() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.code());
            let back: TaskStatus = serde_json::from_value(json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn from_code_round_trips_every_status() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn from_code_rejects_unknown_and_near_misses() {
        for code in ["", "QUEUED", "queued ", "download-finished", "unknown"] {
            assert_eq!(TaskStatus::from_code(code), None, "code: {code:?}");
        }
    }

    #[test]
    fn recognized_codes_cover_all_statuses() {
        assert_eq!(TaskStatus::recognized_codes().len(), TaskStatus::ALL.len());
        for status in TaskStatus::ALL {
            assert!(TaskStatus::recognized_codes().contains(&status.code()));
        }
    }

    #[test]
    fn exactly_four_system_terminal_codes() {
        let system_terminal: Vec<TaskStatus> = TaskStatus::ALL
            .into_iter()
            .filter(TaskStatus::is_system_terminal)
            .collect();
        assert_eq!(
            system_terminal,
            vec![
                TaskStatus::DownloadFinished,
                TaskStatus::DownloadError,
                TaskStatus::UploadFinished,
                TaskStatus::UploadError,
            ]
        );
    }

    #[test]
    fn deleted_is_not_system_terminal() {
        assert!(!TaskStatus::Deleted.is_system_terminal());
    }

    #[test]
    fn every_status_has_a_default_message() {
        for status in TaskStatus::ALL {
            assert!(!status.default_message().is_empty());
        }
    }

    #[test]
    fn service_kind_round_trips() {
        for service in [ServiceKind::Storage, ServiceKind::Compute] {
            assert_eq!(ServiceKind::from_name(service.name()), Some(service));
            let json = serde_json::to_value(service).unwrap();
            assert_eq!(json, service.name());
        }
    }

    #[test]
    fn service_kind_rejects_unknown() {
        for name in ["", "Storage", "archive", "compute "] {
            assert_eq!(ServiceKind::from_name(name), None, "name: {name:?}");
        }
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = TaskSummary {
            task_id: "12".to_string(),
            status: TaskStatus::UploadError,
            description: "Upload from object storage failed".to_string(),
            service: ServiceKind::Storage,
            created_at: "2026-08-06T09:00:00.000Z".to_string(),
            last_updated_at: "2026-08-06T09:05:00.000Z".to_string(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["taskId"], "12");
        assert_eq!(json["status"], "upload_error");
        assert_eq!(json["description"], "Upload from object storage failed");
        assert_eq!(json["service"], "storage");
        assert_eq!(json["lastUpdatedAt"], "2026-08-06T09:05:00.000Z");
    }

    #[test]
    fn summary_round_trip_deserialization() {
        let json_str = r#"{
            "taskId": "3",
            "status": "running",
            "description": "Task in progress",
            "service": "compute",
            "createdAt": "2026-08-06T09:00:00.000Z",
            "lastUpdatedAt": "2026-08-06T09:01:00.000Z"
        }"#;

        let summary: TaskSummary = serde_json::from_str(json_str).unwrap();
        assert_eq!(summary.task_id, "3");
        assert_eq!(summary.status, TaskStatus::Running);
        assert_eq!(summary.service, ServiceKind::Compute);
    }
}
