//! Ownership-scoped access control.
//!
//! Access decisions operate purely on the in-memory [`TaskRecord`] and the
//! caller identity the transport layer has already verified -- this module
//! never consults the durable store and never extracts credentials itself.
//!
//! # Security Model
//!
//! Every read, update, delete, and expire operation requires the caller's
//! identity to equal the task's `owner`. One exemption exists: a status
//! update carrying a *system-terminal* code
//! ([`TaskStatus::is_system_terminal`]) is reported by a trusted automated
//! worker with no end-user identity at all, so the ownership check is
//! skipped entirely; such requests are gated by a caller-origin allow-list
//! in the transport layer instead.

use crate::domain::TaskRecord;
use crate::error::TaskError;
use crate::types::task::TaskStatus;

/// Returns `true` if `caller` may operate on `record`.
///
/// # Examples
///
/// ```
/// use gateway_tasks::security::can_access;
/// use gateway_tasks::{ServiceKind, TaskRecord};
///
/// let record = TaskRecord::new(1, "alice".to_string(), ServiceKind::Storage);
/// assert!(can_access(&record, "alice"));
/// assert!(!can_access(&record, "bob"));
/// ```
pub fn can_access(record: &TaskRecord, caller: &str) -> bool {
    record.owner == caller
}

/// Returns `true` if an update to `status` bypasses ownership checks.
///
/// # Examples
///
/// ```
/// use gateway_tasks::security::ownership_exempt;
/// use gateway_tasks::TaskStatus;
///
/// assert!(ownership_exempt(TaskStatus::DownloadError));
/// assert!(!ownership_exempt(TaskStatus::Running));
/// ```
pub fn ownership_exempt(status: TaskStatus) -> bool {
    status.is_system_terminal()
}

/// Unwraps a caller identity, failing with
/// [`TaskError::Unauthenticated`] when none was supplied.
///
/// Used on every path that is not ownership-exempt.
pub fn require_identity<'a>(caller: Option<&'a str>) -> Result<&'a str, TaskError> {
    match caller {
        Some(identity) if !identity.is_empty() => Ok(identity),
        Some(_) => Err(TaskError::Unauthenticated {
            reason: "empty caller identity".to_string(),
        }),
        None => Err(TaskError::Unauthenticated {
            reason: "no caller identity supplied".to_string(),
        }),
    }
}

/// Verifies that `caller` owns `record`, failing with
/// [`TaskError::OwnerMismatch`] otherwise.
///
/// The rejection names the task but reveals nothing about its owner.
pub fn check_owner(record: &TaskRecord, caller: &str) -> Result<(), TaskError> {
    if can_access(record, caller) {
        Ok(())
    } else {
        tracing::warn!(
            public_id = %record.public_id,
            caller = caller,
            "ownership check failed"
        );
        Err(TaskError::OwnerMismatch {
            public_id: record.public_id.clone(),
        })
    }
}
