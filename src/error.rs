//! Error types for task registry operations.
//!
//! Provides [`TaskError`], the error enum every facade and registry
//! operation returns, with context fields and a retryability split per
//! failure class.
//!
//! # Taxonomy
//!
//! | Variant | Class | Retry helps? |
//! |---------|-------|--------------|
//! | [`Unauthenticated`](TaskError::Unauthenticated) | authentication | no |
//! | [`OwnerMismatch`](TaskError::OwnerMismatch) | authorization | no |
//! | [`UnknownService`](TaskError::UnknownService) | authorization | no |
//! | [`NotFound`](TaskError::NotFound) | lookup | no |
//! | [`UnrecognizedStatus`](TaskError::UnrecognizedStatus) | validation | no |
//! | [`ReservedStatus`](TaskError::ReservedStatus) | validation | no |
//! | [`DuplicateTask`](TaskError::DuplicateTask) | internal | no |
//! | [`Store`](TaskError::Store) | persistence | if unavailable |
//!
//! Validation and authorization failures are reported before any state
//! mutation; a persistence failure leaves the in-memory registry untouched
//! because every write persists before it applies.

use thiserror::Error;

use crate::store::StoreError;
use crate::types::task::TaskStatus;

/// Errors that can occur during task registry operations.
///
/// Each variant carries the context a caller needs to act on the failure.
/// Use [`is_retryable`](TaskError::is_retryable) to distinguish "retry will
/// not help" (validation, authorization, lookup) from "retry might help"
/// (durable store unavailability) without inspecting message text.
///
/// # Examples
///
/// ```
/// use gateway_tasks::TaskError;
///
/// let err = TaskError::NotFound { public_id: "7".to_string() };
/// assert!(err.to_string().contains('7'));
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Error)]
pub enum TaskError {
    /// The operation requires a caller identity and none was supplied.
    #[error("caller identity required: {reason}")]
    Unauthenticated {
        /// Why the identity requirement was not met.
        reason: String,
    },

    /// The caller's identity does not match the task's owner.
    #[error("operation not permitted: caller does not own task {public_id}")]
    OwnerMismatch {
        /// The task the caller attempted to access.
        public_id: String,
    },

    /// The caller named a service family this registry does not recognize.
    #[error("unknown service '{service}' (expected 'storage' or 'compute')")]
    UnknownService {
        /// The service name as received.
        service: String,
    },

    /// No task with the given public identifier is known to the registry.
    #[error("task {public_id} does not exist")]
    NotFound {
        /// The public identifier that failed to resolve.
        public_id: String,
    },

    /// A status update carried a code outside the recognized set.
    ///
    /// The display text lists every recognized code so the caller can
    /// correct itself without consulting documentation.
    #[error(
        "unrecognized status code '{code}' (recognized: {})",
        TaskStatus::recognized_codes().join(", ")
    )]
    UnrecognizedStatus {
        /// The status code as received.
        code: String,
    },

    /// The status is recognized but not settable through the generic
    /// update operation (`deleted` is reachable only via deletion).
    #[error("status '{status}' can only be set by the delete operation")]
    ReservedStatus {
        /// The reserved status that was rejected.
        status: TaskStatus,
    },

    /// A freshly allocated identifier collided with a registered task.
    ///
    /// Indicates a corrupted counter in the durable store; never expected
    /// in normal operation.
    #[error("task {public_id} is already registered")]
    DuplicateTask {
        /// The colliding public identifier.
        public_id: String,
    },

    /// The durable store failed the operation.
    ///
    /// At bootstrap this is fatal; at request time the operation as a
    /// whole fails with the in-memory view unchanged.
    #[error("durable store failure: {0}")]
    Store(#[from] StoreError),
}

impl TaskError {
    /// Returns `true` if retrying the same operation may succeed.
    ///
    /// Only durable store unavailability is retryable; every other failure
    /// is deterministic for identical inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tasks::{StoreError, TaskError};
    ///
    /// let err = TaskError::Store(StoreError::unavailable("connection refused"));
    /// assert!(err.is_retryable());
    ///
    /// let err = TaskError::UnknownService { service: "archive".to_string() };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_task() {
        let err = TaskError::NotFound {
            public_id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "task 42 does not exist");
    }

    #[test]
    fn unrecognized_status_lists_recognized_codes() {
        let err = TaskError::UnrecognizedStatus {
            code: "paused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("paused"));
        assert!(msg.contains("queued"));
        assert!(msg.contains("deleted"));
    }

    #[test]
    fn reserved_status_names_the_status() {
        let err = TaskError::ReservedStatus {
            status: TaskStatus::Deleted,
        };
        assert!(err.to_string().contains("deleted"));
        assert!(err.to_string().contains("delete operation"));
    }

    #[test]
    fn store_unavailable_is_retryable() {
        let err = TaskError::Store(StoreError::unavailable("timed out"));
        assert!(err.is_retryable());
    }

    #[test]
    fn non_persistence_failures_are_not_retryable() {
        let errs = [
            TaskError::Unauthenticated {
                reason: "no credential".to_string(),
            },
            TaskError::OwnerMismatch {
                public_id: "1".to_string(),
            },
            TaskError::UnknownService {
                service: "other".to_string(),
            },
            TaskError::NotFound {
                public_id: "1".to_string(),
            },
            TaskError::UnrecognizedStatus {
                code: "x".to_string(),
            },
            TaskError::ReservedStatus {
                status: TaskStatus::Deleted,
            },
            TaskError::DuplicateTask {
                public_id: "1".to_string(),
            },
        ];
        for err in errs {
            assert!(!err.is_retryable(), "{err} should not be retryable");
        }
    }

    #[test]
    fn store_error_source_is_preserved() {
        let err = TaskError::Store(StoreError::unavailable("broken pipe"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
