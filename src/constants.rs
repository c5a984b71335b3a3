//! Shared constants for the task registry.

/// Default time-to-live, in seconds, applied by the expiry operation when
/// the caller does not supply one.
///
/// Matches the retention window used for scheduler-query tasks (squeue /
/// sacct polling) in the gateway.
pub const DEFAULT_TASK_EXPIRY_SECS: u64 = 300;

/// Durable key holding the last-allocated task identifier.
pub const COUNTER_KEY: &str = "last_task_id";

/// Durable key segment under which task records are stored
/// (`{prefix}:task:{id}`).
pub const TASK_KEY_SEGMENT: &str = "task";

/// Default key prefix used by the redis adapter.
pub const DEFAULT_KEY_PREFIX: &str = "tasks";

/// Body of the liveness acknowledgment returned by the health probe.
pub const HEALTH_ACK: &str = "ack";
