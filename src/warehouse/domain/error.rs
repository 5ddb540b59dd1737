//! Error types for warehouse task validation and parsing.

use super::{TaskAction, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while validating warehouse task values and transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WarehouseDomainError {
    /// The requested action is not available from the task's current status.
    #[error("action '{action}' is not available for task {task_id} in status '{status}'")]
    InvalidTransition {
        /// Task the action was requested for.
        task_id: TaskId,
        /// Requested action.
        action: TaskAction,
        /// Status the task was actually in.
        status: TaskStatus,
    },

    /// A reset was requested for a task in a terminal status.
    #[error("task {task_id} cannot be reset from terminal status '{status}'")]
    ResetNotAllowed {
        /// Task the reset was requested for.
        task_id: TaskId,
        /// Terminal status the task is in.
        status: TaskStatus,
    },

    /// Deletion was requested for a task that has left `pending`.
    #[error("task {task_id} cannot be deleted in status '{status}', only pending tasks may be deleted")]
    DeletionNotAllowed {
        /// Task the deletion was requested for.
        task_id: TaskId,
        /// Status the task is in.
        status: TaskStatus,
    },

    /// Deletion was requested for a task whose action log is not empty.
    #[error("task {0} has recorded history and cannot be deleted")]
    TaskHasHistory(TaskId),

    /// The operator identity is empty after trimming.
    #[error("operator must not be empty")]
    EmptyOperator,

    /// The priority is outside the supported range.
    #[error("invalid priority {0}, expected a value between 1 and 5")]
    InvalidPriority(i64),

    /// The task code does not follow `PREFIX-YYMMDD-XXXXX`.
    #[error("invalid task code '{0}'")]
    InvalidTaskCode(String),

    /// The identifier is not a positive integer.
    #[error("invalid identifier {0}, expected a positive integer")]
    InvalidIdentifier(i64),

    /// The pagination request is out of range.
    #[error("invalid page request: page {page}, limit {limit} (maximum {max_limit})")]
    InvalidPage {
        /// Requested one-based page number.
        page: u32,
        /// Requested page size.
        limit: u32,
        /// Largest accepted page size.
        max_limit: u32,
    },
}

/// Error returned while parsing task statuses from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task action verbs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task action: {0}")]
pub struct ParseTaskActionError(pub String);

/// Error returned while parsing task types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);

/// Error returned while parsing label types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown label type: {0}")]
pub struct ParseLabelTypeError(pub String);

/// Error returned while parsing exception types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown exception type: {0}")]
pub struct ParseExceptionTypeError(pub String);
