//! Service-level errors and their caller-facing classification.

use crate::warehouse::{
    domain::{ParseTaskActionError, TaskId, TaskStatus, WarehouseDomainError},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Coarse error classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The referenced task does not exist.
    NotFound,
    /// The action is not available from the task's current status.
    InvalidTransition,
    /// Another writer changed the task first. Retrying may succeed.
    ConflictRace,
    /// A reset or delete was refused by policy.
    PolicyViolation,
    /// Malformed input.
    Validation,
    /// Storage failed or returned data that could not be decoded.
    StoreFailure,
}

/// Errors returned by [`super::TaskLifecycleService`].
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WarehouseDomainError),

    /// The action verb is not known.
    #[error(transparent)]
    UnknownAction(#[from] ParseTaskActionError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored status changed between read and write.
    #[error("task {task_id} moved to '{actual}' while '{expected}' was being acted on")]
    ConflictRace {
        /// Task being written.
        task_id: TaskId,
        /// Status the write was based on.
        expected: TaskStatus,
        /// Status found at write time.
        actual: TaskStatus,
    },

    /// Every generated code collided with an existing task.
    #[error("no unique task code found after {attempts} attempts")]
    CodeGenerationExhausted {
        /// Number of codes tried.
        attempts: u32,
    },
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            TaskRepositoryError::StaleStatus {
                task_id,
                expected,
                actual,
            } => Self::ConflictRace {
                task_id,
                expected,
                actual,
            },
            TaskRepositoryError::HasHistory(task_id) => {
                Self::Domain(WarehouseDomainError::TaskHasHistory(task_id))
            }
            other => Self::Repository(other),
        }
    }
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => domain_kind(err),
            Self::UnknownAction(_) => ErrorKind::InvalidTransition,
            Self::Repository(_) | Self::CodeGenerationExhausted { .. } => ErrorKind::StoreFailure,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ConflictRace { .. } => ErrorKind::ConflictRace,
        }
    }

    /// Returns `true` when repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConflictRace)
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Errors returned by the read-side query services.
#[derive(Debug, Error)]
pub enum TaskQueryError {
    /// The page request is out of range.
    #[error(transparent)]
    Domain(#[from] WarehouseDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskQueryError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => domain_kind(err),
            Self::Repository(_) => ErrorKind::StoreFailure,
        }
    }
}

/// Result type for query service operations.
pub type TaskQueryResult<T> = Result<T, TaskQueryError>;

const fn domain_kind(err: &WarehouseDomainError) -> ErrorKind {
    match err {
        WarehouseDomainError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
        WarehouseDomainError::ResetNotAllowed { .. }
        | WarehouseDomainError::DeletionNotAllowed { .. }
        | WarehouseDomainError::TaskHasHistory(_) => ErrorKind::PolicyViolation,
        WarehouseDomainError::EmptyOperator
        | WarehouseDomainError::InvalidPriority(_)
        | WarehouseDomainError::InvalidTaskCode(_)
        | WarehouseDomainError::InvalidIdentifier(_)
        | WarehouseDomainError::InvalidPage { .. } => ErrorKind::Validation,
    }
}
