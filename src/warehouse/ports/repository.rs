//! Repository ports for task persistence and the append-only action log.

use crate::warehouse::domain::{
    ActionLogDraft, ActionLogEntry, LogFilter, NewWarehouseTask, Page, PageRequest, TaskCode,
    TaskFilter, TaskId, TaskStatus, WarehouseTask,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Status changes go exclusively through [`Self::commit_transition`], which
/// applies the task update and appends the log row as one atomic unit.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new `pending` task and returns it with its assigned
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateCode`] when the code is already
    /// taken.
    async fn insert(&self, task: &NewWarehouseTask) -> TaskRepositoryResult<WarehouseTask>;

    /// Persists the editable details and update audit columns of a task.
    ///
    /// Status, milestones, executor and exception columns are left as stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update_details(&self, task: &WarehouseTask) -> TaskRepositoryResult<()>;

    /// Persists a transitioned task and appends its log row atomically.
    ///
    /// Only the status, exception, executor, milestone and update audit
    /// columns are written; stored details are left as they are. The update
    /// only applies while the stored status still equals `expected_status`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StaleStatus`] when another transition
    /// won the race, [`TaskRepositoryError::NotFound`] when the task is gone.
    /// Neither the task nor the log is changed on error.
    async fn commit_transition(
        &self,
        task: &WarehouseTask,
        expected_status: TaskStatus,
        log: &ActionLogDraft,
    ) -> TaskRepositoryResult<ActionLogEntry>;

    /// Deletes a task that is still `pending` and has no log rows.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`],
    /// [`TaskRepositoryError::StaleStatus`] when the task has left `pending`,
    /// or [`TaskRepositoryError::HasHistory`] when log rows exist.
    async fn delete_pending(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<WarehouseTask>>;

    /// Finds a task by code.
    ///
    /// Returns `None` when no task carries the code.
    async fn find_by_code(&self, code: &TaskCode) -> TaskRepositoryResult<Option<WarehouseTask>>;

    /// Lists tasks matching `filter` in the filter's sort order.
    async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<WarehouseTask>>;
}

/// Read-only access to the action log.
///
/// Rows are appended by [`TaskRepository::commit_transition`]; the log port
/// offers no way to change or remove them.
#[async_trait]
pub trait ActionLogRepository: Send + Sync {
    /// Lists log rows matching `filter` in chronological order.
    async fn list_entries(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<ActionLogEntry>>;

    /// Returns every log row of a task in chronological order.
    async fn history(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<ActionLogEntry>>;

    /// Returns the number of log rows recorded for a task.
    async fn count_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task and log repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same code already exists.
    #[error("duplicate task code: {0}")]
    DuplicateCode(TaskCode),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored status no longer matches the status the caller read.
    #[error("task {task_id} is in status '{actual}', expected '{expected}'")]
    StaleStatus {
        /// Task being written.
        task_id: TaskId,
        /// Status the caller based its change on.
        expected: TaskStatus,
        /// Status currently stored.
        actual: TaskStatus,
    },

    /// The task has log rows and cannot be deleted.
    #[error("task {0} has recorded history")]
    HasHistory(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
