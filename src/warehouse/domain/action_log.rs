//! Immutable audit records of task status transitions.

use super::{ActionLogId, Operator, TaskAction, TaskCode, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log entry produced by a transition and not yet appended to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogDraft {
    /// Task the transition was applied to.
    pub task_id: TaskId,
    /// Task code, denormalized for audit readability.
    pub task_code: TaskCode,
    /// Action verb.
    pub action: TaskAction,
    /// Status before the transition.
    pub from_status: TaskStatus,
    /// Status after the transition.
    pub to_status: TaskStatus,
    /// Acting operator.
    pub operator: Operator,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Transition timestamp.
    pub created_at: DateTime<Utc>,
}

impl ActionLogDraft {
    /// Attaches the store-assigned identifier.
    #[must_use]
    pub fn into_entry(self, id: ActionLogId) -> ActionLogEntry {
        ActionLogEntry {
            id,
            task_id: self.task_id,
            task_code: self.task_code,
            action: self.action,
            from_status: self.from_status,
            to_status: self.to_status,
            operator: self.operator,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

/// Appended action log row. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Store-assigned identifier.
    pub id: ActionLogId,
    /// Task the transition was applied to.
    pub task_id: TaskId,
    /// Task code at transition time.
    pub task_code: TaskCode,
    /// Action verb.
    pub action: TaskAction,
    /// Status before the transition.
    pub from_status: TaskStatus,
    /// Status after the transition.
    pub to_status: TaskStatus,
    /// Acting operator.
    pub operator: Operator,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Transition timestamp.
    pub created_at: DateTime<Utc>,
}
