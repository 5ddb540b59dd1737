//! Diesel row models for warehouse task persistence.

use super::schema::{warehouse_task_action_logs, warehouse_tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = warehouse_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: i64,
    pub code: String,
    pub shop_id: Option<i64>,
    pub task_type: String,
    pub label_type: String,
    pub deadline_at: Option<DateTime<Utc>>,
    pub priority: i16,
    pub status: String,
    pub is_exception: bool,
    pub exception_type: Option<String>,
    pub active: bool,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub remark: Option<String>,
    pub comment: Option<String>,
    pub documents: Value,
    pub images: Value,
    pub extra: Value,
    pub executor: Option<String>,
    pub executing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Insert model for new `pending` task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = warehouse_tasks)]
pub struct NewTaskRow {
    pub code: String,
    pub shop_id: Option<i64>,
    pub task_type: String,
    pub label_type: String,
    pub deadline_at: Option<DateTime<Utc>>,
    pub priority: i16,
    pub status: String,
    pub is_exception: bool,
    pub active: bool,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub remark: Option<String>,
    pub comment: Option<String>,
    pub documents: Value,
    pub images: Value,
    pub extra: Value,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Changeset for the caller-editable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = warehouse_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskDetailsChangeset {
    pub shop_id: Option<i64>,
    pub task_type: String,
    pub label_type: String,
    pub deadline_at: Option<DateTime<Utc>>,
    pub priority: i16,
    pub active: bool,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub remark: Option<String>,
    pub comment: Option<String>,
    pub documents: Value,
    pub images: Value,
    pub extra: Value,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Changeset for the columns a transition or reset rewrites.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = warehouse_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskLifecycleChangeset {
    pub status: String,
    pub is_exception: bool,
    pub exception_type: Option<String>,
    pub executor: Option<String>,
    pub executing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Query result row for action log records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = warehouse_task_action_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActionLogRow {
    pub id: i64,
    pub task_id: i64,
    pub task_code: String,
    pub action: String,
    pub from_status: String,
    pub to_status: String,
    pub operator: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert model for action log records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = warehouse_task_action_logs)]
pub struct NewActionLogRow {
    pub task_id: i64,
    pub task_code: String,
    pub action: String,
    pub from_status: String,
    pub to_status: String,
    pub operator: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
