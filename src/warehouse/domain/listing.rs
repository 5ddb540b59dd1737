//! Filter, ordering and pagination types for task and log listings.

use super::{
    ActionLogEntry, Priority, ShopId, TaskAction, TaskCode, TaskId, TaskStatus, TaskType,
    WarehouseDomainError, WarehouseTask,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl PageRequest {
    /// Creates a page request. Validation happens in [`Self::validate`].
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Checks that the page is at least 1 and the limit lies in
    /// `1..=max_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::InvalidPage`] otherwise.
    pub const fn validate(self, max_limit: u32) -> Result<Self, WarehouseDomainError> {
        if self.page == 0 || self.limit == 0 || self.limit > max_limit {
            return Err(WarehouseDomainError::InvalidPage {
                page: self.page,
                limit: self.limit,
                max_limit,
            });
        }
        Ok(self)
    }

    /// Number of rows skipped before this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page.saturating_sub(1) as u64) * (self.limit as u64)
    }
}

/// A page of results and the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Total number of rows matching the filter.
    pub total: u64,
    /// Requested page size.
    pub limit: u32,
    /// Rows skipped before this page.
    pub offset: u64,
}

impl<T> Page<T> {
    /// Builds a page for `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            limit: request.limit,
            offset: request.offset(),
        }
    }
}

/// Priority predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum PriorityFilter {
    /// Priority equals the value.
    Exact(Priority),
    /// Priority is at least the value.
    AtLeast(Priority),
}

impl PriorityFilter {
    /// Returns `true` when `priority` satisfies the predicate.
    #[must_use]
    pub fn matches(self, priority: Priority) -> bool {
        match self {
            Self::Exact(expected) => priority == expected,
            Self::AtLeast(floor) => priority >= floor,
        }
    }
}

/// Ordering of task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    /// Latest deadline first, tasks without deadline last.
    #[default]
    DeadlineDesc,
    /// Earliest deadline first, tasks without deadline last.
    DeadlineAsc,
    /// Most urgent first, then earliest deadline.
    PriorityDesc,
    /// Most recently created first.
    CreatedDesc,
}

impl TaskSort {
    /// Compares two tasks in listing order. Ties are broken by identifier so
    /// the order is total.
    #[must_use]
    pub fn compare(self, left: &WarehouseTask, right: &WarehouseTask) -> Ordering {
        let deadline = |task: &WarehouseTask| task.details().schedule.deadline_at;
        match self {
            Self::DeadlineDesc => nulls_last(deadline(left), deadline(right), true)
                .then_with(|| right.id().cmp(&left.id())),
            Self::DeadlineAsc => nulls_last(deadline(left), deadline(right), false)
                .then_with(|| left.id().cmp(&right.id())),
            Self::PriorityDesc => {
                let priority = |task: &WarehouseTask| task.details().schedule.priority;
                priority(right)
                    .cmp(&priority(left))
                    .then_with(|| nulls_last(deadline(left), deadline(right), false))
                    .then_with(|| left.id().cmp(&right.id()))
            }
            Self::CreatedDesc => right
                .audit()
                .created_at
                .cmp(&left.audit().created_at)
                .then_with(|| right.id().cmp(&left.id())),
        }
    }
}

fn nulls_last<T: Ord>(left: Option<T>, right: Option<T>, descending: bool) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) if descending => r.cmp(&l),
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Composite predicate over tasks. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks in one of these statuses (ignored when empty).
    pub status_in: Vec<TaskStatus>,
    /// No tasks in any of these statuses.
    pub status_not_in: Vec<TaskStatus>,
    /// Only tasks of this shop.
    pub shop_id: Option<ShopId>,
    /// Priority predicate.
    pub priority: Option<PriorityFilter>,
    /// Only tasks of this type.
    pub task_type: Option<TaskType>,
    /// Only tasks with this active flag.
    pub active: Option<bool>,
    /// Only tasks with this exception flag.
    pub is_exception: Option<bool>,
    /// Only tasks created at or after this time.
    pub created_from: Option<DateTime<Utc>>,
    /// Only tasks with a deadline at or before this time.
    pub deadline_until: Option<DateTime<Utc>>,
    /// Only the task with this code.
    pub code: Option<TaskCode>,
    /// Result ordering.
    pub sort: TaskSort,
}

impl TaskFilter {
    /// Returns `true` when `task` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, task: &WarehouseTask) -> bool {
        let details = task.details();
        let status = task.status();
        (self.status_in.is_empty() || self.status_in.contains(&status))
            && !self.status_not_in.contains(&status)
            && self
                .shop_id
                .is_none_or(|shop| details.classification.shop_id == Some(shop))
            && self
                .priority
                .is_none_or(|predicate| predicate.matches(details.schedule.priority))
            && self
                .task_type
                .is_none_or(|kind| details.classification.task_type == kind)
            && self.active.is_none_or(|active| details.active == active)
            && self
                .is_exception
                .is_none_or(|flag| task.is_exception() == flag)
            && self
                .created_from
                .is_none_or(|floor| task.audit().created_at >= floor)
            && self.deadline_until.is_none_or(|ceiling| {
                details
                    .schedule
                    .deadline_at
                    .is_some_and(|deadline| deadline <= ceiling)
            })
            && self.code.as_ref().is_none_or(|code| task.code() == code)
    }
}

/// Composite predicate over action log rows. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Only rows of this task.
    pub task_id: Option<TaskId>,
    /// Only rows with this action.
    pub action: Option<TaskAction>,
    /// Only rows written by this operator.
    pub operator: Option<String>,
    /// Only rows created at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only rows created at or before this time.
    pub until: Option<DateTime<Utc>>,
}

impl LogFilter {
    /// Returns a filter matching every row of one task.
    #[must_use]
    pub fn for_task(task_id: TaskId) -> Self {
        Self {
            task_id: Some(task_id),
            ..Self::default()
        }
    }

    /// Returns `true` when `entry` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, entry: &ActionLogEntry) -> bool {
        self.task_id.is_none_or(|id| entry.task_id == id)
            && self.action.is_none_or(|action| entry.action == action)
            && self
                .operator
                .as_deref()
                .is_none_or(|operator| entry.operator.as_str() == operator)
            && self.from.is_none_or(|floor| entry.created_at >= floor)
            && self.until.is_none_or(|ceiling| entry.created_at <= ceiling)
    }
}
