//! Warehouse task aggregate root and its value groups.

use super::{
    ActionLogDraft, AvailableAction, ExceptionType, LabelType, Operator, Priority, ShopId,
    TaskAction, TaskCode, TaskId, TaskStatus, TaskType, TransitionContext, WarehouseDomainError,
    transitions,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Channel and labelling classification of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskClassification {
    /// Shop the task fulfils orders for, if any.
    pub shop_id: Option<ShopId>,
    /// Fulfilment channel.
    pub task_type: TaskType,
    /// Label requirement.
    pub label_type: LabelType,
}

/// Scheduling attributes of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSchedule {
    /// Latest completion time, if any.
    pub deadline_at: Option<DateTime<Utc>>,
    /// Urgency, higher is more urgent.
    pub priority: Priority,
}

/// Free-text content and file references of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContent {
    /// Short title.
    pub subject: Option<String>,
    /// Work description.
    pub description: Option<String>,
    /// Internal remark.
    pub remark: Option<String>,
    /// Operator comment.
    pub comment: Option<String>,
    /// References to externally stored documents.
    pub documents: Vec<String>,
    /// References to externally stored images.
    pub images: Vec<String>,
    /// Open attribute map for forward-compatible fields.
    pub extra: Map<String, Value>,
}

/// Everything about a task that callers may edit directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// Classification.
    pub classification: TaskClassification,
    /// Scheduling.
    pub schedule: TaskSchedule,
    /// Content.
    pub content: TaskContent,
    /// Whether the task is active. Inactive tasks cannot be flagged onto the
    /// exception branch.
    pub active: bool,
}

impl TaskDetails {
    /// Creates details for a task of the given type with default values.
    #[must_use]
    pub fn new(task_type: TaskType) -> Self {
        Self {
            classification: TaskClassification {
                shop_id: None,
                task_type,
                label_type: LabelType::default(),
            },
            schedule: TaskSchedule::default(),
            content: TaskContent::default(),
            active: true,
        }
    }
}

/// Partial update of [`TaskDetails`].
///
/// Outer `None` leaves a field unchanged; for optional fields `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDetailsUpdate {
    /// New shop.
    pub shop_id: Option<Option<ShopId>>,
    /// New fulfilment channel.
    pub task_type: Option<TaskType>,
    /// New label requirement.
    pub label_type: Option<LabelType>,
    /// New deadline.
    pub deadline_at: Option<Option<DateTime<Utc>>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New subject.
    pub subject: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New remark.
    pub remark: Option<Option<String>>,
    /// New comment.
    pub comment: Option<Option<String>>,
    /// Replacement document references.
    pub documents: Option<Vec<String>>,
    /// Replacement image references.
    pub images: Option<Vec<String>>,
    /// Replacement attribute map.
    pub extra: Option<Map<String, Value>>,
    /// New active flag.
    pub active: Option<bool>,
}

impl TaskDetailsUpdate {
    /// Returns `true` when the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, details: &mut TaskDetails) {
        let classification = &mut details.classification;
        set_if_some(&mut classification.shop_id, self.shop_id);
        set_if_some(&mut classification.task_type, self.task_type);
        set_if_some(&mut classification.label_type, self.label_type);

        set_if_some(&mut details.schedule.deadline_at, self.deadline_at);
        set_if_some(&mut details.schedule.priority, self.priority);

        let content = &mut details.content;
        set_if_some(&mut content.subject, self.subject);
        set_if_some(&mut content.description, self.description);
        set_if_some(&mut content.remark, self.remark);
        set_if_some(&mut content.comment, self.comment);
        set_if_some(&mut content.documents, self.documents);
        set_if_some(&mut content.images, self.images);
        set_if_some(&mut content.extra, self.extra);

        set_if_some(&mut details.active, self.active);
    }
}

fn set_if_some<T>(field: &mut T, value: Option<T>) {
    if let Some(new_value) = value {
        *field = new_value;
    }
}

/// Timestamps stamped on first entry into a milestone status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    /// First entry into `picking`.
    pub executing_at: Option<DateTime<Utc>>,
    /// First entry into `ready`.
    pub ready_at: Option<DateTime<Utc>>,
    /// Entry into `completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Milestones {
    fn stamp(&mut self, status: TaskStatus, timestamp: DateTime<Utc>) {
        let slot = match status {
            TaskStatus::Picking => &mut self.executing_at,
            TaskStatus::Ready => &mut self.ready_at,
            TaskStatus::Completed => &mut self.completed_at,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(timestamp);
        }
    }
}

/// Creation and last-mutation audit columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating operator.
    pub created_by: Operator,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Latest mutating operator.
    pub updated_by: Operator,
}

impl AuditStamp {
    fn touch(&mut self, operator: &Operator, timestamp: DateTime<Utc>) {
        self.updated_at = timestamp;
        self.updated_by = operator.clone();
    }
}

/// A task that has not been stored yet and therefore has no identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWarehouseTask {
    code: TaskCode,
    details: TaskDetails,
    audit: AuditStamp,
}

impl NewWarehouseTask {
    /// Prepares a pending task with the given code.
    #[must_use]
    pub fn new(
        code: TaskCode,
        details: TaskDetails,
        created_by: Operator,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            code,
            details,
            audit: AuditStamp {
                created_at: timestamp,
                created_by: created_by.clone(),
                updated_at: timestamp,
                updated_by: created_by,
            },
        }
    }

    /// Returns the task code.
    #[must_use]
    pub const fn code(&self) -> &TaskCode {
        &self.code
    }

    /// Returns a copy carrying a different code, used when retrying after a
    /// code collision.
    #[must_use]
    pub fn with_code(mut self, code: TaskCode) -> Self {
        self.code = code;
        self
    }

    /// Returns the editable details.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the audit columns.
    #[must_use]
    pub const fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Turns the draft into a stored task with the store-assigned identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> WarehouseTask {
        WarehouseTask {
            id,
            code: self.code,
            details: self.details,
            status: TaskStatus::Pending,
            is_exception: false,
            exception_type: None,
            executor: None,
            milestones: Milestones::default(),
            audit: self.audit,
        }
    }
}

/// Warehouse task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseTask {
    id: TaskId,
    code: TaskCode,
    details: TaskDetails,
    status: TaskStatus,
    is_exception: bool,
    exception_type: Option<ExceptionType>,
    executor: Option<String>,
    milestones: Milestones,
    audit: AuditStamp,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted code.
    pub code: TaskCode,
    /// Persisted editable details.
    pub details: TaskDetails,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted exception flag.
    pub is_exception: bool,
    /// Persisted exception reason.
    pub exception_type: Option<ExceptionType>,
    /// Persisted executor.
    pub executor: Option<String>,
    /// Persisted milestone timestamps.
    pub milestones: Milestones,
    /// Persisted audit columns.
    pub audit: AuditStamp,
}

impl WarehouseTask {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            code: data.code,
            details: data.details,
            status: data.status,
            is_exception: data.is_exception,
            exception_type: data.exception_type,
            executor: data.executor,
            milestones: data.milestones,
            audit: data.audit,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task code.
    #[must_use]
    pub const fn code(&self) -> &TaskCode {
        &self.code
    }

    /// Returns the editable details.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns whether the task sits on the exception branch.
    #[must_use]
    pub const fn is_exception(&self) -> bool {
        self.is_exception
    }

    /// Returns the exception reason, if any.
    #[must_use]
    pub const fn exception_type(&self) -> Option<ExceptionType> {
        self.exception_type
    }

    /// Returns the operator executing the task, if any.
    #[must_use]
    pub fn executor(&self) -> Option<&str> {
        self.executor.as_deref()
    }

    /// Returns the milestone timestamps.
    #[must_use]
    pub const fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    /// Returns the audit columns.
    #[must_use]
    pub const fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Returns the attributes transition guards are evaluated against.
    #[must_use]
    pub const fn transition_context(&self) -> TransitionContext {
        TransitionContext {
            task_type: self.details.classification.task_type,
            label_type: self.details.classification.label_type,
            active: self.details.active,
        }
    }

    /// Returns the actions legal from the current status, in table order.
    #[must_use]
    pub fn available_actions(&self) -> Vec<AvailableAction> {
        transitions::available_actions(self.status, &self.transition_context())
    }

    /// Applies a table-driven action and returns the log entry to append.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::InvalidTransition`] when the action is
    /// not among [`Self::available_actions`]. The task is left unchanged.
    pub fn apply_action(
        &mut self,
        action: TaskAction,
        operator: &Operator,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<ActionLogDraft, WarehouseDomainError> {
        let from = self.status;
        let to = transitions::resolve_transition(from, action, &self.transition_context())
            .ok_or(WarehouseDomainError::InvalidTransition {
                task_id: self.id,
                action,
                status: from,
            })?;

        let timestamp = clock.utc();
        self.status = to;
        self.milestones.stamp(to, timestamp);
        if to == TaskStatus::Picking && self.executor.is_none() {
            self.executor = Some(operator.as_str().to_owned());
        }
        if to.is_exception() {
            self.is_exception = true;
            self.exception_type = ExceptionType::for_status(to);
        } else if action == TaskAction::Start {
            self.clear_exception();
        }
        self.audit.touch(operator, timestamp);

        Ok(self.log_draft(action, from, operator, comment, timestamp))
    }

    /// Forces the task back to `pending` and returns the log entry to append.
    ///
    /// Milestones, executor and exception flags are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::ResetNotAllowed`] when the task is in a
    /// terminal status.
    pub fn reset(
        &mut self,
        operator: &Operator,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<ActionLogDraft, WarehouseDomainError> {
        let from = self.status;
        if from.is_terminal() {
            return Err(WarehouseDomainError::ResetNotAllowed {
                task_id: self.id,
                status: from,
            });
        }

        let timestamp = clock.utc();
        self.status = TaskStatus::Pending;
        self.milestones = Milestones::default();
        self.executor = None;
        self.clear_exception();
        self.audit.touch(operator, timestamp);

        Ok(self.log_draft(TaskAction::Reset, from, operator, comment, timestamp))
    }

    /// Applies a partial update of the editable details.
    pub fn update_details(
        &mut self,
        update: TaskDetailsUpdate,
        operator: &Operator,
        clock: &impl Clock,
    ) {
        update.apply(&mut self.details);
        self.audit.touch(operator, clock.utc());
    }

    /// Checks the deletion policy.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseDomainError::DeletionNotAllowed`] when the task is
    /// not `pending`.
    pub fn ensure_deletable(&self) -> Result<(), WarehouseDomainError> {
        if self.status != TaskStatus::Pending {
            return Err(WarehouseDomainError::DeletionNotAllowed {
                task_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn clear_exception(&mut self) {
        self.is_exception = false;
        self.exception_type = None;
    }

    fn log_draft(
        &self,
        action: TaskAction,
        from: TaskStatus,
        operator: &Operator,
        comment: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ActionLogDraft {
        ActionLogDraft {
            task_id: self.id,
            task_code: self.code.clone(),
            action,
            from_status: from,
            to_status: self.status,
            operator: operator.clone(),
            comment: comment.filter(|text| !text.trim().is_empty()),
            created_at,
        }
    }
}
