//! Service layer for warehouse task creation, transitions and deletion.

use super::error::{TaskLifecycleError, TaskLifecycleResult};
use crate::config::EngineConfig;
use crate::warehouse::{
    domain::{
        ActionLogDraft, ActionLogEntry, AvailableAction, LabelType, NewWarehouseTask, Operator,
        Priority, RandomTaskCodeSource, ShopId, TaskAction, TaskCode, TaskCodeSource,
        TaskDetails, TaskDetailsUpdate, TaskId, TaskStatus, TaskType, WarehouseDomainError,
        WarehouseTask,
    },
    ports::{ActionLogRepository, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    details: TaskDetails,
}

impl CreateTaskRequest {
    /// Creates a request for a task of the given type with default
    /// attributes.
    #[must_use]
    pub fn new(task_type: TaskType) -> Self {
        Self {
            details: TaskDetails::new(task_type),
        }
    }

    /// Sets the shop.
    #[must_use]
    pub const fn with_shop(mut self, shop_id: ShopId) -> Self {
        self.details.classification.shop_id = Some(shop_id);
        self
    }

    /// Sets the label requirement.
    #[must_use]
    pub const fn with_label_type(mut self, label_type: LabelType) -> Self {
        self.details.classification.label_type = label_type;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline_at: DateTime<Utc>) -> Self {
        self.details.schedule.deadline_at = Some(deadline_at);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.details.schedule.priority = priority;
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.details.content.subject = Some(subject.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.details.content.description = Some(description.into());
        self
    }

    /// Sets the internal remark.
    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.details.content.remark = Some(remark.into());
        self
    }

    /// Sets the operator comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.details.content.comment = Some(comment.into());
        self
    }

    /// Sets document references.
    #[must_use]
    pub fn with_documents(mut self, documents: impl IntoIterator<Item = String>) -> Self {
        self.details.content.documents = documents.into_iter().collect();
        self
    }

    /// Sets image references.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.details.content.images = images.into_iter().collect();
        self
    }

    /// Sets the open attribute map.
    #[must_use]
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.details.content.extra = extra;
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.details.active = active;
        self
    }
}

/// Request payload for editing task details.
///
/// Fields that are not set keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTaskRequest {
    update: TaskDetailsUpdate,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the shop.
    #[must_use]
    pub const fn with_shop(mut self, shop_id: Option<ShopId>) -> Self {
        self.update.shop_id = Some(shop_id);
        self
    }

    /// Changes the fulfilment channel.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.update.task_type = Some(task_type);
        self
    }

    /// Changes the label requirement.
    #[must_use]
    pub const fn with_label_type(mut self, label_type: LabelType) -> Self {
        self.update.label_type = Some(label_type);
        self
    }

    /// Sets or clears the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline_at: Option<DateTime<Utc>>) -> Self {
        self.update.deadline_at = Some(deadline_at);
        self
    }

    /// Changes the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.update.priority = Some(priority);
        self
    }

    /// Sets or clears the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.update.subject = Some(subject);
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.update.description = Some(description);
        self
    }

    /// Sets or clears the internal remark.
    #[must_use]
    pub fn with_remark(mut self, remark: Option<String>) -> Self {
        self.update.remark = Some(remark);
        self
    }

    /// Sets or clears the operator comment.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.update.comment = Some(comment);
        self
    }

    /// Replaces document references.
    #[must_use]
    pub fn with_documents(mut self, documents: impl IntoIterator<Item = String>) -> Self {
        self.update.documents = Some(documents.into_iter().collect());
        self
    }

    /// Replaces image references.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.update.images = Some(images.into_iter().collect());
        self
    }

    /// Replaces the open attribute map.
    #[must_use]
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.update.extra = Some(extra);
        self
    }

    /// Changes the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.update.active = Some(active);
        self
    }
}

/// Request payload for applying an action verb to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformActionRequest {
    task_id: TaskId,
    action: String,
    operator: String,
    comment: Option<String>,
}

impl PerformActionRequest {
    /// Creates a request. The verb and operator are validated when the
    /// request is performed.
    #[must_use]
    pub fn new(task_id: TaskId, action: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            task_id,
            action: action.into(),
            operator: operator.into(),
            comment: None,
        }
    }

    /// Attaches a comment to the resulting log row.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the target task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// Task snapshot and log row written by a successful transition or reset.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// Task after the change.
    pub task: WarehouseTask,
    /// Appended log row.
    pub entry: ActionLogEntry,
}

/// Warehouse task lifecycle orchestration service.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository + ActionLogRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    code_source: Arc<dyn TaskCodeSource>,
    config: EngineConfig,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository + ActionLogRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            code_source: Arc::clone(&self.code_source),
            config: self.config.clone(),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository + ActionLogRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with default configuration and random task codes.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            code_source: Arc::new(RandomTaskCodeSource),
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the task code source.
    #[must_use]
    pub fn with_code_source(mut self, code_source: Arc<dyn TaskCodeSource>) -> Self {
        self.code_source = code_source;
        self
    }

    /// Creates a `pending` task with a freshly generated code.
    ///
    /// Codes that are already taken are replaced by new ones up to the
    /// configured number of attempts. No log row is written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when `created_by` is empty,
    /// [`TaskLifecycleError::CodeGenerationExhausted`] when no free code was
    /// found, or [`TaskLifecycleError::Repository`] when persistence fails.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        created_by: &str,
    ) -> TaskLifecycleResult<WarehouseTask> {
        let operator = Operator::new(created_by)?;
        let prefix = self.config.code_prefix.as_str();
        let attempts = self.config.code_generation_attempts;

        let first_code = self.code_source.next_code(prefix, self.clock.utc());
        let mut draft = NewWarehouseTask::new(first_code, request.details, operator, &*self.clock);

        for attempt in 1..=attempts {
            if attempt > 1 {
                let code = self
                    .code_source
                    .next_code(prefix, draft.audit().created_at);
                draft = draft.with_code(code);
            }

            if self.repository.find_by_code(draft.code()).await?.is_some() {
                warn!(code = %draft.code(), attempt, "generated task code already in use");
                continue;
            }

            match self.repository.insert(&draft).await {
                Ok(task) => {
                    info!(
                        task_id = %task.id(),
                        code = %task.code(),
                        operator = %task.audit().created_by,
                        "warehouse task created"
                    );
                    return Ok(task);
                }
                Err(TaskRepositoryError::DuplicateCode(code)) => {
                    warn!(%code, attempt, "task code collided on insert");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(TaskLifecycleError::CodeGenerationExhausted { attempts })
    }

    /// Edits classification, scheduling, content and the active flag.
    ///
    /// Status, milestones, exception flags and the code are not touched, so a
    /// concurrent transition is never overwritten. Terminal tasks remain
    /// editable.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// or [`TaskLifecycleError::Domain`] when `updated_by` is empty.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        task_id: TaskId,
        request: UpdateTaskRequest,
        updated_by: &str,
    ) -> TaskLifecycleResult<WarehouseTask> {
        let operator = Operator::new(updated_by)?;
        let mut task = self.load(task_id).await?;
        if request.update.is_empty() {
            return Ok(task);
        }

        task.update_details(request.update, &operator, &*self.clock);
        self.repository.update_details(&task).await?;
        info!(task_id = %task_id, operator = %operator, "warehouse task details updated");
        self.load(task_id).await
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, task_id: TaskId) -> TaskLifecycleResult<WarehouseTask> {
        self.load(task_id).await
    }

    /// Retrieves a task by code.
    ///
    /// Returns `Ok(None)` when no task carries the code.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when `code` is malformed or
    /// [`TaskLifecycleError::Repository`] when the lookup fails.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> TaskLifecycleResult<Option<WarehouseTask>> {
        let task_code = TaskCode::new(code)?;
        Ok(self.repository.find_by_code(&task_code).await?)
    }

    /// Lists the actions legal for the task right now, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn available_actions(
        &self,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Vec<AvailableAction>> {
        Ok(self.load(task_id).await?.available_actions())
    }

    /// Applies an action verb and appends its log row atomically.
    ///
    /// # Errors
    ///
    /// Returns, in checking order, [`TaskLifecycleError::Domain`] for an empty
    /// operator, [`TaskLifecycleError::UnknownAction`] for an unknown verb,
    /// [`TaskLifecycleError::NotFound`], [`TaskLifecycleError::Domain`] with
    /// an invalid transition, and [`TaskLifecycleError::ConflictRace`] when
    /// another writer changed the status first.
    #[tracing::instrument(skip(self))]
    pub async fn perform_action(
        &self,
        request: PerformActionRequest,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let PerformActionRequest {
            task_id,
            action,
            operator,
            comment,
        } = request;
        let acting = Operator::new(operator)?;
        let verb = TaskAction::try_from(action.as_str())?;
        let mut task = self.load(task_id).await?;
        let from = task.status();

        let log = task
            .apply_action(verb, &acting, comment, &*self.clock)
            .inspect_err(|err| debug!(%task_id, action = %verb, status = %from, %err, "transition rejected"))?;

        self.commit(task, from, &log).await
    }

    /// Forces a non-terminal task back to `pending`.
    ///
    /// Milestones, executor and exception flags are cleared and a `reset` log
    /// row is written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty operator or a
    /// terminal task, [`TaskLifecycleError::NotFound`], or
    /// [`TaskLifecycleError::ConflictRace`].
    #[tracing::instrument(skip(self))]
    pub async fn reset_task(
        &self,
        task_id: TaskId,
        operator: &str,
        comment: Option<String>,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let acting = Operator::new(operator)?;
        let mut task = self.load(task_id).await?;
        let from = task.status();

        let log = task
            .reset(&acting, comment, &*self.clock)
            .inspect_err(|err| debug!(%task_id, status = %from, %err, "reset rejected"))?;

        self.commit(task, from, &log).await
    }

    /// Deletes a task that is `pending` and has never been transitioned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`], or
    /// [`TaskLifecycleError::Domain`] when the task has left `pending` or has
    /// log rows.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, task_id: TaskId) -> TaskLifecycleResult<()> {
        let task = self.load(task_id).await?;
        task.ensure_deletable()?;
        if self.repository.count_for_task(task_id).await? > 0 {
            return Err(WarehouseDomainError::TaskHasHistory(task_id).into());
        }

        match self.repository.delete_pending(task_id).await {
            Ok(()) => {
                info!(%task_id, code = %task.code(), "warehouse task deleted");
                Ok(())
            }
            Err(TaskRepositoryError::StaleStatus { actual, .. }) => {
                warn!(%task_id, status = %actual, "task left pending before deletion");
                Err(WarehouseDomainError::DeletionNotAllowed {
                    task_id,
                    status: actual,
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the task's log rows in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn task_history(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<ActionLogEntry>> {
        self.load(task_id).await?;
        Ok(self.repository.history(task_id).await?)
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<WarehouseTask> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    async fn commit(
        &self,
        task: WarehouseTask,
        from: TaskStatus,
        log: &ActionLogDraft,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        match self.repository.commit_transition(&task, from, log).await {
            Ok(entry) => {
                info!(
                    task_id = %task.id(),
                    code = %task.code(),
                    action = %entry.action,
                    from = %entry.from_status,
                    to = %entry.to_status,
                    operator = %entry.operator,
                    "warehouse task transitioned"
                );
                let stored = self.load(task.id()).await?;
                Ok(TransitionOutcome {
                    task: stored,
                    entry,
                })
            }
            Err(err) => {
                if let TaskRepositoryError::StaleStatus { actual, .. } = &err {
                    warn!(
                        task_id = %task.id(),
                        action = %log.action,
                        expected = %from,
                        %actual,
                        "transition lost a concurrent update race"
                    );
                }
                Err(err.into())
            }
        }
    }
}
