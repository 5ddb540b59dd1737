//! `PostgreSQL` repository implementation for warehouse tasks and logs.

use super::{
    models::{
        ActionLogRow, NewActionLogRow, NewTaskRow, TaskDetailsChangeset, TaskLifecycleChangeset,
        TaskRow,
    },
    schema::{warehouse_task_action_logs, warehouse_tasks},
};
use crate::warehouse::{
    domain::{
        ActionLogDraft, ActionLogEntry, ActionLogId, AuditStamp, ExceptionType, LabelType,
        LogFilter, Milestones, NewWarehouseTask, Operator, Page, PageRequest, PersistedTaskData,
        Priority, PriorityFilter, ShopId, TaskAction, TaskClassification, TaskCode, TaskContent,
        TaskDetails, TaskFilter, TaskId, TaskSchedule, TaskSort, TaskStatus, TaskType,
        WarehouseTask,
    },
    ports::{ActionLogRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use serde_json::{Map, Value};

/// `PostgreSQL` connection pool type used by warehouse adapters.
pub type WarehousePgPool = Pool<ConnectionManager<PgConnection>>;

const CODE_UNIQUE_CONSTRAINT: &str = "idx_warehouse_tasks_code_unique";

/// `PostgreSQL`-backed task and action log repository.
///
/// Transitions run the guarded task update and the log insert inside one
/// database transaction.
#[derive(Debug, Clone)]
pub struct PostgresWarehouseRepository {
    pool: WarehousePgPool,
}

impl PostgresWarehouseRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WarehousePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresWarehouseRepository {
    async fn insert(&self, task: &NewWarehouseTask) -> TaskRepositoryResult<WarehouseTask> {
        let code = task.code().clone();
        let new_row = to_new_task_row(task);

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(warehouse_tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_code_unique_violation(info.as_ref()) =>
                    {
                        TaskRepositoryError::DuplicateCode(code.clone())
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            row_to_task(row)
        })
        .await
    }

    async fn update_details(&self, task: &WarehouseTask) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_details_changeset(task);

        self.run_blocking(move |connection| {
            let updated = diesel::update(warehouse_tasks::table.find(task_id.value()))
                .set(&changeset)
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn commit_transition(
        &self,
        task: &WarehouseTask,
        expected_status: TaskStatus,
        log: &ActionLogDraft,
    ) -> TaskRepositoryResult<ActionLogEntry> {
        let task_id = task.id();
        let changeset = to_lifecycle_changeset(task);
        let new_log = to_new_log_row(log);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let updated = diesel::update(
                    warehouse_tasks::table
                        .filter(warehouse_tasks::id.eq(task_id.value()))
                        .filter(warehouse_tasks::status.eq(expected_status.as_str())),
                )
                .set(&changeset)
                .execute(tx)?;

                if updated == 0 {
                    return Err(guard_failure(tx, task_id, expected_status)?);
                }

                let row = diesel::insert_into(warehouse_task_action_logs::table)
                    .values(&new_log)
                    .returning(ActionLogRow::as_returning())
                    .get_result::<ActionLogRow>(tx)?;
                row_to_log_entry(row)
            })
        })
        .await
    }

    async fn delete_pending(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let stored_status = warehouse_tasks::table
                    .find(id.value())
                    .select(warehouse_tasks::status)
                    .for_update()
                    .first::<String>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(id))?;

                let actual = parse_status(&stored_status)?;
                if actual != TaskStatus::Pending {
                    return Err(TaskRepositoryError::StaleStatus {
                        task_id: id,
                        expected: TaskStatus::Pending,
                        actual,
                    });
                }

                let history = warehouse_task_action_logs::table
                    .filter(warehouse_task_action_logs::task_id.eq(id.value()))
                    .count()
                    .get_result::<i64>(tx)?;
                if history > 0 {
                    return Err(TaskRepositoryError::HasHistory(id));
                }

                diesel::delete(warehouse_tasks::table.find(id.value())).execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<WarehouseTask>> {
        self.run_blocking(move |connection| {
            let row = warehouse_tasks::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_code(&self, code: &TaskCode) -> TaskRepositoryResult<Option<WarehouseTask>> {
        let lookup_code = code.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = warehouse_tasks::table
                .filter(warehouse_tasks::code.eq(lookup_code))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<WarehouseTask>> {
        let lookup_filter = filter.clone();
        let (offset, limit) = page_bounds(page)?;

        self.run_blocking(move |connection| {
            let total = filtered_tasks(&lookup_filter)
                .count()
                .get_result::<i64>(connection)?;
            let rows = sorted_tasks(filtered_tasks(&lookup_filter), lookup_filter.sort)
                .offset(offset)
                .limit(limit)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            let items = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            Ok(Page::new(items, count_to_u64(total)?, page))
        })
        .await
    }
}

#[async_trait]
impl ActionLogRepository for PostgresWarehouseRepository {
    async fn list_entries(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<ActionLogEntry>> {
        let lookup_filter = filter.clone();
        let (offset, limit) = page_bounds(page)?;

        self.run_blocking(move |connection| {
            let total = filtered_logs(&lookup_filter)
                .count()
                .get_result::<i64>(connection)?;
            let rows = filtered_logs(&lookup_filter)
                .order(warehouse_task_action_logs::created_at.asc())
                .then_order_by(warehouse_task_action_logs::id.asc())
                .offset(offset)
                .limit(limit)
                .select(ActionLogRow::as_select())
                .load::<ActionLogRow>(connection)?;
            let items = rows
                .into_iter()
                .map(row_to_log_entry)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            Ok(Page::new(items, count_to_u64(total)?, page))
        })
        .await
    }

    async fn history(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<ActionLogEntry>> {
        self.run_blocking(move |connection| {
            let rows = warehouse_task_action_logs::table
                .filter(warehouse_task_action_logs::task_id.eq(task_id.value()))
                .order(warehouse_task_action_logs::created_at.asc())
                .then_order_by(warehouse_task_action_logs::id.asc())
                .select(ActionLogRow::as_select())
                .load::<ActionLogRow>(connection)?;
            rows.into_iter().map(row_to_log_entry).collect()
        })
        .await
    }

    async fn count_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let total = warehouse_task_action_logs::table
                .filter(warehouse_task_action_logs::task_id.eq(task_id.value()))
                .count()
                .get_result::<i64>(connection)?;
            count_to_u64(total)
        })
        .await
    }
}

/// Explains why a guarded update touched no rows.
fn guard_failure(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: TaskStatus,
) -> TaskRepositoryResult<TaskRepositoryError> {
    let stored_status = warehouse_tasks::table
        .find(task_id.value())
        .select(warehouse_tasks::status)
        .first::<String>(connection)
        .optional()?;
    Ok(match stored_status {
        None => TaskRepositoryError::NotFound(task_id),
        Some(raw) => TaskRepositoryError::StaleStatus {
            task_id,
            expected,
            actual: parse_status(&raw)?,
        },
    })
}

fn filtered_tasks(filter: &TaskFilter) -> warehouse_tasks::BoxedQuery<'static, Pg> {
    let mut query = warehouse_tasks::table.into_boxed();

    if !filter.status_in.is_empty() {
        query = query.filter(warehouse_tasks::status.eq_any(status_values(&filter.status_in)));
    }
    if !filter.status_not_in.is_empty() {
        query = query.filter(warehouse_tasks::status.ne_all(status_values(&filter.status_not_in)));
    }
    if let Some(shop_id) = filter.shop_id {
        query = query.filter(warehouse_tasks::shop_id.eq(shop_id.value()));
    }
    match filter.priority {
        Some(PriorityFilter::Exact(priority)) => {
            query = query.filter(warehouse_tasks::priority.eq(priority_to_column(priority)));
        }
        Some(PriorityFilter::AtLeast(priority)) => {
            query = query.filter(warehouse_tasks::priority.ge(priority_to_column(priority)));
        }
        None => {}
    }
    if let Some(task_type) = filter.task_type {
        query = query.filter(warehouse_tasks::task_type.eq(task_type.as_str()));
    }
    if let Some(active) = filter.active {
        query = query.filter(warehouse_tasks::active.eq(active));
    }
    if let Some(is_exception) = filter.is_exception {
        query = query.filter(warehouse_tasks::is_exception.eq(is_exception));
    }
    if let Some(created_from) = filter.created_from {
        query = query.filter(warehouse_tasks::created_at.ge(created_from));
    }
    if let Some(deadline_until) = filter.deadline_until {
        query = query.filter(warehouse_tasks::deadline_at.le(deadline_until));
    }
    if let Some(code) = &filter.code {
        query = query.filter(warehouse_tasks::code.eq(code.as_str().to_owned()));
    }

    query
}

fn sorted_tasks(
    query: warehouse_tasks::BoxedQuery<'static, Pg>,
    sort: TaskSort,
) -> warehouse_tasks::BoxedQuery<'static, Pg> {
    match sort {
        TaskSort::DeadlineDesc => query
            .order(warehouse_tasks::deadline_at.desc().nulls_last())
            .then_order_by(warehouse_tasks::id.desc()),
        TaskSort::DeadlineAsc => query
            .order(warehouse_tasks::deadline_at.asc().nulls_last())
            .then_order_by(warehouse_tasks::id.asc()),
        TaskSort::PriorityDesc => query
            .order(warehouse_tasks::priority.desc())
            .then_order_by(warehouse_tasks::deadline_at.asc().nulls_last())
            .then_order_by(warehouse_tasks::id.asc()),
        TaskSort::CreatedDesc => query
            .order(warehouse_tasks::created_at.desc())
            .then_order_by(warehouse_tasks::id.desc()),
    }
}

fn filtered_logs(filter: &LogFilter) -> warehouse_task_action_logs::BoxedQuery<'static, Pg> {
    let mut query = warehouse_task_action_logs::table.into_boxed();

    if let Some(task_id) = filter.task_id {
        query = query.filter(warehouse_task_action_logs::task_id.eq(task_id.value()));
    }
    if let Some(action) = filter.action {
        query = query.filter(warehouse_task_action_logs::action.eq(action.as_str()));
    }
    if let Some(operator) = &filter.operator {
        query = query.filter(warehouse_task_action_logs::operator.eq(operator.clone()));
    }
    if let Some(from) = filter.from {
        query = query.filter(warehouse_task_action_logs::created_at.ge(from));
    }
    if let Some(until) = filter.until {
        query = query.filter(warehouse_task_action_logs::created_at.le(until));
    }

    query
}

fn status_values(statuses: &[TaskStatus]) -> Vec<String> {
    statuses
        .iter()
        .map(|status| status.as_str().to_owned())
        .collect()
}

fn priority_to_column(priority: Priority) -> i16 {
    i16::from(priority.value())
}

fn page_bounds(page: PageRequest) -> TaskRepositoryResult<(i64, i64)> {
    let offset = i64::try_from(page.offset()).map_err(TaskRepositoryError::persistence)?;
    Ok((offset, i64::from(page.limit)))
}

fn count_to_u64(count: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(count).map_err(TaskRepositoryError::persistence)
}

fn is_code_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == CODE_UNIQUE_CONSTRAINT)
}

fn parse_status(raw: &str) -> TaskRepositoryResult<TaskStatus> {
    TaskStatus::try_from(raw).map_err(TaskRepositoryError::persistence)
}

fn string_list_to_json(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn to_new_task_row(task: &NewWarehouseTask) -> NewTaskRow {
    let details = task.details();
    let audit = task.audit();
    NewTaskRow {
        code: task.code().as_str().to_owned(),
        shop_id: details.classification.shop_id.map(ShopId::value),
        task_type: details.classification.task_type.as_str().to_owned(),
        label_type: details.classification.label_type.as_str().to_owned(),
        deadline_at: details.schedule.deadline_at,
        priority: priority_to_column(details.schedule.priority),
        status: TaskStatus::Pending.as_str().to_owned(),
        is_exception: false,
        active: details.active,
        subject: details.content.subject.clone(),
        description: details.content.description.clone(),
        remark: details.content.remark.clone(),
        comment: details.content.comment.clone(),
        documents: string_list_to_json(&details.content.documents),
        images: string_list_to_json(&details.content.images),
        extra: Value::Object(details.content.extra.clone()),
        created_at: audit.created_at,
        created_by: audit.created_by.as_str().to_owned(),
        updated_at: audit.updated_at,
        updated_by: audit.updated_by.as_str().to_owned(),
    }
}

fn to_details_changeset(task: &WarehouseTask) -> TaskDetailsChangeset {
    let details = task.details();
    let audit = task.audit();
    TaskDetailsChangeset {
        shop_id: details.classification.shop_id.map(ShopId::value),
        task_type: details.classification.task_type.as_str().to_owned(),
        label_type: details.classification.label_type.as_str().to_owned(),
        deadline_at: details.schedule.deadline_at,
        priority: priority_to_column(details.schedule.priority),
        active: details.active,
        subject: details.content.subject.clone(),
        description: details.content.description.clone(),
        remark: details.content.remark.clone(),
        comment: details.content.comment.clone(),
        documents: string_list_to_json(&details.content.documents),
        images: string_list_to_json(&details.content.images),
        extra: Value::Object(details.content.extra.clone()),
        updated_at: audit.updated_at,
        updated_by: audit.updated_by.as_str().to_owned(),
    }
}

fn to_lifecycle_changeset(task: &WarehouseTask) -> TaskLifecycleChangeset {
    let milestones = task.milestones();
    TaskLifecycleChangeset {
        status: task.status().as_str().to_owned(),
        is_exception: task.is_exception(),
        exception_type: task.exception_type().map(|kind| kind.as_str().to_owned()),
        executor: task.executor().map(str::to_owned),
        executing_at: milestones.executing_at,
        ready_at: milestones.ready_at,
        completed_at: milestones.completed_at,
        updated_at: task.audit().updated_at,
        updated_by: task.audit().updated_by.as_str().to_owned(),
    }
}

fn to_new_log_row(log: &ActionLogDraft) -> NewActionLogRow {
    NewActionLogRow {
        task_id: log.task_id.value(),
        task_code: log.task_code.as_str().to_owned(),
        action: log.action.as_str().to_owned(),
        from_status: log.from_status.as_str().to_owned(),
        to_status: log.to_status.as_str().to_owned(),
        operator: log.operator.as_str().to_owned(),
        comment: log.comment.clone(),
        created_at: log.created_at,
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<WarehouseTask> {
    let TaskRow {
        id,
        code,
        shop_id,
        task_type,
        label_type,
        deadline_at,
        priority,
        status,
        is_exception,
        exception_type,
        active,
        subject,
        description,
        remark,
        comment,
        documents,
        images,
        extra,
        executor,
        executing_at,
        ready_at,
        completed_at,
        created_at,
        created_by,
        updated_at,
        updated_by,
    } = row;

    let details = TaskDetails {
        classification: TaskClassification {
            shop_id: shop_id
                .map(ShopId::new)
                .transpose()
                .map_err(TaskRepositoryError::persistence)?,
            task_type: TaskType::try_from(task_type.as_str())
                .map_err(TaskRepositoryError::persistence)?,
            label_type: LabelType::try_from(label_type.as_str())
                .map_err(TaskRepositoryError::persistence)?,
        },
        schedule: TaskSchedule {
            deadline_at,
            priority: Priority::new(i64::from(priority))
                .map_err(TaskRepositoryError::persistence)?,
        },
        content: TaskContent {
            subject,
            description,
            remark,
            comment,
            documents: serde_json::from_value::<Vec<String>>(documents)
                .map_err(TaskRepositoryError::persistence)?,
            images: serde_json::from_value::<Vec<String>>(images)
                .map_err(TaskRepositoryError::persistence)?,
            extra: serde_json::from_value::<Map<String, Value>>(extra)
                .map_err(TaskRepositoryError::persistence)?,
        },
        active,
    };

    let data = PersistedTaskData {
        id: TaskId::new(id).map_err(TaskRepositoryError::persistence)?,
        code: TaskCode::new(code).map_err(TaskRepositoryError::persistence)?,
        details,
        status: parse_status(&status)?,
        is_exception,
        exception_type: exception_type
            .as_deref()
            .map(ExceptionType::try_from)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        executor,
        milestones: Milestones {
            executing_at,
            ready_at,
            completed_at,
        },
        audit: AuditStamp {
            created_at,
            created_by: Operator::new(created_by).map_err(TaskRepositoryError::persistence)?,
            updated_at,
            updated_by: Operator::new(updated_by).map_err(TaskRepositoryError::persistence)?,
        },
    };
    Ok(WarehouseTask::from_persisted(data))
}

fn row_to_log_entry(row: ActionLogRow) -> TaskRepositoryResult<ActionLogEntry> {
    Ok(ActionLogEntry {
        id: ActionLogId::new(row.id).map_err(TaskRepositoryError::persistence)?,
        task_id: TaskId::new(row.task_id).map_err(TaskRepositoryError::persistence)?,
        task_code: TaskCode::new(row.task_code).map_err(TaskRepositoryError::persistence)?,
        action: TaskAction::try_from(row.action.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        from_status: parse_status(&row.from_status)?,
        to_status: parse_status(&row.to_status)?,
        operator: Operator::new(row.operator).map_err(TaskRepositoryError::persistence)?,
        comment: row.comment,
        created_at: row.created_at,
    })
}
