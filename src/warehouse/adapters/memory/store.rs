//! In-memory task and action log store for tests and embedding.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::warehouse::{
    domain::{
        ActionLogDraft, ActionLogEntry, ActionLogId, AuditStamp, LogFilter, NewWarehouseTask, Page,
        PageRequest, PersistedTaskData, TaskCode, TaskFilter, TaskId, TaskStatus, WarehouseTask,
    },
    ports::{ActionLogRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory store implementing both task and log ports.
///
/// A single lock guards tasks and log rows, so a transition's task update and
/// log append are applied under one write guard.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWarehouseStore {
    state: Arc<RwLock<InMemoryWarehouseState>>,
}

#[derive(Debug, Default)]
struct InMemoryWarehouseState {
    tasks: BTreeMap<TaskId, WarehouseTask>,
    code_index: HashMap<TaskCode, TaskId>,
    logs: Vec<ActionLogEntry>,
    last_task_id: i64,
    last_log_id: i64,
}

impl InMemoryWarehouseStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryWarehouseState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryWarehouseState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryWarehouseState {
    fn next_task_id(&mut self) -> TaskRepositoryResult<TaskId> {
        self.last_task_id += 1;
        TaskId::new(self.last_task_id).map_err(TaskRepositoryError::persistence)
    }

    fn next_log_id(&mut self) -> TaskRepositoryResult<ActionLogId> {
        self.last_log_id += 1;
        ActionLogId::new(self.last_log_id).map_err(TaskRepositoryError::persistence)
    }

    fn stored(&self, id: TaskId) -> TaskRepositoryResult<&WarehouseTask> {
        self.tasks.get(&id).ok_or(TaskRepositoryError::NotFound(id))
    }

    fn has_history(&self, id: TaskId) -> bool {
        self.logs.iter().any(|entry| entry.task_id == id)
    }
}

/// Takes the editable details from `incoming` and everything else from
/// `current`.
fn merge_details(current: &WarehouseTask, incoming: &WarehouseTask) -> WarehouseTask {
    WarehouseTask::from_persisted(PersistedTaskData {
        id: current.id(),
        code: current.code().clone(),
        details: incoming.details().clone(),
        status: current.status(),
        is_exception: current.is_exception(),
        exception_type: current.exception_type(),
        executor: current.executor().map(str::to_owned),
        milestones: *current.milestones(),
        audit: stamped_audit(current, incoming),
    })
}

/// Takes the lifecycle columns from `incoming` and the details from
/// `current`.
fn merge_lifecycle(current: &WarehouseTask, incoming: &WarehouseTask) -> WarehouseTask {
    WarehouseTask::from_persisted(PersistedTaskData {
        id: current.id(),
        code: current.code().clone(),
        details: current.details().clone(),
        status: incoming.status(),
        is_exception: incoming.is_exception(),
        exception_type: incoming.exception_type(),
        executor: incoming.executor().map(str::to_owned),
        milestones: *incoming.milestones(),
        audit: stamped_audit(current, incoming),
    })
}

fn stamped_audit(current: &WarehouseTask, incoming: &WarehouseTask) -> AuditStamp {
    AuditStamp {
        created_at: current.audit().created_at,
        created_by: current.audit().created_by.clone(),
        updated_at: incoming.audit().updated_at,
        updated_by: incoming.audit().updated_by.clone(),
    }
}

/// Slices an already ordered result set into the requested page.
fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> Page<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    let items = rows.iter().skip(offset).take(limit).cloned().collect();
    Page::new(items, rows.len() as u64, page)
}

#[async_trait]
impl TaskRepository for InMemoryWarehouseStore {
    async fn insert(&self, task: &NewWarehouseTask) -> TaskRepositoryResult<WarehouseTask> {
        let mut state = self.write()?;
        if state.code_index.contains_key(task.code()) {
            return Err(TaskRepositoryError::DuplicateCode(task.code().clone()));
        }

        let id = state.next_task_id()?;
        let stored = task.clone().into_task(id);
        state.code_index.insert(stored.code().clone(), id);
        state.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_details(&self, task: &WarehouseTask) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let merged = merge_details(state.stored(task.id())?, task);
        state.tasks.insert(merged.id(), merged);
        Ok(())
    }

    async fn commit_transition(
        &self,
        task: &WarehouseTask,
        expected_status: TaskStatus,
        log: &ActionLogDraft,
    ) -> TaskRepositoryResult<ActionLogEntry> {
        let mut state = self.write()?;
        let actual = state.stored(task.id())?.status();
        if actual != expected_status {
            return Err(TaskRepositoryError::StaleStatus {
                task_id: task.id(),
                expected: expected_status,
                actual,
            });
        }

        let merged = merge_lifecycle(state.stored(task.id())?, task);
        let log_id = state.next_log_id()?;
        let entry = log.clone().into_entry(log_id);
        state.tasks.insert(merged.id(), merged);
        state.logs.push(entry.clone());
        Ok(entry)
    }

    async fn delete_pending(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let actual = state.stored(id)?.status();
        if actual != TaskStatus::Pending {
            return Err(TaskRepositoryError::StaleStatus {
                task_id: id,
                expected: TaskStatus::Pending,
                actual,
            });
        }
        if state.has_history(id) {
            return Err(TaskRepositoryError::HasHistory(id));
        }

        if let Some(removed) = state.tasks.remove(&id) {
            state.code_index.remove(removed.code());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<WarehouseTask>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &TaskCode) -> TaskRepositoryResult<Option<WarehouseTask>> {
        let state = self.read()?;
        let task = state
            .code_index
            .get(code)
            .and_then(|id| state.tasks.get(id))
            .cloned();
        Ok(task)
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<WarehouseTask>> {
        let state = self.read()?;
        let mut matching: Vec<WarehouseTask> = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        matching.sort_by(|left, right| filter.sort.compare(left, right));
        Ok(paginate(&matching, page))
    }
}

#[async_trait]
impl ActionLogRepository for InMemoryWarehouseStore {
    async fn list_entries(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<ActionLogEntry>> {
        let state = self.read()?;
        let mut matching: Vec<ActionLogEntry> = state
            .logs
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(paginate(&matching, page))
    }

    async fn history(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<ActionLogEntry>> {
        let state = self.read()?;
        let mut entries: Vec<ActionLogEntry> = state
            .logs
            .iter()
            .filter(|entry| entry.task_id == task_id)
            .cloned()
            .collect();
        entries.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(entries)
    }

    async fn count_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<u64> {
        let state = self.read()?;
        Ok(state
            .logs
            .iter()
            .filter(|entry| entry.task_id == task_id)
            .count() as u64)
    }
}
