//! Unit tests for the warehouse task module.


use crate::warehouse::domain::{
    AuditStamp, ExceptionType, LabelType, Milestones, Operator, PersistedTaskData, TaskCode,
    TaskDetails, TaskId, TaskStatus, TaskType, WarehouseTask,
};
use chrono::Utc;

/// Builds a stored task in an arbitrary status without going through the
/// transition table.
pub(super) fn task_in(
    status: TaskStatus,
    task_type: TaskType,
    label_type: LabelType,
) -> eyre::Result<WarehouseTask> {
    let mut details = TaskDetails::new(task_type);
    details.classification.label_type = label_type;
    let now = Utc::now();
    let creator = Operator::new("seed")?;
    Ok(WarehouseTask::from_persisted(PersistedTaskData {
        id: TaskId::new(1)?,
        code: TaskCode::new("WT-261018-SEED1")?,
        details,
        status,
        is_exception: status.is_exception(),
        exception_type: ExceptionType::for_status(status),
        executor: None,
        milestones: Milestones::default(),
        audit: AuditStamp {
            created_at: now,
            created_by: creator.clone(),
            updated_at: now,
            updated_by: creator,
        },
    }))
}
