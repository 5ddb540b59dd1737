//! Domain model for warehouse task lifecycle management.
//!
//! The domain holds the task aggregate, the declarative transition table, the
//! action log records and the listing predicates. Persistence concerns stay
//! outside the domain boundary.

mod action;
mod action_log;
mod code;
mod error;
mod ids;
mod listing;
pub mod metadata;
mod status;
mod task;
pub mod transitions;

pub use action::TaskAction;
pub use action_log::{ActionLogDraft, ActionLogEntry};
pub use code::{RandomTaskCodeSource, TaskCode, TaskCodeSource, is_valid_prefix};
pub use error::{
    ParseExceptionTypeError, ParseLabelTypeError, ParseTaskActionError, ParseTaskStatusError,
    ParseTaskTypeError, WarehouseDomainError,
};
pub use ids::{ActionLogId, Operator, Priority, ShopId, TaskId};
pub use listing::{LogFilter, Page, PageRequest, PriorityFilter, TaskFilter, TaskSort};
pub use status::{ExceptionType, LabelType, TaskStatus, TaskType};
pub use task::{
    AuditStamp, Milestones, NewWarehouseTask, PersistedTaskData, TaskClassification, TaskContent,
    TaskDetails, TaskDetailsUpdate, TaskSchedule, WarehouseTask,
};
pub use transitions::{AvailableAction, TransitionContext};
