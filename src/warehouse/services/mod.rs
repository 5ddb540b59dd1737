//! Application services for warehouse task lifecycle and listings.

mod error;
mod lifecycle;
mod query;

pub use error::{
    ErrorKind, TaskLifecycleError, TaskLifecycleResult, TaskQueryError, TaskQueryResult,
};
pub use lifecycle::{
    CreateTaskRequest, PerformActionRequest, TaskLifecycleService, TransitionOutcome,
    UpdateTaskRequest,
};
pub use query::{ActionLogQueryService, TaskQueryService};
