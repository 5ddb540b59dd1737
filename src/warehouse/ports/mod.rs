//! Port contracts for warehouse task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

pub use repository::{
    ActionLogRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
};
