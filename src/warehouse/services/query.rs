//! Read-side listing services over tasks and the action log.

use super::error::TaskQueryResult;
use crate::config::EngineConfig;
use crate::warehouse::{
    domain::{ActionLogEntry, LogFilter, Page, PageRequest, TaskFilter, WarehouseTask},
    ports::{ActionLogRepository, TaskRepository},
};
use std::sync::Arc;

/// Paginated task listings.
pub struct TaskQueryService<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
    config: EngineConfig,
}

impl<R> Clone for TaskQueryService<R>
where
    R: TaskRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

impl<R> TaskQueryService<R>
where
    R: TaskRepository,
{
    /// Creates a query service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the first page at the configured default page size.
    #[must_use]
    pub const fn first_page(&self) -> PageRequest {
        PageRequest::new(1, self.config.default_page_limit)
    }

    /// Lists tasks matching `filter` in the filter's sort order.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskQueryError::Domain`] when the page request is out
    /// of range or [`super::TaskQueryError::Repository`] when the lookup
    /// fails.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskQueryResult<Page<WarehouseTask>> {
        let checked = page.validate(self.config.max_page_limit)?;
        Ok(self.repository.list(filter, checked).await?)
    }
}

/// Paginated action log listings.
pub struct ActionLogQueryService<R>
where
    R: ActionLogRepository,
{
    repository: Arc<R>,
    config: EngineConfig,
}

impl<R> Clone for ActionLogQueryService<R>
where
    R: ActionLogRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

impl<R> ActionLogQueryService<R>
where
    R: ActionLogRepository,
{
    /// Creates a query service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the first page at the configured default page size.
    #[must_use]
    pub const fn first_page(&self) -> PageRequest {
        PageRequest::new(1, self.config.default_page_limit)
    }

    /// Lists log rows matching `filter` in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskQueryError::Domain`] when the page request is out
    /// of range or [`super::TaskQueryError::Repository`] when the lookup
    /// fails.
    #[tracing::instrument(skip(self))]
    pub async fn list_logs(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> TaskQueryResult<Page<ActionLogEntry>> {
        let checked = page.validate(self.config.max_page_limit)?;
        Ok(self.repository.list_entries(filter, checked).await?)
    }
}
