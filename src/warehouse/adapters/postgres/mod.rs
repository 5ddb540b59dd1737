//! `PostgreSQL` adapters for warehouse task persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresWarehouseRepository, WarehousePgPool};
