//! Warehouse task lifecycle engine.
//!
//! This crate tracks physical fulfilment work (picking, labelling, shipping)
//! as state-machine governed tasks. Every successful transition is recorded
//! in an append-only action log, and read-side services list tasks and log
//! rows with composite filters and pagination.
//!
//! # Architecture
//!
//! The engine follows hexagonal architecture principles:
//!
//! - **Domain**: task aggregate, transition table and listing predicates
//! - **Ports**: repository traits for tasks and the action log
//! - **Adapters**: in-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`config`]: engine tunables loaded from the environment
//! - [`warehouse`]: task lifecycle, action log and listings

pub mod config;
pub mod warehouse;
