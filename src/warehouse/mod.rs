//! Warehouse task lifecycle management.
//!
//! A warehouse task tracks physical fulfilment work through picking,
//! labelling and shipping. Every status change goes through a declarative
//! transition table and is recorded in an append-only action log committed
//! together with the task update. The module follows hexagonal architecture:
//!
//! - Domain types, the transition table and listing predicates in [`domain`]
//! - Port contracts in [`ports`]
//! - In-memory and `PostgreSQL` adapters in [`adapters`]
//! - Lifecycle and query services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
