//! Adapter implementations of the warehouse task ports.

pub mod memory;
pub mod postgres;
