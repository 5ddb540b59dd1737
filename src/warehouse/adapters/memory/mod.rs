//! In-memory adapters for warehouse task persistence.

mod store;

pub use store::InMemoryWarehouseStore;
