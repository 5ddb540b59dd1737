//! Step definitions for warehouse task lifecycle scenarios.

mod given;
mod then;
mod when;
