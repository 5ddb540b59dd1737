//! Presentation metadata for the enumerations exposed to clients.
//!
//! Labels and colours live in static tables keyed by the storage value so the
//! transition logic never depends on them.

use super::{ExceptionType, LabelType, TaskStatus, TaskType};
use serde::Serialize;

/// Display metadata for one enumeration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EnumEntry {
    /// Canonical storage value.
    pub value: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Hex display colour.
    pub color: &'static str,
}

const fn entry(value: &'static str, label: &'static str, color: &'static str) -> EnumEntry {
    EnumEntry {
        value,
        label,
        color,
    }
}

const STATUSES: &[EnumEntry] = &[
    entry("pending", "Pending", "#9e9e9e"),
    entry("picking", "Picking", "#2196f3"),
    entry("label_created", "Label created", "#3f51b5"),
    entry("ready", "Ready", "#009688"),
    entry("waiting_pickup", "Waiting for pickup", "#00bcd4"),
    entry("shipped", "Shipped", "#8bc34a"),
    entry("completed", "Completed", "#4caf50"),
    entry("missing_transparency_code", "Missing transparency code", "#ff9800"),
    entry("missing_fba_code", "Missing FBA code", "#ff5722"),
    entry("out_of_stock", "Out of stock", "#f44336"),
    entry("problem", "Problem", "#e91e63"),
    entry("unclear", "Unclear", "#9c27b0"),
    entry("canceled", "Canceled", "#607d8b"),
];

const TASK_TYPES: &[EnumEntry] = &[
    entry("fba", "FBA", "#ff9900"),
    entry("fbm", "FBM", "#146eb4"),
    entry("b2b", "B2B", "#6d4c41"),
    entry("other", "Other", "#9e9e9e"),
];

const LABEL_TYPES: &[EnumEntry] = &[
    entry("transparency_code", "Transparency code", "#ff9800"),
    entry("fn_code", "FN code", "#3f51b5"),
    entry("none", "None", "#9e9e9e"),
];

const EXCEPTION_TYPES: &[EnumEntry] = &[
    entry("missing_transparency_code", "Missing transparency code", "#ff9800"),
    entry("missing_fba_code", "Missing FBA code", "#ff5722"),
    entry("out_of_stock", "Out of stock", "#f44336"),
    entry("problem", "Problem", "#e91e63"),
    entry("unclear", "Unclear", "#9c27b0"),
];

const UNKNOWN_COLOR: &str = "#000000";

fn lookup(table: &'static [EnumEntry], value: &'static str) -> EnumEntry {
    table
        .iter()
        .find(|candidate| candidate.value == value)
        .copied()
        .unwrap_or(EnumEntry {
            value,
            label: value,
            color: UNKNOWN_COLOR,
        })
}

/// Metadata for every task status.
#[must_use]
pub const fn statuses() -> &'static [EnumEntry] {
    STATUSES
}

/// Metadata for every task type.
#[must_use]
pub const fn task_types() -> &'static [EnumEntry] {
    TASK_TYPES
}

/// Metadata for every label type.
#[must_use]
pub const fn label_types() -> &'static [EnumEntry] {
    LABEL_TYPES
}

/// Metadata for every exception type.
#[must_use]
pub const fn exception_types() -> &'static [EnumEntry] {
    EXCEPTION_TYPES
}

/// Metadata for one status.
#[must_use]
pub fn describe_status(status: TaskStatus) -> EnumEntry {
    lookup(STATUSES, status.as_str())
}

/// Metadata for one task type.
#[must_use]
pub fn describe_task_type(task_type: TaskType) -> EnumEntry {
    lookup(TASK_TYPES, task_type.as_str())
}

/// Metadata for one label type.
#[must_use]
pub fn describe_label_type(label_type: LabelType) -> EnumEntry {
    lookup(LABEL_TYPES, label_type.as_str())
}

/// Metadata for one exception type.
#[must_use]
pub fn describe_exception_type(exception_type: ExceptionType) -> EnumEntry {
    lookup(EXCEPTION_TYPES, exception_type.as_str())
}
