//! Lifecycle status and classification enumerations.

use super::{
    ParseExceptionTypeError, ParseLabelTypeError, ParseTaskStatusError, ParseTaskTypeError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational status of a warehouse task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created and is waiting to be confirmed.
    Pending,
    /// Goods are being picked.
    Picking,
    /// Labels have been created for the picked goods.
    LabelCreated,
    /// Goods are packed and ready.
    Ready,
    /// Goods are waiting for the carrier.
    WaitingPickup,
    /// Goods have left the warehouse.
    Shipped,
    /// Fulfilment has been completed.
    Completed,
    /// Work is blocked on a missing transparency code.
    MissingTransparencyCode,
    /// Work is blocked on a missing FBA shipment code.
    MissingFbaCode,
    /// Work is blocked because stock ran out.
    OutOfStock,
    /// Work is blocked by an operational problem.
    Problem,
    /// Work is blocked pending clarification.
    Unclear,
    /// Task has been canceled.
    Canceled,
}

impl TaskStatus {
    /// Every status in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Pending,
        Self::Picking,
        Self::LabelCreated,
        Self::Ready,
        Self::WaitingPickup,
        Self::Shipped,
        Self::Completed,
        Self::MissingTransparencyCode,
        Self::MissingFbaCode,
        Self::OutOfStock,
        Self::Problem,
        Self::Unclear,
        Self::Canceled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Picking => "picking",
            Self::LabelCreated => "label_created",
            Self::Ready => "ready",
            Self::WaitingPickup => "waiting_pickup",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::MissingTransparencyCode => "missing_transparency_code",
            Self::MissingFbaCode => "missing_fba_code",
            Self::OutOfStock => "out_of_stock",
            Self::Problem => "problem",
            Self::Unclear => "unclear",
            Self::Canceled => "canceled",
        }
    }

    /// Returns `true` when no further transition can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Returns `true` for the blocked statuses of the exception branch.
    #[must_use]
    pub const fn is_exception(self) -> bool {
        matches!(
            self,
            Self::MissingTransparencyCode
                | Self::MissingFbaCode
                | Self::OutOfStock
                | Self::Problem
                | Self::Unclear
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

/// Fulfilment channel of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Fulfilment by Amazon inbound shipment.
    Fba,
    /// Fulfilment by merchant.
    Fbm,
    /// Business-to-business delivery.
    B2b,
    /// Anything else.
    Other,
}

impl TaskType {
    /// Every task type in declaration order.
    pub const ALL: [Self; 4] = [Self::Fba, Self::Fbm, Self::B2b, Self::Other];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fba => "fba",
            Self::Fbm => "fbm",
            Self::B2b => "b2b",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "fba" => Ok(Self::Fba),
            "fbm" => Ok(Self::Fbm),
            "b2b" => Ok(Self::B2b),
            "other" => Ok(Self::Other),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}

/// Kind of product label the task's goods need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    /// Amazon Transparency code stickers.
    TransparencyCode,
    /// Amazon FN-SKU labels.
    FnCode,
    /// No labelling required.
    #[default]
    #[serde(rename = "none")]
    Unlabeled,
}

impl LabelType {
    /// Every label type in declaration order.
    pub const ALL: [Self; 3] = [Self::TransparencyCode, Self::FnCode, Self::Unlabeled];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransparencyCode => "transparency_code",
            Self::FnCode => "fn_code",
            Self::Unlabeled => "none",
        }
    }

    /// Returns `true` when goods must be labelled before they are ready.
    #[must_use]
    pub const fn requires_label(self) -> bool {
        !matches!(self, Self::Unlabeled)
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LabelType {
    type Error = ParseLabelTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "transparency_code" => Ok(Self::TransparencyCode),
            "fn_code" => Ok(Self::FnCode),
            "none" => Ok(Self::Unlabeled),
            _ => Err(ParseLabelTypeError(value.to_owned())),
        }
    }
}

/// Reason a task sits on the exception branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionType {
    /// A transparency code is missing.
    MissingTransparencyCode,
    /// An FBA shipment code is missing.
    MissingFbaCode,
    /// Stock ran out.
    OutOfStock,
    /// An operational problem occurred.
    Problem,
    /// The task needs clarification.
    Unclear,
}

impl ExceptionType {
    /// Every exception type in declaration order.
    pub const ALL: [Self; 5] = [
        Self::MissingTransparencyCode,
        Self::MissingFbaCode,
        Self::OutOfStock,
        Self::Problem,
        Self::Unclear,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingTransparencyCode => "missing_transparency_code",
            Self::MissingFbaCode => "missing_fba_code",
            Self::OutOfStock => "out_of_stock",
            Self::Problem => "problem",
            Self::Unclear => "unclear",
        }
    }

    /// Returns the exception type recorded when a task enters `status`.
    #[must_use]
    pub const fn for_status(status: TaskStatus) -> Option<Self> {
        match status {
            TaskStatus::MissingTransparencyCode => Some(Self::MissingTransparencyCode),
            TaskStatus::MissingFbaCode => Some(Self::MissingFbaCode),
            TaskStatus::OutOfStock => Some(Self::OutOfStock),
            TaskStatus::Problem => Some(Self::Problem),
            TaskStatus::Unclear => Some(Self::Unclear),
            _ => None,
        }
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExceptionType {
    type Error = ParseExceptionTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseExceptionTypeError(value.to_owned()))
    }
}
