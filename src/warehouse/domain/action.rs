//! Action verbs that drive task status transitions.

use super::ParseTaskActionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verb recorded in the action log for each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Accept a pending task and begin picking.
    Confirm,
    /// Record that labels have been created for picked goods.
    CreateLabel,
    /// Mark goods as packed and ready.
    Ready,
    /// Hand ready goods over to carrier pickup.
    AwaitPickup,
    /// Record that goods have left the warehouse.
    Ship,
    /// Close a shipped task.
    Complete,
    /// Resume picking after an exception has been resolved.
    Start,
    /// Flag a missing transparency code.
    FlagMissingTransparencyCode,
    /// Flag a missing FBA shipment code.
    FlagMissingFbaCode,
    /// Flag that stock ran out.
    FlagOutOfStock,
    /// Flag an operational problem.
    FlagProblem,
    /// Flag that the task needs clarification.
    FlagUnclear,
    /// Cancel the task.
    Cancel,
    /// Force the task back to pending.
    Reset,
}

impl TaskAction {
    /// Every action in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Confirm,
        Self::CreateLabel,
        Self::Ready,
        Self::AwaitPickup,
        Self::Ship,
        Self::Complete,
        Self::Start,
        Self::FlagMissingTransparencyCode,
        Self::FlagMissingFbaCode,
        Self::FlagOutOfStock,
        Self::FlagProblem,
        Self::FlagUnclear,
        Self::Cancel,
        Self::Reset,
    ];

    /// Returns the canonical verb stored in the action log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::CreateLabel => "create_label",
            Self::Ready => "ready",
            Self::AwaitPickup => "await_pickup",
            Self::Ship => "ship",
            Self::Complete => "complete",
            Self::Start => "start",
            Self::FlagMissingTransparencyCode => "flag_missing_transparency_code",
            Self::FlagMissingFbaCode => "flag_missing_fba_code",
            Self::FlagOutOfStock => "flag_out_of_stock",
            Self::FlagProblem => "flag_problem",
            Self::FlagUnclear => "flag_unclear",
            Self::Cancel => "cancel",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskAction {
    type Error = ParseTaskActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| ParseTaskActionError(value.to_owned()))
    }
}
