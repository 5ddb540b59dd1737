//! Declarative transition table for the warehouse task state machine.
//!
//! The table has three layers, offered in this order:
//!
//! 1. main edges: the linear fulfilment track plus the `start` edges that
//!    resume picking after an exception,
//! 2. exception edges: the "flag" actions moving an active task onto the
//!    exception branch,
//! 3. the `cancel` edge, available from every non-terminal status.
//!
//! `reset` is not part of the table; it is a forced rollback handled by
//! [`super::WarehouseTask::reset`].

use super::{LabelType, TaskAction, TaskStatus, TaskType};
use serde::{Deserialize, Serialize};

/// An action legal from a task's current status and the status it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailableAction {
    /// Action verb.
    pub action: TaskAction,
    /// Status the task will be in after the action.
    pub resulting_status: TaskStatus,
}

/// Task attributes that guards are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext {
    /// Fulfilment channel.
    pub task_type: TaskType,
    /// Label requirement.
    pub label_type: LabelType,
    /// Whether the task is active.
    pub active: bool,
}

/// Condition an edge requires from the task attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Always satisfied.
    Always,
    /// The task's goods must be labelled.
    LabelRequired,
    /// The task's goods need no label.
    NoLabelRequired,
    /// The task uses transparency-code labels.
    TransparencyCodeLabel,
    /// The task ships to FBA or uses FN-code labels.
    FbaCodeRequired,
}

impl Guard {
    /// Returns `true` when the guard holds for `context`.
    #[must_use]
    pub const fn allows(self, context: &TransitionContext) -> bool {
        match self {
            Self::Always => true,
            Self::LabelRequired => context.label_type.requires_label(),
            Self::NoLabelRequired => !context.label_type.requires_label(),
            Self::TransparencyCodeLabel => {
                matches!(context.label_type, LabelType::TransparencyCode)
            }
            Self::FbaCodeRequired => {
                matches!(context.task_type, TaskType::Fba)
                    || matches!(context.label_type, LabelType::FnCode)
            }
        }
    }
}

/// One `(from, action) -> to` row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Statuses the edge leaves from.
    pub from: &'static [TaskStatus],
    /// Action verb.
    pub action: TaskAction,
    /// Status the edge leads to.
    pub to: TaskStatus,
    /// Attribute condition.
    pub guard: Guard,
}

const EXCEPTION_STATUSES: &[TaskStatus] = &[
    TaskStatus::MissingTransparencyCode,
    TaskStatus::MissingFbaCode,
    TaskStatus::OutOfStock,
    TaskStatus::Problem,
    TaskStatus::Unclear,
];

/// Statuses from which a task may be flagged onto the exception branch.
const FLAGGABLE_STATUSES: &[TaskStatus] = &[
    TaskStatus::Pending,
    TaskStatus::Picking,
    TaskStatus::LabelCreated,
    TaskStatus::Ready,
    TaskStatus::WaitingPickup,
    TaskStatus::Shipped,
    TaskStatus::MissingTransparencyCode,
    TaskStatus::MissingFbaCode,
    TaskStatus::OutOfStock,
    TaskStatus::Problem,
    TaskStatus::Unclear,
];

/// Linear fulfilment track and exception recovery.
pub const MAIN_EDGES: &[Edge] = &[
    Edge {
        from: &[TaskStatus::Pending],
        action: TaskAction::Confirm,
        to: TaskStatus::Picking,
        guard: Guard::Always,
    },
    Edge {
        from: &[TaskStatus::Picking],
        action: TaskAction::CreateLabel,
        to: TaskStatus::LabelCreated,
        guard: Guard::LabelRequired,
    },
    Edge {
        from: &[TaskStatus::Picking],
        action: TaskAction::Ready,
        to: TaskStatus::Ready,
        guard: Guard::NoLabelRequired,
    },
    Edge {
        from: &[TaskStatus::LabelCreated],
        action: TaskAction::Ready,
        to: TaskStatus::Ready,
        guard: Guard::Always,
    },
    Edge {
        from: &[TaskStatus::Ready],
        action: TaskAction::AwaitPickup,
        to: TaskStatus::WaitingPickup,
        guard: Guard::Always,
    },
    Edge {
        from: &[TaskStatus::Ready, TaskStatus::WaitingPickup],
        action: TaskAction::Ship,
        to: TaskStatus::Shipped,
        guard: Guard::Always,
    },
    Edge {
        from: &[TaskStatus::Shipped],
        action: TaskAction::Complete,
        to: TaskStatus::Completed,
        guard: Guard::Always,
    },
    Edge {
        from: EXCEPTION_STATUSES,
        action: TaskAction::Start,
        to: TaskStatus::Picking,
        guard: Guard::Always,
    },
];

/// Secondary edge set moving active tasks onto the exception branch.
///
/// The missing-code flags are independent of each other; none of them
/// requires another to have been raised first.
pub const EXCEPTION_EDGES: &[Edge] = &[
    Edge {
        from: FLAGGABLE_STATUSES,
        action: TaskAction::FlagMissingTransparencyCode,
        to: TaskStatus::MissingTransparencyCode,
        guard: Guard::TransparencyCodeLabel,
    },
    Edge {
        from: FLAGGABLE_STATUSES,
        action: TaskAction::FlagMissingFbaCode,
        to: TaskStatus::MissingFbaCode,
        guard: Guard::FbaCodeRequired,
    },
    Edge {
        from: FLAGGABLE_STATUSES,
        action: TaskAction::FlagOutOfStock,
        to: TaskStatus::OutOfStock,
        guard: Guard::Always,
    },
    Edge {
        from: FLAGGABLE_STATUSES,
        action: TaskAction::FlagProblem,
        to: TaskStatus::Problem,
        guard: Guard::Always,
    },
    Edge {
        from: FLAGGABLE_STATUSES,
        action: TaskAction::FlagUnclear,
        to: TaskStatus::Unclear,
        guard: Guard::Always,
    },
];

fn edge_applies(edge: &Edge, status: TaskStatus, context: &TransitionContext) -> bool {
    edge.from.contains(&status) && edge.guard.allows(context)
}

/// Returns the ordered list of actions legal from `status` under `context`.
///
/// Terminal statuses yield an empty list.
#[must_use]
pub fn available_actions(status: TaskStatus, context: &TransitionContext) -> Vec<AvailableAction> {
    if status.is_terminal() {
        return Vec::new();
    }

    let main = MAIN_EDGES
        .iter()
        .filter(|edge| edge_applies(edge, status, context));
    let exceptions = EXCEPTION_EDGES
        .iter()
        .filter(|_| context.active)
        .filter(|edge| edge.to != status && edge_applies(edge, status, context));

    main.chain(exceptions)
        .map(|edge| AvailableAction {
            action: edge.action,
            resulting_status: edge.to,
        })
        .chain(std::iter::once(AvailableAction {
            action: TaskAction::Cancel,
            resulting_status: TaskStatus::Canceled,
        }))
        .collect()
}

/// Resolves the status `action` leads to from `status`, if it is legal.
#[must_use]
pub fn resolve_transition(
    status: TaskStatus,
    action: TaskAction,
    context: &TransitionContext,
) -> Option<TaskStatus> {
    available_actions(status, context)
        .into_iter()
        .find(|available| available.action == action)
        .map(|available| available.resulting_status)
}
