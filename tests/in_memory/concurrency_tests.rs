//! Competing writers against one in-memory store.

use std::collections::HashSet;

use rstest::rstest;
use tokio::task::JoinSet;
use warehouse_tasks::warehouse::{
    domain::{TaskStatus, TaskType},
    services::{CreateTaskRequest, ErrorKind, PerformActionRequest},
};

use super::helpers::{Harness, assert_status, create, harness};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn competing_confirms_yield_one_transition(harness: Harness) -> Result<(), eyre::Report> {
    let service = harness.lifecycle;
    let task = create(&service, CreateTaskRequest::new(TaskType::Fbm)).await?;

    let mut attempts = JoinSet::new();
    for operator in ["alice", "bob", "carol", "dave", "erin", "frank"] {
        let worker = service.clone();
        let task_id = task.id();
        attempts.spawn(async move {
            worker
                .perform_action(PerformActionRequest::new(task_id, "confirm", operator))
                .await
        });
    }

    let mut winners = Vec::new();
    while let Some(joined) = attempts.join_next().await {
        match joined? {
            Ok(outcome) => winners.push(outcome),
            Err(err) => eyre::ensure!(
                matches!(
                    err.kind(),
                    ErrorKind::ConflictRace | ErrorKind::InvalidTransition
                ),
                "unexpected failure: {err}"
            ),
        }
    }

    eyre::ensure!(winners.len() == 1, "expected one winner, got {}", winners.len());
    let history = service.task_history(task.id()).await?;
    eyre::ensure!(history.len() == 1);
    let stored = service.get_task(task.id()).await?;
    let winner = winners
        .first()
        .ok_or_else(|| eyre::eyre!("missing winning outcome"))?;
    eyre::ensure!(stored.executor() == Some(winner.entry.operator.as_str()));
    assert_status(&service, task.id(), TaskStatus::Picking).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_racing_confirm_leaves_a_consistent_log(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let service = harness.lifecycle;
    let task = create(&service, CreateTaskRequest::new(TaskType::Fbm)).await?;

    let confirm = service.perform_action(PerformActionRequest::new(task.id(), "confirm", "alice"));
    let cancel = service.perform_action(PerformActionRequest::new(task.id(), "cancel", "bob"));
    let (confirmed, canceled) = tokio::join!(confirm, cancel);

    let stored = service.get_task(task.id()).await?;
    let history = service.task_history(task.id()).await?;
    let last = history
        .last()
        .ok_or_else(|| eyre::eyre!("at least one action must have been logged"))?;
    eyre::ensure!(last.to_status == stored.status());
    eyre::ensure!(
        history.len() == usize::from(confirmed.is_ok()) + usize::from(canceled.is_ok()),
        "each successful action writes exactly one row"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parallel_creation_assigns_unique_codes(harness: Harness) -> Result<(), eyre::Report> {
    let service = harness.lifecycle;
    let mut creations = JoinSet::new();
    for _ in 0..16 {
        let worker = service.clone();
        creations.spawn(async move {
            worker
                .create_task(CreateTaskRequest::new(TaskType::Fba), "planner")
                .await
        });
    }

    let mut codes = HashSet::new();
    let mut ids = HashSet::new();
    while let Some(joined) = creations.join_next().await {
        let task = joined??;
        codes.insert(task.code().clone());
        ids.insert(task.id());
    }

    eyre::ensure!(codes.len() == 16);
    eyre::ensure!(ids.len() == 16);
    Ok(())
}
