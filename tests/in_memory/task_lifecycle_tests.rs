//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::rstest;
use warehouse_tasks::warehouse::{
    adapters::memory::InMemoryWarehouseStore,
    domain::{
        ExceptionType, LabelType, Operator, Priority, ShopId, TaskAction, TaskId, TaskStatus,
        TaskType,
    },
    ports::TaskRepository,
    services::{
        CreateTaskRequest, ErrorKind, PerformActionRequest, TaskLifecycleError,
        TaskLifecycleService, UpdateTaskRequest,
    },
};

use super::helpers::{Harness, assert_status, create, drive, harness, store};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn labelled_task_walks_the_full_track(harness: Harness) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(
        service,
        CreateTaskRequest::new(TaskType::Fba)
            .with_label_type(LabelType::FnCode)
            .with_shop(ShopId::new(7)?),
    )
    .await?;

    let shipped = drive(
        service,
        task.id(),
        "alice",
        &["confirm", "create_label", "ready", "await_pickup", "ship"],
    )
    .await?;
    eyre::ensure!(shipped.status() == TaskStatus::Shipped);
    eyre::ensure!(shipped.executor() == Some("alice"));

    let completed = drive(service, task.id(), "bob", &["complete"]).await?;
    let milestones = completed.milestones();
    eyre::ensure!(completed.status() == TaskStatus::Completed);
    eyre::ensure!(completed.executor() == Some("alice"));
    eyre::ensure!(milestones.executing_at.is_some());
    eyre::ensure!(milestones.ready_at.is_some());
    eyre::ensure!(milestones.completed_at.is_some());
    eyre::ensure!(service.available_actions(task.id()).await?.is_empty());

    let history = service.task_history(task.id()).await?;
    let actions: Vec<TaskAction> = history.iter().map(|entry| entry.action).collect();
    eyre::ensure!(
        actions
            == vec![
                TaskAction::Confirm,
                TaskAction::CreateLabel,
                TaskAction::Ready,
                TaskAction::AwaitPickup,
                TaskAction::Ship,
                TaskAction::Complete,
            ]
    );
    let chained = history
        .windows(2)
        .all(|pair| matches!(pair, [earlier, later] if earlier.to_status == later.from_status));
    eyre::ensure!(chained, "log rows must chain status to status");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unlabelled_task_skips_label_creation(harness: Harness) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(service, CreateTaskRequest::new(TaskType::Fbm)).await?;
    drive(service, task.id(), "alice", &["confirm"]).await?;

    let rejected = service
        .perform_action(PerformActionRequest::new(task.id(), "create_label", "alice"))
        .await;
    eyre::ensure!(matches!(
        rejected,
        Err(ref err) if err.kind() == ErrorKind::InvalidTransition
    ));

    drive(service, task.id(), "alice", &["ready", "ship"]).await?;
    assert_status(service, task.id(), TaskStatus::Shipped).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exception_round_trip_keeps_first_milestone(harness: Harness) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(
        service,
        CreateTaskRequest::new(TaskType::Fbm).with_label_type(LabelType::TransparencyCode),
    )
    .await?;
    let picking = drive(service, task.id(), "alice", &["confirm"]).await?;
    let first_pick = picking.milestones().executing_at;

    let flagged = service
        .perform_action(
            PerformActionRequest::new(task.id(), "flag_missing_transparency_code", "bob")
                .with_comment("no codes on the pallet"),
        )
        .await?;
    eyre::ensure!(flagged.task.is_exception());
    eyre::ensure!(
        flagged.task.exception_type() == Some(ExceptionType::MissingTransparencyCode)
    );
    eyre::ensure!(flagged.entry.comment.as_deref() == Some("no codes on the pallet"));

    let resumed = drive(service, task.id(), "bob", &["start"]).await?;
    eyre::ensure!(resumed.status() == TaskStatus::Picking);
    eyre::ensure!(!resumed.is_exception());
    eyre::ensure!(resumed.exception_type().is_none());
    eyre::ensure!(resumed.milestones().executing_at == first_pick);
    eyre::ensure!(resumed.executor() == Some("alice"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reset_returns_task_to_pending_and_blocks_deletion(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(service, CreateTaskRequest::new(TaskType::B2b)).await?;
    drive(service, task.id(), "alice", &["confirm", "flag_problem"]).await?;

    let outcome = service
        .reset_task(task.id(), "supervisor", Some("restart picking".to_owned()))
        .await?;
    eyre::ensure!(outcome.task.status() == TaskStatus::Pending);
    eyre::ensure!(outcome.task.executor().is_none());
    eyre::ensure!(!outcome.task.is_exception());
    eyre::ensure!(outcome.task.milestones().executing_at.is_none());
    eyre::ensure!(outcome.entry.action == TaskAction::Reset);
    eyre::ensure!(outcome.entry.from_status == TaskStatus::Problem);

    let deletion = service.delete_task(task.id()).await;
    eyre::ensure!(matches!(
        deletion,
        Err(ref err) if err.kind() == ErrorKind::PolicyViolation
    ));
    eyre::ensure!(service.task_history(task.id()).await?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn canceled_task_accepts_nothing(harness: Harness) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(service, CreateTaskRequest::new(TaskType::Other)).await?;
    drive(service, task.id(), "alice", &["cancel"]).await?;

    eyre::ensure!(service.available_actions(task.id()).await?.is_empty());
    let reset = service.reset_task(task.id(), "supervisor", None).await;
    eyre::ensure!(matches!(
        reset,
        Err(ref err) if err.kind() == ErrorKind::PolicyViolation
    ));
    let confirm = service
        .perform_action(PerformActionRequest::new(task.id(), "confirm", "alice"))
        .await;
    eyre::ensure!(matches!(
        confirm,
        Err(ref err) if err.kind() == ErrorKind::InvalidTransition
    ));
    assert_status(service, task.id(), TaskStatus::Canceled).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_fresh_task_frees_its_code(harness: Harness) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(service, CreateTaskRequest::new(TaskType::Fbm)).await?;
    let code = task.code().to_string();

    service.delete_task(task.id()).await?;

    eyre::ensure!(service.find_by_code(&code).await?.is_none());
    eyre::ensure!(matches!(
        service.get_task(task.id()).await,
        Err(TaskLifecycleError::NotFound(id)) if id == task.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_identifiers_report_not_found(harness: Harness) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let missing = TaskId::new(404)?;

    let action = service
        .perform_action(PerformActionRequest::new(missing, "confirm", "alice"))
        .await;
    let reset = service.reset_task(missing, "alice", None).await;
    let delete = service.delete_task(missing).await;
    let history = service.task_history(missing).await;

    eyre::ensure!(matches!(action, Err(ref err) if err.kind() == ErrorKind::NotFound));
    eyre::ensure!(matches!(reset, Err(ref err) if err.kind() == ErrorKind::NotFound));
    eyre::ensure!(matches!(delete, Err(ref err) if err.kind() == ErrorKind::NotFound));
    eyre::ensure!(matches!(history, Err(ref err) if err.kind() == ErrorKind::NotFound));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn details_update_is_visible_through_code_lookup(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(
        service,
        CreateTaskRequest::new(TaskType::Fbm).with_subject("Restock shelf 4"),
    )
    .await?;
    drive(service, task.id(), "alice", &["confirm"]).await?;
    let deadline = Utc::now() + Duration::hours(6);

    service
        .update_task(
            task.id(),
            UpdateTaskRequest::new()
                .with_deadline(Some(deadline))
                .with_priority(Priority::new(5)?)
                .with_subject(None),
            "dispatcher",
        )
        .await?;

    let found = service
        .find_by_code(&task.code().to_string())
        .await?
        .ok_or_else(|| eyre::eyre!("task not found by code"))?;
    eyre::ensure!(found.status() == TaskStatus::Picking);
    eyre::ensure!(found.details().schedule.deadline_at == Some(deadline));
    eyre::ensure!(found.details().schedule.priority.value() == 5);
    eyre::ensure!(found.details().content.subject.is_none());
    eyre::ensure!(found.audit().updated_by.as_str() == "dispatcher");
    eyre::ensure!(found.audit().created_by.as_str() == "planner");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transition_commit_keeps_details_edited_after_load(
    store: Arc<InMemoryWarehouseStore>,
) -> Result<(), eyre::Report> {
    let service = TaskLifecycleService::new(Arc::clone(&store), Arc::new(DefaultClock));
    let task = create(&service, CreateTaskRequest::new(TaskType::Fbm)).await?;
    let mut loaded = store
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task missing from store"))?;

    service
        .update_task(
            task.id(),
            UpdateTaskRequest::new()
                .with_label_type(LabelType::TransparencyCode)
                .with_subject(Some("Recount shelf 9".to_owned())),
            "dispatcher",
        )
        .await?;

    let log = loaded.apply_action(
        TaskAction::Confirm,
        &Operator::new("alice")?,
        None,
        &DefaultClock,
    )?;
    store
        .commit_transition(&loaded, TaskStatus::Pending, &log)
        .await?;

    let stored = service.get_task(task.id()).await?;
    eyre::ensure!(stored.status() == TaskStatus::Picking);
    eyre::ensure!(stored.executor() == Some("alice"));
    eyre::ensure!(stored.milestones().executing_at.is_some());
    eyre::ensure!(
        stored.details().classification.label_type == LabelType::TransparencyCode,
        "label type edit was overwritten"
    );
    eyre::ensure!(
        stored.details().content.subject.as_deref() == Some("Recount shelf 9"),
        "subject edit was overwritten"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transition_outcome_reports_the_stored_task(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let service = &harness.lifecycle;
    let task = create(service, CreateTaskRequest::new(TaskType::Fbm)).await?;

    let outcome = service
        .perform_action(PerformActionRequest::new(task.id(), "confirm", "alice"))
        .await?;

    eyre::ensure!(outcome.task == service.get_task(task.id()).await?);
    Ok(())
}
