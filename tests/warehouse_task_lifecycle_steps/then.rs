//! Then steps for warehouse task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use rstest_bdd_macros::then;
use warehouse_tasks::warehouse::{
    domain::{TaskAction, TaskStatus, WarehouseTask},
    services::{ErrorKind, TaskLifecycleError},
};

fn parse_kind(name: &str) -> Result<ErrorKind, eyre::Report> {
    match name {
        "not_found" => Ok(ErrorKind::NotFound),
        "invalid_transition" => Ok(ErrorKind::InvalidTransition),
        "conflict_race" => Ok(ErrorKind::ConflictRace),
        "policy_violation" => Ok(ErrorKind::PolicyViolation),
        "validation" => Ok(ErrorKind::Validation),
        "store_failure" => Ok(ErrorKind::StoreFailure),
        other => Err(eyre::eyre!("unknown error kind in scenario: {other}")),
    }
}

fn parse_status(name: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(name).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

fn stored_task(world: &LifecycleWorld) -> Result<WarehouseTask, eyre::Report> {
    let task_id = world.current_task()?.id();
    Ok(run_async(world.service.get_task(task_id))?)
}

#[then("the action succeeds")]
fn action_succeeds(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(())) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("missing action result")),
    }
}

#[then(r#"the action fails with "{kind}""#)]
fn action_fails_with(world: &LifecycleWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = parse_kind(&kind)?;
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing action result"))?;

    match result {
        Err(err) if err.kind() == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected:?} failure, got {other:?}")),
    }
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &LifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let stored = stored_task(world)?;
    eyre::ensure!(
        stored.status() == expected,
        "expected status {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then(r#"the task executor is "{operator}""#)]
fn task_executor_is(world: &LifecycleWorld, operator: String) -> Result<(), eyre::Report> {
    let stored = stored_task(world)?;
    eyre::ensure!(
        stored.executor() == Some(operator.as_str()),
        "expected executor {operator}, found {:?}",
        stored.executor()
    );
    Ok(())
}

#[then("the task is not flagged as an exception")]
fn task_not_flagged(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let stored = stored_task(world)?;
    eyre::ensure!(!stored.is_exception(), "exception flag still set");
    eyre::ensure!(stored.exception_type().is_none(), "exception type still set");
    Ok(())
}

#[then("the task history has {count:usize} entries")]
fn history_has_entries(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let history = run_async(world.service.task_history(task_id))?;
    eyre::ensure!(
        history.len() == count,
        "expected {count} log rows, found {}",
        history.len()
    );
    Ok(())
}

#[then(r#"the latest log entry moved from "{from}" to "{to}" by "{operator}""#)]
fn latest_entry_moved(
    world: &LifecycleWorld,
    from: String,
    to: String,
    operator: String,
) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let history = run_async(world.service.task_history(task_id))?;
    let latest = history
        .last()
        .ok_or_else(|| eyre::eyre!("task has no log rows"))?;

    eyre::ensure!(latest.from_status == parse_status(&from)?);
    eyre::ensure!(latest.to_status == parse_status(&to)?);
    eyre::ensure!(latest.operator.as_str() == operator);
    Ok(())
}

#[then(r#"the available actions are "{actions}""#)]
fn available_actions_are(world: &LifecycleWorld, actions: String) -> Result<(), eyre::Report> {
    let expected = actions
        .split(',')
        .map(|verb| {
            TaskAction::try_from(verb.trim())
                .map_err(|err| eyre::eyre!("invalid action in scenario: {err}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let task_id = world.current_task()?.id();
    let available: Vec<TaskAction> = run_async(world.service.available_actions(task_id))?
        .into_iter()
        .map(|entry| entry.action)
        .collect();

    eyre::ensure!(
        available == expected,
        "expected {expected:?}, found {available:?}"
    );
    Ok(())
}

#[then("the task no longer exists")]
fn task_no_longer_exists(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    match run_async(world.service.get_task(task_id)) {
        Err(TaskLifecycleError::NotFound(missing)) if missing == task_id => Ok(()),
        other => Err(eyre::eyre!("expected the task to be gone, got {other:?}")),
    }
}
