//! When steps for warehouse task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use rstest_bdd_macros::when;
use warehouse_tasks::warehouse::services::PerformActionRequest;

#[when(r#""{operator}" performs "{verb}""#)]
fn perform_action(
    world: &mut LifecycleWorld,
    operator: String,
    verb: String,
) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let result = run_async(
        world
            .service
            .perform_action(PerformActionRequest::new(task_id, verb, operator)),
    );
    if let Ok(ref outcome) = result {
        world.task = Some(outcome.task.clone());
    }
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{operator}" resets the task"#)]
fn reset_task(world: &mut LifecycleWorld, operator: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let result = run_async(world.service.reset_task(task_id, &operator, None));
    if let Ok(ref outcome) = result {
        world.task = Some(outcome.task.clone());
    }
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when("the task is deleted")]
fn delete_task(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    world.last_result = Some(run_async(world.service.delete_task(task_id)));
    Ok(())
}
