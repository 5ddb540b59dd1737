//! Given steps for warehouse task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use warehouse_tasks::warehouse::{
    domain::{LabelType, TaskType},
    services::{CreateTaskRequest, PerformActionRequest},
};

#[given(r#"a "{task_type}" task labelled "{label_type}" created by "{creator}""#)]
fn task_created(
    world: &mut LifecycleWorld,
    task_type: String,
    label_type: String,
    creator: String,
) -> Result<(), eyre::Report> {
    let kind = TaskType::try_from(task_type.as_str())
        .map_err(|err| eyre::eyre!("invalid task type in scenario: {err}"))?;
    let label = LabelType::try_from(label_type.as_str())
        .map_err(|err| eyre::eyre!("invalid label type in scenario: {err}"))?;

    let request = CreateTaskRequest::new(kind).with_label_type(label);
    let created = run_async(world.service.create_task(request, &creator))
        .wrap_err("create task for lifecycle scenario")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#""{operator}" has performed "{verb}""#)]
fn action_performed(
    world: &mut LifecycleWorld,
    operator: String,
    verb: String,
) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let outcome = run_async(
        world
            .service
            .perform_action(PerformActionRequest::new(task_id, verb, operator)),
    )
    .wrap_err("perform action in scenario setup")?;
    world.task = Some(outcome.task);
    Ok(())
}
