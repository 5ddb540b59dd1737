//! In-memory integration tests for task and action log listings.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rstest::rstest;
use warehouse_tasks::{
    config::EngineConfig,
    warehouse::{
        adapters::memory::InMemoryWarehouseStore,
        domain::{
            LogFilter, PageRequest, Priority, PriorityFilter, ShopId, TaskAction, TaskFilter,
            TaskId, TaskSort, TaskStatus, TaskType,
        },
        services::{CreateTaskRequest, ErrorKind, TaskQueryService},
    },
};

use super::helpers::{Harness, TestService, create, drive, harness, store};

/// Seeds four tasks and returns their identifiers in creation order.
async fn seed(service: &TestService, now: DateTime<Utc>) -> Result<Vec<TaskId>, eyre::Report> {
    let requests = [
        CreateTaskRequest::new(TaskType::Fba)
            .with_shop(ShopId::new(1)?)
            .with_priority(Priority::new(2)?)
            .with_deadline(now + Duration::hours(4)),
        CreateTaskRequest::new(TaskType::Fbm)
            .with_shop(ShopId::new(2)?)
            .with_priority(Priority::new(5)?)
            .with_deadline(now + Duration::hours(12)),
        CreateTaskRequest::new(TaskType::Fba)
            .with_shop(ShopId::new(1)?)
            .with_priority(Priority::new(5)?),
        CreateTaskRequest::new(TaskType::B2b)
            .with_shop(ShopId::new(2)?)
            .with_priority(Priority::new(4)?)
            .with_deadline(now + Duration::hours(1))
            .with_active(false),
    ];

    let mut ids = Vec::with_capacity(requests.len());
    for request in requests {
        ids.push(create(service, request).await?.id());
    }
    Ok(ids)
}

fn id_at(ids: &[TaskId], index: usize) -> Result<TaskId, eyre::Report> {
    ids.get(index)
        .copied()
        .ok_or_else(|| eyre::eyre!("seeded task {index} missing"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_listing_orders_by_latest_deadline(harness: Harness) -> Result<(), eyre::Report> {
    let ids = seed(&harness.lifecycle, Utc::now()).await?;

    let page = harness
        .tasks
        .list_tasks(&TaskFilter::default(), harness.tasks.first_page())
        .await?;

    let listed: Vec<TaskId> = page.items.iter().map(|task| task.id()).collect();
    let expected = vec![id_at(&ids, 1)?, id_at(&ids, 0)?, id_at(&ids, 3)?, id_at(&ids, 2)?];
    eyre::ensure!(listed == expected, "unexpected order {listed:?}");
    eyre::ensure!(page.total == 4);
    eyre::ensure!(page.limit == 20);
    eyre::ensure!(page.offset == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn priority_sort_puts_urgent_tasks_with_deadlines_first(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let ids = seed(&harness.lifecycle, Utc::now()).await?;
    let filter = TaskFilter {
        sort: TaskSort::PriorityDesc,
        ..TaskFilter::default()
    };

    let page = harness.tasks.list_tasks(&filter, PageRequest::new(1, 10)).await?;

    let listed: Vec<TaskId> = page.items.iter().map(|task| task.id()).collect();
    let expected = vec![id_at(&ids, 1)?, id_at(&ids, 2)?, id_at(&ids, 3)?, id_at(&ids, 0)?];
    eyre::ensure!(listed == expected, "unexpected order {listed:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pages_partition_the_result_set(harness: Harness) -> Result<(), eyre::Report> {
    seed(&harness.lifecycle, Utc::now()).await?;
    let filter = TaskFilter {
        sort: TaskSort::CreatedDesc,
        ..TaskFilter::default()
    };

    let first = harness.tasks.list_tasks(&filter, PageRequest::new(1, 3)).await?;
    let second = harness.tasks.list_tasks(&filter, PageRequest::new(2, 3)).await?;
    let beyond = harness.tasks.list_tasks(&filter, PageRequest::new(3, 3)).await?;

    eyre::ensure!(first.items.len() == 3);
    eyre::ensure!(second.items.len() == 1);
    eyre::ensure!(beyond.items.is_empty());
    eyre::ensure!(second.offset == 3);
    eyre::ensure!([first.total, second.total, beyond.total] == [4, 4, 4]);
    let overlap = first
        .items
        .iter()
        .any(|task| second.items.iter().any(|other| other.id() == task.id()));
    eyre::ensure!(!overlap, "pages must not overlap");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_combine_across_attributes(harness: Harness) -> Result<(), eyre::Report> {
    let now = Utc::now();
    let ids = seed(&harness.lifecycle, now).await?;
    drive(&harness.lifecycle, id_at(&ids, 0)?, "alice", &["confirm"]).await?;

    let active_in_shop_two = TaskFilter {
        shop_id: Some(ShopId::new(2)?),
        active: Some(true),
        ..TaskFilter::default()
    };
    let urgent_open = TaskFilter {
        priority: Some(PriorityFilter::AtLeast(Priority::new(4)?)),
        status_not_in: vec![TaskStatus::Picking],
        deadline_until: Some(now + Duration::hours(12)),
        ..TaskFilter::default()
    };
    let picking_fba = TaskFilter {
        status_in: vec![TaskStatus::Picking],
        task_type: Some(TaskType::Fba),
        ..TaskFilter::default()
    };

    let page = PageRequest::new(1, 10);
    let first: Vec<TaskId> = harness
        .tasks
        .list_tasks(&active_in_shop_two, page)
        .await?
        .items
        .iter()
        .map(|task| task.id())
        .collect();
    let second: Vec<TaskId> = harness
        .tasks
        .list_tasks(&urgent_open, page)
        .await?
        .items
        .iter()
        .map(|task| task.id())
        .collect();
    let third: Vec<TaskId> = harness
        .tasks
        .list_tasks(&picking_fba, page)
        .await?
        .items
        .iter()
        .map(|task| task.id())
        .collect();

    eyre::ensure!(first == vec![id_at(&ids, 1)?]);
    eyre::ensure!(second == vec![id_at(&ids, 1)?, id_at(&ids, 3)?]);
    eyre::ensure!(third == vec![id_at(&ids, 0)?]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn action_log_listing_filters_and_keeps_chronology(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let ids = seed(&harness.lifecycle, Utc::now()).await?;
    let first = id_at(&ids, 0)?;
    let second = id_at(&ids, 1)?;
    drive(&harness.lifecycle, first, "alice", &["confirm", "flag_problem"]).await?;
    drive(&harness.lifecycle, second, "bob", &["confirm"]).await?;
    drive(&harness.lifecycle, first, "carol", &["start"]).await?;

    let everything = harness
        .logs
        .list_logs(&LogFilter::default(), harness.logs.first_page())
        .await?;
    let timestamps: Vec<DateTime<Utc>> =
        everything.items.iter().map(|entry| entry.created_at).collect();
    eyre::ensure!(everything.total == 4);
    eyre::ensure!(timestamps.windows(2).all(|pair| pair.first() <= pair.last()));

    let confirms = LogFilter {
        action: Some(TaskAction::Confirm),
        ..LogFilter::default()
    };
    let confirm_tasks: Vec<TaskId> = harness
        .logs
        .list_logs(&confirms, PageRequest::new(1, 10))
        .await?
        .items
        .iter()
        .map(|entry| entry.task_id)
        .collect();
    eyre::ensure!(confirm_tasks == vec![first, second]);

    let by_carol = LogFilter {
        operator: Some("carol".to_owned()),
        ..LogFilter::for_task(first)
    };
    let carol_rows = harness
        .logs
        .list_logs(&by_carol, PageRequest::new(1, 10))
        .await?;
    eyre::ensure!(carol_rows.total == 1);
    eyre::ensure!(
        carol_rows
            .items
            .iter()
            .all(|entry| entry.action == TaskAction::Start
                && entry.to_status == TaskStatus::Picking)
    );
    Ok(())
}

#[rstest]
#[case(PageRequest::new(0, 10))]
#[case(PageRequest::new(1, 0))]
#[case(PageRequest::new(1, 101))]
#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_pages_are_validation_errors(
    harness: Harness,
    #[case] page: PageRequest,
) -> Result<(), eyre::Report> {
    let tasks = harness.tasks.list_tasks(&TaskFilter::default(), page).await;
    let logs = harness.logs.list_logs(&LogFilter::default(), page).await;

    eyre::ensure!(matches!(tasks, Err(ref err) if err.kind() == ErrorKind::Validation));
    eyre::ensure!(matches!(logs, Err(ref err) if err.kind() == ErrorKind::Validation));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_limits_drive_paging(
    store: Arc<InMemoryWarehouseStore>,
) -> Result<(), eyre::Report> {
    let config = EngineConfig {
        default_page_limit: 5,
        max_page_limit: 10,
        ..EngineConfig::default()
    }
    .validate()?;
    let queries = TaskQueryService::new(store).with_config(config);

    eyre::ensure!(queries.first_page() == PageRequest::new(1, 5));
    let too_large = queries
        .list_tasks(&TaskFilter::default(), PageRequest::new(1, 11))
        .await;
    eyre::ensure!(too_large.is_err());
    let empty = queries
        .list_tasks(&TaskFilter::default(), PageRequest::new(1, 10))
        .await?;
    eyre::ensure!(empty.items.is_empty() && empty.total == 0);
    Ok(())
}
