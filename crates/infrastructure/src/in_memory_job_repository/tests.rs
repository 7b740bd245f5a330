use chrono::{Duration, Utc};
use stasis_application::JobRepository;
use stasis_core::AppError;
use stasis_domain::{
    DEFAULT_JOB_RETRIES, DeferredActionDescriptor, Job, JobSelector, START_TIMER_HANDLER_TYPE,
    SuspensionState, TimerHandlerType,
};

use super::InMemoryJobRepository;

fn job(id: &str, handler_type: &str, process_definition_id: &str) -> Job {
    Job {
        id: id.to_owned(),
        job_definition_id: Some("jd1".to_owned()),
        process_instance_id: None,
        process_definition_id: Some(process_definition_id.to_owned()),
        process_definition_key: Some("orderProcess".to_owned()),
        handler_type: handler_type.to_owned(),
        handler_configuration: None,
        due_date: None,
        retries: DEFAULT_JOB_RETRIES,
        suspension_state: SuspensionState::Active,
        exception_message: None,
    }
}

async fn states(repository: &InMemoryJobRepository) -> Vec<(String, SuspensionState)> {
    repository
        .list_jobs()
        .await
        .into_iter()
        .map(|job| (job.id, job.suspension_state))
        .collect()
}

#[tokio::test]
async fn start_timer_updates_skip_definition_scoped_jobs() {
    let repository = InMemoryJobRepository::new();
    for job in [
        job("a-start", START_TIMER_HANDLER_TYPE, "orderProcess:1"),
        job("b-async", "async-continuation", "orderProcess:1"),
        job("c-start", START_TIMER_HANDLER_TYPE, "orderProcess:2"),
    ] {
        assert!(repository.save_job(job).await.is_ok());
    }

    let result = repository
        .update_start_timer_suspension_state_by_process_definition_id(
            "orderProcess:1",
            SuspensionState::Suspended,
        )
        .await;
    assert!(result.is_ok());
    assert_eq!(
        states(&repository).await,
        vec![
            ("a-start".to_owned(), SuspensionState::Suspended),
            ("b-async".to_owned(), SuspensionState::Active),
            ("c-start".to_owned(), SuspensionState::Active),
        ]
    );

    let result = repository
        .update_start_timer_suspension_state_by_process_definition_key(
            "orderProcess",
            SuspensionState::Suspended,
        )
        .await;
    assert!(result.is_ok());
    assert_eq!(states(&repository).await[2].1, SuspensionState::Suspended);
}

#[tokio::test]
async fn job_selector_updates_matching_jobs() {
    let repository = InMemoryJobRepository::new();
    assert!(
        repository
            .save_job(job("job-1", "async-continuation", "orderProcess:1"))
            .await
            .is_ok()
    );

    let by_definition = repository
        .update_job_suspension_state(
            &JobSelector::JobDefinitionId("jd1".to_owned()),
            SuspensionState::Suspended,
        )
        .await;
    assert!(by_definition.is_ok());
    assert_eq!(states(&repository).await[0].1, SuspensionState::Suspended);

    let unknown_instance = repository
        .update_job_suspension_state(
            &JobSelector::ProcessInstanceId("pi-9".to_owned()),
            SuspensionState::Active,
        )
        .await;
    assert!(unknown_instance.is_ok());

    let unknown_job = repository
        .update_job_suspension_state(
            &JobSelector::JobId("job-9".to_owned()),
            SuspensionState::Active,
        )
        .await;
    assert!(matches!(unknown_job, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn scheduled_timers_are_acquired_once_due() {
    let repository = InMemoryJobRepository::new();
    let now = Utc::now();

    let timer_id = repository
        .schedule_timer(DeferredActionDescriptor {
            due_date: now + Duration::hours(1),
            handler_type: TimerHandlerType::SuspendJobDefinition,
            configuration: r#"{"by":"jobDefinitionId","jobDefinitionId":"jd1","includeJobs":false}"#
                .to_owned(),
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    let handler_types = [TimerHandlerType::SuspendJobDefinition.as_str()];
    let early = repository
        .acquire_due_timers(now, &handler_types, 10)
        .await
        .unwrap_or_default();
    assert!(early.is_empty());

    let due = repository
        .acquire_due_timers(now + Duration::hours(2), &handler_types, 10)
        .await
        .unwrap_or_default();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, timer_id);
    assert_eq!(due[0].retries, DEFAULT_JOB_RETRIES);

    let other_types = repository
        .acquire_due_timers(
            now + Duration::hours(2),
            &[TimerHandlerType::ActivateJobDefinition.as_str()],
            10,
        )
        .await
        .unwrap_or_default();
    assert!(other_types.is_empty());
}

#[tokio::test]
async fn failures_consume_retries_and_delete_removes() {
    let repository = InMemoryJobRepository::new();
    let mut timer = job("timer-1", "suspend-job-definition", "orderProcess:1");
    timer.retries = 1;
    timer.due_date = Some(Utc::now() - Duration::minutes(1));
    assert!(repository.save_job(timer).await.is_ok());

    let retry_at = Utc::now() + Duration::seconds(30);
    let failed = repository
        .record_job_failure("timer-1", "boom", retry_at)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(failed.retries, 0);
    assert_eq!(failed.exception_message.as_deref(), Some("boom"));
    assert_eq!(failed.due_date, Some(retry_at));

    let acquired = repository
        .acquire_due_timers(Utc::now(), &["suspend-job-definition"], 10)
        .await
        .unwrap_or_default();
    assert!(acquired.is_empty());

    assert!(repository.delete_job("timer-1").await.is_ok());
    assert!(matches!(
        repository.delete_job("timer-1").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn blank_job_is_rejected() {
    let repository = InMemoryJobRepository::new();

    let result = repository
        .save_job(job(" ", "async-continuation", "orderProcess:1"))
        .await;

    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
}

#[tokio::test]
async fn failed_timer_is_postponed_until_its_retry_instant() {
    let repository = InMemoryJobRepository::new();
    let now = Utc::now();
    let mut timer = job("timer-1", "suspend-job-definition", "orderProcess:1");
    timer.due_date = Some(now - Duration::minutes(1));
    assert!(repository.save_job(timer).await.is_ok());

    let failed = repository
        .record_job_failure("timer-1", "boom", now + Duration::seconds(10))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(failed.retries, 2);

    let same_instant = repository
        .acquire_due_timers(now, &["suspend-job-definition"], 10)
        .await
        .unwrap_or_default();
    assert!(same_instant.is_empty());

    let after_wait = repository
        .acquire_due_timers(now + Duration::seconds(10), &["suspend-job-definition"], 10)
        .await
        .unwrap_or_default();
    assert_eq!(after_wait.len(), 1);
}
