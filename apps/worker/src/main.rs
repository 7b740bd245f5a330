//! Stasis timer worker runtime.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use stasis_application::{
    DEFAULT_TIMER_RETRY_WAIT_SECONDS, DefaultOperationLogEventProducer, EngineSettings,
    JobDefinitionStateService, JobDefinitionSuspensionTimerHandler, JobStateService,
    OperationLogService, TimerExecutionReport, TimerJobExecutor,
};
use stasis_core::{AppError, AppResult};
use stasis_domain::AuditingLevel;
use stasis_infrastructure::{
    EngineSeed, InMemoryJobDefinitionRepository, InMemoryJobRepository, InMemoryOperationLog,
    InMemoryProcessInstanceRepository,
};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkerConfig {
    auditing_level: AuditingLevel,
    worker_id: String,
    timer_batch_size: usize,
    poll_interval_ms: u64,
    retry_wait_ms: u64,
    seed_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let settings = EngineSettings::new(config.auditing_level);

    let job_definition_repository = Arc::new(InMemoryJobDefinitionRepository::new());
    let job_repository = Arc::new(InMemoryJobRepository::new());
    let process_instance_repository = Arc::new(InMemoryProcessInstanceRepository::new());
    let operation_log = Arc::new(InMemoryOperationLog::new());

    if let Some(seed_path) = &config.seed_path {
        EngineSeed::load_from_path(seed_path)?
            .apply(
                job_definition_repository.as_ref(),
                job_repository.as_ref(),
                process_instance_repository.as_ref(),
            )
            .await?;
    }

    let operation_log_service = OperationLogService::new(
        Arc::new(DefaultOperationLogEventProducer::new()),
        operation_log.clone(),
        operation_log,
        job_definition_repository.clone(),
        job_repository.clone(),
        process_instance_repository,
    );
    let job_state_service = Arc::new(JobStateService::new(
        job_repository.clone(),
        operation_log_service.clone(),
    ));
    let job_definition_state_service = JobDefinitionStateService::new(
        job_definition_repository,
        job_repository.clone(),
        operation_log_service,
        job_state_service,
    );
    let executor = TimerJobExecutor::new(job_repository)
        .with_retry_wait(retry_wait(config.retry_wait_ms)?)
        .with_handler(Arc::new(JobDefinitionSuspensionTimerHandler::suspend(
            job_definition_state_service.clone(),
        )))
        .with_handler(Arc::new(JobDefinitionSuspensionTimerHandler::activate(
            job_definition_state_service,
        )));

    info!(
        worker_id = %config.worker_id,
        auditing_level = settings.auditing_level().as_str(),
        timer_batch_size = config.timer_batch_size,
        poll_interval_ms = config.poll_interval_ms,
        retry_wait_ms = config.retry_wait_ms,
        handler_types = ?executor.handler_types(),
        "stasis-worker started"
    );

    let context = settings.system_context();
    loop {
        match executor
            .execute_due_timers(&context, Utc::now(), config.timer_batch_size)
            .await
        {
            Ok(report) => {
                for failure in &report.failures {
                    warn!(
                        worker_id = %config.worker_id,
                        timer_id = %failure.timer_id,
                        handler_type = %failure.handler_type,
                        retries_left = failure.retries_left,
                        retry_at = %failure.retry_at,
                        error = %failure.error_message,
                        "timer execution failed"
                    );
                }

                if report.acquired > 0 {
                    info!(
                        worker_id = %config.worker_id,
                        acquired = report.acquired,
                        executed = report.executed,
                        failed = report.failures.len(),
                        "timer batch processed"
                    );
                }

                if should_poll_immediately(&report, config.timer_batch_size) {
                    continue;
                }
            }
            Err(error) => {
                warn!(
                    worker_id = %config.worker_id,
                    error = %error,
                    "failed to process due timers"
                );
            }
        }

        tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
    }
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auditing_level = match lookup("STASIS_AUDITING_LEVEL") {
            Some(value) => value.parse::<AuditingLevel>()?,
            None => AuditingLevel::default(),
        };
        let worker_id = lookup("STASIS_WORKER_ID")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("worker-{}", std::process::id()));
        let timer_batch_size = parse_usize(&lookup, "STASIS_TIMER_BATCH_SIZE", 10)?;
        let poll_interval_ms = parse_u64(&lookup, "STASIS_POLL_INTERVAL_MS", 1000)?;
        let retry_wait_ms = parse_u64(
            &lookup,
            "STASIS_TIMER_RETRY_WAIT_MS",
            DEFAULT_TIMER_RETRY_WAIT_SECONDS.unsigned_abs() * 1000,
        )?;
        let seed_path = lookup("STASIS_SEED_PATH")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        if timer_batch_size == 0 {
            return Err(AppError::InvalidRequest(
                "STASIS_TIMER_BATCH_SIZE must be greater than zero".to_owned(),
            ));
        }

        if poll_interval_ms == 0 {
            return Err(AppError::InvalidRequest(
                "STASIS_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        if retry_wait_ms == 0 {
            return Err(AppError::InvalidRequest(
                "STASIS_TIMER_RETRY_WAIT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            auditing_level,
            worker_id,
            timer_batch_size,
            poll_interval_ms,
            retry_wait_ms,
            seed_path,
        })
    }
}

/// Only a full batch without failures re-polls without sleeping.
fn should_poll_immediately(report: &TimerExecutionReport, timer_batch_size: usize) -> bool {
    report.acquired == timer_batch_size && report.failures.is_empty()
}

fn retry_wait(retry_wait_ms: u64) -> AppResult<TimeDelta> {
    i64::try_from(retry_wait_ms)
        .map(TimeDelta::milliseconds)
        .map_err(|error| {
            AppError::InvalidRequest(format!(
                "invalid STASIS_TIMER_RETRY_WAIT_MS value '{retry_wait_ms}': {error}"
            ))
        })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_usize<F>(lookup: &F, name: &str, default: usize) -> AppResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<usize>().map_err(|error| {
            AppError::InvalidRequest(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_u64<F>(lookup: &F, name: &str, default: u64) -> AppResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::InvalidRequest(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use stasis_application::{TimerExecutionReport, TimerFailure};
    use stasis_core::AppError;
    use stasis_domain::AuditingLevel;

    use super::{WorkerConfig, should_poll_immediately};

    fn config_from(pairs: &[(&str, &str)]) -> Result<WorkerConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        WorkerConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.auditing_level, AuditingLevel::Full);
        assert!(config.worker_id.starts_with("worker-"));
        assert_eq!(config.timer_batch_size, 10);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.retry_wait_ms, 10_000);
        assert_eq!(config.seed_path, None);
    }

    #[test]
    fn explicit_values_are_parsed() {
        let config = config_from(&[
            ("STASIS_AUDITING_LEVEL", "Audit"),
            ("STASIS_WORKER_ID", " timer-1 "),
            ("STASIS_TIMER_BATCH_SIZE", "25"),
            ("STASIS_TIMER_RETRY_WAIT_MS", "2500"),
            ("STASIS_SEED_PATH", "seed.json"),
        ])
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.auditing_level, AuditingLevel::Audit);
        assert_eq!(config.worker_id, "timer-1");
        assert_eq!(config.timer_batch_size, 25);
        assert_eq!(config.retry_wait_ms, 2500);
        assert_eq!(config.seed_path, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("STASIS_TIMER_BATCH_SIZE", "0")]),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            config_from(&[("STASIS_POLL_INTERVAL_MS", "soon")]),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            config_from(&[("STASIS_AUDITING_LEVEL", "verbose")]),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            config_from(&[("STASIS_TIMER_RETRY_WAIT_MS", "0")]),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn batch_with_failures_waits_for_next_poll() {
        let clean = TimerExecutionReport {
            acquired: 2,
            executed: 2,
            failures: Vec::new(),
        };
        let failed = TimerExecutionReport {
            acquired: 2,
            executed: 1,
            failures: vec![TimerFailure {
                timer_id: "timer-1".to_owned(),
                handler_type: "suspend-job-definition".to_owned(),
                retries_left: 2,
                error_message: "not found".to_owned(),
                retry_at: chrono::Utc::now(),
            }],
        };

        assert!(should_poll_immediately(&clean, 2));
        assert!(!should_poll_immediately(&clean, 3));
        assert!(!should_poll_immediately(&failed, 2));
    }
}
