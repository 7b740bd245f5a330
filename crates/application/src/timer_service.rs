use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use stasis_core::{AppError, AppResult};

use crate::CommandContext;
use crate::job_ports::{JobRepository, TimerJobHandler};

mod suspension_handler;

pub use suspension_handler::JobDefinitionSuspensionTimerHandler;

/// Delay before a failed timer becomes due again.
pub const DEFAULT_TIMER_RETRY_WAIT_SECONDS: i64 = 10;

/// Failed timer execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFailure {
    /// Timer job id.
    pub timer_id: String,
    /// Handler type of the timer.
    pub handler_type: String,
    /// Retries left after this failure.
    pub retries_left: u32,
    /// Error reported by the handler.
    pub error_message: String,
    /// Instant the timer becomes due again.
    pub retry_at: DateTime<Utc>,
}

/// Outcome of one timer execution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerExecutionReport {
    /// Timers acquired in this pass.
    pub acquired: usize,
    /// Timers executed and removed.
    pub executed: usize,
    /// Timers that failed and stay queued while retries remain.
    pub failures: Vec<TimerFailure>,
}

/// Runs due timers through the handlers registered for their handler type.
#[derive(Clone)]
pub struct TimerJobExecutor {
    job_repository: Arc<dyn JobRepository>,
    handlers: BTreeMap<&'static str, Arc<dyn TimerJobHandler>>,
    retry_wait: Duration,
}

impl TimerJobExecutor {
    /// Creates an executor without handlers.
    #[must_use]
    pub fn new(job_repository: Arc<dyn JobRepository>) -> Self {
        Self {
            job_repository,
            handlers: BTreeMap::new(),
            retry_wait: Duration::seconds(DEFAULT_TIMER_RETRY_WAIT_SECONDS),
        }
    }

    /// Sets the delay before a failed timer is acquired again.
    #[must_use]
    pub fn with_retry_wait(mut self, retry_wait: Duration) -> Self {
        self.retry_wait = retry_wait;
        self
    }

    /// Registers a handler, replacing any handler of the same type.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn TimerJobHandler>) -> Self {
        self.handlers.insert(handler.handler_type(), handler);
        self
    }

    /// Returns the registered handler types in stable order.
    #[must_use]
    pub fn handler_types(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    /// Acquires up to `limit` due timers and executes them one after another.
    ///
    /// A failed timer loses one retry and is postponed by the retry wait, so it
    /// is never picked up again in the same pass or instant.
    pub async fn execute_due_timers(
        &self,
        context: &CommandContext,
        now: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<TimerExecutionReport> {
        if limit == 0 {
            return Err(AppError::InvalidRequest(
                "timer batch size must be greater than zero".to_owned(),
            ));
        }

        let handler_types = self.handler_types();
        let timers = self
            .job_repository
            .acquire_due_timers(now, &handler_types, limit)
            .await?;

        let mut report = TimerExecutionReport {
            acquired: timers.len(),
            ..TimerExecutionReport::default()
        };

        for timer in timers {
            let Some(handler) = self.handlers.get(timer.handler_type.as_str()) else {
                continue;
            };

            match handler.execute(context, &timer).await {
                Ok(()) => {
                    self.job_repository.delete_job(&timer.id).await?;
                    report.executed += 1;
                }
                Err(error) => {
                    let error_message = error.to_string();
                    let retry_at = now + self.retry_wait;
                    let failed = self
                        .job_repository
                        .record_job_failure(&timer.id, &error_message, retry_at)
                        .await?;
                    report.failures.push(TimerFailure {
                        timer_id: failed.id,
                        handler_type: failed.handler_type,
                        retries_left: failed.retries,
                        error_message,
                        retry_at,
                    });
                }
            }
        }

        Ok(report)
    }
}
