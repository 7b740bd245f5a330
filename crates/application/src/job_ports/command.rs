use async_trait::async_trait;
use stasis_core::AppResult;
use stasis_domain::{Job, JobSelection};

use crate::{CommandContext, JobStateTransition};

/// Job-level suspend/activate command invoked when a job definition change includes jobs.
#[async_trait]
pub trait JobStateCommand: Send + Sync {
    /// Changes the state of the selected jobs.
    ///
    /// `operation_id` ties the job-level operation log entry to an enclosing operation.
    async fn set_job_state(
        &self,
        context: &CommandContext,
        transition: JobStateTransition,
        selection: JobSelection,
        operation_id: Option<String>,
    ) -> AppResult<()>;
}

/// Executes timers of one handler type when they become due.
#[async_trait]
pub trait TimerJobHandler: Send + Sync {
    /// Returns the handler type served.
    fn handler_type(&self) -> &'static str;

    /// Executes one due timer.
    async fn execute(&self, context: &CommandContext, timer: &Job) -> AppResult<()>;
}
