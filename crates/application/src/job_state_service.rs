use std::sync::Arc;

use async_trait::async_trait;
use stasis_core::AppResult;
use stasis_domain::{JobSelection, PropertyChange, SUSPENSION_STATE_PROPERTY};

use crate::job_ports::{JobRepository, JobStateCommand};
use crate::{CommandContext, JobStateTransition, OperationLogService};

/// Suspends and activates jobs.
///
/// Also serves as the cascade target of job definition state changes.
#[derive(Clone)]
pub struct JobStateService {
    job_repository: Arc<dyn JobRepository>,
    operation_log_service: OperationLogService,
}

impl JobStateService {
    /// Creates a job state service.
    #[must_use]
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        operation_log_service: OperationLogService,
    ) -> Self {
        Self {
            job_repository,
            operation_log_service,
        }
    }

    /// Suspends the selected jobs.
    pub async fn suspend_jobs(
        &self,
        context: &CommandContext,
        selection: JobSelection,
    ) -> AppResult<()> {
        self.set_job_state(context, JobStateTransition::Suspend, selection, None)
            .await
    }

    /// Activates the selected jobs.
    pub async fn activate_jobs(
        &self,
        context: &CommandContext,
        selection: JobSelection,
    ) -> AppResult<()> {
        self.set_job_state(context, JobStateTransition::Activate, selection, None)
            .await
    }
}

#[async_trait]
impl JobStateCommand for JobStateService {
    async fn set_job_state(
        &self,
        context: &CommandContext,
        transition: JobStateTransition,
        selection: JobSelection,
        operation_id: Option<String>,
    ) -> AppResult<()> {
        let selection = selection.normalized();
        let selector = selection.resolve()?;
        let target_state = transition.target_state();

        self.operation_log_service
            .log_job_operation(
                context,
                operation_id,
                transition.log_operation(),
                &selection,
                PropertyChange::new(
                    SUSPENSION_STATE_PROPERTY,
                    None,
                    Some(target_state.name().to_owned()),
                ),
            )
            .await?;

        self.job_repository
            .update_job_suspension_state(&selector, target_state)
            .await
    }
}
