use async_trait::async_trait;
use stasis_core::{AppError, AppResult};
use stasis_domain::{Job, JobDefinitionSuspensionConfiguration, TimerHandlerType};

use crate::job_ports::TimerJobHandler;
use crate::{
    CommandContext, JobDefinitionStateService, JobDefinitionStateTransition,
    SetJobDefinitionStateInput,
};

/// Applies a deferred job definition state change when its timer fires.
#[derive(Clone)]
pub struct JobDefinitionSuspensionTimerHandler {
    transition: JobDefinitionStateTransition,
    job_definition_state_service: JobDefinitionStateService,
}

impl JobDefinitionSuspensionTimerHandler {
    /// Creates the handler for deferred suspensions.
    #[must_use]
    pub fn suspend(job_definition_state_service: JobDefinitionStateService) -> Self {
        Self::for_handler_type(
            TimerHandlerType::SuspendJobDefinition,
            job_definition_state_service,
        )
    }

    /// Creates the handler for deferred activations.
    #[must_use]
    pub fn activate(job_definition_state_service: JobDefinitionStateService) -> Self {
        Self::for_handler_type(
            TimerHandlerType::ActivateJobDefinition,
            job_definition_state_service,
        )
    }

    fn for_handler_type(
        handler_type: TimerHandlerType,
        job_definition_state_service: JobDefinitionStateService,
    ) -> Self {
        Self {
            transition: JobDefinitionStateTransition::for_handler_type(handler_type),
            job_definition_state_service,
        }
    }
}

#[async_trait]
impl TimerJobHandler for JobDefinitionSuspensionTimerHandler {
    fn handler_type(&self) -> &'static str {
        self.transition.delayed_handler_type().as_str()
    }

    async fn execute(&self, context: &CommandContext, timer: &Job) -> AppResult<()> {
        let configuration = timer.handler_configuration.as_deref().ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "{} timer '{}' has no configuration",
                self.transition.label(),
                timer.id
            ))
        })?;
        let configuration = JobDefinitionSuspensionConfiguration::decode(configuration)?;

        let input = SetJobDefinitionStateInput::new(configuration.selector.to_selection())
            .include_jobs(configuration.include_jobs);

        self.job_definition_state_service
            .set_job_definition_state(context, self.transition, input)
            .await
    }
}
