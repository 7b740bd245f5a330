use std::sync::Arc;

use chrono::{DateTime, Utc};
use stasis_core::AppResult;
use stasis_domain::{JobDefinitionSelection, PropertyChange, SUSPENSION_STATE_PROPERTY};

use crate::job_ports::{JobDefinitionRepository, JobRepository, JobStateCommand};
use crate::{CommandContext, JobDefinitionStateTransition, OperationLogService};

mod apply;

/// Input for suspending or activating job definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetJobDefinitionStateInput {
    /// Job definition selectors; the most specific present one wins.
    pub selection: JobDefinitionSelection,
    /// Cascades the state change to jobs of the selected definitions.
    pub include_jobs: bool,
    /// Defers the change to a timer firing at this instant.
    pub execution_date: Option<DateTime<Utc>>,
}

impl SetJobDefinitionStateInput {
    /// Creates an immediate, non-cascading change for a selection.
    #[must_use]
    pub fn new(selection: JobDefinitionSelection) -> Self {
        Self {
            selection,
            include_jobs: false,
            execution_date: None,
        }
    }

    /// Sets the cascade flag.
    #[must_use]
    pub fn include_jobs(mut self, include_jobs: bool) -> Self {
        self.include_jobs = include_jobs;
        self
    }

    /// Defers the change.
    #[must_use]
    pub fn execute_at(mut self, execution_date: DateTime<Utc>) -> Self {
        self.execution_date = Some(execution_date);
        self
    }
}

/// Suspends and activates job definitions, immediately or through a timer.
#[derive(Clone)]
pub struct JobDefinitionStateService {
    job_definition_repository: Arc<dyn JobDefinitionRepository>,
    job_repository: Arc<dyn JobRepository>,
    operation_log_service: OperationLogService,
    job_state_command: Arc<dyn JobStateCommand>,
}

impl JobDefinitionStateService {
    /// Creates a job definition state service.
    #[must_use]
    pub fn new(
        job_definition_repository: Arc<dyn JobDefinitionRepository>,
        job_repository: Arc<dyn JobRepository>,
        operation_log_service: OperationLogService,
        job_state_command: Arc<dyn JobStateCommand>,
    ) -> Self {
        Self {
            job_definition_repository,
            job_repository,
            operation_log_service,
            job_state_command,
        }
    }

    /// Suspends the selected job definitions.
    pub async fn suspend_job_definitions(
        &self,
        context: &CommandContext,
        input: SetJobDefinitionStateInput,
    ) -> AppResult<()> {
        self.set_job_definition_state(context, JobDefinitionStateTransition::Suspend, input)
            .await
    }

    /// Activates the selected job definitions.
    pub async fn activate_job_definitions(
        &self,
        context: &CommandContext,
        input: SetJobDefinitionStateInput,
    ) -> AppResult<()> {
        self.set_job_definition_state(context, JobDefinitionStateTransition::Activate, input)
            .await
    }

    /// Validates the selection, records the request and then either applies
    /// the change or schedules it.
    ///
    /// The operation log entry is kept even when the later step fails.
    pub async fn set_job_definition_state(
        &self,
        context: &CommandContext,
        transition: JobDefinitionStateTransition,
        input: SetJobDefinitionStateInput,
    ) -> AppResult<()> {
        let selection = input.selection.normalized();
        let selector = selection.resolve()?;

        let operation_id = self
            .operation_log_service
            .log_job_definition_operation(
                context,
                transition.log_operation(),
                &selection,
                PropertyChange::new(
                    SUSPENSION_STATE_PROPERTY,
                    None,
                    Some(transition.target_state().name().to_owned()),
                ),
            )
            .await?;

        match input.execution_date {
            Some(execution_date) => {
                self.schedule_state_change(
                    transition,
                    &selector,
                    input.include_jobs,
                    execution_date,
                )
                .await
            }
            None => {
                self.apply_state_change(
                    context,
                    transition,
                    &selector,
                    input.include_jobs,
                    operation_id,
                )
                .await
            }
        }
    }
}
