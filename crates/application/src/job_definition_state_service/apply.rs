use super::*;

use stasis_domain::{
    DeferredActionDescriptor, JobDefinitionSelector, JobDefinitionSuspensionConfiguration,
    JobSelection,
};

impl JobDefinitionStateService {
    pub(super) async fn apply_state_change(
        &self,
        context: &CommandContext,
        transition: JobDefinitionStateTransition,
        selector: &JobDefinitionSelector,
        include_jobs: bool,
        operation_id: Option<String>,
    ) -> AppResult<()> {
        let target_state = transition.target_state();

        match selector {
            JobDefinitionSelector::JobDefinitionId { job_definition_id } => {
                self.job_definition_repository
                    .update_suspension_state_by_id(job_definition_id, target_state)
                    .await?;
            }
            JobDefinitionSelector::ProcessDefinitionId {
                process_definition_id,
            } => {
                self.job_definition_repository
                    .update_suspension_state_by_process_definition_id(
                        process_definition_id,
                        target_state,
                    )
                    .await?;
                self.job_repository
                    .update_start_timer_suspension_state_by_process_definition_id(
                        process_definition_id,
                        target_state,
                    )
                    .await?;
            }
            JobDefinitionSelector::ProcessDefinitionKey {
                process_definition_key,
            } => {
                self.job_definition_repository
                    .update_suspension_state_by_process_definition_key(
                        process_definition_key,
                        target_state,
                    )
                    .await?;
                self.job_repository
                    .update_start_timer_suspension_state_by_process_definition_key(
                        process_definition_key,
                        target_state,
                    )
                    .await?;
            }
        }

        if include_jobs {
            // Cascaded job rows share the job definition's operation id only
            // under detailed auditing.
            let operation_id = operation_id.filter(|_| context.is_detailed_auditing_enabled());
            self.job_state_command
                .set_job_state(
                    context,
                    transition.job_transition(),
                    JobSelection::from(&selector.to_selection()),
                    operation_id,
                )
                .await?;
        }

        Ok(())
    }

    pub(super) async fn schedule_state_change(
        &self,
        transition: JobDefinitionStateTransition,
        selector: &JobDefinitionSelector,
        include_jobs: bool,
        execution_date: DateTime<Utc>,
    ) -> AppResult<()> {
        let descriptor = DeferredActionDescriptor {
            due_date: execution_date,
            handler_type: transition.delayed_handler_type(),
            configuration: JobDefinitionSuspensionConfiguration::for_selector(
                selector,
                include_jobs,
            )?,
        };

        self.job_repository.schedule_timer(descriptor).await?;
        Ok(())
    }
}
