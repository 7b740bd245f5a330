use std::collections::HashMap;

use async_trait::async_trait;
use stasis_application::JobDefinitionRepository;
use stasis_core::{AppError, AppResult};
use stasis_domain::{JobDefinition, SuspensionState};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory job definition store.
#[derive(Debug, Default)]
pub struct InMemoryJobDefinitionRepository {
    job_definitions: RwLock<HashMap<String, JobDefinition>>,
}

impl InMemoryJobDefinitionRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_matching<F>(&self, suspension_state: SuspensionState, matches: F) -> usize
    where
        F: Fn(&JobDefinition) -> bool,
    {
        let mut job_definitions = self.job_definitions.write().await;
        let mut updated = 0;

        for job_definition in job_definitions.values_mut() {
            if matches(job_definition) {
                *job_definition = job_definition.clone().with_suspension_state(suspension_state);
                updated += 1;
            }
        }

        updated
    }
}

#[async_trait]
impl JobDefinitionRepository for InMemoryJobDefinitionRepository {
    async fn save_job_definition(&self, job_definition: JobDefinition) -> AppResult<()> {
        self.job_definitions
            .write()
            .await
            .insert(job_definition.id().to_owned(), job_definition);
        Ok(())
    }

    async fn find_job_definition(
        &self,
        job_definition_id: &str,
    ) -> AppResult<Option<JobDefinition>> {
        Ok(self
            .job_definitions
            .read()
            .await
            .get(job_definition_id)
            .cloned())
    }

    async fn list_job_definitions(&self) -> AppResult<Vec<JobDefinition>> {
        let mut values: Vec<JobDefinition> =
            self.job_definitions.read().await.values().cloned().collect();
        values.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(values)
    }

    async fn update_suspension_state_by_id(
        &self,
        job_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        let updated = self
            .update_matching(suspension_state, |job_definition| {
                job_definition.id() == job_definition_id
            })
            .await;

        if updated == 0 {
            return Err(AppError::NotFound(format!(
                "job definition '{job_definition_id}' does not exist"
            )));
        }

        debug!(job_definition_id, state = %suspension_state, "job definition state updated");
        Ok(())
    }

    async fn update_suspension_state_by_process_definition_id(
        &self,
        process_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        let updated = self
            .update_matching(suspension_state, |job_definition| {
                job_definition.process_definition_id() == process_definition_id
            })
            .await;

        debug!(
            process_definition_id,
            state = %suspension_state,
            updated,
            "job definition states updated"
        );
        Ok(())
    }

    async fn update_suspension_state_by_process_definition_key(
        &self,
        process_definition_key: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        let updated = self
            .update_matching(suspension_state, |job_definition| {
                job_definition.process_definition_key() == process_definition_key
            })
            .await;

        debug!(
            process_definition_key,
            state = %suspension_state,
            updated,
            "job definition states updated"
        );
        Ok(())
    }
}
