use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stasis_application::JobRepository;
use stasis_core::{AppError, AppResult};
use stasis_domain::{
    DEFAULT_JOB_RETRIES, DeferredActionDescriptor, Job, JobSelector, SuspensionState,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// In-memory job and timer store.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<String, Job>>,
}

impl InMemoryJobRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists every stored job ordered by id.
    pub async fn list_jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|left, right| left.id.cmp(&right.id));
        jobs
    }

    async fn update_matching<F>(&self, suspension_state: SuspensionState, matches: F) -> usize
    where
        F: Fn(&Job) -> bool,
    {
        let mut jobs = self.jobs.write().await;
        let mut updated = 0;

        for job in jobs.values_mut().filter(|job| matches(job)) {
            job.suspension_state = suspension_state;
            updated += 1;
        }

        updated
    }
}

fn matches_selector(job: &Job, selector: &JobSelector) -> bool {
    match selector {
        JobSelector::JobId(job_id) => &job.id == job_id,
        JobSelector::JobDefinitionId(id) => job.job_definition_id.as_ref() == Some(id),
        JobSelector::ProcessInstanceId(id) => job.process_instance_id.as_ref() == Some(id),
        JobSelector::ProcessDefinitionId(id) => job.process_definition_id.as_ref() == Some(id),
        JobSelector::ProcessDefinitionKey(key) => job.process_definition_key.as_ref() == Some(key),
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn save_job(&self, job: Job) -> AppResult<()> {
        job.validate()?;
        self.jobs.write().await.insert(job.id.clone(), job);
        Ok(())
    }

    async fn find_job(&self, job_id: &str) -> AppResult<Option<Job>> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn update_start_timer_suspension_state_by_process_definition_id(
        &self,
        process_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        let updated = self
            .update_matching(suspension_state, |job| {
                job.is_start_timer()
                    && job.process_definition_id.as_deref() == Some(process_definition_id)
            })
            .await;

        debug!(
            process_definition_id,
            state = %suspension_state,
            updated,
            "start timer states updated"
        );
        Ok(())
    }

    async fn update_start_timer_suspension_state_by_process_definition_key(
        &self,
        process_definition_key: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        let updated = self
            .update_matching(suspension_state, |job| {
                job.is_start_timer()
                    && job.process_definition_key.as_deref() == Some(process_definition_key)
            })
            .await;

        debug!(
            process_definition_key,
            state = %suspension_state,
            updated,
            "start timer states updated"
        );
        Ok(())
    }

    async fn update_job_suspension_state(
        &self,
        selector: &JobSelector,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        let updated = self
            .update_matching(suspension_state, |job| matches_selector(job, selector))
            .await;

        if let JobSelector::JobId(job_id) = selector
            && updated == 0
        {
            return Err(AppError::NotFound(format!("job '{job_id}' does not exist")));
        }

        debug!(?selector, state = %suspension_state, updated, "job states updated");
        Ok(())
    }

    async fn schedule_timer(&self, descriptor: DeferredActionDescriptor) -> AppResult<String> {
        let timer = Job {
            id: Uuid::new_v4().to_string(),
            job_definition_id: None,
            process_instance_id: None,
            process_definition_id: None,
            process_definition_key: None,
            handler_type: descriptor.handler_type.as_str().to_owned(),
            handler_configuration: Some(descriptor.configuration),
            due_date: Some(descriptor.due_date),
            retries: DEFAULT_JOB_RETRIES,
            suspension_state: SuspensionState::Active,
            exception_message: None,
        };
        let timer_id = timer.id.clone();

        info!(
            timer_id = %timer_id,
            handler_type = %timer.handler_type,
            due_date = %descriptor.due_date,
            "timer scheduled"
        );
        self.jobs.write().await.insert(timer_id.clone(), timer);

        Ok(timer_id)
    }

    async fn acquire_due_timers(
        &self,
        now: DateTime<Utc>,
        handler_types: &[&str],
        limit: usize,
    ) -> AppResult<Vec<Job>> {
        let mut due: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| {
                job.is_acquirable_at(now) && handler_types.contains(&job.handler_type.as_str())
            })
            .cloned()
            .collect();

        due.sort_by(|left, right| {
            left.due_date
                .cmp(&right.due_date)
                .then_with(|| left.id.cmp(&right.id))
        });
        due.truncate(limit);

        Ok(due)
    }

    async fn delete_job(&self, job_id: &str) -> AppResult<()> {
        self.jobs
            .write()
            .await
            .remove(job_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' does not exist")))
    }

    async fn record_job_failure(
        &self,
        job_id: &str,
        error_message: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' does not exist")))?;

        job.retries = job.retries.saturating_sub(1);
        job.exception_message = Some(error_message.to_owned());
        job.due_date = Some(retry_at);

        Ok(job.clone())
    }
}

#[cfg(test)]
mod tests;
