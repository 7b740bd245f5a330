use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stasis_core::AppResult;
use stasis_domain::{
    DeferredActionDescriptor, Job, JobDefinition, JobSelector, ProcessInstanceRecord,
    SuspensionState,
};

/// Repository port for job definitions.
#[async_trait]
pub trait JobDefinitionRepository: Send + Sync {
    /// Saves one job definition, replacing any previous version.
    async fn save_job_definition(&self, job_definition: JobDefinition) -> AppResult<()>;

    /// Returns one job definition by id.
    async fn find_job_definition(
        &self,
        job_definition_id: &str,
    ) -> AppResult<Option<JobDefinition>>;

    /// Lists all job definitions.
    async fn list_job_definitions(&self) -> AppResult<Vec<JobDefinition>>;

    /// Updates the suspension state of one job definition.
    async fn update_suspension_state_by_id(
        &self,
        job_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()>;

    /// Updates the suspension state of every job definition of one process definition.
    async fn update_suspension_state_by_process_definition_id(
        &self,
        process_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()>;

    /// Updates the suspension state of every job definition sharing a process definition key.
    async fn update_suspension_state_by_process_definition_key(
        &self,
        process_definition_key: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()>;
}

/// Repository port for jobs and timers.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Saves one job, replacing any previous version.
    async fn save_job(&self, job: Job) -> AppResult<()>;

    /// Returns one job by id.
    async fn find_job(&self, job_id: &str) -> AppResult<Option<Job>>;

    /// Updates pending start timers of one process definition.
    async fn update_start_timer_suspension_state_by_process_definition_id(
        &self,
        process_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()>;

    /// Updates pending start timers of every process definition sharing a key.
    async fn update_start_timer_suspension_state_by_process_definition_key(
        &self,
        process_definition_key: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()>;

    /// Updates the suspension state of the jobs matched by a selector.
    async fn update_job_suspension_state(
        &self,
        selector: &JobSelector,
        suspension_state: SuspensionState,
    ) -> AppResult<()>;

    /// Registers a timer for a deferred action and returns its job id.
    async fn schedule_timer(&self, descriptor: DeferredActionDescriptor) -> AppResult<String>;

    /// Returns due, active timers with retries left whose handler type is listed.
    async fn acquire_due_timers(
        &self,
        now: DateTime<Utc>,
        handler_types: &[&str],
        limit: usize,
    ) -> AppResult<Vec<Job>>;

    /// Removes one job.
    async fn delete_job(&self, job_id: &str) -> AppResult<()>;

    /// Decrements retries of one job, records the failure message and moves its
    /// due date to `retry_at`.
    async fn record_job_failure(
        &self,
        job_id: &str,
        error_message: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<Job>;
}

/// Repository port for process instance ownership lookups.
#[async_trait]
pub trait ProcessInstanceRepository: Send + Sync {
    /// Returns one process instance by id.
    async fn find_process_instance(
        &self,
        process_instance_id: &str,
    ) -> AppResult<Option<ProcessInstanceRecord>>;
}
