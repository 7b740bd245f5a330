//! In-crate fakes shared by service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use stasis_core::{AppError, AppResult, UserIdentity};
use stasis_domain::{
    AuditingLevel, DeferredActionDescriptor, Job, JobDefinition, JobDefinitionInput, JobSelection,
    JobSelector, OperationLogEntry, ProcessInstanceRecord, SuspensionState,
};

use crate::job_ports::{
    JobDefinitionRepository, JobRepository, JobStateCommand, ProcessInstanceRepository,
};
use crate::operation_log_ports::{
    OperationLogDeleteScope, OperationLogEventHandler, OperationLogQuery, OperationLogRepository,
};
use crate::{
    CommandContext, DefaultOperationLogEventProducer, EngineSettings, JobStateTransition,
    OperationLogService,
};

pub(crate) fn full_auditing_context() -> CommandContext {
    EngineSettings::new(AuditingLevel::Full).command_context(UserIdentity::new("ops"))
}

pub(crate) fn audit_level_context() -> CommandContext {
    EngineSettings::new(AuditingLevel::Audit).command_context(UserIdentity::new("ops"))
}

pub(crate) fn job_definition(id: &str, process_definition_id: &str, key: &str) -> JobDefinition {
    JobDefinition::new(JobDefinitionInput {
        id: id.to_owned(),
        process_definition_id: process_definition_id.to_owned(),
        process_definition_key: key.to_owned(),
        activity_id: Some("serviceTask".to_owned()),
        job_type: "async-continuation".to_owned(),
        suspension_state: SuspensionState::Active,
    })
    .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn job(id: &str, job_definition_id: &str, process_definition_id: &str) -> Job {
    Job {
        id: id.to_owned(),
        job_definition_id: Some(job_definition_id.to_owned()),
        process_instance_id: Some("pi-1".to_owned()),
        process_definition_id: Some(process_definition_id.to_owned()),
        process_definition_key: Some("orderProcess".to_owned()),
        handler_type: "async-continuation".to_owned(),
        handler_configuration: None,
        due_date: None,
        retries: 3,
        suspension_state: SuspensionState::Active,
        exception_message: None,
    }
}

/// Job definition store that records every mutation call.
#[derive(Default)]
pub(crate) struct FakeJobDefinitionRepository {
    pub(crate) definitions: Mutex<HashMap<String, JobDefinition>>,
    pub(crate) mutations: Mutex<Vec<String>>,
}

impl FakeJobDefinitionRepository {
    pub(crate) fn with_definitions(definitions: Vec<JobDefinition>) -> Self {
        Self {
            definitions: Mutex::new(
                definitions
                    .into_iter()
                    .map(|definition| (definition.id().to_owned(), definition))
                    .collect(),
            ),
            mutations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JobDefinitionRepository for FakeJobDefinitionRepository {
    async fn save_job_definition(&self, job_definition: JobDefinition) -> AppResult<()> {
        self.definitions
            .lock()
            .await
            .insert(job_definition.id().to_owned(), job_definition);
        Ok(())
    }

    async fn find_job_definition(
        &self,
        job_definition_id: &str,
    ) -> AppResult<Option<JobDefinition>> {
        Ok(self.definitions.lock().await.get(job_definition_id).cloned())
    }

    async fn list_job_definitions(&self) -> AppResult<Vec<JobDefinition>> {
        Ok(self.definitions.lock().await.values().cloned().collect())
    }

    async fn update_suspension_state_by_id(
        &self,
        job_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        self.mutations
            .lock()
            .await
            .push(format!("by_id:{job_definition_id}:{suspension_state}"));
        Ok(())
    }

    async fn update_suspension_state_by_process_definition_id(
        &self,
        process_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        self.mutations.lock().await.push(format!(
            "by_process_definition_id:{process_definition_id}:{suspension_state}"
        ));
        Ok(())
    }

    async fn update_suspension_state_by_process_definition_key(
        &self,
        process_definition_key: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        self.mutations.lock().await.push(format!(
            "by_process_definition_key:{process_definition_key}:{suspension_state}"
        ));
        Ok(())
    }
}

/// Job store that records mutation calls and scheduled timers.
#[derive(Default)]
pub(crate) struct FakeJobRepository {
    pub(crate) jobs: Mutex<HashMap<String, Job>>,
    pub(crate) mutations: Mutex<Vec<String>>,
    pub(crate) scheduled: Mutex<Vec<DeferredActionDescriptor>>,
}

impl FakeJobRepository {
    pub(crate) fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs.into_iter().map(|job| (job.id.clone(), job)).collect()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl JobRepository for FakeJobRepository {
    async fn save_job(&self, job: Job) -> AppResult<()> {
        self.jobs.lock().await.insert(job.id.clone(), job);
        Ok(())
    }

    async fn find_job(&self, job_id: &str) -> AppResult<Option<Job>> {
        Ok(self.jobs.lock().await.get(job_id).cloned())
    }

    async fn update_start_timer_suspension_state_by_process_definition_id(
        &self,
        process_definition_id: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        self.mutations.lock().await.push(format!(
            "start_timers_by_process_definition_id:{process_definition_id}:{suspension_state}"
        ));
        Ok(())
    }

    async fn update_start_timer_suspension_state_by_process_definition_key(
        &self,
        process_definition_key: &str,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        self.mutations.lock().await.push(format!(
            "start_timers_by_process_definition_key:{process_definition_key}:{suspension_state}"
        ));
        Ok(())
    }

    async fn update_job_suspension_state(
        &self,
        selector: &JobSelector,
        suspension_state: SuspensionState,
    ) -> AppResult<()> {
        self.mutations
            .lock()
            .await
            .push(format!("jobs:{selector:?}:{suspension_state}"));
        Ok(())
    }

    async fn schedule_timer(&self, descriptor: DeferredActionDescriptor) -> AppResult<String> {
        let mut scheduled = self.scheduled.lock().await;
        scheduled.push(descriptor);
        Ok(format!("timer-{}", scheduled.len()))
    }

    async fn acquire_due_timers(
        &self,
        now: DateTime<Utc>,
        handler_types: &[&str],
        limit: usize,
    ) -> AppResult<Vec<Job>> {
        let mut due: Vec<Job> = self
            .jobs
            .lock()
            .await
            .values()
            .filter(|job| {
                job.is_acquirable_at(now) && handler_types.contains(&job.handler_type.as_str())
            })
            .cloned()
            .collect();
        due.sort_by(|left, right| left.id.cmp(&right.id));
        due.truncate(limit);
        Ok(due)
    }

    async fn delete_job(&self, job_id: &str) -> AppResult<()> {
        self.jobs.lock().await.remove(job_id);
        Ok(())
    }

    async fn record_job_failure(
        &self,
        job_id: &str,
        error_message: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<Job> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' does not exist")))?;
        job.retries = job.retries.saturating_sub(1);
        job.exception_message = Some(error_message.to_owned());
        job.due_date = Some(retry_at);
        Ok(job.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeProcessInstanceRepository {
    pub(crate) instances: Mutex<HashMap<String, ProcessInstanceRecord>>,
}

#[async_trait]
impl ProcessInstanceRepository for FakeProcessInstanceRepository {
    async fn find_process_instance(
        &self,
        process_instance_id: &str,
    ) -> AppResult<Option<ProcessInstanceRecord>> {
        Ok(self.instances.lock().await.get(process_instance_id).cloned())
    }
}

/// Recording pipeline sink counting submissions.
#[derive(Default)]
pub(crate) struct RecordingOperationLog {
    pub(crate) entries: Mutex<Vec<OperationLogEntry>>,
    pub(crate) submissions: Mutex<usize>,
}

#[async_trait]
impl OperationLogEventHandler for RecordingOperationLog {
    async fn handle_events(&self, events: Vec<OperationLogEntry>) -> AppResult<()> {
        *self.submissions.lock().await += 1;
        self.entries.lock().await.extend(events);
        Ok(())
    }
}

#[async_trait]
impl OperationLogRepository for RecordingOperationLog {
    async fn list_entries(&self, query: OperationLogQuery) -> AppResult<Vec<OperationLogEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn count_entries(&self, query: OperationLogQuery) -> AppResult<usize> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .count())
    }

    async fn delete_entry(&self, entry_id: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|entry| entry.entry_id != entry_id);
        Ok(entries.len() != before)
    }

    async fn delete_entries_by(&self, scope: OperationLogDeleteScope) -> AppResult<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|entry| !scope.matches(&entry.selection));
        Ok(before - entries.len())
    }
}

/// Job-level command that only records its invocations.
#[derive(Default)]
pub(crate) struct RecordingJobStateCommand {
    pub(crate) calls: Mutex<Vec<(JobStateTransition, JobSelection, Option<String>)>>,
}

#[async_trait]
impl JobStateCommand for RecordingJobStateCommand {
    async fn set_job_state(
        &self,
        _context: &CommandContext,
        transition: JobStateTransition,
        selection: JobSelection,
        operation_id: Option<String>,
    ) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push((transition, selection, operation_id));
        Ok(())
    }
}

/// Fakes wired into one operation log service.
pub(crate) struct Fixture {
    pub(crate) job_definitions: Arc<FakeJobDefinitionRepository>,
    pub(crate) jobs: Arc<FakeJobRepository>,
    pub(crate) process_instances: Arc<FakeProcessInstanceRepository>,
    pub(crate) operation_log: Arc<RecordingOperationLog>,
}

impl Fixture {
    pub(crate) fn new(job_definitions: Vec<JobDefinition>, jobs: Vec<Job>) -> Self {
        Self {
            job_definitions: Arc::new(FakeJobDefinitionRepository::with_definitions(
                job_definitions,
            )),
            jobs: Arc::new(FakeJobRepository::with_jobs(jobs)),
            process_instances: Arc::new(FakeProcessInstanceRepository::default()),
            operation_log: Arc::new(RecordingOperationLog::default()),
        }
    }

    pub(crate) fn operation_log_service(&self) -> OperationLogService {
        OperationLogService::new(
            Arc::new(DefaultOperationLogEventProducer::new()),
            self.operation_log.clone(),
            self.operation_log.clone(),
            self.job_definitions.clone(),
            self.jobs.clone(),
            self.process_instances.clone(),
        )
    }

    pub(crate) async fn submissions(&self) -> usize {
        *self.operation_log.submissions.lock().await
    }

    pub(crate) async fn entries(&self) -> Vec<OperationLogEntry> {
        self.operation_log.entries.lock().await.clone()
    }
}
