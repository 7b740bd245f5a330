use std::sync::Arc;

use stasis_core::{AppError, AppResult, NonEmptyString};
use stasis_domain::{
    AuditLogContext, EntityType, JobDefinition, JobDefinitionSelection, JobSelection,
    OperationLogEntry, OperationType, PropertyChange, TaskRecord,
};
use uuid::Uuid;

use crate::CommandContext;
use crate::job_ports::{JobDefinitionRepository, JobRepository, ProcessInstanceRepository};
use crate::operation_log_ports::{
    OperationLogDeleteScope, OperationLogEventHandler, OperationLogEventProducer,
    OperationLogQuery, OperationLogRepository,
};

mod contexts;

/// Builds correlated audit contexts for administrative operations and records them.
///
/// Every `log_*` entry point is a no-op returning `Ok(None)` unless the command
/// context runs at the detailed auditing level. Otherwise it returns the
/// operation id the rows were recorded under, so callers can correlate
/// follow-up operations with it.
#[derive(Clone)]
pub struct OperationLogService {
    event_producer: Arc<dyn OperationLogEventProducer>,
    event_handler: Arc<dyn OperationLogEventHandler>,
    repository: Arc<dyn OperationLogRepository>,
    job_definition_repository: Arc<dyn JobDefinitionRepository>,
    job_repository: Arc<dyn JobRepository>,
    process_instance_repository: Arc<dyn ProcessInstanceRepository>,
}

impl OperationLogService {
    /// Creates an operation log service.
    #[must_use]
    pub fn new(
        event_producer: Arc<dyn OperationLogEventProducer>,
        event_handler: Arc<dyn OperationLogEventHandler>,
        repository: Arc<dyn OperationLogRepository>,
        job_definition_repository: Arc<dyn JobDefinitionRepository>,
        job_repository: Arc<dyn JobRepository>,
        process_instance_repository: Arc<dyn ProcessInstanceRepository>,
    ) -> Self {
        Self {
            event_producer,
            event_handler,
            repository,
            job_definition_repository,
            job_repository,
            process_instance_repository,
        }
    }

    /// Records a prepared context and returns the operation id used.
    pub async fn log_user_operations(
        &self,
        context: &CommandContext,
        audit_context: AuditLogContext,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let audit_context = match audit_context.operation_id() {
            Some(_) => audit_context,
            None => audit_context.with_operation_id(Uuid::new_v4().to_string()),
        };
        let operation_id = audit_context.operation_id().map(ToOwned::to_owned);

        let events = self.event_producer.produce_events(context, &audit_context)?;
        self.event_handler.handle_events(events).await?;

        Ok(operation_id)
    }

    /// Logs a task operation.
    pub async fn log_task_operations(
        &self,
        context: &CommandContext,
        operation: OperationType,
        task: &TaskRecord,
        property_changes: Vec<PropertyChange>,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let audit_context =
            contexts::task_context(EntityType::Task, operation, task, property_changes);
        self.log_user_operations(context, audit_context).await
    }

    /// Logs a user or group link change on a task.
    pub async fn log_link_operation(
        &self,
        context: &CommandContext,
        operation: OperationType,
        task: &TaskRecord,
        property_change: PropertyChange,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let audit_context = contexts::task_context(
            EntityType::IdentityLink,
            operation,
            task,
            vec![property_change],
        );
        self.log_user_operations(context, audit_context).await
    }

    /// Logs an attachment change on a task.
    pub async fn log_attachment_operation(
        &self,
        context: &CommandContext,
        operation: OperationType,
        task: &TaskRecord,
        property_change: PropertyChange,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let audit_context = contexts::task_context(
            EntityType::Attachment,
            operation,
            task,
            vec![property_change],
        );
        self.log_user_operations(context, audit_context).await
    }

    /// Logs a process instance operation.
    ///
    /// The identifiers are selection constraints of the operation. A given
    /// process instance id wins: its owning definition replaces the caller's
    /// process definition id and key.
    pub async fn log_process_instance_operation(
        &self,
        context: &CommandContext,
        operation_id: Option<String>,
        operation: OperationType,
        process_instance_id: Option<&str>,
        process_definition_id: Option<&str>,
        process_definition_key: Option<&str>,
        property_change: PropertyChange,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let process_instance_id = NonEmptyString::from_optional(process_instance_id);
        let mut process_definition_id = process_definition_id.map(ToOwned::to_owned);
        let mut process_definition_key = process_definition_key.map(ToOwned::to_owned);

        if let Some(process_instance_id) = &process_instance_id {
            let process_instance = self
                .process_instance_repository
                .find_process_instance(process_instance_id.as_str())
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "process instance '{process_instance_id}' does not exist"
                    ))
                })?;
            process_definition_id = Some(process_instance.process_definition_id);
            process_definition_key = Some(process_instance.process_definition_key);
        }

        let audit_context = contexts::process_instance_context(
            operation_id,
            operation,
            process_instance_id.map(String::from),
            process_definition_id,
            process_definition_key,
            vec![property_change],
        );
        self.log_user_operations(context, audit_context).await
    }

    /// Logs a process definition operation.
    pub async fn log_process_definition_operation(
        &self,
        context: &CommandContext,
        operation: OperationType,
        process_definition_id: Option<&str>,
        process_definition_key: Option<&str>,
        property_change: PropertyChange,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let audit_context = contexts::process_definition_context(
            operation,
            process_definition_id.map(ToOwned::to_owned),
            process_definition_key.map(ToOwned::to_owned),
            vec![property_change],
        );
        self.log_user_operations(context, audit_context).await
    }

    /// Logs a job operation.
    ///
    /// A job id is taken as ground truth for every owning identifier; otherwise a
    /// job definition id supplies the process definition; otherwise the caller's
    /// identifiers are used as-is.
    pub async fn log_job_operation(
        &self,
        context: &CommandContext,
        operation_id: Option<String>,
        operation: OperationType,
        selection: &JobSelection,
        property_change: PropertyChange,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let selection = self.resolve_job_ownership(selection.normalized()).await?;
        let audit_context =
            contexts::job_context(operation_id, operation, selection, vec![property_change]);
        self.log_user_operations(context, audit_context).await
    }

    /// Logs a job definition operation.
    ///
    /// A job definition id overwrites the caller's process definition id and key
    /// with the definition's owner.
    pub async fn log_job_definition_operation(
        &self,
        context: &CommandContext,
        operation: OperationType,
        selection: &JobDefinitionSelection,
        property_change: PropertyChange,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let mut selection = selection.normalized();
        if let Some(job_definition_id) = selection.job_definition_id.as_deref() {
            let job_definition = self.require_job_definition(job_definition_id).await?;
            selection.process_definition_id =
                Some(job_definition.process_definition_id().to_owned());
            selection.process_definition_key =
                Some(job_definition.process_definition_key().to_owned());
        }

        let audit_context =
            contexts::job_definition_context(operation, selection, vec![property_change]);
        self.log_user_operations(context, audit_context).await
    }

    /// Logs a job retry operation. Identifiers are recorded as given.
    pub async fn log_job_retry_operation(
        &self,
        context: &CommandContext,
        operation: OperationType,
        selection: &JobSelection,
        property_changes: Vec<PropertyChange>,
    ) -> AppResult<Option<String>> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(None);
        }

        let audit_context =
            contexts::job_retry_context(operation, selection.normalized(), property_changes);
        self.log_user_operations(context, audit_context).await
    }

    /// Lists recorded operation log entries.
    pub async fn list_entries(&self, query: OperationLogQuery) -> AppResult<Vec<OperationLogEntry>> {
        if query.limit == 0 {
            return Err(AppError::InvalidRequest(
                "limit must be greater than zero".to_owned(),
            ));
        }

        self.repository.list_entries(query).await
    }

    /// Counts recorded entries matching the query filters.
    pub async fn count_entries(&self, query: OperationLogQuery) -> AppResult<usize> {
        self.repository.count_entries(query).await
    }

    /// Deletes one operation log entry. Does nothing below the detailed auditing level.
    pub async fn delete_entry(&self, context: &CommandContext, entry_id: &str) -> AppResult<()> {
        if !context.is_detailed_auditing_enabled() {
            return Ok(());
        }

        if !self.repository.delete_entry(entry_id).await? {
            return Err(AppError::NotFound(format!(
                "operation log entry '{entry_id}' does not exist"
            )));
        }

        Ok(())
    }

    /// Deletes every entry recorded for an owner and returns how many were removed.
    ///
    /// Runs at every auditing level so that history of a removed owner never lingers.
    pub async fn delete_entries_by(&self, scope: OperationLogDeleteScope) -> AppResult<usize> {
        self.repository.delete_entries_by(scope).await
    }

    async fn resolve_job_ownership(&self, mut selection: JobSelection) -> AppResult<JobSelection> {
        if let Some(job_id) = selection.job_id.as_deref() {
            let job = self
                .job_repository
                .find_job(job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' does not exist")))?;

            selection.job_definition_id = job.job_definition_id;
            selection.process_instance_id = job.process_instance_id;
            selection.process_definition_id = job.process_definition_id;
            selection.process_definition_key = job.process_definition_key;
            return Ok(selection);
        }

        if let Some(job_definition_id) = selection.job_definition_id.as_deref() {
            let job_definition = self.require_job_definition(job_definition_id).await?;
            selection.process_definition_id =
                Some(job_definition.process_definition_id().to_owned());
            selection.process_definition_key =
                Some(job_definition.process_definition_key().to_owned());
        }

        Ok(selection)
    }

    async fn require_job_definition(&self, job_definition_id: &str) -> AppResult<JobDefinition> {
        self.job_definition_repository
            .find_job_definition(job_definition_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "job definition '{job_definition_id}' does not exist"
                ))
            })
    }
}
