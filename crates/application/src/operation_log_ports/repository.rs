use async_trait::async_trait;
use stasis_core::AppResult;
use stasis_domain::{AuditSelection, EntityType, OperationLogEntry};

/// Query parameters for operation log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLogQuery {
    /// Optional correlation id filter.
    pub operation_id: Option<String>,
    /// Optional entity type filter.
    pub entity_type: Option<EntityType>,
    /// Optional job definition filter.
    pub job_definition_id: Option<String>,
    /// Optional process definition key filter.
    pub process_definition_key: Option<String>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl Default for OperationLogQuery {
    fn default() -> Self {
        Self {
            operation_id: None,
            entity_type: None,
            job_definition_id: None,
            process_definition_key: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl OperationLogQuery {
    /// Returns whether an entry satisfies every present filter. Paging is ignored.
    #[must_use]
    pub fn matches(&self, entry: &OperationLogEntry) -> bool {
        self.operation_id
            .as_deref()
            .is_none_or(|operation_id| entry.operation_id == operation_id)
            && self
                .entity_type
                .is_none_or(|entity_type| entry.entity_type == entity_type)
            && self
                .job_definition_id
                .as_deref()
                .is_none_or(|id| entry.selection.job_definition_id.as_deref() == Some(id))
            && self
                .process_definition_key
                .as_deref()
                .is_none_or(|key| entry.selection.process_definition_key.as_deref() == Some(key))
    }
}

/// Owner whose operation log entries are removed together, usually when the
/// owner itself is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationLogDeleteScope {
    /// Entries of one process instance.
    ProcessInstanceId(String),
    /// Entries of one case instance.
    CaseInstanceId(String),
    /// Entries of one case definition.
    CaseDefinitionId(String),
    /// Entries of one task.
    TaskId(String),
    /// Entries of one process definition.
    ProcessDefinitionId(String),
    /// Entries of every version of a process definition key.
    ProcessDefinitionKey(String),
}

impl OperationLogDeleteScope {
    /// Returns whether a recorded selection belongs to this scope.
    #[must_use]
    pub fn matches(&self, selection: &AuditSelection) -> bool {
        let (recorded, expected) = match self {
            Self::ProcessInstanceId(id) => (&selection.process_instance_id, id),
            Self::CaseInstanceId(id) => (&selection.case_instance_id, id),
            Self::CaseDefinitionId(id) => (&selection.case_definition_id, id),
            Self::TaskId(id) => (&selection.task_id, id),
            Self::ProcessDefinitionId(id) => (&selection.process_definition_id, id),
            Self::ProcessDefinitionKey(key) => (&selection.process_definition_key, key),
        };

        recorded.as_deref() == Some(expected.as_str())
    }
}

/// Repository port for reading and pruning the operation log.
#[async_trait]
pub trait OperationLogRepository: Send + Sync {
    /// Lists entries in recording order.
    async fn list_entries(&self, query: OperationLogQuery) -> AppResult<Vec<OperationLogEntry>>;

    /// Counts entries matching the query filters, ignoring paging.
    async fn count_entries(&self, query: OperationLogQuery) -> AppResult<usize>;

    /// Deletes one entry, returning whether it existed.
    async fn delete_entry(&self, entry_id: &str) -> AppResult<bool>;

    /// Deletes every entry in a scope, returning how many were removed.
    async fn delete_entries_by(&self, scope: OperationLogDeleteScope) -> AppResult<usize>;
}
