use serde::{Deserialize, Serialize};

/// Snapshot of the task fields that audit entries are keyed by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task identifier.
    pub id: String,
    /// Execution the task belongs to.
    pub execution_id: Option<String>,
    /// Owning process instance.
    pub process_instance_id: Option<String>,
    /// Owning process definition.
    pub process_definition_id: Option<String>,
    /// Owning case definition.
    pub case_definition_id: Option<String>,
    /// Owning case instance.
    pub case_instance_id: Option<String>,
    /// Owning case execution.
    pub case_execution_id: Option<String>,
}

/// Running process instance and the definition it was started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInstanceRecord {
    /// Process instance identifier.
    pub id: String,
    /// Definition the instance was started from.
    pub process_definition_id: String,
    /// Key of that definition.
    pub process_definition_key: String,
}
