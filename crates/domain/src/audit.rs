use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stasis_core::AppError;

/// Property name recorded for suspension state changes.
pub const SUSPENSION_STATE_PROPERTY: &str = "suspensionState";

/// Property name recorded for job retry changes.
pub const RETRIES_PROPERTY: &str = "retries";

/// Kind of entity an operation log entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EntityType {
    /// User task.
    Task,
    /// User or group link on a task.
    IdentityLink,
    /// Task attachment.
    Attachment,
    /// Process instance.
    ProcessInstance,
    /// Process definition.
    ProcessDefinition,
    /// Job.
    Job,
    /// Job definition.
    JobDefinition,
}

impl EntityType {
    /// Returns a stable storage value for this entity type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::IdentityLink => "IdentityLink",
            Self::Attachment => "Attachment",
            Self::ProcessInstance => "ProcessInstance",
            Self::ProcessDefinition => "ProcessDefinition",
            Self::Job => "Job",
            Self::JobDefinition => "JobDefinition",
        }
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Task" => Ok(Self::Task),
            "IdentityLink" => Ok(Self::IdentityLink),
            "Attachment" => Ok(Self::Attachment),
            "ProcessInstance" => Ok(Self::ProcessInstance),
            "ProcessDefinition" => Ok(Self::ProcessDefinition),
            "Job" => Ok(Self::Job),
            "JobDefinition" => Ok(Self::JobDefinition),
            _ => Err(AppError::InvalidRequest(format!(
                "unknown entity type '{value}'"
            ))),
        }
    }
}

/// Administrative operation recorded in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OperationType {
    /// Entity created.
    Create,
    /// Entity updated.
    Update,
    /// Entity deleted.
    Delete,
    /// Task assigned.
    Assign,
    /// Task claimed.
    Claim,
    /// Task completed.
    Complete,
    /// Task delegated.
    Delegate,
    /// Delegated task resolved.
    Resolve,
    /// Task owner changed.
    SetOwner,
    /// Task priority changed.
    SetPriority,
    /// User link added to a task.
    AddUserLink,
    /// User link removed from a task.
    DeleteUserLink,
    /// Group link added to a task.
    AddGroupLink,
    /// Group link removed from a task.
    DeleteGroupLink,
    /// Attachment added to a task.
    AddAttachment,
    /// Attachment removed from a task.
    DeleteAttachment,
    /// Process instance activated.
    Activate,
    /// Process instance suspended.
    Suspend,
    /// Process definition activated.
    ActivateProcessDefinition,
    /// Process definition suspended.
    SuspendProcessDefinition,
    /// Job definition activated.
    ActivateJobDefinition,
    /// Job definition suspended.
    SuspendJobDefinition,
    /// Job activated.
    ActivateJob,
    /// Job suspended.
    SuspendJob,
    /// Job retries changed.
    SetJobRetries,
}

impl OperationType {
    /// Returns a stable storage value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Assign => "Assign",
            Self::Claim => "Claim",
            Self::Complete => "Complete",
            Self::Delegate => "Delegate",
            Self::Resolve => "Resolve",
            Self::SetOwner => "SetOwner",
            Self::SetPriority => "SetPriority",
            Self::AddUserLink => "AddUserLink",
            Self::DeleteUserLink => "DeleteUserLink",
            Self::AddGroupLink => "AddGroupLink",
            Self::DeleteGroupLink => "DeleteGroupLink",
            Self::AddAttachment => "AddAttachment",
            Self::DeleteAttachment => "DeleteAttachment",
            Self::Activate => "Activate",
            Self::Suspend => "Suspend",
            Self::ActivateProcessDefinition => "ActivateProcessDefinition",
            Self::SuspendProcessDefinition => "SuspendProcessDefinition",
            Self::ActivateJobDefinition => "ActivateJobDefinition",
            Self::SuspendJobDefinition => "SuspendJobDefinition",
            Self::ActivateJob => "ActivateJob",
            Self::SuspendJob => "SuspendJob",
            Self::SetJobRetries => "SetJobRetries",
        }
    }

    /// Returns true for operations that create the entity they refer to.
    #[must_use]
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Old and new value of one attribute touched by an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    property_name: Option<String>,
    org_value: Option<String>,
    new_value: Option<String>,
}

impl PropertyChange {
    /// Marker for operations that happened without an attribute diff.
    pub const EMPTY: Self = Self {
        property_name: None,
        org_value: None,
        new_value: None,
    };

    /// Creates a property change record.
    #[must_use]
    pub fn new(
        property_name: impl Into<String>,
        org_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            property_name: Some(property_name.into()),
            org_value,
            new_value,
        }
    }

    /// Returns the changed property name.
    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    /// Returns the value before the operation.
    #[must_use]
    pub fn org_value(&self) -> Option<&str> {
        self.org_value.as_deref()
    }

    /// Returns the value after the operation.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns true for the [`PropertyChange::EMPTY`] marker.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::EMPTY
    }
}

/// Identifiers that scope one logged operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSelection {
    /// Affected job.
    pub job_id: Option<String>,
    /// Affected job definition.
    pub job_definition_id: Option<String>,
    /// Affected process instance.
    pub process_instance_id: Option<String>,
    /// Affected process definition.
    pub process_definition_id: Option<String>,
    /// Affected process definition key.
    pub process_definition_key: Option<String>,
    /// Affected task.
    pub task_id: Option<String>,
    /// Affected execution.
    pub execution_id: Option<String>,
    /// Affected case definition.
    pub case_definition_id: Option<String>,
    /// Affected case instance.
    pub case_instance_id: Option<String>,
    /// Affected case execution.
    pub case_execution_id: Option<String>,
}

/// One logical administrative operation, ready for recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogContext {
    entity_type: EntityType,
    operation_type: OperationType,
    operation_id: Option<String>,
    selection: AuditSelection,
    property_changes: Vec<PropertyChange>,
}

impl AuditLogContext {
    /// Creates an immutable context.
    #[must_use]
    pub fn new(
        entity_type: EntityType,
        operation_type: OperationType,
        operation_id: Option<String>,
        selection: AuditSelection,
        property_changes: Vec<PropertyChange>,
    ) -> Self {
        Self {
            entity_type,
            operation_type,
            operation_id,
            selection,
            property_changes,
        }
    }

    /// Returns the entity type.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the operation type.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Returns the correlation identifier, when one was attached.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns the selection identifiers.
    #[must_use]
    pub fn selection(&self) -> &AuditSelection {
        &self.selection
    }

    /// Returns property changes in recording order.
    #[must_use]
    pub fn property_changes(&self) -> &[PropertyChange] {
        self.property_changes.as_slice()
    }

    /// Returns a copy with the given correlation identifier attached.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }
}
