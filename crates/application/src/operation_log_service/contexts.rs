//! Pure audit context constructors, one per operation family.

use stasis_domain::{
    AuditLogContext, AuditSelection, EntityType, JobDefinitionSelection, JobSelection,
    OperationType, PropertyChange, TaskRecord,
};

/// Create operations always yield at least one row, even with nothing to diff.
fn changes_or_empty_marker(
    operation: OperationType,
    property_changes: Vec<PropertyChange>,
) -> Vec<PropertyChange> {
    if property_changes.is_empty() && operation.is_create() {
        return vec![PropertyChange::EMPTY];
    }

    property_changes
}

/// Context for task, identity link and attachment operations.
pub(crate) fn task_context(
    entity_type: EntityType,
    operation: OperationType,
    task: &TaskRecord,
    property_changes: Vec<PropertyChange>,
) -> AuditLogContext {
    AuditLogContext::new(
        entity_type,
        operation,
        None,
        AuditSelection {
            task_id: Some(task.id.clone()),
            execution_id: task.execution_id.clone(),
            process_instance_id: task.process_instance_id.clone(),
            process_definition_id: task.process_definition_id.clone(),
            case_definition_id: task.case_definition_id.clone(),
            case_instance_id: task.case_instance_id.clone(),
            case_execution_id: task.case_execution_id.clone(),
            ..AuditSelection::default()
        },
        changes_or_empty_marker(operation, property_changes),
    )
}

pub(crate) fn process_definition_context(
    operation: OperationType,
    process_definition_id: Option<String>,
    process_definition_key: Option<String>,
    property_changes: Vec<PropertyChange>,
) -> AuditLogContext {
    AuditLogContext::new(
        EntityType::ProcessDefinition,
        operation,
        None,
        AuditSelection {
            process_definition_id,
            process_definition_key,
            ..AuditSelection::default()
        },
        property_changes,
    )
}

pub(crate) fn process_instance_context(
    operation_id: Option<String>,
    operation: OperationType,
    process_instance_id: Option<String>,
    process_definition_id: Option<String>,
    process_definition_key: Option<String>,
    property_changes: Vec<PropertyChange>,
) -> AuditLogContext {
    AuditLogContext::new(
        EntityType::ProcessInstance,
        operation,
        operation_id,
        AuditSelection {
            process_instance_id,
            process_definition_id,
            process_definition_key,
            ..AuditSelection::default()
        },
        property_changes,
    )
}

pub(crate) fn job_context(
    operation_id: Option<String>,
    operation: OperationType,
    selection: JobSelection,
    property_changes: Vec<PropertyChange>,
) -> AuditLogContext {
    AuditLogContext::new(
        EntityType::Job,
        operation,
        operation_id,
        job_audit_selection(selection),
        property_changes,
    )
}

pub(crate) fn job_retry_context(
    operation: OperationType,
    selection: JobSelection,
    property_changes: Vec<PropertyChange>,
) -> AuditLogContext {
    AuditLogContext::new(
        EntityType::Job,
        operation,
        None,
        job_audit_selection(selection),
        changes_or_empty_marker(operation, property_changes),
    )
}

pub(crate) fn job_definition_context(
    operation: OperationType,
    selection: JobDefinitionSelection,
    property_changes: Vec<PropertyChange>,
) -> AuditLogContext {
    AuditLogContext::new(
        EntityType::JobDefinition,
        operation,
        None,
        AuditSelection {
            job_definition_id: selection.job_definition_id,
            process_definition_id: selection.process_definition_id,
            process_definition_key: selection.process_definition_key,
            ..AuditSelection::default()
        },
        property_changes,
    )
}

fn job_audit_selection(selection: JobSelection) -> AuditSelection {
    AuditSelection {
        job_id: selection.job_id,
        job_definition_id: selection.job_definition_id,
        process_instance_id: selection.process_instance_id,
        process_definition_id: selection.process_definition_id,
        process_definition_key: selection.process_definition_key,
        ..AuditSelection::default()
    }
}
