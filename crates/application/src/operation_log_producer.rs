use chrono::Utc;
use stasis_core::AppResult;
use stasis_domain::{AuditLogContext, OperationLogEntry};
use uuid::Uuid;

use crate::CommandContext;
use crate::operation_log_ports::OperationLogEventProducer;

/// Produces one operation log row per property change, all sharing one operation id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOperationLogEventProducer;

impl DefaultOperationLogEventProducer {
    /// Creates the producer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OperationLogEventProducer for DefaultOperationLogEventProducer {
    fn produce_events(
        &self,
        context: &CommandContext,
        audit_context: &AuditLogContext,
    ) -> AppResult<Vec<OperationLogEntry>> {
        let operation_id = audit_context
            .operation_id()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let user_id = context.authenticated_user_id().map(ToOwned::to_owned);
        let timestamp = Utc::now();

        Ok(audit_context
            .property_changes()
            .iter()
            .map(|change| OperationLogEntry {
                entry_id: Uuid::new_v4().to_string(),
                operation_id: operation_id.clone(),
                operation_type: audit_context.operation_type(),
                entity_type: audit_context.entity_type(),
                user_id: user_id.clone(),
                timestamp,
                selection: audit_context.selection().clone(),
                property: change.property_name().map(ToOwned::to_owned),
                org_value: change.org_value().map(ToOwned::to_owned),
                new_value: change.new_value().map(ToOwned::to_owned),
            })
            .collect())
    }
}
