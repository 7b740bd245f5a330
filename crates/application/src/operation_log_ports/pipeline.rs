use async_trait::async_trait;
use stasis_core::AppResult;
use stasis_domain::{AuditLogContext, OperationLogEntry};

use crate::CommandContext;

/// Turns one audit context into persistable operation log rows.
pub trait OperationLogEventProducer: Send + Sync {
    /// Produces the rows for one logical operation.
    fn produce_events(
        &self,
        context: &CommandContext,
        audit_context: &AuditLogContext,
    ) -> AppResult<Vec<OperationLogEntry>>;
}

/// Persists produced operation log rows.
#[async_trait]
pub trait OperationLogEventHandler: Send + Sync {
    /// Persists rows in order.
    async fn handle_events(&self, events: Vec<OperationLogEntry>) -> AppResult<()>;
}
