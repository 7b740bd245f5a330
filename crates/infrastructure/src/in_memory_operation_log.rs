use async_trait::async_trait;
use stasis_application::{
    OperationLogDeleteScope, OperationLogEventHandler, OperationLogQuery, OperationLogRepository,
};
use stasis_core::AppResult;
use stasis_domain::OperationLogEntry;
use tokio::sync::RwLock;
use tracing::{debug, info};

const MAX_LIST_LIMIT: usize = 500;

/// In-memory operation log acting as both the recording sink and the read model.
#[derive(Debug, Default)]
pub struct InMemoryOperationLog {
    entries: RwLock<Vec<OperationLogEntry>>,
}

impl InMemoryOperationLog {
    /// Creates an empty operation log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationLogEventHandler for InMemoryOperationLog {
    async fn handle_events(&self, events: Vec<OperationLogEntry>) -> AppResult<()> {
        for event in &events {
            info!(
                operation_id = %event.operation_id,
                operation_type = event.operation_type.as_str(),
                entity_type = event.entity_type.as_str(),
                user_id = event.user_id.as_deref().unwrap_or("system"),
                property = event.property.as_deref().unwrap_or("-"),
                new_value = event.new_value.as_deref().unwrap_or("-"),
                "operation log entry recorded"
            );
        }

        self.entries.write().await.extend(events);
        Ok(())
    }
}

#[async_trait]
impl OperationLogRepository for InMemoryOperationLog {
    async fn list_entries(&self, query: OperationLogQuery) -> AppResult<Vec<OperationLogEntry>> {
        let capped_limit = query.limit.clamp(1, MAX_LIST_LIMIT);

        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .skip(query.offset)
            .take(capped_limit)
            .cloned()
            .collect())
    }

    async fn count_entries(&self, query: OperationLogQuery) -> AppResult<usize> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .count())
    }

    async fn delete_entry(&self, entry_id: &str) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.entry_id != entry_id);
        Ok(entries.len() != before)
    }

    async fn delete_entries_by(&self, scope: OperationLogDeleteScope) -> AppResult<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| !scope.matches(&entry.selection));
        let removed = before - entries.len();

        debug!(scope = ?scope, removed, "operation log entries deleted");
        Ok(removed)
    }
}
