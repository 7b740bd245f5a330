use std::collections::HashMap;

use async_trait::async_trait;
use stasis_application::ProcessInstanceRepository;
use stasis_core::AppResult;
use stasis_domain::ProcessInstanceRecord;
use tokio::sync::RwLock;

/// In-memory process instance ownership index.
#[derive(Debug, Default)]
pub struct InMemoryProcessInstanceRepository {
    process_instances: RwLock<HashMap<String, ProcessInstanceRecord>>,
}

impl InMemoryProcessInstanceRepository {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one process instance, replacing any previous record.
    pub async fn save_process_instance(&self, process_instance: ProcessInstanceRecord) {
        self.process_instances
            .write()
            .await
            .insert(process_instance.id.clone(), process_instance);
    }
}

#[async_trait]
impl ProcessInstanceRepository for InMemoryProcessInstanceRepository {
    async fn find_process_instance(
        &self,
        process_instance_id: &str,
    ) -> AppResult<Option<ProcessInstanceRecord>> {
        Ok(self
            .process_instances
            .read()
            .await
            .get(process_instance_id)
            .cloned())
    }
}
