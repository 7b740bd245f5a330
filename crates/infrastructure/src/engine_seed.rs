use std::fs;
use std::path::Path;

use serde::Deserialize;
use stasis_application::{JobDefinitionRepository, JobRepository};
use stasis_core::{AppError, AppResult};
use stasis_domain::{Job, JobDefinition, JobDefinitionInput, ProcessInstanceRecord};
use tracing::info;

use crate::InMemoryProcessInstanceRepository;

/// Initial engine state loaded from a JSON document.
///
/// ```json
/// {
///   "job_definitions": [{ "id": "jd1", "process_definition_id": "order:1",
///                         "process_definition_key": "order", "job_type": "async-continuation" }],
///   "jobs": [],
///   "process_instances": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineSeed {
    /// Job definitions to register.
    #[serde(default)]
    pub job_definitions: Vec<JobDefinitionInput>,
    /// Jobs and timers to register.
    #[serde(default)]
    pub jobs: Vec<Job>,
    /// Process instances used for ownership lookups.
    #[serde(default)]
    pub process_instances: Vec<ProcessInstanceRecord>,
}

/// Number of records written by [`EngineSeed::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSeedSummary {
    /// Job definitions written.
    pub job_definitions: usize,
    /// Jobs written.
    pub jobs: usize,
    /// Process instances written.
    pub process_instances: usize,
}

impl EngineSeed {
    /// Parses a seed document.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|error| AppError::InvalidRequest(format!("invalid engine seed: {error}")))
    }

    /// Reads and parses a seed file.
    pub fn load_from_path(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|error| {
            AppError::Storage(format!(
                "failed to read engine seed '{}': {error}",
                path.display()
            ))
        })?;

        Self::from_json(&contents)
    }

    /// Writes every seeded record, validating job definitions and jobs first.
    pub async fn apply(
        self,
        job_definition_repository: &dyn JobDefinitionRepository,
        job_repository: &dyn JobRepository,
        process_instance_repository: &InMemoryProcessInstanceRepository,
    ) -> AppResult<EngineSeedSummary> {
        let job_definitions = self
            .job_definitions
            .into_iter()
            .map(JobDefinition::new)
            .collect::<AppResult<Vec<_>>>()?;
        for job in &self.jobs {
            job.validate()?;
        }

        let summary = EngineSeedSummary {
            job_definitions: job_definitions.len(),
            jobs: self.jobs.len(),
            process_instances: self.process_instances.len(),
        };

        for job_definition in job_definitions {
            job_definition_repository
                .save_job_definition(job_definition)
                .await?;
        }
        for job in self.jobs {
            job_repository.save_job(job).await?;
        }
        for process_instance in self.process_instances {
            process_instance_repository
                .save_process_instance(process_instance)
                .await;
        }

        info!(
            job_definitions = summary.job_definitions,
            jobs = summary.jobs,
            process_instances = summary.process_instances,
            "engine seed applied"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use stasis_application::{JobDefinitionRepository, JobRepository, ProcessInstanceRepository};
    use stasis_core::AppError;
    use stasis_domain::{DEFAULT_JOB_RETRIES, SuspensionState};

    use super::EngineSeed;
    use crate::{
        InMemoryJobDefinitionRepository, InMemoryJobRepository, InMemoryProcessInstanceRepository,
    };

    const SEED: &str = r#"{
        "job_definitions": [
            {
                "id": "jd1",
                "process_definition_id": "orderProcess:1",
                "process_definition_key": "orderProcess",
                "job_type": "async-continuation"
            },
            {
                "id": "jd2",
                "process_definition_id": "orderProcess:1",
                "process_definition_key": "orderProcess",
                "job_type": "timer-intermediate-transition",
                "suspension_state": "suspended"
            }
        ],
        "jobs": [
            {
                "id": "start-1",
                "process_definition_id": "orderProcess:1",
                "process_definition_key": "orderProcess",
                "handler_type": "timer-start-event",
                "due_date": "2026-05-01T08:00:00Z"
            }
        ],
        "process_instances": [
            {
                "id": "pi-1",
                "process_definition_id": "orderProcess:1",
                "process_definition_key": "orderProcess"
            }
        ]
    }"#;

    #[tokio::test]
    async fn seed_populates_every_store() {
        let job_definitions = InMemoryJobDefinitionRepository::new();
        let jobs = InMemoryJobRepository::new();
        let process_instances = InMemoryProcessInstanceRepository::new();

        let seed = EngineSeed::from_json(SEED).unwrap_or_else(|_| unreachable!());
        let summary = seed
            .apply(&job_definitions, &jobs, &process_instances)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(summary.job_definitions, 2);
        assert_eq!(summary.jobs, 1);
        assert_eq!(summary.process_instances, 1);

        let jd2 = job_definitions
            .find_job_definition("jd2")
            .await
            .unwrap_or_default();
        assert_eq!(
            jd2.map(|definition| definition.suspension_state()),
            Some(SuspensionState::Suspended)
        );

        let start_timer = jobs.find_job("start-1").await.unwrap_or_default();
        assert!(start_timer.as_ref().is_some_and(|job| job.is_start_timer()));
        assert_eq!(
            start_timer.map(|job| job.retries),
            Some(DEFAULT_JOB_RETRIES)
        );

        let instance = process_instances
            .find_process_instance("pi-1")
            .await
            .unwrap_or_default();
        assert!(instance.is_some());
    }

    #[tokio::test]
    async fn invalid_job_definition_aborts_before_writes() {
        let job_definitions = InMemoryJobDefinitionRepository::new();
        let jobs = InMemoryJobRepository::new();
        let process_instances = InMemoryProcessInstanceRepository::new();
        let seed = EngineSeed::from_json(
            r#"{"job_definitions": [{"id": "", "process_definition_id": "p:1",
                "process_definition_key": "p", "job_type": "async-continuation"}]}"#,
        )
        .unwrap_or_else(|_| unreachable!());

        let result = seed.apply(&job_definitions, &jobs, &process_instances).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(
            job_definitions
                .list_job_definitions()
                .await
                .unwrap_or_default()
                .is_empty()
        );
    }

    #[test]
    fn malformed_json_is_invalid_request() {
        assert!(matches!(
            EngineSeed::from_json("{ not json"),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
