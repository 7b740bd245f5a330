use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stasis_core::{AppError, AppResult};

use crate::{JobDefinitionSelector, SuspensionState};

/// Timer handler kinds understood by the deferred suspension machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerHandlerType {
    /// Suspends job definitions when the timer fires.
    SuspendJobDefinition,
    /// Activates job definitions when the timer fires.
    ActivateJobDefinition,
}

impl TimerHandlerType {
    /// Returns the stable handler type stored on the timer job.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuspendJobDefinition => "suspend-job-definition",
            Self::ActivateJobDefinition => "activate-job-definition",
        }
    }

    /// Returns the state applied when a timer of this type fires.
    #[must_use]
    pub fn target_state(&self) -> SuspensionState {
        match self {
            Self::SuspendJobDefinition => SuspensionState::Suspended,
            Self::ActivateJobDefinition => SuspensionState::Active,
        }
    }
}

/// Deferred job definition state change handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredActionDescriptor {
    /// Instant at which the change takes effect.
    pub due_date: DateTime<Utc>,
    /// Handler that applies the change.
    pub handler_type: TimerHandlerType,
    /// Serialized [`JobDefinitionSuspensionConfiguration`].
    pub configuration: String,
}

/// Timer configuration that lets the handler replay a selector decision at due time.
///
/// Encoded as `{"by": "<selector>", "<selector>": "<value>", "includeJobs": <bool>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinitionSuspensionConfiguration {
    /// Effective selector.
    #[serde(flatten)]
    pub selector: JobDefinitionSelector,
    /// Whether jobs of the selected definitions change state too.
    #[serde(rename = "includeJobs")]
    pub include_jobs: bool,
}

impl JobDefinitionSuspensionConfiguration {
    /// Encodes a configuration selecting one job definition.
    pub fn by_job_definition_id(job_definition_id: &str, include_jobs: bool) -> AppResult<String> {
        Self {
            selector: JobDefinitionSelector::JobDefinitionId {
                job_definition_id: job_definition_id.to_owned(),
            },
            include_jobs,
        }
        .encode()
    }

    /// Encodes a configuration selecting the job definitions of one process definition.
    pub fn by_process_definition_id(
        process_definition_id: &str,
        include_jobs: bool,
    ) -> AppResult<String> {
        Self {
            selector: JobDefinitionSelector::ProcessDefinitionId {
                process_definition_id: process_definition_id.to_owned(),
            },
            include_jobs,
        }
        .encode()
    }

    /// Encodes a configuration selecting the job definitions of a process definition key.
    pub fn by_process_definition_key(
        process_definition_key: &str,
        include_jobs: bool,
    ) -> AppResult<String> {
        Self {
            selector: JobDefinitionSelector::ProcessDefinitionKey {
                process_definition_key: process_definition_key.to_owned(),
            },
            include_jobs,
        }
        .encode()
    }

    /// Encodes a configuration for an already resolved selector.
    pub fn for_selector(selector: &JobDefinitionSelector, include_jobs: bool) -> AppResult<String> {
        match selector {
            JobDefinitionSelector::JobDefinitionId { job_definition_id } => {
                Self::by_job_definition_id(job_definition_id, include_jobs)
            }
            JobDefinitionSelector::ProcessDefinitionId {
                process_definition_id,
            } => Self::by_process_definition_id(process_definition_id, include_jobs),
            JobDefinitionSelector::ProcessDefinitionKey {
                process_definition_key,
            } => Self::by_process_definition_key(process_definition_key, include_jobs),
        }
    }

    /// Serializes the configuration.
    pub fn encode(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|error| {
            AppError::Internal(format!(
                "failed to encode job definition timer configuration: {error}"
            ))
        })
    }

    /// Parses a stored configuration.
    pub fn decode(configuration: &str) -> AppResult<Self> {
        serde_json::from_str(configuration).map_err(|error| {
            AppError::InvalidRequest(format!(
                "invalid job definition timer configuration '{configuration}': {error}"
            ))
        })
    }
}
