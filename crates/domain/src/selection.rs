use serde::{Deserialize, Serialize};
use stasis_core::{AppError, AppResult, NonEmptyString};

/// Caller-supplied selectors for a job definition state change.
///
/// More than one selector may be present; the most specific one wins
/// (job definition id, then process definition id, then process definition key)
/// and the others are ignored without consistency checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinitionSelection {
    /// Selects exactly one job definition.
    pub job_definition_id: Option<String>,
    /// Selects every job definition of one process definition.
    pub process_definition_id: Option<String>,
    /// Selects every job definition of all versions sharing a process definition key.
    pub process_definition_key: Option<String>,
}

impl JobDefinitionSelection {
    /// Selects one job definition by id.
    #[must_use]
    pub fn by_job_definition_id(job_definition_id: impl Into<String>) -> Self {
        Self {
            job_definition_id: Some(job_definition_id.into()),
            ..Self::default()
        }
    }

    /// Selects the job definitions of one process definition.
    #[must_use]
    pub fn by_process_definition_id(process_definition_id: impl Into<String>) -> Self {
        Self {
            process_definition_id: Some(process_definition_id.into()),
            ..Self::default()
        }
    }

    /// Selects the job definitions of every version of a process definition key.
    #[must_use]
    pub fn by_process_definition_key(process_definition_key: impl Into<String>) -> Self {
        Self {
            process_definition_key: Some(process_definition_key.into()),
            ..Self::default()
        }
    }

    /// Returns a copy where blank selectors are treated as absent.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            job_definition_id: non_blank(self.job_definition_id.as_deref()),
            process_definition_id: non_blank(self.process_definition_id.as_deref()),
            process_definition_key: non_blank(self.process_definition_key.as_deref()),
        }
    }

    /// Resolves the effective selector by priority.
    pub fn resolve(&self) -> AppResult<JobDefinitionSelector> {
        if let Some(id) = NonEmptyString::from_optional(self.job_definition_id.as_deref()) {
            return Ok(JobDefinitionSelector::JobDefinitionId {
                job_definition_id: id.into(),
            });
        }

        if let Some(id) = NonEmptyString::from_optional(self.process_definition_id.as_deref()) {
            return Ok(JobDefinitionSelector::ProcessDefinitionId {
                process_definition_id: id.into(),
            });
        }

        if let Some(key) = NonEmptyString::from_optional(self.process_definition_key.as_deref()) {
            return Ok(JobDefinitionSelector::ProcessDefinitionKey {
                process_definition_key: key.into(),
            });
        }

        Err(AppError::InvalidRequest(
            "job definition id, process definition id or process definition key is required"
                .to_owned(),
        ))
    }
}

/// Effective job definition selector after priority resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by")]
pub enum JobDefinitionSelector {
    /// One job definition.
    #[serde(rename = "jobDefinitionId")]
    JobDefinitionId {
        /// Selected job definition id.
        #[serde(rename = "jobDefinitionId")]
        job_definition_id: String,
    },
    /// All job definitions of one process definition.
    #[serde(rename = "processDefinitionId")]
    ProcessDefinitionId {
        /// Selected process definition id.
        #[serde(rename = "processDefinitionId")]
        process_definition_id: String,
    },
    /// All job definitions of every process definition version with a key.
    #[serde(rename = "processDefinitionKey")]
    ProcessDefinitionKey {
        /// Selected process definition key.
        #[serde(rename = "processDefinitionKey")]
        process_definition_key: String,
    },
}

impl JobDefinitionSelector {
    /// Converts back into a selection carrying only this selector.
    #[must_use]
    pub fn to_selection(&self) -> JobDefinitionSelection {
        match self {
            Self::JobDefinitionId { job_definition_id } => {
                JobDefinitionSelection::by_job_definition_id(job_definition_id.clone())
            }
            Self::ProcessDefinitionId {
                process_definition_id,
            } => JobDefinitionSelection::by_process_definition_id(process_definition_id.clone()),
            Self::ProcessDefinitionKey {
                process_definition_key,
            } => JobDefinitionSelection::by_process_definition_key(process_definition_key.clone()),
        }
    }
}

/// Caller-supplied selectors for a job state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSelection {
    /// Selects exactly one job.
    pub job_id: Option<String>,
    /// Selects the jobs created from one job definition.
    pub job_definition_id: Option<String>,
    /// Selects the jobs of one process instance.
    pub process_instance_id: Option<String>,
    /// Selects the jobs of one process definition.
    pub process_definition_id: Option<String>,
    /// Selects the jobs of every version of a process definition key.
    pub process_definition_key: Option<String>,
}

impl JobSelection {
    /// Returns a copy where blank selectors are treated as absent.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            job_id: non_blank(self.job_id.as_deref()),
            job_definition_id: non_blank(self.job_definition_id.as_deref()),
            process_instance_id: non_blank(self.process_instance_id.as_deref()),
            process_definition_id: non_blank(self.process_definition_id.as_deref()),
            process_definition_key: non_blank(self.process_definition_key.as_deref()),
        }
    }

    /// Resolves the effective selector by priority
    /// (job, job definition, process instance, process definition id, process definition key).
    pub fn resolve(&self) -> AppResult<JobSelector> {
        let candidates: [(Option<&str>, fn(String) -> JobSelector); 5] = [
            (self.job_id.as_deref(), JobSelector::JobId),
            (self.job_definition_id.as_deref(), JobSelector::JobDefinitionId),
            (self.process_instance_id.as_deref(), JobSelector::ProcessInstanceId),
            (self.process_definition_id.as_deref(), JobSelector::ProcessDefinitionId),
            (self.process_definition_key.as_deref(), JobSelector::ProcessDefinitionKey),
        ];

        candidates
            .into_iter()
            .find_map(|(value, selector)| {
                NonEmptyString::from_optional(value).map(|value| selector(value.into()))
            })
            .ok_or_else(|| {
                AppError::InvalidRequest(
                    "job id, job definition id, process instance id, process definition id or process definition key is required"
                        .to_owned(),
                )
            })
    }
}

impl From<&JobDefinitionSelection> for JobSelection {
    fn from(selection: &JobDefinitionSelection) -> Self {
        Self {
            job_id: None,
            job_definition_id: selection.job_definition_id.clone(),
            process_instance_id: None,
            process_definition_id: selection.process_definition_id.clone(),
            process_definition_key: selection.process_definition_key.clone(),
        }
    }
}

/// Effective job selector after priority resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSelector {
    /// One job.
    JobId(String),
    /// Jobs of one job definition.
    JobDefinitionId(String),
    /// Jobs of one process instance.
    ProcessInstanceId(String),
    /// Jobs of one process definition.
    ProcessDefinitionId(String),
    /// Jobs of every version of a process definition key.
    ProcessDefinitionKey(String),
}

fn non_blank(value: Option<&str>) -> Option<String> {
    NonEmptyString::from_optional(value).map(String::from)
}
