use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stasis_core::{AppError, AppResult, NonEmptyString};

use crate::SuspensionState;

/// Handler type of jobs that start a new process instance when they fire.
pub const START_TIMER_HANDLER_TYPE: &str = "timer-start-event";

/// Default number of execution attempts granted to a freshly scheduled timer.
pub const DEFAULT_JOB_RETRIES: u32 = 3;

/// Template from which runnable jobs of one process definition are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    id: NonEmptyString,
    process_definition_id: NonEmptyString,
    process_definition_key: NonEmptyString,
    activity_id: Option<String>,
    job_type: NonEmptyString,
    suspension_state: SuspensionState,
}

/// Input payload used to construct a validated job definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinitionInput {
    /// Stable job definition identifier.
    pub id: String,
    /// Owning process definition identifier.
    pub process_definition_id: String,
    /// Owning process definition key shared by all versions.
    pub process_definition_key: String,
    /// Activity that spawns jobs from this definition.
    #[serde(default)]
    pub activity_id: Option<String>,
    /// Kind of job produced, for example `async-continuation` or `timer-intermediate-transition`.
    pub job_type: String,
    /// Initial suspension state.
    #[serde(default = "default_suspension_state")]
    pub suspension_state: SuspensionState,
}

fn default_suspension_state() -> SuspensionState {
    SuspensionState::Active
}

fn default_job_retries() -> u32 {
    DEFAULT_JOB_RETRIES
}

impl JobDefinition {
    /// Creates a validated job definition.
    pub fn new(input: JobDefinitionInput) -> AppResult<Self> {
        let JobDefinitionInput {
            id,
            process_definition_id,
            process_definition_key,
            activity_id,
            job_type,
            suspension_state,
        } = input;

        Ok(Self {
            id: NonEmptyString::new(id)?,
            process_definition_id: NonEmptyString::new(process_definition_id)?,
            process_definition_key: NonEmptyString::new(process_definition_key)?,
            activity_id: trimmed_or_none(activity_id),
            job_type: NonEmptyString::new(job_type)?,
            suspension_state,
        })
    }

    /// Returns the job definition identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the owning process definition identifier.
    #[must_use]
    pub fn process_definition_id(&self) -> &str {
        self.process_definition_id.as_str()
    }

    /// Returns the owning process definition key.
    #[must_use]
    pub fn process_definition_key(&self) -> &str {
        self.process_definition_key.as_str()
    }

    /// Returns the spawning activity, if recorded.
    #[must_use]
    pub fn activity_id(&self) -> Option<&str> {
        self.activity_id.as_deref()
    }

    /// Returns the job type label.
    #[must_use]
    pub fn job_type(&self) -> &str {
        self.job_type.as_str()
    }

    /// Returns the current suspension state.
    #[must_use]
    pub fn suspension_state(&self) -> SuspensionState {
        self.suspension_state
    }

    /// Returns a copy carrying the given suspension state.
    #[must_use]
    pub fn with_suspension_state(mut self, suspension_state: SuspensionState) -> Self {
        self.suspension_state = suspension_state;
        self
    }
}

/// Runnable job, including timers registered for deferred actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Stable job identifier.
    pub id: String,
    /// Definition the job was created from, when definition-scoped.
    pub job_definition_id: Option<String>,
    /// Owning process instance.
    pub process_instance_id: Option<String>,
    /// Owning process definition.
    pub process_definition_id: Option<String>,
    /// Owning process definition key.
    pub process_definition_key: Option<String>,
    /// Handler that executes the job.
    pub handler_type: String,
    /// Serialized handler configuration.
    pub handler_configuration: Option<String>,
    /// Instant at which a timer becomes due.
    pub due_date: Option<DateTime<Utc>>,
    /// Remaining execution attempts.
    #[serde(default = "default_job_retries")]
    pub retries: u32,
    /// Current suspension state.
    #[serde(default = "default_suspension_state")]
    pub suspension_state: SuspensionState,
    /// Message of the last failed execution.
    pub exception_message: Option<String>,
}

impl Job {
    /// Returns true for jobs that start process instances when they fire.
    #[must_use]
    pub fn is_start_timer(&self) -> bool {
        self.handler_type == START_TIMER_HANDLER_TYPE
    }

    /// Returns true when the job is an active timer with retries left that is due at `now`.
    #[must_use]
    pub fn is_acquirable_at(&self, now: DateTime<Utc>) -> bool {
        !self.suspension_state.is_suspended()
            && self.retries > 0
            && self.due_date.is_some_and(|due_date| due_date <= now)
    }

    /// Validates identifiers of a job built outside the scheduler.
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "job id must not be empty".to_owned(),
            ));
        }

        if self.handler_type.trim().is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "job '{}' handler_type must not be empty",
                self.id
            )));
        }

        Ok(())
    }
}

fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
