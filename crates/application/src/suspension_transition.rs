use stasis_domain::{OperationType, SuspensionState, TimerHandlerType};

/// Job definition state change variants sharing one orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDefinitionStateTransition {
    /// Moves job definitions to [`SuspensionState::Active`].
    Activate,
    /// Moves job definitions to [`SuspensionState::Suspended`].
    Suspend,
}

impl JobDefinitionStateTransition {
    /// Returns the state applied by this transition.
    #[must_use]
    pub fn target_state(&self) -> SuspensionState {
        match self {
            Self::Activate => SuspensionState::Active,
            Self::Suspend => SuspensionState::Suspended,
        }
    }

    /// Returns the handler type of the timer used for deferred execution.
    #[must_use]
    pub fn delayed_handler_type(&self) -> TimerHandlerType {
        match self {
            Self::Activate => TimerHandlerType::ActivateJobDefinition,
            Self::Suspend => TimerHandlerType::SuspendJobDefinition,
        }
    }

    /// Returns the operation recorded in the operation log.
    #[must_use]
    pub fn log_operation(&self) -> OperationType {
        match self {
            Self::Activate => OperationType::ActivateJobDefinition,
            Self::Suspend => OperationType::SuspendJobDefinition,
        }
    }

    /// Returns the job-level transition used when jobs are included.
    #[must_use]
    pub fn job_transition(&self) -> JobStateTransition {
        match self {
            Self::Activate => JobStateTransition::Activate,
            Self::Suspend => JobStateTransition::Suspend,
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Activate => "activate job definition",
            Self::Suspend => "suspend job definition",
        }
    }

    /// Returns the transition fired by a timer of the given handler type.
    #[must_use]
    pub fn for_handler_type(handler_type: TimerHandlerType) -> Self {
        match handler_type {
            TimerHandlerType::ActivateJobDefinition => Self::Activate,
            TimerHandlerType::SuspendJobDefinition => Self::Suspend,
        }
    }
}

/// Job state change variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStateTransition {
    /// Moves jobs to [`SuspensionState::Active`].
    Activate,
    /// Moves jobs to [`SuspensionState::Suspended`].
    Suspend,
}

impl JobStateTransition {
    /// Returns the state applied by this transition.
    #[must_use]
    pub fn target_state(&self) -> SuspensionState {
        match self {
            Self::Activate => SuspensionState::Active,
            Self::Suspend => SuspensionState::Suspended,
        }
    }

    /// Returns the operation recorded in the operation log.
    #[must_use]
    pub fn log_operation(&self) -> OperationType {
        match self {
            Self::Activate => OperationType::ActivateJob,
            Self::Suspend => OperationType::SuspendJob,
        }
    }
}
