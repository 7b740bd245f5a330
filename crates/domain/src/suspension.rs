use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stasis_core::AppError;

/// Whether a job definition or job may produce and execute work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionState {
    /// Work is produced and executed.
    Active,
    /// Work is neither produced nor executed.
    Suspended,
}

impl SuspensionState {
    /// Returns the stable symbolic name used for storage and audit payloads.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Returns the stable numeric storage code.
    #[must_use]
    pub fn state_code(&self) -> i32 {
        match self {
            Self::Active => 1,
            Self::Suspended => 2,
        }
    }

    /// Parses a numeric storage code.
    pub fn from_state_code(code: i32) -> Result<Self, AppError> {
        match code {
            1 => Ok(Self::Active),
            2 => Ok(Self::Suspended),
            _ => Err(AppError::InvalidRequest(format!(
                "unknown suspension state code '{code}'"
            ))),
        }
    }

    /// Returns true for [`SuspensionState::Suspended`].
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended)
    }
}

impl Display for SuspensionState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for SuspensionState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(AppError::InvalidRequest(format!(
                "unknown suspension state '{value}'"
            ))),
        }
    }
}
