use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stasis_core::AppError;

use crate::{AuditSelection, EntityType, OperationType};

/// Ambient setting that decides how much history is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditingLevel {
    /// Nothing is recorded.
    None,
    /// Activity instances only.
    Activity,
    /// Activity instances and variable updates.
    Audit,
    /// Everything, including operation log entries.
    #[default]
    Full,
}

impl AuditingLevel {
    /// Returns a stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Activity => "activity",
            Self::Audit => "audit",
            Self::Full => "full",
        }
    }

    /// Returns true at the most detailed level, the only one that records operation logs.
    #[must_use]
    pub fn is_detailed(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl FromStr for AuditingLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "activity" => Ok(Self::Activity),
            "audit" => Ok(Self::Audit),
            "full" => Ok(Self::Full),
            _ => Err(AppError::InvalidRequest(format!(
                "unknown auditing level '{value}'"
            ))),
        }
    }
}

/// Persisted operation log row. One row is produced per property change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    /// Stable row identifier.
    pub entry_id: String,
    /// Correlation identifier shared by rows of one logical operation.
    pub operation_id: String,
    /// Operation type.
    pub operation_type: OperationType,
    /// Entity type.
    pub entity_type: EntityType,
    /// Operator that requested the operation; absent for engine-triggered work.
    pub user_id: Option<String>,
    /// Recording timestamp.
    pub timestamp: DateTime<Utc>,
    /// Selection identifiers copied from the context.
    pub selection: AuditSelection,
    /// Changed property name.
    pub property: Option<String>,
    /// Value before the operation.
    pub org_value: Option<String>,
    /// Value after the operation.
    pub new_value: Option<String>,
}
