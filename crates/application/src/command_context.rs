use stasis_core::UserIdentity;
use stasis_domain::AuditingLevel;

/// Process-wide engine settings. Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    auditing_level: AuditingLevel,
}

impl EngineSettings {
    /// Creates engine settings.
    #[must_use]
    pub fn new(auditing_level: AuditingLevel) -> Self {
        Self { auditing_level }
    }

    /// Returns the configured auditing level.
    #[must_use]
    pub fn auditing_level(&self) -> AuditingLevel {
        self.auditing_level
    }

    /// Derives a command context for an operator request.
    #[must_use]
    pub fn command_context(&self, actor: UserIdentity) -> CommandContext {
        CommandContext {
            actor: Some(actor),
            auditing_level: self.auditing_level,
        }
    }

    /// Derives a command context for engine-triggered work such as fired timers.
    #[must_use]
    pub fn system_context(&self) -> CommandContext {
        CommandContext {
            actor: None,
            auditing_level: self.auditing_level,
        }
    }
}

/// Capabilities threaded through one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    actor: Option<UserIdentity>,
    auditing_level: AuditingLevel,
}

impl CommandContext {
    /// Returns the user id recorded on operation log entries.
    #[must_use]
    pub fn authenticated_user_id(&self) -> Option<&str> {
        self.actor.as_ref().map(UserIdentity::subject)
    }

    /// Returns true when operation log entries are recorded.
    #[must_use]
    pub fn is_detailed_auditing_enabled(&self) -> bool {
        self.auditing_level.is_detailed()
    }
}
