use serde::{Deserialize, Serialize};

/// Identity of the operator on whose behalf a command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Returns the stable subject recorded as the audit user id.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }
}
