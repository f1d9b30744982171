// Session domain model
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "USER";

/// Credential and identity fields persisted on the client.
///
/// An empty token is the same as no token; it never authenticates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Session {
    pub fn new(token: String, username: String, role: Option<String>) -> Self {
        Self {
            token: Some(token),
            username: Some(username),
            role,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The token, if present and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn role(&self) -> &str {
        self.role
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.username.is_none() && self.role.is_none()
    }
}
