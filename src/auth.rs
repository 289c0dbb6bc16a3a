//! Shared-secret access gate.
//!
//! One secret separates editors from viewers for the rest of a session.
//! There is no per-user identity and no expiry.

use std::fmt;

use tracing::{info, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Editor,
    Viewer,
}

impl Role {
    pub fn can_edit(self) -> bool {
        self == Self::Editor
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        })
    }
}

#[derive(Clone)]
pub struct AccessGate {
    secret: Option<String>,
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("configured", &self.secret.is_some())
            .finish()
    }
}

impl AccessGate {
    /// A blank secret counts as unset.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Enter the session. No key means viewer; a key must match the secret.
    pub fn enter(&self, key: Option<&str>) -> Result<Role> {
        let Some(key) = key else {
            return Ok(Role::Viewer);
        };
        match &self.secret {
            Some(secret) if secret == key => {
                info!("editor session opened");
                Ok(Role::Editor)
            }
            _ => {
                warn!("rejected access key");
                Err(Error::InvalidAccessKey)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_key_grants_editor() {
        let gate = AccessGate::new(Some("obra-2024".into()));
        assert_eq!(gate.enter(Some("obra-2024")).unwrap(), Role::Editor);
    }

    #[test]
    fn no_key_is_a_viewer() {
        let gate = AccessGate::new(Some("obra-2024".into()));
        let role = gate.enter(None).unwrap();
        assert_eq!(role, Role::Viewer);
        assert!(!role.can_edit());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let gate = AccessGate::new(Some("obra-2024".into()));
        assert!(matches!(gate.enter(Some("guess")), Err(Error::InvalidAccessKey)));
    }

    #[test]
    fn unconfigured_gate_never_grants_editor() {
        let gate = AccessGate::new(Some(String::new()));
        assert!(!gate.is_configured());
        assert!(matches!(gate.enter(Some("")), Err(Error::InvalidAccessKey)));
        assert!(matches!(gate.enter(Some("anything")), Err(Error::InvalidAccessKey)));
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let gate = AccessGate::new(Some("obra-2024".into()));
        assert!(!format!("{gate:?}").contains("obra-2024"));
    }
}
