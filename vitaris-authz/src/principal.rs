//! Authenticated principal
//!
//! A [`Principal`] is derived once per request from a verified credential and
//! never mutated afterward. It carries only what authorization needs: who the
//! subject is, which role they hold, and whether the account is active.

use crate::roles::{Role, RoleClaim};
use serde::{Deserialize, Serialize};

/// The authenticated subject of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject identifier (user id or username)
    pub subject: String,
    /// Role as carried by the credential
    pub role: RoleClaim,
    /// Deactivated accounts keep their role but are denied everywhere
    pub active: bool,
}

impl Principal {
    /// Create an active principal with a known role.
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self { subject: subject.into(), role: RoleClaim::Known(role), active: true }
    }

    /// Create an active principal from a raw role string (unknown strings
    /// are kept and fail closed).
    pub fn with_claim(subject: impl Into<String>, role: RoleClaim) -> Self {
        Self { subject: subject.into(), role, active: true }
    }

    /// Mark the account inactive.
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Check whether the principal holds the given known role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role.role() == Some(role)
    }
}
