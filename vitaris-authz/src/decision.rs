//! Authorization decision values
//!
//! A decision is a plain value, not an error: denial is a normal, expected
//! outcome of evaluating a request, and the transport adapter decides how to
//! surface it. Nothing in this module panics or performs I/O.

use crate::permissions::Permission;
use crate::roles::{Role, RoleClaim};
use std::collections::HashSet;

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed
    Allow,
    /// The request must not proceed
    Deny(DenyReason),
}

impl Decision {
    /// True if the decision is [`Decision::Allow`].
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The deny reason, if denied.
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason),
        }
    }
}

/// Why a request was denied.
///
/// Carries enough detail for the audit trail; the transport adapter must not
/// forward the specifics (missing permissions, allowed roles) to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No principal, or a deactivated account
    Unauthenticated,
    /// Principal resolved but lacks one or more required permissions
    InsufficientPermissions {
        /// Role the principal presented
        role: RoleClaim,
        /// Required permissions the role does not hold
        missing: HashSet<Permission>,
    },
    /// Principal resolved but holds none of the allowed roles
    InsufficientRole {
        /// Role the principal presented
        role: RoleClaim,
        /// Roles that would have been accepted
        allowed: Vec<Role>,
    },
}

impl DenyReason {
    /// Short wire tag for audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::InsufficientPermissions { .. } => "insufficient_permissions",
            DenyReason::InsufficientRole { .. } => "insufficient_role",
        }
    }
}
