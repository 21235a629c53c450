//! Declarative authorization policies
//!
//! A [`Policy`] is the unit routes are guarded with: a value describing which
//! check to run, evaluated against a table and a principal. The named
//! constructors cover the gates the platform uses everywhere; they are
//! aliases over the same three mechanisms, not separate ones.

use crate::decision::Decision;
use crate::permissions::Permission;
use crate::principal::Principal;
use crate::roles::Role;
use crate::table::PermissionTable;

/// A declarative authorization requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Every listed permission must be held
    RequireAll(Vec<Permission>),
    /// At least one listed permission must be held
    RequireAny(Vec<Permission>),
    /// The principal's role must be one of the listed roles
    RequireRole(Vec<Role>),
}

impl Policy {
    /// Gate for system administration surfaces.
    pub fn admin_only() -> Self {
        Policy::RequireRole(vec![Role::SuperAdmin, Role::Admin])
    }

    /// Gate for clinical surfaces (charts, vitals, inboxes).
    pub fn medical_staff_only() -> Self {
        Policy::RequireRole(vec![Role::SuperAdmin, Role::Admin, Role::Doctor, Role::Nurse])
    }

    /// Gate for emergency overrides.
    pub fn emergency_access() -> Self {
        Policy::RequireAll(vec![Permission::EmergencyAccess])
    }

    /// Evaluate this policy for a principal.
    pub fn evaluate(&self, table: &PermissionTable, principal: Option<&Principal>) -> Decision {
        match self {
            Policy::RequireAll(required) => table.require_all(principal, required),
            Policy::RequireAny(candidates) => table.require_any(principal, candidates),
            Policy::RequireRole(allowed) => table.require_role(principal, allowed),
        }
    }
}
