//! Role → permission table and the pure decision functions
//!
//! The table is built once at process start and never mutated afterward; the
//! builder is the only write path and it is consumed by `build()`. Lookups
//! for roles the table does not know resolve to the empty set (fail-closed),
//! never to an error.

use crate::decision::{Decision, DenyReason};
use crate::permissions::Permission;
use crate::principal::Principal;
use crate::roles::{Role, RoleClaim};
use std::collections::{HashMap, HashSet};

/// Immutable role → permission-set mapping.
///
/// Evaluation is a pure function of the table and its arguments: no I/O, no
/// locks, no shared mutable state, so a `PermissionTable` (usually behind an
/// `Arc`) is safe to consult from any number of request tasks at once.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    grants: HashMap<Role, HashSet<Permission>>,
    // Returned by reference for roles without an entry
    empty: HashSet<Permission>,
}

impl PermissionTable {
    /// Start building a table.
    pub fn builder() -> PermissionTableBuilder {
        PermissionTableBuilder { grants: HashMap::new() }
    }

    /// The production VITAL RED table.
    ///
    /// The generic hospital roles and the VITAL-RED-specific roles
    /// (`medical_evaluator`, `vital_red_admin`) share one flat table;
    /// `evaluate_medical_cases` and `make_transfer_decisions` belong to
    /// `medical_evaluator` alone, which in turn never holds
    /// `delete_patients`. Keep it that way.
    pub fn vitaris() -> Self {
        use Permission::*;

        Self::builder()
            .grant(
                Role::SuperAdmin,
                [
                    ReadPatients,
                    WritePatients,
                    DeletePatients,
                    PrescribeMedications,
                    DispenseMedications,
                    ManageAppointments,
                    UploadLabResults,
                    ViewReports,
                    ManageReferrals,
                    ManageUsers,
                    AdminSystem,
                    AuditLogs,
                    EmergencyAccess,
                ],
            )
            .grant(
                Role::Admin,
                [
                    ReadPatients,
                    WritePatients,
                    DeletePatients,
                    ManageAppointments,
                    ViewReports,
                    ManageReferrals,
                    ManageUsers,
                    AdminSystem,
                    AuditLogs,
                ],
            )
            .grant(
                Role::Doctor,
                [
                    ReadPatients,
                    WritePatients,
                    PrescribeMedications,
                    UploadLabResults,
                    ViewReports,
                    EmergencyAccess,
                ],
            )
            .grant(
                Role::Nurse,
                [ReadPatients, WritePatients, ManageAppointments, EmergencyAccess],
            )
            .grant(Role::Pharmacist, [ReadPatients, DispenseMedications, ViewReports])
            .grant(Role::Receptionist, [ReadPatients, WritePatients, ManageAppointments])
            .grant(Role::Technician, [ReadPatients, UploadLabResults])
            .grant(Role::Auditor, [ReadPatients, ViewReports, AuditLogs])
            .grant(Role::Guest, [])
            .grant(
                Role::MedicalEvaluator,
                [
                    ReadPatients,
                    WritePatients,
                    ViewReports,
                    ManageReferrals,
                    EvaluateMedicalCases,
                    MakeTransferDecisions,
                ],
            )
            .grant(
                Role::VitalRedAdmin,
                [
                    ReadPatients,
                    WritePatients,
                    DeletePatients,
                    ViewReports,
                    ManageReferrals,
                    ManageUsers,
                    AdminSystem,
                    AuditLogs,
                ],
            )
            .build()
    }

    /// Permission set for a role claim.
    ///
    /// Unknown roles, and known roles without an entry, resolve to the empty
    /// set. This is the fail-closed default; it is never an error.
    pub fn permissions_for(&self, role: &RoleClaim) -> &HashSet<Permission> {
        match role.role() {
            Some(role) => self.grants.get(&role).unwrap_or(&self.empty),
            None => &self.empty,
        }
    }

    /// Allow iff the principal's role holds every required permission.
    pub fn require_all(
        &self,
        principal: Option<&Principal>,
        required: &[Permission],
    ) -> Decision {
        let principal = match authenticated(principal) {
            Ok(p) => p,
            Err(deny) => return Decision::Deny(deny),
        };

        let held = self.permissions_for(&principal.role);
        let missing: HashSet<Permission> =
            required.iter().copied().filter(|p| !held.contains(p)).collect();

        if missing.is_empty() {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::InsufficientPermissions {
                role: principal.role.clone(),
                missing,
            })
        }
    }

    /// Allow iff the principal's role holds at least one candidate
    /// permission. An empty candidate set always denies.
    pub fn require_any(
        &self,
        principal: Option<&Principal>,
        candidates: &[Permission],
    ) -> Decision {
        let principal = match authenticated(principal) {
            Ok(p) => p,
            Err(deny) => return Decision::Deny(deny),
        };

        let held = self.permissions_for(&principal.role);
        if candidates.iter().any(|p| held.contains(p)) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::InsufficientPermissions {
                role: principal.role.clone(),
                missing: candidates.iter().copied().collect(),
            })
        }
    }

    /// Allow iff the principal holds one of the allowed roles.
    ///
    /// This is a coarse gate that does not consult the permission table at
    /// all; an unknown role claim matches no allowed role.
    pub fn require_role(
        &self,
        principal: Option<&Principal>,
        allowed: &[Role],
    ) -> Decision {
        let principal = match authenticated(principal) {
            Ok(p) => p,
            Err(deny) => return Decision::Deny(deny),
        };

        match principal.role.role() {
            Some(role) if allowed.contains(&role) => Decision::Allow,
            _ => Decision::Deny(DenyReason::InsufficientRole {
                role: principal.role.clone(),
                allowed: allowed.to_vec(),
            }),
        }
    }
}

/// A missing principal and a deactivated account both fail the same way.
fn authenticated(principal: Option<&Principal>) -> Result<&Principal, DenyReason> {
    match principal {
        Some(p) if p.active => Ok(p),
        _ => Err(DenyReason::Unauthenticated),
    }
}

/// Write-once builder for [`PermissionTable`].
#[derive(Debug, Default)]
pub struct PermissionTableBuilder {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl PermissionTableBuilder {
    /// Grant a role a set of permissions. Granting the same role twice
    /// merges the sets.
    pub fn grant(mut self, role: Role, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.grants.entry(role).or_default().extend(permissions);
        self
    }

    /// Freeze the table. No mutation is possible afterward.
    pub fn build(self) -> PermissionTable {
        PermissionTable { grants: self.grants, empty: HashSet::new() }
    }
}
