//! Role definitions for the VITAL RED platform
//!
//! Roles are a closed enumeration: every role the system knows about is a
//! variant here, and adding one is a code change, not a data migration. The
//! single runtime escape hatch is [`RoleClaim::Unknown`], for role strings
//! that arrive in external tokens and match no variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's role in the hospital platform.
///
/// A user holds exactly one role at a time. The set includes both the generic
/// hospital roles (doctor, nurse, ...) and the VITAL-RED-specific roles
/// (`MedicalEvaluator`, `VitalRedAdmin`); they live in the same flat table
/// on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full system access, including role administration
    SuperAdmin,
    /// Hospital-wide administration
    Admin,
    /// Treating physician
    Doctor,
    /// Nursing staff
    Nurse,
    /// Pharmacy staff
    Pharmacist,
    /// Front-desk staff
    Receptionist,
    /// Lab and imaging technicians
    Technician,
    /// Read-only access to audit trails and reports
    Auditor,
    /// Unauthenticated or provisional account
    Guest,
    /// VITAL RED referral evaluator
    MedicalEvaluator,
    /// VITAL RED module administrator
    VitalRedAdmin,
}

impl Role {
    /// All roles, in table order.
    pub const ALL: [Role; 11] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Doctor,
        Role::Nurse,
        Role::Pharmacist,
        Role::Receptionist,
        Role::Technician,
        Role::Auditor,
        Role::Guest,
        Role::MedicalEvaluator,
        Role::VitalRedAdmin,
    ];

    /// Wire name of this role (the snake_case string stored in tokens).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Pharmacist => "pharmacist",
            Role::Receptionist => "receptionist",
            Role::Technician => "technician",
            Role::Auditor => "auditor",
            Role::Guest => "guest",
            Role::MedicalEvaluator => "medical_evaluator",
            Role::VitalRedAdmin => "vital_red_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Error for a role string that matches no [`Role`] variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// A role value as it arrived from an external credential.
///
/// Tokens are minted by an external identity system, so the role string they
/// carry may postdate (or predate) this binary's `Role` enum. An unrecognized
/// string is kept as `Unknown` rather than rejected: it authenticates, but it
/// resolves to the empty permission set and matches no allowed-role list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    /// A role this binary knows about
    Known(Role),
    /// A role string with no matching variant; always fail-closed
    Unknown(String),
}

impl RoleClaim {
    /// Parse a wire string into a claim. Never fails; unknown strings are
    /// preserved for diagnostics.
    pub fn parse(s: &str) -> Self {
        match s.parse::<Role>() {
            Ok(role) => RoleClaim::Known(role),
            Err(_) => RoleClaim::Unknown(s.to_string()),
        }
    }

    /// The known role, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleClaim::Known(role) => Some(*role),
            RoleClaim::Unknown(_) => None,
        }
    }

    /// Wire name of the claim, known or not.
    pub fn as_str(&self) -> &str {
        match self {
            RoleClaim::Known(role) => role.as_str(),
            RoleClaim::Unknown(s) => s.as_str(),
        }
    }
}

impl From<Role> for RoleClaim {
    fn from(role: Role) -> Self {
        RoleClaim::Known(role)
    }
}

impl fmt::Display for RoleClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
