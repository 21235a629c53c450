//! Permission definitions
//!
//! Permissions are atomic capability tags with no hierarchy between them;
//! what a role may do is decided entirely by the set of permissions the
//! table grants it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single capability a role may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read patient records
    ReadPatients,
    /// Create and update patient records
    WritePatients,
    /// Delete patient records
    DeletePatients,
    /// Issue prescriptions
    PrescribeMedications,
    /// Dispense prescribed medications
    DispenseMedications,
    /// Create and reschedule appointments
    ManageAppointments,
    /// Attach lab and imaging results to a record
    UploadLabResults,
    /// View clinical and operational reports
    ViewReports,
    /// Manage VITAL RED referral requests
    ManageReferrals,
    /// Create, deactivate, and reassign user accounts
    ManageUsers,
    /// Change system-wide configuration
    AdminSystem,
    /// Read the audit trail
    AuditLogs,
    /// Evaluate incoming medical referral cases
    EvaluateMedicalCases,
    /// Accept or reject patient transfer requests
    MakeTransferDecisions,
    /// Bypass normal gating during a declared emergency
    EmergencyAccess,
}

impl Permission {
    /// Wire name of this permission (snake_case, as used in route
    /// declarations and audit records).
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadPatients => "read_patients",
            Permission::WritePatients => "write_patients",
            Permission::DeletePatients => "delete_patients",
            Permission::PrescribeMedications => "prescribe_medications",
            Permission::DispenseMedications => "dispense_medications",
            Permission::ManageAppointments => "manage_appointments",
            Permission::UploadLabResults => "upload_lab_results",
            Permission::ViewReports => "view_reports",
            Permission::ManageReferrals => "manage_referrals",
            Permission::ManageUsers => "manage_users",
            Permission::AdminSystem => "admin_system",
            Permission::AuditLogs => "audit_logs",
            Permission::EvaluateMedicalCases => "evaluate_medical_cases",
            Permission::MakeTransferDecisions => "make_transfer_decisions",
            Permission::EmergencyAccess => "emergency_access",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Permission; 15] = [
            Permission::ReadPatients,
            Permission::WritePatients,
            Permission::DeletePatients,
            Permission::PrescribeMedications,
            Permission::DispenseMedications,
            Permission::ManageAppointments,
            Permission::UploadLabResults,
            Permission::ViewReports,
            Permission::ManageReferrals,
            Permission::ManageUsers,
            Permission::AdminSystem,
            Permission::AuditLogs,
            Permission::EvaluateMedicalCases,
            Permission::MakeTransferDecisions,
            Permission::EmergencyAccess,
        ];

        ALL.iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Error for a permission string that matches no [`Permission`] variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_wire_names_round_trip() {
        let samples = [
            Permission::ReadPatients,
            Permission::PrescribeMedications,
            Permission::MakeTransferDecisions,
            Permission::EmergencyAccess,
        ];
        for perm in samples {
            assert_eq!(perm.as_str().parse::<Permission>().unwrap(), perm);
        }
    }

    #[test]
    fn test_unknown_permission_string_is_an_error() {
        assert!("fly_helicopter".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_serde_uses_wire_names() {
        let json = serde_json::to_string(&Permission::EvaluateMedicalCases).unwrap();
        assert_eq!(json, r#""evaluate_medical_cases""#);
    }
}
