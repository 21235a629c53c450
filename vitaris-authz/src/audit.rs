//! Advisory audit trail for authorization decisions
//!
//! Auditing is best-effort by contract: a sink that fails is noted on the
//! local diagnostic log and otherwise ignored. Access control must keep
//! working when the audit infrastructure does not.

use crate::decision::{Decision, DenyReason};
use crate::permissions::Permission;
use crate::policy::Policy;
use crate::principal::Principal;
use crate::roles::Role;
use crate::table::PermissionTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// One recorded authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
    /// Subject identifier, or `None` when no principal resolved
    pub subject: Option<String>,
    /// Role string the principal presented, if any
    pub role: Option<String>,
    /// What the caller was gating (route, resource name)
    pub resource: String,
    /// Permissions the gate required, wire names
    pub required: Vec<String>,
    /// `"allow"` or the deny-reason tag
    pub outcome: String,
    /// Missing permissions on a permission denial, wire names
    pub missing: Vec<String>,
}

impl AuditEntry {
    fn for_decision(
        principal: Option<&Principal>,
        resource: &str,
        required: &[Permission],
        decision: &Decision,
    ) -> Self {
        let (outcome, missing) = match decision {
            Decision::Allow => ("allow".to_string(), Vec::new()),
            Decision::Deny(reason) => (
                reason.kind().to_string(),
                match reason {
                    DenyReason::InsufficientPermissions { missing, .. } => {
                        let mut names: Vec<String> =
                            missing.iter().map(|p| p.as_str().to_string()).collect();
                        names.sort();
                        names
                    }
                    _ => Vec::new(),
                },
            ),
        };

        Self {
            timestamp: Utc::now(),
            subject: principal.map(|p| p.subject.clone()),
            role: principal.map(|p| p.role.as_str().to_string()),
            resource: resource.to_string(),
            required: required.iter().map(|p| p.as_str().to_string()).collect(),
            outcome,
            missing,
        }
    }
}

/// Destination for audit records.
///
/// Implementations must be safe to call from concurrent request tasks.
/// Errors are advisory; the caller swallows them.
pub trait AuditSink: Send + Sync {
    /// Record one decision.
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError>;

    /// Sink name for diagnostics.
    fn name(&self) -> &str;
}

/// Failure inside an audit sink. Never affects the decision that produced
/// the entry.
#[derive(Debug, thiserror::Error)]
#[error("audit sink error: {0}")]
pub struct AuditError(pub String);

/// Sink that writes through the `log` facade: denials at warn, allows at
/// debug.
#[derive(Debug, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let line = serde_json::to_string(entry).map_err(|e| AuditError(e.to_string()))?;
        if entry.outcome == "allow" {
            log::debug!("authz allow: {line}");
        } else {
            log::warn!("authz deny: {line}");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Permission table plus audit sink, bundled for request handlers.
///
/// The pure decision functions live on [`PermissionTable`]; this wrapper
/// adds the advisory audit record and nothing else.
#[derive(Clone)]
pub struct Authorizer {
    table: Arc<PermissionTable>,
    sink: Arc<dyn AuditSink>,
}

impl Authorizer {
    /// Create an authorizer over a shared table, auditing through the `log`
    /// facade.
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table, sink: Arc::new(LogAuditSink) }
    }

    /// Replace the audit sink.
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The underlying table.
    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Evaluate a policy and audit the outcome.
    pub fn check(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        policy: &Policy,
    ) -> Decision {
        let decision = policy.evaluate(&self.table, principal);
        let required = match policy {
            Policy::RequireAll(perms) | Policy::RequireAny(perms) => perms.clone(),
            Policy::RequireRole(_) => Vec::new(),
        };
        self.audit(principal, resource, &required, &decision);
        decision
    }

    /// `require_all` with auditing.
    pub fn check_all(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        required: &[Permission],
    ) -> Decision {
        let decision = self.table.require_all(principal, required);
        self.audit(principal, resource, required, &decision);
        decision
    }

    /// `require_any` with auditing.
    pub fn check_any(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        candidates: &[Permission],
    ) -> Decision {
        let decision = self.table.require_any(principal, candidates);
        self.audit(principal, resource, candidates, &decision);
        decision
    }

    /// `require_role` with auditing.
    pub fn check_role(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        allowed: &[Role],
    ) -> Decision {
        let decision = self.table.require_role(principal, allowed);
        self.audit(principal, resource, &[], &decision);
        decision
    }

    fn audit(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        required: &[Permission],
        decision: &Decision,
    ) {
        let entry = AuditEntry::for_decision(principal, resource, required, decision);
        if let Err(e) = self.sink.record(&entry) {
            log::debug!("audit sink '{}' failed, decision unaffected: {e}", self.sink.name());
        }
    }
}
