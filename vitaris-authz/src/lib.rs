//! Vitaris Authorization - Core
//!
//! Role-based authorization for the VITAL RED hospital referral platform.
//! A fixed role → permission table is built once at startup; every incoming
//! request is then decided by a pure function of (table, principal, required
//! permissions). Denial is a value, not an error, and the table has no
//! runtime mutation path: changing what a role may do is a code change.
//!
//! # Quick Start
//!
//! ```rust
//! use vitaris_authz::{Permission, PermissionTable, Principal, Role};
//!
//! let table = PermissionTable::vitaris();
//! let doctor = Principal::new("dr-lopez", Role::Doctor);
//!
//! let decision = table.require_all(
//!     Some(&doctor),
//!     &[Permission::ReadPatients, Permission::PrescribeMedications],
//! );
//! assert!(decision.is_allow());
//! ```
//!
//! # Architecture
//!
//! - [`roles`] / [`permissions`] - closed enumerations of who and what
//! - [`table`] - the immutable role → permission table and the pure
//!   `require_all` / `require_any` / `require_role` decisions
//! - [`policy`] - declarative route policies and the platform's named gates
//! - [`principal`] - the authenticated subject of a request
//! - [`audit`] - advisory, best-effort audit trail around decisions
//! - [`token`] - HMAC-signed bearer tokens to and from principals
//! - [`http`] - adapter mapping denials onto 401/403 responses
//!
//! # Fail-closed by construction
//!
//! A role the table does not know resolves to the empty permission set; an
//! unparseable token resolves to no principal; both end in denial, never in
//! a panic or an error path the caller has to get right.

pub mod audit;
pub mod decision;
pub mod http;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod table;
pub mod token;

// Public exports
pub use audit::{AuditEntry, AuditError, AuditSink, Authorizer, LogAuditSink};
pub use decision::{Decision, DenyReason};
pub use http::{bearer_token, deny_response, GuardResult, HttpGuard, RouteRule};
pub use permissions::{Permission, UnknownPermission};
pub use policy::Policy;
pub use principal::Principal;
pub use roles::{Role, RoleClaim, UnknownRole};
pub use table::{PermissionTable, PermissionTableBuilder};
pub use token::{AuthError, Claims, TokenVerifier};
