//! End-to-end authorization scenarios: token -> principal -> decision ->
//! HTTP response.

use http::{Method, Request, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;
use vitaris_authz::{
    Authorizer, Decision, DenyReason, GuardResult, HttpGuard, Permission, PermissionTable,
    Policy, Principal, Role, RoleClaim, TokenVerifier,
};

const SECRET: &str = "integration_secret";

fn table() -> PermissionTable {
    PermissionTable::vitaris()
}

fn gateway() -> HttpGuard {
    let authorizer = Authorizer::new(Arc::new(table()));
    HttpGuard::new(TokenVerifier::new(SECRET), authorizer)
        .with_rule("/api/admin/*", Policy::admin_only())
        .with_rule("/api/referrals/*", Policy::RequireAll(vec![Permission::ManageReferrals]))
        .with_rule_for(
            vec![Method::POST],
            "/api/prescriptions",
            Policy::RequireAll(vec![Permission::PrescribeMedications]),
        )
        .with_rule("/api/patients/*", Policy::RequireAny(vec![Permission::ReadPatients]))
}

fn authed_request(method: Method, path: &str, principal: &Principal) -> Request<()> {
    let token = TokenVerifier::new(SECRET).mint(principal, 3600).unwrap();
    Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .unwrap()
}

#[test]
fn doctor_reads_and_prescribes() {
    let t = table();
    let doctor = Principal::new("dr-lopez", Role::Doctor);
    let decision = t.require_all(
        Some(&doctor),
        &[Permission::ReadPatients, Permission::PrescribeMedications],
    );
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn receptionist_denied_prescribing_with_missing_set() {
    let t = table();
    let rec = Principal::new("front-desk", Role::Receptionist);
    let decision = t.require_all(Some(&rec), &[Permission::PrescribeMedications]);

    assert_eq!(
        decision,
        Decision::Deny(DenyReason::InsufficientPermissions {
            role: RoleClaim::Known(Role::Receptionist),
            missing: HashSet::from([Permission::PrescribeMedications]),
        })
    );
}

#[test]
fn unknown_role_fails_closed() {
    let t = table();
    let ghost = Principal::with_claim("ghost", RoleClaim::parse("unknown_role_xyz"));
    let decision = t.require_all(Some(&ghost), &[Permission::ReadPatients]);

    assert_eq!(
        decision,
        Decision::Deny(DenyReason::InsufficientPermissions {
            role: RoleClaim::Unknown("unknown_role_xyz".to_string()),
            missing: HashSet::from([Permission::ReadPatients]),
        })
    );
}

#[test]
fn role_gate_admits_admin_and_rejects_nurse() {
    let t = table();
    let gate = [Role::SuperAdmin, Role::Admin];

    let admin = Principal::new("admin", Role::Admin);
    assert!(t.require_role(Some(&admin), &gate).is_allow());

    let nurse = Principal::new("nurse", Role::Nurse);
    assert!(!t.require_role(Some(&nurse), &gate).is_allow());
}

#[test]
fn absent_principal_is_always_unauthenticated() {
    let t = table();
    assert_eq!(
        t.require_all(None, &[Permission::AdminSystem]),
        Decision::Deny(DenyReason::Unauthenticated)
    );
    assert_eq!(
        t.require_any(None, &[Permission::AdminSystem]),
        Decision::Deny(DenyReason::Unauthenticated)
    );
    assert_eq!(
        t.require_role(None, &[Role::Guest]),
        Decision::Deny(DenyReason::Unauthenticated)
    );
}

#[test]
fn evaluator_manages_referrals_over_http() {
    let evaluator = Principal::new("eval-1", Role::MedicalEvaluator);
    let req = authed_request(Method::GET, "/api/referrals/inbox", &evaluator);

    match gateway().check(&req) {
        GuardResult::Allow(Some(principal)) => {
            assert!(principal.has_role(Role::MedicalEvaluator))
        }
        other => panic!("expected allow, got {other:?}"),
    }
}

#[test]
fn technician_gets_403_on_referrals() {
    let tech = Principal::new("tech-1", Role::Technician);
    let req = authed_request(Method::GET, "/api/referrals/inbox", &tech);

    match gateway().check(&req) {
        GuardResult::Deny(resp) => assert_eq!(resp.status(), StatusCode::FORBIDDEN),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[test]
fn missing_token_gets_401_on_guarded_route() {
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/patients/42")
        .body(())
        .unwrap();

    match gateway().check(&req) {
        GuardResult::Deny(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[test]
fn expired_session_behaves_like_no_session() {
    // Minting with the wrong secret stands in for any unverifiable token
    let doctor = Principal::new("dr", Role::Doctor);
    let bad_token = TokenVerifier::new("other_secret").mint(&doctor, 3600).unwrap();
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/patients/42")
        .header("Authorization", format!("Bearer {bad_token}"))
        .body(())
        .unwrap();

    match gateway().check(&req) {
        GuardResult::Deny(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[test]
fn deactivated_account_is_denied_even_with_valid_token() {
    let inactive = Principal::new("dr-retired", Role::Doctor).deactivated();
    let req = authed_request(Method::GET, "/api/patients/42", &inactive);

    match gateway().check(&req) {
        GuardResult::Deny(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[test]
fn unknown_role_token_gets_403_not_500() {
    let ghost = Principal::with_claim("ghost", RoleClaim::parse("unknown_role_xyz"));
    let req = authed_request(Method::GET, "/api/patients/42", &ghost);

    match gateway().check(&req) {
        GuardResult::Deny(resp) => assert_eq!(resp.status(), StatusCode::FORBIDDEN),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[test]
fn monotonicity_between_roles() {
    // Any require_all that admits the auditor must admit the super admin,
    // whose permission set is a superset.
    let t = table();
    let auditor = Principal::new("aud", Role::Auditor);
    let root = Principal::new("root", Role::SuperAdmin);

    let auditor_perms: Vec<Permission> =
        t.permissions_for(&auditor.role).iter().copied().collect();
    for perm in &auditor_perms {
        assert!(t.permissions_for(&root.role).contains(perm));
    }

    for window in auditor_perms.chunks(2) {
        assert!(t.require_all(Some(&auditor), window).is_allow());
        assert!(t.require_all(Some(&root), window).is_allow());
    }
}
