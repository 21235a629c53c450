//! Referral gateway demo
//!
//! Small hyper server showing the Vitaris authorization stack end to end:
//! `POST /auth/login` mints a token for one of the demo users, and the
//! guarded API routes enforce the production permission table.
//!
//! ```text
//! curl -s -X POST localhost:3000/auth/login -d '{"username":"dr-lopez"}'
//! curl -s localhost:3000/api/patients/42 -H "Authorization: Bearer <token>"
//! ```

use anyhow::Result;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::TcpListener;
use vitaris_authz::{
    Authorizer, GuardResult, HttpGuard, Permission, PermissionTable, Policy, Principal, Role,
    TokenVerifier,
};

const SECRET: &str = "demo-secret-change-me";
const TOKEN_TTL_SECS: u64 = 8 * 60 * 60;

/// Demo accounts, one per interesting role.
fn demo_user(username: &str) -> Option<Principal> {
    let role = match username {
        "root" => Role::SuperAdmin,
        "admin" => Role::Admin,
        "dr-lopez" => Role::Doctor,
        "nurse-kim" => Role::Nurse,
        "front-desk" => Role::Receptionist,
        "eval-1" => Role::MedicalEvaluator,
        "vr-admin" => Role::VitalRedAdmin,
        _ => return None,
    };
    Some(Principal::new(username, role))
}

fn build_guard() -> HttpGuard {
    let authorizer = Authorizer::new(Arc::new(PermissionTable::vitaris()));

    HttpGuard::new(TokenVerifier::new(SECRET), authorizer)
        .with_rule("/api/admin/*", Policy::admin_only())
        .with_rule("/api/vitals/*", Policy::medical_staff_only())
        .with_rule(
            "/api/referrals/*",
            Policy::RequireAll(vec![Permission::ManageReferrals]),
        )
        .with_rule_for(
            vec![Method::POST],
            "/api/prescriptions",
            Policy::RequireAll(vec![Permission::PrescribeMedications]),
        )
        .with_rule("/api/patients/*", Policy::RequireAny(vec![Permission::ReadPatients]))
}

fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .expect("static response parts")
}

async fn login(req: Request<Incoming>, verifier: &TokenVerifier) -> Result<Response<Full<Bytes>>> {
    let body = req.into_body().collect().await?.to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body)?;
    let username = parsed["username"].as_str().unwrap_or_default();

    let Some(principal) = demo_user(username) else {
        return Ok(json_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Unknown user"}"#.to_string(),
        ));
    };

    let token = verifier.mint(&principal, TOKEN_TTL_SECS)?;
    log::info!("issued token for {} ({})", principal.subject, principal.role);
    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({ "token": token, "role": principal.role.as_str() }).to_string(),
    ))
}

async fn handle(
    req: Request<Incoming>,
    guard: Arc<HttpGuard>,
    verifier: Arc<TokenVerifier>,
) -> Result<Response<Full<Bytes>>> {
    if req.method() == Method::POST && req.uri().path() == "/auth/login" {
        return login(req, &verifier).await;
    }

    let principal = match guard.check(&req) {
        GuardResult::Allow(principal) => principal,
        GuardResult::Deny(resp) => return Ok(resp),
    };

    let who = principal
        .as_ref()
        .map(|p| p.subject.as_str())
        .unwrap_or("anonymous");
    let body = serde_json::json!({
        "path": req.uri().path(),
        "served_to": who,
    });
    Ok(json_response(StatusCode::OK, body.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let guard = Arc::new(build_guard());
    let verifier = Arc::new(TokenVerifier::new(SECRET));

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    log::info!("referral gateway listening on http://127.0.0.1:3000");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let guard = guard.clone();
        let verifier = verifier.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let guard = guard.clone();
                let verifier = verifier.clone();
                async move { handle(req, guard, verifier).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                log::debug!("connection error: {e}");
            }
        });
    }
}
