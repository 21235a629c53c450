//! HTTP transport adapter
//!
//! Translates the framework-agnostic [`Decision`](crate::Decision) into HTTP:
//! route patterns pick a [`Policy`], bearer tokens become principals, and a
//! denial becomes a 401 or 403 response. The response body never names the
//! permissions that were missing; that detail goes to the audit sink only.

use crate::audit::Authorizer;
use crate::decision::{Decision, DenyReason};
use crate::policy::Policy;
use crate::principal::Principal;
use crate::token::TokenVerifier;
use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use http_body_util::Full;

type Resp = Response<Full<Bytes>>;

/// Result of guarding one request.
#[derive(Debug)]
pub enum GuardResult {
    /// Request may proceed to its handler, with the principal (if any)
    Allow(Option<Principal>),
    /// Request is denied; return this response
    Deny(Resp),
}

/// Associates a path pattern with a policy.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Pattern to match: `/path/*` is a prefix match, anything else is exact
    pub pattern: String,
    /// HTTP methods this rule applies to (None = all methods)
    pub methods: Option<Vec<Method>>,
    /// Policy to enforce
    pub policy: Policy,
}

impl RouteRule {
    /// Check if a method/path pair falls under this rule.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(ref methods) = self.methods {
            if !methods.contains(method) {
                return false;
            }
        }
        self.matches_pattern(path)
    }

    fn matches_pattern(&self, path: &str) -> bool {
        if let Some(prefix) = self.pattern.strip_suffix("/*") {
            path.starts_with(prefix)
        } else {
            path == self.pattern
        }
    }
}

/// Request guard: token verification, policy lookup, decision, response.
#[derive(Clone)]
pub struct HttpGuard {
    verifier: TokenVerifier,
    authorizer: Authorizer,
    rules: Vec<RouteRule>,
}

impl HttpGuard {
    /// Create a guard with no rules (everything passes through).
    pub fn new(verifier: TokenVerifier, authorizer: Authorizer) -> Self {
        Self { verifier, authorizer, rules: Vec::new() }
    }

    /// Guard all methods on a pattern with a policy.
    pub fn with_rule(mut self, pattern: impl Into<String>, policy: Policy) -> Self {
        self.rules.push(RouteRule { pattern: pattern.into(), methods: None, policy });
        self
    }

    /// Guard specific methods on a pattern with a policy.
    pub fn with_rule_for(
        mut self,
        methods: Vec<Method>,
        pattern: impl Into<String>,
        policy: Policy,
    ) -> Self {
        self.rules.push(RouteRule {
            pattern: pattern.into(),
            methods: Some(methods),
            policy,
        });
        self
    }

    /// Evaluate a request against the rule list.
    ///
    /// The first matching rule decides. A request matching no rule is allowed
    /// through (routes without a declared policy are public), still carrying
    /// the principal when a valid token was presented.
    pub fn check<B>(&self, req: &Request<B>) -> GuardResult {
        let principal = self.resolve_principal(req);
        let path = req.uri().path();

        let rule = self.rules.iter().find(|r| r.matches(req.method(), path));
        let Some(rule) = rule else {
            return GuardResult::Allow(principal);
        };

        match self.authorizer.check(principal.as_ref(), path, &rule.policy) {
            Decision::Allow => GuardResult::Allow(principal),
            Decision::Deny(reason) => GuardResult::Deny(deny_response(&reason)),
        }
    }

    /// Extract and verify the bearer token, if one was presented.
    ///
    /// A bad token is treated the same as no token: the decision layer turns
    /// the absent principal into `Unauthenticated` on guarded routes.
    fn resolve_principal<B>(&self, req: &Request<B>) -> Option<Principal> {
        let token = bearer_token(req)?;
        match self.verifier.verify(token) {
            Ok(principal) => Some(principal),
            Err(e) => {
                log::debug!("token rejected: {e}");
                None
            }
        }
    }
}

/// Extract a bearer token from the Authorization header.
pub fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Map a deny reason onto an HTTP response.
///
/// 401 when no principal resolved, 403 otherwise. Bodies are deliberately
/// generic; which permissions were missing is audit-only information.
pub fn deny_response(reason: &DenyReason) -> Resp {
    let (status, body) = match reason {
        DenyReason::Unauthenticated => {
            (StatusCode::UNAUTHORIZED, r#"{"error":"Authentication required"}"#)
        }
        DenyReason::InsufficientPermissions { .. } | DenyReason::InsufficientRole { .. } => {
            (StatusCode::FORBIDDEN, r#"{"error":"Insufficient permissions"}"#)
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
