//! Credential verification adapter
//!
//! Turns a signed bearer token into a [`Principal`]. Tokens are compact
//! JWT-style: base64url(header).base64url(claims).base64url(signature), with
//! an HMAC-SHA256 signature verified in constant time. Verification is the
//! only place trust is established; everything downstream treats the
//! principal as an opaque, already-verified input.

use crate::principal::Principal;
use crate::roles::RoleClaim;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Signed claims carried by a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    pub sub: String,
    /// Role wire name; may be a string this binary does not know
    pub role: String,
    /// Account active flag at mint time
    pub active: bool,
    /// Expiry, seconds since the UNIX epoch
    pub exp: u64,
    /// Issued-at, seconds since the UNIX epoch
    pub iat: u64,
}

/// Token verification failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Not three dot-separated base64url parts
    #[error("malformed token")]
    MalformedToken,
    /// Signature does not match the payload
    #[error("invalid token signature")]
    InvalidSignature,
    /// `exp` is in the past
    #[error("token expired")]
    Expired,
    /// Claims payload is not valid JSON of the expected shape
    #[error("invalid token claims")]
    InvalidClaims,
}

/// Mints and verifies principal tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    /// Create a verifier for the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Mint a token for a principal, valid for `ttl_secs`.
    pub fn mint(&self, principal: &Principal, ttl_secs: u64) -> Result<String, AuthError> {
        let now = self.now();
        let claims = Claims {
            sub: principal.subject.clone(),
            role: principal.role.as_str().to_string(),
            active: principal.active,
            exp: now + ttl_secs,
            iat: now,
        };

        let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
        let payload =
            serde_json::to_string(&claims).map_err(|_| AuthError::InvalidClaims)?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signature = self.sign(&header_b64, &payload_b64);

        Ok(format!("{header_b64}.{payload_b64}.{signature}"))
    }

    /// Verify a token and produce the principal it carries.
    ///
    /// Signature is checked before the payload is parsed; expired tokens are
    /// rejected. An unrecognized role string is not an error here: it becomes
    /// a [`RoleClaim::Unknown`] principal that the decision layer fails
    /// closed on.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(AuthError::MalformedToken),
            };

        self.verify_signature(header_b64, payload_b64, signature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidClaims)?;

        if claims.exp < self.now() {
            return Err(AuthError::Expired);
        }

        let mut principal = Principal::with_claim(claims.sub, RoleClaim::parse(&claims.role));
        principal.active = claims.active;
        Ok(principal)
    }

    fn sign(&self, header_b64: &str, payload_b64: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any size");
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Constant-time signature comparison (prevents timing attacks)
    fn verify_signature(
        &self,
        header_b64: &str,
        payload_b64: &str,
        signature: &str,
    ) -> Result<(), AuthError> {
        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::MalformedToken)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any size");
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        mac.verify_slice(&signature_bytes).map_err(|_| AuthError::InvalidSignature)
    }

    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX epoch")
            .as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new("test_secret")
    }

    #[test]
    fn test_mint_and_verify_round_trip() {
        let v = verifier();
        let principal = Principal::new("dr-lopez", Role::Doctor);

        let token = v.mint(&principal, 3600).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let back = v.verify(&token).unwrap();
        assert_eq!(back, principal);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let v = verifier();
        let token = v.mint(&Principal::new("dr", Role::Doctor), 3600).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.{}.AAAA", parts[0], parts[1]);
        assert_eq!(v.verify(&tampered), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let v = verifier();
        let token = v.mint(&Principal::new("dr", Role::Doctor), 3600).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Claims {
            sub: "dr".to_string(),
            role: "super_admin".to_string(),
            active: true,
            exp: u64::MAX,
            iat: 0,
        };
        let forged =
            URL_SAFE_NO_PAD.encode(serde_json::to_string(&forged_claims).unwrap().as_bytes());
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert_eq!(v.verify(&tampered), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let v = verifier();
        for bad in ["", "only_one_part", "a.b", "a.b.c.d", "not base64.at.all"] {
            assert!(v.verify(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = verifier().mint(&Principal::new("dr", Role::Doctor), 3600).unwrap();
        let other = TokenVerifier::new("other_secret");
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Hand-sign a token whose exp is already in the past
        let v = verifier();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let claims = Claims {
            sub: "dr".to_string(),
            role: "doctor".to_string(),
            active: true,
            exp: now - 60,
            iat: now - 3600,
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
        let payload_b64 =
            URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims).unwrap().as_bytes());
        let signature = v.sign(&header_b64, &payload_b64);
        let stale = format!("{header_b64}.{payload_b64}.{signature}");

        assert_eq!(v.verify(&stale), Err(AuthError::Expired));
    }

    #[test]
    fn test_unknown_role_token_verifies_to_unknown_claim() {
        let v = verifier();
        let p = Principal::with_claim("ghost", RoleClaim::parse("unknown_role_xyz"));
        let token = v.mint(&p, 3600).unwrap();

        let back = v.verify(&token).unwrap();
        assert_eq!(back.role, RoleClaim::Unknown("unknown_role_xyz".to_string()));
    }

    #[test]
    fn test_inactive_flag_survives_round_trip() {
        let v = verifier();
        let p = Principal::new("dr", Role::Doctor).deactivated();
        let token = v.mint(&p, 3600).unwrap();
        assert!(!v.verify(&token).unwrap().active);
    }
}
