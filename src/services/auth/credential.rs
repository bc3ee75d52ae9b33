use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;
use uuid::Uuid;

/// Errors returned by credential issuance and verification.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("identity must not be empty")]
    EmptyIdentity,
    #[error("failed to sign credential")]
    Signing,
}

/// Credential (JWT) claims.
///
/// - `email` is the subject identity and the Account lookup key.
/// - `jti` is only for log correlation; nothing stores it (no denylist).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Identity that passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    pub email: String,
    pub jti: Option<String>,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub jti: String,
    pub expires_in: u64,
}

/// HS256 credential signer/verifier sharing one process-wide secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("CredentialService")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl CredentialService {
    pub fn new(secret: &[u8], ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    /// Issue a credential for `email`, valid for the configured window from now.
    pub fn issue(&self, email: &str) -> Result<IssuedCredential, CredentialError> {
        self.issue_at(email, Utc::now().timestamp())
    }

    /// Same as `issue`, but the caller decides what "now" is.
    pub fn issue_at(&self, email: &str, now: i64) -> Result<IssuedCredential, CredentialError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CredentialError::EmptyIdentity);
        }

        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.ttl_seconds, "credential expiry out of range");
                CredentialError::Signing
            })?;

        let jti = Uuid::new_v4().to_string();
        let claims = CredentialClaims {
            email: email.to_string(),
            iat: now,
            exp,
            jti: Some(jti.clone()),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign credential");
            CredentialError::Signing
        })?;

        Ok(IssuedCredential {
            token,
            jti,
            expires_in: self.ttl_seconds,
        })
    }

    /// Verify signature + `exp`, then require a non-empty identity.
    ///
    /// Pure and synchronous: no I/O, no shared mutable state.
    pub fn verify(&self, token: &str) -> Result<VerifiedCredential, CredentialError> {
        let data = jsonwebtoken::decode::<CredentialClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;
        let claims = data.claims;

        if claims.email.trim().is_empty() {
            return Err(CredentialError::EmptyClaim("email"));
        }

        Ok(VerifiedCredential {
            email: claims.email,
            jti: claims.jti,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: u64 = 365 * 24 * 60 * 60;

    fn service(secret: &str) -> CredentialService {
        CredentialService::new(secret.as_bytes(), YEAR, 0)
    }

    #[test]
    fn issued_credential_round_trips_identity() {
        let svc = service("process-secret");
        let issued = svc.issue("a@x.com").unwrap();

        let verified = svc.verify(&issued.token).unwrap();
        assert_eq!(verified.email, "a@x.com");
        assert_eq!(verified.jti.as_deref(), Some(issued.jti.as_str()));
        assert_eq!(issued.expires_in, YEAR);
    }

    #[test]
    fn validity_window_is_fixed_from_issuance() {
        let svc = service("process-secret");
        let now = Utc::now().timestamp();
        let issued = svc.issue_at("a@x.com", now).unwrap();

        let verified = svc.verify(&issued.token).unwrap();
        assert_eq!(verified.expires_at, now + YEAR as i64);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = service("process-secret");
        let theirs = service("some-other-secret");
        let forged = theirs.issue("a@x.com").unwrap();

        assert!(matches!(
            ours.verify(&forged.token),
            Err(CredentialError::Jwt(_))
        ));
    }

    #[test]
    fn expired_credential_is_rejected_despite_valid_signature() {
        let svc = service("process-secret");
        let long_ago = Utc::now().timestamp() - YEAR as i64 - 3600;
        let stale = svc.issue_at("a@x.com", long_ago).unwrap();

        let err = svc.verify(&stale.token).unwrap_err();
        match err {
            CredentialError::Jwt(e) => assert!(matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            )),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let svc = service("process-secret");
        let issued = svc.issue("a@x.com").unwrap();

        // swap the payload for one claiming a different identity
        let other = svc.issue("admin@x.com").unwrap();
        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let other_parts: Vec<&str> = other.token.split('.').collect();
        parts[1] = other_parts[1];
        let tampered = parts.join(".");

        assert!(svc.verify(&tampered).is_err());
    }

    #[test]
    fn garbage_and_empty_identity_are_rejected() {
        let svc = service("process-secret");
        assert!(svc.verify("not-a-jwt").is_err());
        assert!(matches!(
            svc.issue("   "),
            Err(CredentialError::EmptyIdentity)
        ));
    }

    #[test]
    fn unrepresentable_expiry_is_refused_not_wrapped() {
        let now = Utc::now().timestamp();

        // would wrap to a negative exp
        let wrapping = CredentialService::new(b"s", 1 << 63, 0);
        assert!(matches!(
            wrapping.issue_at("a@x.com", now),
            Err(CredentialError::Signing)
        ));

        // would overflow now + ttl
        let overflowing = CredentialService::new(b"s", i64::MAX as u64, 0);
        assert!(matches!(
            overflowing.issue_at("a@x.com", now),
            Err(CredentialError::Signing)
        ));
    }

    #[test]
    fn debug_output_hides_key_material() {
        let svc = service("super-secret-value");
        let printed = format!("{svc:?}");
        assert!(!printed.contains("super-secret-value"));
    }
}
