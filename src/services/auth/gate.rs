//! Request authorization gate.
//!
//! identity check → (optional) role check を順に合成し、`Result` で結果を返す。
//! axum への依存は middleware 側に閉じ込め、ここは HTTP を知らない。

use std::{fmt, sync::Arc};

use tracing::{debug, error, warn};

use crate::services::auth::account_store::{Account, AccountStore, Role};
use crate::services::auth::cookie::CookiePolicy;
use crate::services::auth::credential::{CredentialService, VerifiedCredential};

/// Why the gate refused a request.
///
/// The first three are final security decisions; `StoreLookupFailure` is an
/// infrastructure fault and must not be reported as forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateRejection {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid or expired credential")]
    InvalidOrExpiredCredential,
    #[error("insufficient role")]
    InsufficientRole,
    #[error("credential store lookup failed")]
    StoreLookupFailure,
}

pub type GateResult<T> = Result<T, GateRejection>;

/// What a passing request carries on to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowed {
    pub identity: VerifiedCredential,
    // Only set when a role check ran.
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialService,
    accounts: Arc<dyn AccountStore>,
    cookie_policy: CookiePolicy,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("credentials", &self.credentials)
            .field("cookie_policy", &self.cookie_policy)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        credentials: CredentialService,
        accounts: Arc<dyn AccountStore>,
        cookie_policy: CookiePolicy,
    ) -> Self {
        Self {
            credentials,
            accounts,
            cookie_policy,
        }
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        self.cookie_policy
    }

    /// Identity gate: establish who is calling from the carried credential.
    pub fn authenticate(&self, credential: Option<&str>) -> GateResult<VerifiedCredential> {
        let token = credential.ok_or(GateRejection::MissingCredential)?;

        self.credentials.verify(token).map_err(|err| {
            warn!(error = %err, "credential verification failed");
            GateRejection::InvalidOrExpiredCredential
        })
    }

    /// Role gate: trusts an identity already established by `authenticate`.
    ///
    /// One read-only lookup. No Account means no role, so the check fails closed.
    pub async fn require_role(&self, email: &str, required: Role) -> GateResult<Account> {
        let account = self
            .accounts
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(error = %err, "account lookup failed");
                GateRejection::StoreLookupFailure
            })?;

        match account {
            Some(account) if account.role == Some(required) => {
                debug!(
                    account_id = account.id,
                    email = %account.email,
                    required = required.as_str(),
                    "role check passed"
                );
                Ok(account)
            }
            Some(account) => {
                warn!(
                    email = %email,
                    role = ?account.role,
                    required = required.as_str(),
                    "role check failed"
                );
                Err(GateRejection::InsufficientRole)
            }
            None => {
                warn!(email = %email, required = required.as_str(), "no account for identity");
                Err(GateRejection::InsufficientRole)
            }
        }
    }

    /// identity → role の逐次合成。`required` が None なら identity のみ。
    pub async fn authorize(
        &self,
        credential: Option<&str>,
        required: Option<Role>,
    ) -> GateResult<Allowed> {
        let identity = self.authenticate(credential)?;

        let role = match required {
            Some(role) => self.require_role(&identity.email, role).await?.role,
            None => None,
        };

        Ok(Allowed { identity, role })
    }
}
