/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が gate を通して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 署名検証や role 判定は services/auth (gate) の責務
 */
use crate::services::auth::{Allowed, Role};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `email` は credential の subject (Account の検索キー)
/// - `role` は role gate を通った場合のみ Some
/// - `jti` はログ相関用 (denylist は持たない)
/// - `expires_at` は credential の exp (unix 秒)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub email: String,
    pub role: Option<Role>,
    pub jti: Option<String>,
    pub expires_at: i64,
}

impl From<Allowed> for AuthCtx {
    fn from(allowed: Allowed) -> Self {
        Self {
            email: allowed.identity.email,
            role: allowed.role,
            jti: allowed.identity.jti,
            expires_at: allowed.identity.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::credential::VerifiedCredential;

    #[test]
    fn context_carries_identity_and_expiry() {
        let ctx = AuthCtx::from(Allowed {
            identity: VerifiedCredential {
                email: "a@x.com".into(),
                jti: Some("j-1".into()),
                expires_at: 1_900_000_000,
            },
            role: Some(Role::Admin),
        });

        assert_eq!(ctx.email, "a@x.com");
        assert_eq!(ctx.jti.as_deref(), Some("j-1"));
        assert_eq!(ctx.expires_at, 1_900_000_000);
        assert_eq!(ctx.role, Some(Role::Admin));
    }
}
