/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::auth::{
    AuthService, CookiePolicy, CredentialService, account_store::PgAccountStore,
};

pub fn build_auth_service(config: &Config, db: PgPool) -> Arc<AuthService> {
    let credentials = CredentialService::new(
        config.access_token_secret.as_bytes(),
        config.credential_ttl_seconds,
        config.credential_leeway_seconds,
    );

    let auth = AuthService::new(
        credentials,
        Arc::new(PgAccountStore::new(db)),
        CookiePolicy::for_env(config.app_env),
    );

    Arc::new(auth)
}
