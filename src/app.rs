/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (PgPool, IdCodec, AuthService, 決済 client) → Router 組み立て
 * - Middleware の適用 (http / security headers / CORS)
 * - axum::serve() で起動 (Ctrl-C で graceful shutdown)
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    services::{auth::build_auth_service, id_codec::IdCodec, payment::StripeClient},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG=info,teachem_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr が見えない起動方法でも残るように tracing にも出す
        tracing::error!(?info, "panic");

        // 開発中は即死させて気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    if config.stripe_secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY is not set; payment intents will be refused");
    }

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;
    let auth = build_auth_service(config, db.clone());
    let payments = Arc::new(StripeClient::new(
        config.stripe_api_base.clone(),
        config.stripe_secret_key.clone(),
    )?);

    Ok(AppState::new(db, id_codec, auth, payments))
}

fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api_router(state);
    let router = middleware::security_headers::apply(router, config.app_env);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::AppEnv;
    use crate::services::auth::{
        AccountStore, AuthService, CookiePolicy, CredentialService, Role,
        account_store::testing::{MemoryAccountStore, UnavailableAccountStore},
    };
    use crate::services::payment::{PaymentError, PaymentGateway};

    const SECRET: &[u8] = b"router-test-secret";
    const YEAR: u64 = 365 * 24 * 60 * 60;

    struct FakeGateway;

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, PaymentError> {
            Ok(format!("pi_{amount_cents}_{currency}_secret"))
        }
    }

    fn state_with(accounts: Arc<dyn AccountStore>) -> AppState {
        // never connected: gate tests must not reach the database
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://localhost:1/teachem_test")
            .unwrap();
        let auth = Arc::new(AuthService::new(
            CredentialService::new(SECRET, YEAR, 0),
            accounts,
            CookiePolicy::for_env(AppEnv::Development),
        ));
        let id_codec = IdCodec::new(
            10,
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
        )
        .unwrap();

        AppState::new(db, id_codec, auth, Arc::new(FakeGateway))
    }

    fn app() -> Router {
        api_router(state_with(Arc::new(
            MemoryAccountStore::default()
                .with("admin@x.com", Some(Role::Admin))
                .with("student@x.com", Some(Role::User)),
        )))
    }

    fn cookie_for(email: &str) -> String {
        let issued = CredentialService::new(SECRET, YEAR, 0)
            .issue(email)
            .unwrap();
        format!("token={}", issued.token)
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let resp = app()
            .oneshot(request("GET", "/api/v1/health", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_without_cookie_is_unauthorized() {
        let resp = app()
            .oneshot(request("GET", "/api/v1/auth/me", None, None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn foreign_credential_is_unauthorized() {
        let forged = CredentialService::new(b"someone-else", YEAR, 0)
            .issue("admin@x.com")
            .unwrap();
        let cookie = format!("token={}", forged.token);

        let resp = app()
            .oneshot(request("GET", "/api/v1/auth/me", Some(&cookie), None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIAL");
    }

    #[tokio::test]
    async fn issued_cookie_opens_identity_gate() {
        let app = app();

        let resp = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/auth/token",
                None,
                Some(r#"{"email":"student@x.com"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(set_cookie.contains("HttpOnly"));
        let cookie = set_cookie.split(';').next().unwrap().to_owned();

        let resp = app
            .oneshot(request(
                "POST",
                "/api/v1/payments/intent",
                Some(&cookie),
                Some(r#"{"price":25}"#),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["clientSecret"], "pi_2500_usd_secret");
    }

    #[tokio::test]
    async fn token_request_without_email_is_rejected() {
        let resp = app()
            .oneshot(request("POST", "/api/v1/auth/token", None, Some(r#"{"email":"  "}"#)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn logout_expires_the_cookie() {
        let app = app();
        let cookie = cookie_for("student@x.com");

        let resp = app
            .clone()
            .oneshot(request("POST", "/api/v1/auth/logout", Some(&cookie), None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("token=;"));
        assert!(set_cookie.contains("Max-Age=0"));

        // the browser drops the cookie, so the next request carries nothing
        let resp = app
            .oneshot(request("GET", "/api/v1/auth/me", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_price_is_a_bad_request() {
        let cookie = cookie_for("student@x.com");
        let resp = app()
            .oneshot(request(
                "POST",
                "/api/v1/payments/intent",
                Some(&cookie),
                Some(r#"{"price":0}"#),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_on_admin_routes() {
        for email in ["student@x.com", "ghost@x.com"] {
            let cookie = cookie_for(email);
            let resp = app()
                .oneshot(request("GET", "/api/v1/users", Some(&cookie), None))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{email}");
        }
    }

    #[tokio::test]
    async fn admin_passes_the_role_gate() {
        // a malformed id is rejected by the handler's extractor, which only runs past the gate
        let cookie = cookie_for("admin@x.com");
        let resp = app()
            .oneshot(request(
                "PATCH",
                "/api/v1/users/not-a-valid-id!",
                Some(&cookie),
                Some(r#"{"role":"teacher"}"#),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_PUBLIC_ID");
    }

    #[tokio::test]
    async fn admin_gate_checks_identity_first() {
        let resp = app()
            .oneshot(request("GET", "/api/v1/users", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let app = api_router(state_with(Arc::new(UnavailableAccountStore)));
        let cookie = cookie_for("admin@x.com");

        let resp = app
            .oneshot(request("GET", "/api/v1/classes/all", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn same_path_keeps_per_method_gates() {
        // GET /users is admin-only, PUT /users is public; an anonymous PUT must not hit the gate
        let resp = app()
            .oneshot(request("PUT", "/api/v1/users", None, Some(r#"{"name":"x"}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found_not_unauthorized() {
        let resp = app()
            .oneshot(request("GET", "/api/v1/nope", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
