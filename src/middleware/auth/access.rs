//! credential cookie 検証 (+ 必要なら role 検証) → AuthCtx を extensions に入れる
//!
//! - identity gate: cookie `token` を検証。無ければ 401、不正/期限切れも 401
//! - role gate: identity の後に Account の role を引く。不一致/未登録は 403、store 障害は 503
//! - どちらも handler 実行前に終端する。判定自体は `AuthService::authorize` が行う

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{Role, cookie};
use crate::state::AppState;

#[derive(Clone)]
struct GateState {
    app: AppState,
    required: Option<Role>,
}

/// 配下の route に identity gate を掛ける。
///
/// 例：
/// ```ignore
/// let authed = middleware::auth::access::require_identity(authed_routes, state.clone());
/// ```
pub fn require_identity(router: Router<AppState>, state: AppState) -> Router<AppState> {
    apply(router, state, None)
}

/// 配下の route に identity gate + role gate を掛ける。
pub fn require_role(router: Router<AppState>, state: AppState, role: Role) -> Router<AppState> {
    apply(router, state, Some(role))
}

fn apply(router: Router<AppState>, app: AppState, required: Option<Role>) -> Router<AppState> {
    // route_layer: マッチした route にだけ掛ける (未定義 path は 401 ではなく 404 のまま)
    router.route_layer(middleware::from_fn_with_state(
        GateState { app, required },
        access_middleware,
    ))
}

async fn access_middleware(
    State(gate): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Body は Sync ではないので、await を跨ぐ前に所有権のある値にしておく
    let credential = cookie::read_credential(req.headers()).map(str::to_owned);

    let allowed = match gate
        .app
        .auth
        .authorize(credential.as_deref(), gate.required)
        .await
    {
        Ok(allowed) => allowed,
        Err(rejection) => {
            tracing::warn!(
                reason = %rejection,
                method = %req.method(),
                path = %req.uri().path(),
                "request rejected at gate"
            );
            return Err(rejection.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(allowed));

    Ok(next.run(req).await)
}
