/*
 * Responsibility
 * - credential の発行 (POST /auth/token) と失効 (POST /auth/logout)
 * - 発行: 署名済み JWT を HttpOnly cookie として返す
 * - 失効: 同じ属性で Max-Age=0 の cookie を返すだけ (サーバ側の失効リストは無い)
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::v1::{
        dto::{
            auth::{MeResponse, SuccessResponse, TokenRequest},
            documents,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::user_repo,
    services::auth::credential::CredentialError,
    state::AppState,
};

fn with_cookie(cookie: String) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(&cookie).map_err(|_| AppError::Internal)?;

    let mut resp = (StatusCode::OK, Json(SuccessResponse { success: true })).into_response();
    resp.headers_mut().insert(header::SET_COOKIE, value);
    Ok(resp)
}

pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Response, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_IDENTITY", msg))?;

    let issued = state
        .auth
        .credentials()
        .issue(&req.email)
        .map_err(|err| match err {
            CredentialError::EmptyIdentity => {
                AppError::bad_request("INVALID_IDENTITY", "email is required")
            }
            _ => AppError::Internal,
        })?;

    tracing::info!(jti = %issued.jti, "credential issued");

    let cookie = state
        .auth
        .cookie_policy()
        .issue(&issued.token, issued.expires_in);
    with_cookie(cookie)
}

pub async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    with_cookie(state.auth.cookie_policy().expire())
}

/// The decoded identity plus its Account, when one exists.
pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<MeResponse>, AppError> {
    tracing::debug!(jti = ?ctx.jti, role = ?ctx.role, "resolving current account");

    let account = match user_repo::find_by_email(&state.db, &ctx.email).await? {
        Some(row) => Some(documents::render(&state.id_codec, row)?),
        None => None,
    };

    Ok(Json(MeResponse {
        email: ctx.email,
        expires_at: ctx.expires_at,
        account,
    }))
}
