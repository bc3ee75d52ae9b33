/*
 * Responsibility
 * - /users 系 handler (Account = users コレクション)
 * - PUT /users は初回接触時の upsert (ログイン直後にクライアントが呼ぶ)
 *   - body の role は捨てる。既存 account に対しては status "Requested" だけを反映する
 * - role の付与・変更は admin gate の内側 (PATCH) でのみ許す
 * - email を既存の別 account と同じ値に変えようとすると 409
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    api::v1::{dto::documents, extractors::public_id::PublicUserId},
    error::AppError,
    repos::{
        document_repo::{self, Collection},
        user_repo::{self, UpsertOutcome},
    },
    state::AppState,
};

pub async fn upsert_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doc = documents::accept(body)?;
    let email = documents::required_str(&doc, "email")?.to_owned();

    let (status, row) = match user_repo::upsert_on_first_contact(&state.db, &email, doc).await? {
        UpsertOutcome::Created(row) => (StatusCode::CREATED, row),
        UpsertOutcome::StatusUpdated(row) | UpsertOutcome::Existing(row) => (StatusCode::OK, row),
    };

    Ok((status, Json(documents::render(&state.id_codec, row)?)))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let rows = user_repo::list(&state.db).await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let row = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}

pub async fn update_user(
    State(state): State<AppState>,
    user_id: PublicUserId,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let patch = documents::accept(body)?;

    let row = document_repo::merge(&state.db, Collection::Users, user_id.id, patch)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}

pub async fn update_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let patch = documents::accept(body)?;
    // the patch may move the account to a new email
    let current_email = patch
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or(&email)
        .to_owned();

    let updated = user_repo::merge_by_email(&state.db, &email, patch).await?;
    if updated == 0 {
        return Err(AppError::not_found("user"));
    }

    let row = user_repo::find_by_email(&state.db, &current_email)
        .await?
        .ok_or(AppError::not_found("user"))?;
    Ok(Json(documents::render(&state.id_codec, row)?))
}
