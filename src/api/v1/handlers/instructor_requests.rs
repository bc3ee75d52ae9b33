/*
 * Responsibility
 * - 講師申請 (instructor_requests)
 * - 申請者は自分の申請を email で引く。承認/却下は admin が PATCH で status を書き換える
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    api::v1::{dto::documents, extractors::public_id::PublicInstructorRequestId},
    error::AppError,
    repos::document_repo::{self, Collection},
    state::AppState,
};

pub async fn create_request(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doc = documents::accept(body)?;
    documents::required_str(&doc, "email")?;

    let row = document_repo::insert(&state.db, Collection::InstructorRequests, doc).await?;
    Ok((
        StatusCode::CREATED,
        Json(documents::render(&state.id_codec, row)?),
    ))
}

pub async fn list_requests(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let rows = document_repo::list(&state.db, Collection::InstructorRequests).await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn get_request_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let row =
        document_repo::find_one_by_field(&state.db, Collection::InstructorRequests, "email", &email)
            .await?
            .ok_or(AppError::not_found("instructor request"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}

pub async fn update_request(
    State(state): State<AppState>,
    request_id: PublicInstructorRequestId,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let patch = documents::accept(body)?;

    let row = document_repo::merge(&state.db, Collection::InstructorRequests, request_id.id, patch)
        .await?
        .ok_or(AppError::not_found("instructor request"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}
