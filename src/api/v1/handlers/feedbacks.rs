/*
 * Responsibility
 * - 受講者からのフィードバック (投稿は identity gate の内側、一覧は公開)
 */
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use crate::{
    api::v1::dto::documents,
    error::AppError,
    repos::document_repo::{self, Collection},
    state::AppState,
};

pub async fn create_feedback(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doc = documents::accept(body)?;

    let row = document_repo::insert(&state.db, Collection::Feedbacks, doc).await?;
    Ok((
        StatusCode::CREATED,
        Json(documents::render(&state.id_codec, row)?),
    ))
}

pub async fn list_feedbacks(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let rows = document_repo::list(&state.db, Collection::Feedbacks).await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}
