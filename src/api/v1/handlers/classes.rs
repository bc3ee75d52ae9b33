/*
 * Responsibility
 * - /classes 系 handler
 * - Path の {id} は公開 ID → extractor で内部 ID に変換して受け取る
 * - 件数系 (受講者数 / 課題数 / 提出数) は classId (公開 ID 文字列) で数える
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    api::v1::{dto::documents, extractors::public_id::PublicClassId},
    error::AppError,
    repos::{
        class_repo,
        document_repo::{self, Collection},
    },
    state::AppState,
};

pub async fn create_class(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doc = documents::accept(body)?;
    documents::required_str(&doc, "title")?;

    let row = document_repo::insert(&state.db, Collection::Classes, doc).await?;
    Ok((
        StatusCode::CREATED,
        Json(documents::render(&state.id_codec, row)?),
    ))
}

pub async fn list_accepted_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows = class_repo::list_accepted(&state.db).await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn list_all_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows = document_repo::list(&state.db, Collection::Classes).await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn list_popular_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows = class_repo::list_popular(&state.db).await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn get_class(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<Json<Value>, AppError> {
    let row = document_repo::get(&state.db, Collection::Classes, class_id.id)
        .await?
        .ok_or(AppError::not_found("class"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}

pub async fn list_teacher_classes(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows =
        document_repo::find_by_field(&state.db, Collection::Classes, "teacherEmail", &email)
            .await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

/// Used both for teacher edits and for admin status changes (approve / reject).
pub async fn update_class(
    State(state): State<AppState>,
    class_id: PublicClassId,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let patch = documents::accept(body)?;

    let row = document_repo::merge(&state.db, Collection::Classes, class_id.id, patch)
        .await?
        .ok_or(AppError::not_found("class"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}

pub async fn delete_class(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<StatusCode, AppError> {
    let deleted = document_repo::delete(&state.db, Collection::Classes, class_id.id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("class"))
    }
}

// 件数系・子コレクション一覧は公開 ID 文字列をそのまま classId と突き合わせる

pub async fn count_enrollments(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<Json<Value>, AppError> {
    let n =
        document_repo::count_by_field(&state.db, Collection::Payments, "classId", &class_id.public)
            .await?;
    Ok(Json(json!({ "totalEnrollClass": n })))
}

pub async fn count_assignments(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<Json<Value>, AppError> {
    let n =
        document_repo::count_by_field(&state.db, Collection::Assignments, "classId", &class_id.public)
            .await?;
    Ok(Json(json!({ "totalAssignmentPost": n })))
}

pub async fn count_submissions(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<Json<Value>, AppError> {
    let n =
        document_repo::count_by_field(&state.db, Collection::Submissions, "classId", &class_id.public)
            .await?;
    Ok(Json(json!({ "totalSubmitPost": n })))
}

pub async fn list_class_assignments(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows =
        document_repo::find_by_field(&state.db, Collection::Assignments, "classId", &class_id.public)
            .await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn list_class_feedbacks(
    State(state): State<AppState>,
    class_id: PublicClassId,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows =
        document_repo::find_by_field(&state.db, Collection::Feedbacks, "classId", &class_id.public)
            .await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}
