/*
 * Responsibility
 * - 課題の投稿と提出
 * - 課題は classId (公開 ID) で授業に紐づく。提出は課題側の classId を引き継ぐ
 */
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use crate::{
    api::v1::{dto::documents, extractors::public_id::PublicAssignmentId},
    error::AppError,
    repos::document_repo::{self, Collection},
    state::AppState,
};

pub async fn create_assignment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doc = documents::accept(body)?;
    let class_id = documents::required_str(&doc, "classId")?;
    // 形式だけ確認する (授業の存在までは見ない)
    state.id_codec.decode(class_id)?;

    let row = document_repo::insert(&state.db, Collection::Assignments, doc).await?;
    Ok((
        StatusCode::CREATED,
        Json(documents::render(&state.id_codec, row)?),
    ))
}

pub async fn submit_assignment(
    State(state): State<AppState>,
    assignment_id: PublicAssignmentId,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut doc = documents::accept(body)?;

    let assignment = document_repo::get(&state.db, Collection::Assignments, assignment_id.id)
        .await?
        .ok_or(AppError::not_found("assignment"))?;

    if let Value::Object(map) = &mut doc {
        map.insert(
            "assignmentId".into(),
            Value::String(assignment_id.public.clone()),
        );
        if let Some(class_id) = assignment.str_field("classId") {
            map.insert("classId".into(), Value::String(class_id.to_owned()));
        }
    }

    let row = document_repo::insert(&state.db, Collection::Submissions, doc).await?;
    Ok((
        StatusCode::CREATED,
        Json(documents::render(&state.id_codec, row)?),
    ))
}
