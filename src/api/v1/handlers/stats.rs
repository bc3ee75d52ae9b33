use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    error::AppError,
    repos::document_repo::{self, Collection},
    state::AppState,
};

/// Landing-page counters: accounts, classes and enrolments (recorded payments).
pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let user = document_repo::count(&state.db, Collection::Users).await?;
    let classes = document_repo::count(&state.db, Collection::Classes).await?;
    let enroll = document_repo::count(&state.db, Collection::Payments).await?;

    Ok(Json(json!({ "user": user, "classes": classes, "enroll": enroll })))
}
