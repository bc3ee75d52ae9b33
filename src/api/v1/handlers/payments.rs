/*
 * Responsibility
 * - 決済: PaymentIntent の作成 (外部決済サービス) と、決済完了後の記録
 * - 記録時に対象授業の total_enrolment を 1 加算する (記録と加算は同一トランザクションではない)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    api::v1::{
        dto::{
            documents,
            payments::{PaymentIntentRequest, PaymentIntentResponse, RecordPaymentResponse},
        },
        extractors::{AuthCtxExtractor, public_id::PublicPaymentId},
    },
    error::AppError,
    repos::{
        class_repo,
        document_repo::{self, Collection},
    },
    services::payment::price_to_cents,
    state::AppState,
};

const CURRENCY: &str = "usd";

pub async fn create_intent(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let amount_cents = price_to_cents(&req.price)?;

    let client_secret = state.payments.create_intent(amount_cents, CURRENCY).await?;
    tracing::info!(email = %ctx.email, amount_cents, "payment intent created");

    Ok(Json(PaymentIntentResponse { client_secret }))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), AppError> {
    let doc = documents::accept(body)?;
    let class_id = state
        .id_codec
        .decode(documents::required_str(&doc, "classId")?)?;

    let row = document_repo::insert(&state.db, Collection::Payments, doc).await?;
    let enrolment_updated = class_repo::increment_enrolment(&state.db, class_id).await?;
    if !enrolment_updated {
        tracing::warn!(class_id, "payment recorded for a class that does not exist");
    }

    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse {
            payment: documents::render(&state.id_codec, row)?,
            enrolment_updated,
        }),
    ))
}

pub async fn list_payments_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows =
        document_repo::find_by_field(&state.db, Collection::Payments, "paymentUserEmail", &email)
            .await?;
    Ok(Json(documents::render_all(&state.id_codec, rows)?))
}

pub async fn get_payment(
    State(state): State<AppState>,
    payment_id: PublicPaymentId,
) -> Result<Json<Value>, AppError> {
    let row = document_repo::get(&state.db, Collection::Payments, payment_id.id)
        .await?
        .ok_or(AppError::not_found("payment"))?;

    Ok(Json(documents::render(&state.id_codec, row)?))
}
