/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / IdCodecError / GateRejection / PaymentError を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::GateRejection;
use crate::services::id_codec::IdCodecError;
use crate::services::payment::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },
    #[error("forbidden")]
    Forbidden,
    #[error("conflict: {message}")]
    Conflict { message: &'static str },
    #[error("{0} unavailable")]
    ServiceUnavailable(&'static str),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Unauthorized { code, message } => (StatusCode::UNAUTHORIZED, code, message),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "forbidden access".into()),
            AppError::Conflict { message } => (StatusCode::CONFLICT, "CONFLICT", message.into()),
            AppError::ServiceUnavailable(what) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                format!("{what} unavailable"),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<GateRejection> for AppError {
    fn from(r: GateRejection) -> Self {
        match r {
            GateRejection::MissingCredential => AppError::Unauthorized {
                code: "MISSING_CREDENTIAL",
                message: "unauthorized access".into(),
            },
            GateRejection::InvalidOrExpiredCredential => AppError::Unauthorized {
                code: "INVALID_CREDENTIAL",
                message: "invalid or expired credential".into(),
            },
            GateRejection::InsufficientRole => AppError::Forbidden,
            GateRejection::StoreLookupFailure => AppError::ServiceUnavailable("credential store"),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotAnObject => {
                AppError::bad_request("INVALID_DOCUMENT", "body must be a JSON object")
            }
            RepoError::Conflict => AppError::Conflict {
                message: "a document with the same unique key already exists",
            },
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /classes/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
            }
            // These indicate server-side config / programming errors
            _ => AppError::Internal,
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::InvalidAmount => {
                AppError::bad_request("INVALID_PRICE", "price must be at least one cent")
            }
            PaymentError::NotConfigured => AppError::ServiceUnavailable("payment processor"),
            PaymentError::Transport(err) => {
                tracing::error!(error = %err, "payment processor unreachable");
                AppError::ServiceUnavailable("payment processor")
            }
            PaymentError::Upstream { .. } => AppError::ServiceUnavailable("payment processor"),
        }
    }
}
