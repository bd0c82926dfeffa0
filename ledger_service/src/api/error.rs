use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::LedgerError;

/// The wire shape of every error response. Keeping this distinct from
/// `LedgerError` means the internal error's `Display` text (which can
/// include repository/bus error detail) never has to be trusted as
/// client-safe — only the variants mapped explicitly below reach the
/// response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub message: String,
}

impl From<LedgerError> for (StatusCode, ApiError) {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::WalletNotFound(id) => (
                StatusCode::NOT_FOUND,
                ApiError {
                    message: format!("wallet {id} not found"),
                },
            ),
            LedgerError::ReferenceIdTaken => (
                StatusCode::CONFLICT,
                ApiError {
                    message: "reference_id already in use".to_string(),
                },
            ),
            LedgerError::DuplicatePendingTransfer(id) => (
                StatusCode::CONFLICT,
                ApiError {
                    message: format!("transfer {id} is already pending"),
                },
            ),
            LedgerError::InsufficientBalance(id) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    message: format!("wallet {id} has insufficient balance"),
                },
            ),
            LedgerError::NegativeAmount => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    message: "amount must not be negative".to_string(),
                },
            ),
            LedgerError::InvalidData(msg) => (StatusCode::BAD_REQUEST, ApiError { message: msg }),
            LedgerError::InvalidEventType | LedgerError::UnsupportedEventType | LedgerError::UnsupportedEventVersion => {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError {
                        message: "event could not be processed".to_string(),
                    },
                )
            }
            LedgerError::Repository(_) | LedgerError::Bus(_) | LedgerError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError {
                    message: "internal error".to_string(),
                },
            ),
        }
    }
}

pub struct ApiErrorResponse(pub LedgerError);

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let (status, body) = self.0.into();
        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}
