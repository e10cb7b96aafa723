use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// The compensation engine's single error taxonomy (§7).
///
/// Every fallible operation in `services` returns `Result<_, AppError>`;
/// the HTTP layer's `IntoResponse` impl is the only place that maps a
/// variant to a status code, following the teacher's pattern of one
/// `thiserror` enum per service surface (`OAuthError`, `GroqError`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("amount below minimum withdrawal")]
    MinWithdrawal,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient database error: {0}")]
    Transient(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            other => AppError::Transient(other.to_string()),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientFunds => StatusCode::BAD_REQUEST,
            AppError::MinWithdrawal => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::Transient(_)) {
            tracing::error!(error = %self, "transient failure surfaced to caller");
        }
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
