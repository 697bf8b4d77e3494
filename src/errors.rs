use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Application error type.
///
/// Every handler failure is converted into exactly one of these and rendered
/// as a single JSON envelope, which the client surfaces as a notification.
#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    NotFound(String),
    Validation(String),
    Database(String),
    Storage(String),
    /// LLM credential missing or rejected by the provider.
    LlmConfig(String),
    /// Provider-reported quota/billing failure.
    LlmQuota(String),
    /// Model returned something that does not parse into quiz questions.
    LlmOutput(String),
    /// Any other upstream LLM failure (network included).
    LlmRequest(String),
    Internal(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::LlmConfig(_) => "LLM_CONFIG_ERROR",
            AppError::LlmQuota(_) => "LLM_QUOTA_ERROR",
            AppError::LlmOutput(_) => "LLM_OUTPUT_ERROR",
            AppError::LlmRequest(_) => "LLM_REQUEST_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Database(msg)
            | AppError::Storage(msg)
            | AppError::LlmConfig(msg)
            | AppError::LlmQuota(msg)
            | AppError::LlmOutput(msg)
            | AppError::LlmRequest(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

#[derive(Serialize)]
struct ErrorDetails {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetails,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::LlmConfig(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::LlmQuota(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::LlmOutput(_) | AppError::LlmRequest(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: ErrorDetails {
                code: self.error_code(),
                message: self.message().to_string(),
            },
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Row not found".to_string()),
            other => AppError::Database(format!("Database error: {}", other)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", err);
        AppError::Internal(format!("Internal error: {}", err))
    }
}
