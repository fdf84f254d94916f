use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Every failure the service can surface to a caller.
///
/// Stage errors (formatting, encoding, rendering, storage) travel through `?`
/// untouched, so the kind a handler reports is the kind the stage raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("unsupported variant `{0}`")]
    UnsupportedVariant(String),

    #[error("unsupported render type `{0}`")]
    UnsupportedRenderType(String),

    #[error("content too large for a QR code: {0}")]
    CapacityExceeded(String),

    // Absent and not-visible records look the same to the caller.
    #[error("resource not found")]
    NotFound,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::UnsupportedVariant(_) => "UnsupportedVariantError",
            AppError::UnsupportedRenderType(_) => "UnsupportedRenderTypeError",
            AppError::CapacityExceeded(_) => "CapacityExceededError",
            AppError::NotFound => "NotFound",
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::Internal(_) => "InternalError",
        }
    }

    /// Classifies a body deserialization failure: an unknown enum tag is an
    /// unsupported variant, anything else is a malformed request.
    pub fn from_json(err: serde_json::Error) -> Self {
        let message = err.to_string();
        if message.contains("unknown variant") {
            AppError::UnsupportedVariant(message)
        } else {
            AppError::Validation(message)
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::UnsupportedVariant(_)
            | AppError::UnsupportedRenderType(_)
            | AppError::CapacityExceeded(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("request failed: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Internal(format!("Database error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
