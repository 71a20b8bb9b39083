use axum::{http::StatusCode, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("origin denied")]
    OriginDenied,
    #[error("rate limited")]
    RateLimited,
    #[error("request too large")]
    RequestTooLarge,
    #[error("no active project session")]
    SessionNotConfigured,
    #[error("file path is empty or names the project root")]
    EmptyPath,
    #[error("absolute file paths are not allowed: {path}")]
    AbsolutePathRejected { path: String },
    #[error("path traversal rejected: {path}")]
    TraversalRejected { path: String },
    #[error("not found")]
    NotFound,
    #[error("file exceeds the read limit")]
    FileTooLarge,
    #[error("invalid project root: {0}")]
    InvalidRoot(String),
    #[error("resource error: {0}")]
    ResourceError(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Unauthorized",
            AppError::OriginDenied => "OriginDenied",
            AppError::RateLimited => "RateLimited",
            AppError::RequestTooLarge => "RequestTooLarge",
            AppError::SessionNotConfigured => "SessionNotConfigured",
            AppError::EmptyPath => "EmptyPath",
            AppError::AbsolutePathRejected { .. } => "AbsolutePathRejected",
            AppError::TraversalRejected { .. } => "TraversalRejected",
            AppError::NotFound => "NotFound",
            AppError::FileTooLarge => "FileTooLarge",
            AppError::InvalidRoot(_) => "InvalidRoot",
            AppError::ResourceError(_) => "ResourceError",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::OriginDenied | AppError::TraversalRejected { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::RequestTooLarge | AppError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::SessionNotConfigured => StatusCode::CONFLICT,
            AppError::EmptyPath
            | AppError::AbsolutePathRejected { .. }
            | AppError::InvalidRoot(_)
            | AppError::ResourceError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn into_response(err: AppError) -> (StatusCode, Json<ErrorBody>) {
    let code = err.code();
    let message = err.to_string();
    (err.status(), Json(ErrorBody { code, message }))
}
