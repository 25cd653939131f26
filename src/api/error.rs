//! API errors and their HTTP status codes

use serde::Serialize;
use thiserror::Error;

use crate::core::services::ExportRetryError;

/// Error class, one per HTTP status the API emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 404
    NotFound,
    /// 400
    BadRequest,
    /// 500
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    /// HTTP status code
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }

    /// Code as it appears in the response envelope
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// A failed API call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", .code.as_str())]
pub struct ApiError {
    /// Error class
    pub code: ErrorCode,
    /// Message shown to the caller
    pub message: String,
}

impl ApiError {
    fn new<M: Into<String>>(code: ErrorCode, message: M) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Unknown inspection or export record
    #[must_use]
    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Malformed or refused request
    #[must_use]
    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Storage or other unexpected failure
    #[must_use]
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// HTTP status code
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(format!("Invalid JSON: {err}"))
    }
}

impl From<ExportRetryError> for ApiError {
    fn from(err: ExportRetryError) -> Self {
        let code = match &err {
            ExportRetryError::NotFound(_) => ErrorCode::NotFound,
            ExportRetryError::AlreadySucceeded(_)
            | ExportRetryError::RetryLimit { .. }
            | ExportRetryError::Blocked { .. } => ErrorCode::BadRequest,
            ExportRetryError::Storage(_) => ErrorCode::Internal,
        };
        Self::new(code, err.to_string())
    }
}

/// Error body of the response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorData {
    /// `NOT_FOUND`, `BAD_REQUEST` or `INTERNAL_ERROR`
    pub code: String,
    /// Message shown to the caller
    pub message: String,
}

impl From<&ApiError> for ApiErrorData {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
        }
    }
}
