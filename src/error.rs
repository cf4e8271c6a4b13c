use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const SUMMARIZATION_HINT: &str =
    "Try using slightly shorter text or adjusting the length parameters.";

/// Failures at the orchestrator boundary, every one of them is reported to the user.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SummarizeError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Failed to load the summarization model: {0}")]
    ModelLoad(String),
    #[error("An error occurred during summarization: {message}")]
    Summarization { message: String, hint: String },
}

impl SummarizeError {
    pub fn summarization(err: impl std::fmt::Display) -> Self {
        SummarizeError::Summarization {
            message: err.to_string(),
            hint: SUMMARIZATION_HINT.into(),
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            SummarizeError::Summarization { hint, .. } => Some(hint),
            SummarizeError::ModelLoad(_) => Some("Please try again later."),
            SummarizeError::Validation(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SummarizeError::Validation(_) => StatusCode::BAD_REQUEST,
            SummarizeError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            SummarizeError::Summarization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Taken from https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub struct RunnerError {
    pub status: StatusCode,
    pub message: HttpErrorResponse,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HttpErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<String> for HttpErrorResponse {
    fn from(message: String) -> Self {
        HttpErrorResponse {
            error: message,
            hint: None,
        }
    }
}

impl IntoResponse for RunnerError {
    fn into_response(self) -> Response {
        let mut res = Json(self.message).into_response();
        *res.status_mut() = self.status;
        res
    }
}

impl From<SummarizeError> for RunnerError {
    fn from(err: SummarizeError) -> Self {
        RunnerError {
            status: err.status(),
            message: HttpErrorResponse {
                error: err.to_string(),
                hint: err.hint().map(str::to_string),
            },
        }
    }
}

impl From<anyhow::Error> for RunnerError {
    fn from(err: anyhow::Error) -> Self {
        RunnerError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: HttpErrorResponse::from(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for RunnerError {
    fn from(err: tokio::task::JoinError) -> Self {
        RunnerError::from(anyhow::Error::from(err))
    }
}

pub type RunnerResult<T, E = RunnerError> = Result<T, E>;

#[macro_export]
macro_rules! bail_runner {
    ($error_message:expr) => {
        return Err($crate::error::RunnerError {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: $crate::error::HttpErrorResponse::from($error_message),
        })
    };
    ($status_code:expr, $error_message:expr) => {
        return Err($crate::error::RunnerError {
            status: $status_code,
            message: $crate::error::HttpErrorResponse::from($error_message),
        })
    };
    ($status:expr, $fmt:expr $(, $arg:expr)*) => {
        return Err($crate::error::RunnerError {
            status: $status,
            message: $crate::error::HttpErrorResponse::from(format!($fmt $(, $arg)*)),
        })
    };
}
