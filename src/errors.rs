use crate::models::{HabitId, HabitKind};
use axum::http::StatusCode;
use chrono::NaiveDate;

/// Validation failures raised by the habit core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HabitError {
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("unknown repeat '{0}', expected daily, weekly, monthly or yearly")]
    InvalidRepeat(String),
    #[error("unknown habit type '{0}', expected boolean or percentage")]
    InvalidKind(String),
    #[error("value {value} is not allowed for a {kind} habit")]
    InvalidValue { value: i64, kind: HabitKind },
    #[error("habit name must not be empty")]
    EmptyName,
    #[error("habit {0} not found")]
    NotFound(HabitId),
    #[error("habit id {0} appears more than once")]
    DuplicateId(HabitId),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid habit data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid habit row: {0}")]
    Invalid(#[from] HabitError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<HabitError> for AppError {
    fn from(err: HabitError) -> Self {
        match err {
            HabitError::NotFound(_) => Self::not_found(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
