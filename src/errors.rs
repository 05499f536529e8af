use crate::date_stamp::DateStamp;
use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the key-value collaborator or of the blobs it holds.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt data under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize data for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("{0}")]
    Validation(String),

    #[error("habit '{0}' not found")]
    NotFound(String),

    #[error("data under key '{key}' was modified by another writer")]
    ConcurrentModification { key: String },

    /// The habit kept its completion but the day's progress count did not
    /// get it. Completing again reports the day as already done and leaves
    /// the count as it is.
    #[error("habit '{name}' was completed on {day} but progress was not recorded: {source}")]
    ProgressNotRecorded {
        name: String,
        day: DateStamp,
        #[source]
        source: Box<HabitError>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl HabitError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
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
}

impl From<HabitError> for AppError {
    fn from(err: HabitError) -> Self {
        let status = match &err {
            HabitError::Validation(_) => StatusCode::BAD_REQUEST,
            HabitError::NotFound(_) => StatusCode::NOT_FOUND,
            HabitError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            HabitError::ProgressNotRecorded { .. } | HabitError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
