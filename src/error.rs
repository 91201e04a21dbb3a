use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TripError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TripResult<T> = Result<T, TripError>;

impl TripError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TripError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        TripError::NotFound(msg.into())
    }

    /// The response for a trip that is missing, soft-deleted or owned by someone else.
    pub fn trip_not_found() -> Self {
        TripError::NotFound("Trip not found or access denied".to_string())
    }
}

impl ResponseError for TripError {
    fn status_code(&self) -> StatusCode {
        match self {
            TripError::Validation(_) => StatusCode::BAD_REQUEST,
            TripError::NotFound(_) => StatusCode::NOT_FOUND,
            TripError::Conflict(_) => StatusCode::CONFLICT,
            TripError::Database(_) | TripError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("Trip request failed: {}", self);
        }

        HttpResponse::build(self.status_code()).json(json!({
            "status": "Error",
            "message": self.to_string(),
        }))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
