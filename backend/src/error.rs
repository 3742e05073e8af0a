use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced directly to an HTTP caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Invalid JSON in field '{field}': {source}")]
    InvalidJson {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("Field '{field}' exceeds {limit} bytes")]
    FieldTooLarge { field: String, limit: usize },

    #[error(transparent)]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error("Batch {0} is still running")]
    BatchInFlight(String),

    #[error("Batch not found")]
    BatchNotFound,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedUpload(_)
            | AppError::InvalidJson { .. }
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::FieldTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BatchInFlight(_) => StatusCode::CONFLICT,
            AppError::BatchNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
