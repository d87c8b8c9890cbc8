use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kurz_engine::EngineError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("short code not found")]
    NotFound,
    #[error("stored url for {code} is not a valid Location header")]
    UnredirectableUrl { code: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::Engine(EngineError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Engine(EngineError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Engine(
                EngineError::Store(_) | EngineError::CodeCollision(_) | EngineError::Inconsistent(_),
            )
            | AppError::UnredirectableUrl { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_retriable(&self) -> bool {
        matches!(self, AppError::Engine(e) if e.is_retriable())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            if self.is_retriable() {
                warn!(error = %self, "request failed, store unavailable");
            } else {
                error!(error = %self, "request failed");
            }
        }

        let body = ErrorBody {
            error: match status {
                StatusCode::NOT_FOUND => "short code not found".to_string(),
                StatusCode::SERVICE_UNAVAILABLE => "service temporarily unavailable".to_string(),
                StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
                _ => self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
