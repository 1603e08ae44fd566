//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use giftplanner_actors::ActorError;
use giftplanner_core::command::FailureReason;
use giftplanner_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The event log could not be prepared.
    #[error("event log error: {0}")]
    EventLog(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// The actor runtime answered with an error.
    Actor(ActorError),
    /// A query found nothing.
    NotFound(String),
    /// The request could not be turned into a command.
    BadRequest(String),
}

impl From<ActorError> for ApiError {
    fn from(err: ActorError) -> Self {
        Self::Actor(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Actor(ActorError::Rejected(failure)) => {
                let status = match failure.reason {
                    FailureReason::NotFound | FailureReason::ChildNotFound => StatusCode::NOT_FOUND,
                    FailureReason::AlreadyExists | FailureReason::InvalidState => {
                        StatusCode::CONFLICT
                    }
                    FailureReason::InvalidInput => StatusCode::BAD_REQUEST,
                };
                (status, failure.reason.code())
            }
            Self::Actor(ActorError::Timeout(_)) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Self::Actor(ActorError::Unavailable { .. } | ActorError::Stopped) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
            }
            Self::Actor(ActorError::Infrastructure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Actor(ActorError::Rejected(failure)) => failure.message.clone(),
            Self::Actor(err) => err.to_string(),
            Self::NotFound(message) | Self::BadRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = error_code, message = %self.message(), "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}
