use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nomad_core::request::ValidationError;
use nomad_core::RoomId;
use nomad_trips::{CoordinatorError, TripError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Authorization(String),
    Validation(ValidationError),
    NotFound(String),
    /// Requested rooms are unavailable for the requested interval; a
    /// normal outcome the caller retries with different rooms or dates.
    RoomConflict { room_ids: Vec<RoomId> },
    /// State-machine conflict, e.g. approving an already-rejected trip.
    Conflict(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation failed",
                    "fields": err.errors,
                })),
            )
                .into_response(),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::RoomConflict { room_ids } => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "requested rooms are not available",
                    "rooms": room_ids,
                })),
            )
                .into_response(),
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<TripError> for AppError {
    fn from(err: TripError) -> Self {
        match err {
            TripError::NotFound(id) => Self::NotFound(format!("trip not found: {id}")),
            TripError::InvalidTransition { from, to } => {
                Self::Conflict(format!("cannot transition trip from {from} to {to}"))
            }
            // Storage and invariant failures never leak internals.
            TripError::Storage(err) => Self::Internal(err.to_string()),
            TripError::Coordinator(CoordinatorError::Storage(err)) => {
                Self::Internal(err.to_string())
            }
            TripError::Coordinator(CoordinatorError::Invariant(msg)) => Self::Internal(msg),
            TripError::InvariantViolation { .. } => Self::Internal(err.to_string()),
        }
    }
}
