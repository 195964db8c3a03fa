use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TransitionError;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category, e.g. "Not Found"
    pub error: String,
    /// Stable machine-readable kind, e.g. "invalid_transition"
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Terminal state violation: {0}")]
    TerminalStateViolation(String),

    #[error("Concurrent modification of batch {0}")]
    ConcurrentModification(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Farm {0} is not approved to register batches")]
    FarmNotApproved(Uuid),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { .. } => {
                ServiceError::InvalidTransition(err.to_string())
            }
            TransitionError::TerminalState => ServiceError::TerminalStateViolation(err.to_string()),
            TransitionError::OutOfOrder { .. } => ServiceError::ValidationError(err.to_string()),
        }
    }
}

impl ServiceError {
    pub fn not_found(kind: &str, key: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", kind, key))
    }

    /// Callers may re-read and retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::ConcurrentModification(_) | ServiceError::StoreUnavailable(_)
        )
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition(_) | Self::TerminalStateViolation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::FarmNotApproved(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ConcurrentModification(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::HashError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::NotFound(_) => "not_found",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::TerminalStateViolation(_) => "terminal_state_violation",
            Self::ConcurrentModification(_) => "concurrent_modification",
            Self::ValidationError(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::FarmNotApproved(_) => "farm_not_approved",
            Self::HashError(_) | Self::InternalError(_) => "internal_error",
        }
    }

    /// Message safe to show to clients. Store and internal failures are
    /// reported generically.
    pub fn response_message(&self) -> String {
        match self {
            Self::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            Self::HashError(_) | Self::InternalError(_) => "Internal server error".to_string(),
            Self::ConcurrentModification(_) => {
                "Batch was modified by another request; reload and retry".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            code: self.code().to_string(),
            message: self.response_message(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// Startup and infrastructure failures share the service error type.
pub type AppError = ServiceError;
