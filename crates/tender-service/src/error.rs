//! API error types and responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tender_core::PaymentError;
use tender_store::StoreError;

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A payment operation failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The request body could not be read.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Payment(err) => payment_status(err),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn payment_status(err: &PaymentError) -> StatusCode {
    match err {
        PaymentError::UserNotFound { .. } | PaymentError::CardNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        PaymentError::OwnershipMismatch { .. } => StatusCode::FORBIDDEN,
        PaymentError::UnboundCustomer { .. }
        | PaymentError::CustomerAlreadyBound { .. }
        | PaymentError::CustomerResolution { .. } => StatusCode::CONFLICT,
        PaymentError::InvalidZip { .. }
        | PaymentError::InvalidCardDetails(_)
        | PaymentError::InvalidCurrency(_)
        | PaymentError::InvalidId(_) => StatusCode::BAD_REQUEST,
        PaymentError::RemoteService { .. }
        | PaymentError::MalformedRemoteError { .. }
        | PaymentError::RemoteCleanup { .. } => StatusCode::BAD_GATEWAY,
        PaymentError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        PaymentError::DuplicateDriver { .. }
        | PaymentError::DriverNotFound { .. }
        | PaymentError::SecretDerivation(_)
        | PaymentError::Storage { .. }
        | PaymentError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (code, message, details) = match &self {
            Self::Payment(err) if status.is_server_error() && !is_remote(err) => {
                tracing::error!(error = %err, "Payment operation failed");
                (
                    err.code(),
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Payment(err) => (err.code(), err.to_string(), payment_details(err)),
            Self::BadRequest(msg) => ("invalid_request", msg.clone(), None),
            Self::NotFound(msg) => ("not_found", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Errors caused by the payment service rather than by us.
fn is_remote(err: &PaymentError) -> bool {
    matches!(
        err,
        PaymentError::RemoteService { .. }
            | PaymentError::MalformedRemoteError { .. }
            | PaymentError::RemoteCleanup { .. }
            | PaymentError::Timeout { .. }
    )
}

fn payment_details(err: &PaymentError) -> Option<serde_json::Value> {
    match err {
        PaymentError::RemoteService {
            code: Some(code), ..
        } => Some(serde_json::json!({ "remoteCode": code })),
        PaymentError::RemoteCleanup {
            card_id,
            remote_source,
            ..
        } => Some(serde_json::json!({
            "cardId": card_id,
            "remoteSource": remote_source.as_str(),
        })),
        _ => None,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            other => Self::Internal(other.to_string()),
        }
    }
}
