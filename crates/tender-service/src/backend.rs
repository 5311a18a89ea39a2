//! The payment backend capability.
//!
//! A backend is anything that can hold customers and card sources and charge
//! them. The Stripe client implements it for production; tests substitute a
//! double. Conn flows only ever talk to a backend through this trait.

use async_trait::async_trait;

use tender_core::{
    ChargeOutcome, Currency, PaymentError, RemoteCustomerId, ServiceToken, SourceRef,
};

/// Outcome of a failed backend call, already decoded.
///
/// The backend's error channel is treated as a tagged result: either a
/// structured rejection with a message, a payload that could not be decoded,
/// or a failure to get any answer at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a structured error.
    #[error("{message}")]
    Rejected {
        /// Human-readable message from the backend.
        message: String,
        /// Machine code (e.g. `card_declined`), if any.
        code: Option<String>,
        /// Error category (e.g. `card_error`), if any.
        kind: Option<String>,
    },

    /// The backend answered with an error that could not be decoded.
    #[error("undecodable error payload: {detail}")]
    MalformedPayload {
        /// Status and decoder message.
        detail: String,
    },

    /// A success response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No answer was received.
    #[error("transport error: {0}")]
    Transport(String),
}

impl BackendError {
    /// A rejection with only a message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            code: None,
            kind: None,
        }
    }

    /// Attach the in-flight operation and convert into the public taxonomy.
    #[must_use]
    pub fn into_payment_error(self, operation: &'static str) -> PaymentError {
        match self {
            Self::Rejected { message, code, .. } => PaymentError::RemoteService {
                operation,
                message,
                code,
            },
            Self::MalformedPayload { detail } => {
                PaymentError::MalformedRemoteError { operation, detail }
            }
            other @ (Self::UnexpectedResponse(_) | Self::Transport(_)) => {
                PaymentError::RemoteService {
                    operation,
                    message: other.to_string(),
                    code: None,
                }
            }
        }
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Capability interface over a payment service.
///
/// Implementations must be safe to share between concurrent operations;
/// nothing here takes `&mut self`.
#[async_trait]
pub trait PaymentBackend: Send + Sync + 'static {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Create a remote customer keyed by email.
    async fn create_customer(&self, email: &str) -> BackendResult<RemoteCustomerId>;

    /// Register a client-side token as a card source on a customer.
    async fn create_card_source(
        &self,
        customer: &RemoteCustomerId,
        token: &ServiceToken,
    ) -> BackendResult<SourceRef>;

    /// Remove a card source from a customer.
    async fn delete_card_source(
        &self,
        source: &SourceRef,
        customer: &RemoteCustomerId,
    ) -> BackendResult<()>;

    /// Charge a customer's card source.
    async fn create_charge(
        &self,
        amount_in_cents: u64,
        currency: &Currency,
        customer: &RemoteCustomerId,
        source: &SourceRef,
    ) -> BackendResult<ChargeOutcome>;
}
