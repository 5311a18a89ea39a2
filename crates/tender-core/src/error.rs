//! Error types for tender.

use crate::ids::{CardId, IdError, SourceRef, UserId};

/// Result type for tender operations.
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors that can occur in payment driver operations.
///
/// Every variant carries enough context (operation and identifiers) to be
/// logged and reconciled. Nothing in tender retries on any of these.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    // =========================================================================
    // Registry
    // =========================================================================
    /// A driver is already registered under this name.
    #[error("payment driver already registered: {name}")]
    DuplicateDriver {
        /// The contested driver name.
        name: String,
    },

    /// No driver is registered under this name.
    #[error("unknown payment driver: {name}")]
    DriverNotFound {
        /// The requested driver name.
        name: String,
    },

    // =========================================================================
    // Customer binding and onboarding
    // =========================================================================
    /// The user has no remote customer at the payment backend yet.
    #[error("user {user_id} has no remote customer")]
    UnboundCustomer {
        /// The unbound user.
        user_id: UserId,
    },

    /// The user is already bound to a remote customer.
    #[error("user {user_id} is already bound to a remote customer")]
    CustomerAlreadyBound {
        /// The bound user.
        user_id: UserId,
    },

    /// The user does not exist in storage.
    #[error("user not found: {user_id}")]
    UserNotFound {
        /// The missing user.
        user_id: UserId,
    },

    /// The billing postal code is shorter than five characters.
    #[error("billing zip must contain at least {required} characters")]
    InvalidZip {
        /// Minimum number of characters.
        required: usize,
    },

    /// The postal code hash could not be derived.
    #[error("secret derivation failed: {0}")]
    SecretDerivation(String),

    /// Card metadata failed validation.
    #[error("invalid card details: {0}")]
    InvalidCardDetails(String),

    /// The currency is not a three-letter ISO code.
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),

    /// The backend's error payload could not be decoded.
    #[error("malformed error from payment backend during {operation}: {detail}")]
    MalformedRemoteError {
        /// The operation that was in flight.
        operation: &'static str,
        /// What could not be decoded.
        detail: String,
    },

    /// The payment backend rejected or failed the request.
    #[error("payment backend error during {operation}: {message}")]
    RemoteService {
        /// The operation that was in flight.
        operation: &'static str,
        /// The decoded backend message.
        message: String,
        /// Backend error code, when one was supplied (e.g. `card_declined`).
        code: Option<String>,
    },

    // =========================================================================
    // Charge and removal
    // =========================================================================
    /// No card record exists with this id.
    #[error("card not found: {card_id}")]
    CardNotFound {
        /// The missing card.
        card_id: CardId,
    },

    /// The card's owner could not be resolved to a remote customer.
    #[error("cannot resolve remote customer for card {card_id} (user {user_id})")]
    CustomerResolution {
        /// The card being charged.
        card_id: CardId,
        /// The card's owner.
        user_id: UserId,
    },

    /// The card exists but belongs to a different user than the requester.
    #[error("card {card_id} does not belong to user {user_id}")]
    OwnershipMismatch {
        /// The card.
        card_id: CardId,
        /// The requesting user.
        user_id: UserId,
    },

    /// The local card record was deleted but the remote source was not.
    ///
    /// Operators must remove `remote_source` at the backend by hand.
    #[error("card {card_id} deleted locally but remote source {remote_source} remains: {reason}")]
    RemoteCleanup {
        /// The deleted card.
        card_id: CardId,
        /// The backend reference left behind.
        remote_source: SourceRef,
        /// Why remote deletion failed.
        reason: String,
    },

    // =========================================================================
    // Ambient
    // =========================================================================
    /// The operation did not complete within the configured deadline.
    #[error("{operation} timed out")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
    },

    /// A storage operation failed.
    #[error("storage error during {operation}: {message}")]
    Storage {
        /// The operation that was in flight.
        operation: &'static str,
        /// The underlying error.
        message: String,
    },

    /// Driver or service configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

impl PaymentError {
    /// Short machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateDriver { .. } => "duplicate_driver",
            Self::DriverNotFound { .. } => "driver_not_found",
            Self::UnboundCustomer { .. } => "unbound_customer",
            Self::CustomerAlreadyBound { .. } => "customer_already_bound",
            Self::UserNotFound { .. } => "user_not_found",
            Self::InvalidZip { .. } => "invalid_zip",
            Self::SecretDerivation(_) => "secret_derivation_failed",
            Self::InvalidCardDetails(_) => "invalid_card_details",
            Self::InvalidCurrency(_) => "invalid_currency",
            Self::MalformedRemoteError { .. } => "malformed_remote_error",
            Self::RemoteService { .. } => "remote_service_error",
            Self::CardNotFound { .. } => "card_not_found",
            Self::CustomerResolution { .. } => "customer_resolution_failed",
            Self::OwnershipMismatch { .. } => "ownership_mismatch",
            Self::RemoteCleanup { .. } => "remote_cleanup_failed",
            Self::Timeout { .. } => "timeout",
            Self::Storage { .. } => "storage_error",
            Self::Configuration(_) => "configuration_error",
            Self::InvalidId(_) => "invalid_id",
        }
    }
}
