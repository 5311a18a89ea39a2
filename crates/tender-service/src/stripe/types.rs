//! Stripe API types.

use serde::Deserialize;

/// Stripe customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    /// Stripe customer ID.
    pub id: String,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
    /// Created timestamp (Unix).
    #[serde(default)]
    pub created: i64,
}

/// Stripe card source attached to a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    /// Card ID (`card_...`).
    pub id: String,
    /// Owning customer.
    #[serde(default)]
    pub customer: Option<String>,
    /// Last four digits.
    #[serde(default)]
    pub last4: Option<String>,
    /// Card brand.
    #[serde(default)]
    pub brand: Option<String>,
}

/// Stripe charge object.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    /// Charge ID (`ch_...`).
    pub id: String,
    /// Amount in minor units.
    pub amount: u64,
    /// Currency (e.g., "usd").
    pub currency: String,
    /// Status (succeeded, pending, failed).
    pub status: String,
    /// Whether the charge was paid.
    #[serde(default)]
    pub paid: bool,
    /// Customer ID.
    #[serde(default)]
    pub customer: Option<String>,
    /// Failure code, for failed charges.
    #[serde(default)]
    pub failure_code: Option<String>,
    /// Failure message, for failed charges.
    #[serde(default)]
    pub failure_message: Option<String>,
}

/// Response to a delete call.
#[derive(Debug, Clone, Deserialize)]
pub struct DeletedObject {
    /// ID of the deleted object.
    pub id: String,
    /// Always `true` on success.
    #[serde(default)]
    pub deleted: bool,
}

/// Stripe API error response.
///
/// Stripe wraps errors in an `error` object. Some proxies and older SDKs
/// surface the bare detail instead, so both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StripeErrorResponse {
    /// `{"error": {...}}`
    Wrapped {
        /// Error details.
        error: StripeErrorDetail,
    },
    /// `{"message": ...}`
    Flat(StripeErrorDetail),
}

impl StripeErrorResponse {
    /// The error detail regardless of envelope.
    #[must_use]
    pub fn into_detail(self) -> StripeErrorDetail {
        match self {
            Self::Wrapped { error } | Self::Flat(error) => error,
        }
    }
}

/// Stripe error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Error type.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error message.
    #[serde(alias = "Message")]
    pub message: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Parameter that caused the error.
    #[serde(default)]
    pub param: Option<String>,
}
