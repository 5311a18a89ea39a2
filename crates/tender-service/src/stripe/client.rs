//! Stripe API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use tender_core::{ChargeOutcome, Currency, RemoteCustomerId, ServiceToken, SourceRef};

use super::types::{Card, Charge, Customer, DeletedObject, StripeErrorResponse};
use crate::backend::{BackendError, BackendResult, PaymentBackend};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {message}")]
    Api {
        /// Error type.
        error_type: Option<String>,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Stripe returned an error body that is not a Stripe error.
    #[error("malformed Stripe error (HTTP {status}): {detail}")]
    MalformedError {
        /// HTTP status of the response.
        status: u16,
        /// Decoder message.
        detail: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<StripeError> for BackendError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Api {
                error_type,
                message,
                code,
            } => Self::Rejected {
                message,
                code,
                kind: error_type,
            },
            StripeError::MalformedError { status, detail } => Self::MalformedPayload {
                detail: format!("HTTP {status}: {detail}"),
            },
            StripeError::Serialization(e) => Self::UnexpectedResponse(e.to_string()),
            StripeError::Http(e) => Self::Transport(e.to_string()),
            StripeError::Configuration(msg) => Self::Transport(msg),
        }
    }
}

/// Stripe API client.
///
/// Immutable after construction; clone or share behind `Arc` freely.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl StripeClient {
    /// Stripe API base URL.
    pub const BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Per-request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Configuration` if the key is blank or the HTTP
    /// client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, StripeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StripeError::Configuration("Stripe API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StripeError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: Self::BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root (test servers, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The API root requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new Stripe customer.
    pub async fn create_customer(&self, email: &str) -> Result<Customer, StripeError> {
        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&[("email", email)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Attach a tokenized card to a customer.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - Stripe customer ID
    /// * `token` - Stripe.js token (`tok_...`); never a card number
    pub async fn create_card(&self, customer_id: &str, token: &str) -> Result<Card, StripeError> {
        tracing::debug!(customer_id = %customer_id, "Creating Stripe card source");

        let response = self
            .client
            .post(format!("{}/customers/{}/sources", self.base_url, customer_id))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&[("source", token)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Detach and delete a card from a customer.
    pub async fn delete_card(
        &self,
        customer_id: &str,
        card_id: &str,
    ) -> Result<DeletedObject, StripeError> {
        let response = self
            .client
            .delete(format!(
                "{}/customers/{}/sources/{}",
                self.base_url, customer_id, card_id
            ))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Charge a customer's card.
    ///
    /// # Arguments
    ///
    /// * `amount` - Amount in minor units
    /// * `currency` - Lowercase ISO code
    /// * `customer_id` - Stripe customer ID
    /// * `source` - Card ID belonging to the customer
    pub async fn create_charge(
        &self,
        amount: u64,
        currency: &str,
        customer_id: &str,
        source: &str,
    ) -> Result<Charge, StripeError> {
        let amount = amount.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("customer", customer_id),
            ("source", source),
        ];

        tracing::debug!(
            customer_id = %customer_id,
            amount = %amount,
            currency = %currency,
            "Creating Stripe charge"
        );

        let response = self
            .client
            .post(format!("{}/charges", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and decode errors.
    ///
    /// An error body that is not a Stripe error object is reported as
    /// `MalformedError`, never swallowed.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        match serde_json::from_str::<StripeErrorResponse>(&body) {
            Ok(stripe_error) => {
                let detail = stripe_error.into_detail();
                Err(StripeError::Api {
                    error_type: detail.error_type,
                    message: detail.message,
                    code: detail.code,
                })
            }
            Err(e) => Err(StripeError::MalformedError {
                status: status.as_u16(),
                detail: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl PaymentBackend for StripeClient {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_customer(&self, email: &str) -> BackendResult<RemoteCustomerId> {
        let customer = StripeClient::create_customer(self, email).await?;
        RemoteCustomerId::new(customer.id).map_err(|e| BackendError::UnexpectedResponse(e.to_string()))
    }

    async fn create_card_source(
        &self,
        customer: &RemoteCustomerId,
        token: &ServiceToken,
    ) -> BackendResult<SourceRef> {
        let card = self.create_card(customer.as_str(), token.expose()).await?;
        SourceRef::new(card.id).map_err(|e| BackendError::UnexpectedResponse(e.to_string()))
    }

    async fn delete_card_source(
        &self,
        source: &SourceRef,
        customer: &RemoteCustomerId,
    ) -> BackendResult<()> {
        let deleted = self.delete_card(customer.as_str(), source.as_str()).await?;
        if deleted.deleted {
            Ok(())
        } else {
            Err(BackendError::UnexpectedResponse(format!(
                "Stripe did not confirm deletion of {}",
                deleted.id
            )))
        }
    }

    async fn create_charge(
        &self,
        amount_in_cents: u64,
        currency: &Currency,
        customer: &RemoteCustomerId,
        source: &SourceRef,
    ) -> BackendResult<ChargeOutcome> {
        let charge = StripeClient::create_charge(
            self,
            amount_in_cents,
            currency.as_str(),
            customer.as_str(),
            source.as_str(),
        )
        .await?;

        if charge.status == "failed" {
            return Err(BackendError::Rejected {
                message: charge
                    .failure_message
                    .unwrap_or_else(|| format!("charge {} failed", charge.id)),
                code: charge.failure_code,
                kind: Some("card_error".into()),
            });
        }

        let currency = Currency::new(&charge.currency)
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))?;

        Ok(ChargeOutcome {
            id: charge.id,
            amount: charge.amount,
            currency,
            status: charge.status,
            paid: charge.paid,
        })
    }
}
