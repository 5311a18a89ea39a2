//! Driver abstraction.
//!
//! A [`Driver`] is a stateless factory registered under a name. Opening it
//! yields a [`Conn`]: a handle bound to one backend client and one storage
//! handle, through which the host runs the card lifecycle. Swapping payment
//! backends means registering a different driver; call sites only ever hold
//! an `Arc<dyn Conn>`.

pub mod registry;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tender_core::{
    CardId, CardParams, ChargeOutcome, ChargeRequest, Currency, RemoteCustomerId, Result, User,
    UserId,
};
use tender_store::Store;

use crate::routes::RouteInstaller;

pub use registry::DriverRegistry;

/// Default deadline for a single conn operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend-specific settings handed to [`Driver::open`].
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Backend access credential, read once at startup.
    pub credential: Option<String>,

    /// API root override, for test servers and proxies.
    pub api_base: Option<String>,

    /// Deadline for each conn operation.
    pub operation_timeout: Duration,
}

impl DriverConfig {
    /// A config carrying only a credential.
    #[must_use]
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
            ..Self::default()
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            credential: None,
            api_base: None,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// A payment driver: turns configuration into a live [`Conn`].
pub trait Driver: Send + Sync {
    /// Open a conn bound to `store`.
    ///
    /// The driver may install its card routes on `routes`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if the backend cannot be set up.
    fn open(
        &self,
        store: Arc<dyn Store>,
        routes: &mut RouteInstaller,
        config: &DriverConfig,
    ) -> Result<Arc<dyn Conn>>;
}

/// A live connection to one payment backend.
///
/// Every operation runs on the caller's task and is bounded by the conn's
/// operation timeout. Nothing is retried.
#[async_trait]
pub trait Conn: Send + Sync {
    /// Create a remote customer for `user` and persist the binding.
    ///
    /// On success `user.remote_customer_id` is set.
    async fn register_user(&self, user: &mut User) -> Result<RemoteCustomerId>;

    /// Exchange a client-side token for a stored card record.
    async fn save_card(&self, params: &CardParams, user: &User) -> Result<CardId>;

    /// Charge a stored card.
    async fn charge_card(
        &self,
        card_id: CardId,
        amount_in_cents: u64,
        currency: &Currency,
    ) -> Result<ChargeOutcome>;

    /// Delete a card owned by `user_id`, locally and at the backend.
    async fn delete_card(&self, card_id: CardId, user_id: UserId) -> Result<()>;

    /// Release the conn.
    async fn close(&self) -> Result<()>;

    /// Charge a stored card from a prepared request.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome> {
        self.charge_card(request.card_id, request.amount_in_cents, &request.currency)
            .await
    }
}
