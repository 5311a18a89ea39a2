//! Backend-agnostic conn.
//!
//! [`BackendConn`] runs the card lifecycle against any [`PaymentBackend`].
//! The flows live in sibling modules:
//!
//! - `customer` - binding a local user to a remote customer
//! - `onboarding` - turning a client-side token into a stored card
//! - `charge` - charging a stored card
//! - `removal` - deleting a card locally, then remotely

mod charge;
mod customer;
mod onboarding;
mod removal;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tender_core::{
    CardId, CardParams, ChargeOutcome, Currency, PaymentError, RemoteCustomerId, Result, User,
    UserId,
};
use tender_store::{Store, StoreError};

use crate::backend::PaymentBackend;
use crate::driver::Conn;

/// A conn that drives one [`PaymentBackend`] against one [`Store`].
pub struct BackendConn<B> {
    backend: Arc<B>,
    store: Arc<dyn Store>,
    operation_timeout: Duration,
}

impl<B: PaymentBackend> BackendConn<B> {
    /// Bind `backend` to `store`.
    pub fn new(backend: Arc<B>, store: Arc<dyn Store>, operation_timeout: Duration) -> Self {
        Self {
            backend,
            store,
            operation_timeout,
        }
    }

    /// The backend this conn talks to.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The deadline applied to each operation.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Run `fut` under the operation deadline.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        if let Ok(result) = tokio::time::timeout(self.operation_timeout, fut).await {
            result
        } else {
            tracing::warn!(
                backend = self.backend.name(),
                operation,
                timeout_ms = u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX),
                "Payment operation timed out"
            );
            Err(PaymentError::Timeout { operation })
        }
    }
}

impl<B> std::fmt::Debug for BackendConn<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConn")
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<B: PaymentBackend> Conn for BackendConn<B> {
    async fn register_user(&self, user: &mut User) -> Result<RemoteCustomerId> {
        self.bounded(customer::OPERATION, self.bind_customer(user))
            .await
    }

    async fn save_card(&self, params: &CardParams, user: &User) -> Result<CardId> {
        self.bounded(onboarding::OPERATION, self.onboard_card(params, user))
            .await
    }

    async fn charge_card(
        &self,
        card_id: CardId,
        amount_in_cents: u64,
        currency: &Currency,
    ) -> Result<ChargeOutcome> {
        self.bounded(
            charge::OPERATION,
            self.execute_charge(card_id, amount_in_cents, currency),
        )
        .await
    }

    async fn delete_card(&self, card_id: CardId, user_id: UserId) -> Result<()> {
        // Bounded per phase; see `removal`.
        self.remove_card(card_id, user_id).await
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!(backend = self.backend.name(), "Payment conn closed");
        Ok(())
    }
}

/// Wrap a storage failure for `operation`.
fn storage(operation: &'static str) -> impl Fn(StoreError) -> PaymentError {
    move |err| PaymentError::Storage {
        operation,
        message: err.to_string(),
    }
}
