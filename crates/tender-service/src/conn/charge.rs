//! Charge execution.

use tender_core::{CardId, ChargeOutcome, Currency, PaymentError, Result};
use tender_store::StoreError;

use super::{storage, BackendConn};
use crate::backend::PaymentBackend;

pub(super) const OPERATION: &str = "charge_card";

impl<B: PaymentBackend> BackendConn<B> {
    pub(super) async fn execute_charge(
        &self,
        card_id: CardId,
        amount_in_cents: u64,
        currency: &Currency,
    ) -> Result<ChargeOutcome> {
        let card = self
            .store
            .get_card(card_id)
            .await
            .map_err(storage(OPERATION))?
            .ok_or(PaymentError::CardNotFound { card_id })?;

        let customer = match self.store.remote_customer_id(card.user_id).await {
            Ok(Some(customer)) => customer,
            Ok(None) | Err(StoreError::NotFound { .. }) => {
                return Err(PaymentError::CustomerResolution {
                    card_id,
                    user_id: card.user_id,
                })
            }
            Err(e) => return Err(storage(OPERATION)(e)),
        };

        let outcome = self
            .backend
            .create_charge(amount_in_cents, currency, &customer, &card.remote_token)
            .await
            .map_err(|e| {
                tracing::warn!(
                    card_id = %card_id,
                    amount = amount_in_cents,
                    currency = %currency,
                    error = %e,
                    "Charge failed"
                );
                e.into_payment_error(OPERATION)
            })?;

        tracing::info!(
            backend = self.backend.name(),
            card_id = %card_id,
            charge_id = %outcome.id,
            amount = outcome.amount,
            currency = %outcome.currency,
            status = %outcome.status,
            "Card charged"
        );

        Ok(outcome)
    }
}
