//! Card removal.
//!
//! The local row is deleted first, scoped to the owner. Once it is gone,
//! every later failure (including running out of time) is reported as
//! `RemoteCleanup` carrying the remote source id, so the caller can finish
//! the job by hand.

use tender_core::{CardId, CardRecord, PaymentError, RemoteCustomerId, Result, UserId};

use super::{storage, BackendConn};
use crate::backend::PaymentBackend;

pub(super) const OPERATION: &str = "delete_card";

impl<B: PaymentBackend> BackendConn<B> {
    pub(super) async fn remove_card(&self, card_id: CardId, user_id: UserId) -> Result<()> {
        let card = self
            .bounded(OPERATION, self.delete_local(card_id, user_id))
            .await?;

        let remote = tokio::time::timeout(self.operation_timeout, self.delete_remote(&card)).await;
        let reason = match remote {
            Ok(Ok(())) => {
                tracing::info!(
                    backend = self.backend.name(),
                    card_id = %card_id,
                    user_id = %user_id,
                    "Card deleted"
                );
                return Ok(());
            }
            Ok(Err(reason)) => reason,
            Err(_) => "timed out deleting remote card source".to_string(),
        };

        tracing::error!(
            card_id = %card_id,
            user_id = %user_id,
            remote_source = %card.remote_token,
            reason = %reason,
            "Card deleted locally but not at the backend"
        );

        Err(PaymentError::RemoteCleanup {
            card_id,
            remote_source: card.remote_token,
            reason,
        })
    }

    /// Delete the row and return what it held.
    async fn delete_local(&self, card_id: CardId, user_id: UserId) -> Result<CardRecord> {
        let card = self
            .store
            .get_card(card_id)
            .await
            .map_err(storage(OPERATION))?
            .ok_or(PaymentError::CardNotFound { card_id })?;

        let removed = self
            .store
            .delete_card(card_id, user_id)
            .await
            .map_err(storage(OPERATION))?;

        if removed == 0 {
            // Either a concurrent delete won, or the card is someone else's.
            let still_present = self
                .store
                .get_card(card_id)
                .await
                .map_err(storage(OPERATION))?
                .is_some();

            return Err(if still_present {
                tracing::warn!(card_id = %card_id, user_id = %user_id, "Card ownership mismatch");
                PaymentError::OwnershipMismatch { card_id, user_id }
            } else {
                PaymentError::CardNotFound { card_id }
            });
        }

        Ok(card)
    }

    /// Delete the card's remote source. Errors are plain reasons.
    async fn delete_remote(&self, card: &CardRecord) -> std::result::Result<(), String> {
        let customer: RemoteCustomerId = match self.store.remote_customer_id(card.user_id).await {
            Ok(Some(customer)) => customer,
            Ok(None) => return Err(format!("user {} has no remote customer", card.user_id)),
            Err(e) => return Err(e.to_string()),
        };

        self.backend
            .delete_card_source(&card.remote_token, &customer)
            .await
            .map_err(|e| e.to_string())
    }
}
