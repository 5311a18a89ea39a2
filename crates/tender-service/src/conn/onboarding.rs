//! Card onboarding.

use tender_core::{derive_zip5_hash, CardId, CardParams, NewCard, PaymentError, Result, User};
use tender_store::StoreError;

use super::{storage, BackendConn};
use crate::backend::PaymentBackend;

pub(super) const OPERATION: &str = "save_card";

impl<B: PaymentBackend> BackendConn<B> {
    /// Register the token with the backend and store the resulting card.
    ///
    /// A card record is written only after the backend accepted the token.
    /// Any earlier failure leaves storage untouched.
    pub(super) async fn onboard_card(&self, params: &CardParams, user: &User) -> Result<CardId> {
        let user_id = user.id;

        if !user.is_bound() {
            return Err(PaymentError::UnboundCustomer { user_id });
        }

        params.validate()?;

        // Argon2 is CPU-bound; keep it off the async workers.
        let zip = params.address_zip.clone();
        let zip5_hash = tokio::task::spawn_blocking(move || derive_zip5_hash(&zip))
            .await
            .map_err(|e| PaymentError::SecretDerivation(e.to_string()))??;

        let customer = match self.store.remote_customer_id(user_id).await {
            Ok(Some(customer)) => customer,
            Ok(None) => return Err(PaymentError::UnboundCustomer { user_id }),
            Err(StoreError::NotFound { .. }) => return Err(PaymentError::UserNotFound { user_id }),
            Err(e) => return Err(storage(OPERATION)(e)),
        };

        let source = self
            .backend
            .create_card_source(&customer, &params.service_token)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %user_id, error = %e, "Card source registration failed");
                e.into_payment_error(OPERATION)
            })?;

        let card = NewCard::from_params(user_id, params, source, zip5_hash);
        let card_id = self.store.insert_card(&card).await.map_err(|e| {
            tracing::error!(
                user_id = %user_id,
                remote_source = %card.remote_token,
                error = %e,
                "Failed to store card; remote source left orphaned"
            );
            storage(OPERATION)(e)
        })?;

        tracing::info!(
            backend = self.backend.name(),
            user_id = %user_id,
            card_id = %card_id,
            last4 = %card.last4,
            "Card saved"
        );

        Ok(card_id)
    }
}
