//! Remote customer binding.

use tender_core::{PaymentError, RemoteCustomerId, Result, User};
use tender_store::StoreError;

use super::{storage, BackendConn};
use crate::backend::PaymentBackend;

pub(super) const OPERATION: &str = "register_user";

impl<B: PaymentBackend> BackendConn<B> {
    /// Create a remote customer for `user` and persist the binding.
    ///
    /// The binding is written with a conditional update, so of two racing
    /// registrations only one is stored. The loser's remote customer is left
    /// orphaned at the backend and logged.
    pub(super) async fn bind_customer(&self, user: &mut User) -> Result<RemoteCustomerId> {
        let user_id = user.id;

        if user.is_bound() {
            return Err(PaymentError::CustomerAlreadyBound { user_id });
        }

        match self.store.remote_customer_id(user_id).await {
            Ok(None) => {}
            Ok(Some(_)) => return Err(PaymentError::CustomerAlreadyBound { user_id }),
            Err(StoreError::NotFound { .. }) => return Err(PaymentError::UserNotFound { user_id }),
            Err(e) => return Err(storage(OPERATION)(e)),
        }

        let customer = self
            .backend
            .create_customer(&user.email)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %user_id, error = %e, "Remote customer creation failed");
                e.into_payment_error(OPERATION)
            })?;

        let bound = self
            .store
            .bind_remote_customer(user_id, &customer)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %user_id,
                    remote_customer = %customer,
                    error = %e,
                    "Failed to persist remote customer binding"
                );
                storage(OPERATION)(e)
            })?;

        if bound == 0 {
            tracing::warn!(
                user_id = %user_id,
                remote_customer = %customer,
                "User was bound concurrently; remote customer left orphaned"
            );
            return Err(PaymentError::CustomerAlreadyBound { user_id });
        }

        tracing::info!(
            backend = self.backend.name(),
            user_id = %user_id,
            remote_customer = %customer,
            "Remote customer bound"
        );

        user.remote_customer_id = Some(customer.clone());
        Ok(customer)
    }
}
