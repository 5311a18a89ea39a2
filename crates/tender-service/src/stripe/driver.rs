//! The `stripe` payment driver.

use std::sync::Arc;

use tender_core::{PaymentError, Result};
use tender_store::Store;

use super::StripeClient;
use crate::conn::BackendConn;
use crate::driver::{Conn, Driver, DriverConfig};
use crate::handlers::cards;
use crate::routes::RouteInstaller;
use crate::state::CardState;

/// Driver that charges cards through Stripe.
///
/// Opening it builds one [`StripeClient`] from the configured secret key and
/// installs the card routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripeDriver;

impl StripeDriver {
    /// Registry name.
    pub const NAME: &'static str = "stripe";
}

impl Driver for StripeDriver {
    fn open(
        &self,
        store: Arc<dyn Store>,
        routes: &mut RouteInstaller,
        config: &DriverConfig,
    ) -> Result<Arc<dyn Conn>> {
        let api_key = config.credential.as_deref().ok_or_else(|| {
            PaymentError::Configuration("no Stripe access token configured".into())
        })?;

        let mut client =
            StripeClient::new(api_key).map_err(|e| PaymentError::Configuration(e.to_string()))?;
        if let Some(base_url) = &config.api_base {
            client = client.with_base_url(base_url);
        }

        tracing::info!(
            base_url = %client.base_url(),
            operation_timeout_secs = config.operation_timeout.as_secs(),
            "Stripe driver configured"
        );

        let conn: Arc<dyn Conn> = Arc::new(BackendConn::new(
            Arc::new(client),
            Arc::clone(&store),
            config.operation_timeout,
        ));

        routes.install(
            Self::NAME,
            cards::router(CardState::new(Arc::clone(&conn), store)),
        )?;

        Ok(conn)
    }
}
