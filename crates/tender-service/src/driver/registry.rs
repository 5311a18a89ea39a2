//! Driver registry.
//!
//! The registry is an ordinary value the host builds once at startup and
//! passes to whatever needs to open a backend. There is no global; tests can
//! build as many registries as they like.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tender_core::{PaymentError, Result};
use tender_store::Store;

use super::{Conn, Driver, DriverConfig};
use crate::routes::RouteInstaller;
use crate::stripe::StripeDriver;

/// Name-to-driver mapping with at most one open conn per name.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
    opened: HashMap<String, Arc<dyn Conn>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the bundled drivers (`stripe`) registered.
    #[must_use]
    pub fn with_default_drivers() -> Self {
        let mut registry = Self::new();
        registry
            .drivers
            .insert(StripeDriver::NAME.to_string(), Arc::new(StripeDriver));
        registry
    }

    /// Register `driver` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::DuplicateDriver` if the name is taken.
    pub fn register(&mut self, name: impl Into<String>, driver: Arc<dyn Driver>) -> Result<()> {
        let name = name.into();
        if self.drivers.contains_key(&name) {
            return Err(PaymentError::DuplicateDriver { name });
        }

        tracing::debug!(driver = %name, "Payment driver registered");
        self.drivers.insert(name, driver);
        Ok(())
    }

    /// Open the driver registered under `name`.
    ///
    /// Opening an already opened name returns the existing conn; `store`,
    /// `routes` and `config` are then ignored.
    ///
    /// # Errors
    ///
    /// - `PaymentError::DriverNotFound` if nothing is registered under `name`.
    /// - Whatever the driver's own `open` returns.
    pub fn open(
        &mut self,
        name: &str,
        store: Arc<dyn Store>,
        routes: &mut RouteInstaller,
        config: &DriverConfig,
    ) -> Result<Arc<dyn Conn>> {
        if let Some(conn) = self.opened.get(name) {
            tracing::debug!(driver = %name, "Payment driver already open");
            return Ok(Arc::clone(conn));
        }

        let driver = self
            .drivers
            .get(name)
            .ok_or_else(|| PaymentError::DriverNotFound {
                name: name.to_string(),
            })?;

        let conn = driver.open(store, routes, config)?;
        self.opened.insert(name.to_string(), Arc::clone(&conn));

        tracing::info!(driver = %name, "Payment driver opened");

        Ok(conn)
    }

    /// Registered driver names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether `name` has an open conn.
    #[must_use]
    pub fn is_open(&self, name: &str) -> bool {
        self.opened.contains_key(name)
    }

    /// Close every open conn.
    ///
    /// All conns are closed even if some fail; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a conn's `close`.
    pub async fn close_all(&mut self) -> Result<()> {
        let opened: Vec<_> = self.opened.drain().collect();
        let results = futures::future::join_all(opened.iter().map(|(name, conn)| async move {
            let result = conn.close().await;
            if let Err(e) = &result {
                tracing::warn!(driver = %name, error = %e, "Failed to close payment driver");
            }
            result
        }))
        .await;

        results.into_iter().collect::<Result<Vec<()>>>().map(|_| ())
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut opened: Vec<_> = self.opened.keys().collect();
        opened.sort_unstable();
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .field("opened", &opened)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tender_core::{
        CardId, CardParams, ChargeOutcome, Currency, RemoteCustomerId, User, UserId,
    };
    use tender_store::MemoryStore;

    use super::*;

    struct NullConn;

    #[async_trait]
    impl Conn for NullConn {
        async fn register_user(&self, user: &mut User) -> Result<RemoteCustomerId> {
            Err(PaymentError::CustomerAlreadyBound { user_id: user.id })
        }

        async fn save_card(&self, _params: &CardParams, user: &User) -> Result<CardId> {
            Err(PaymentError::UnboundCustomer { user_id: user.id })
        }

        async fn charge_card(
            &self,
            card_id: CardId,
            _amount_in_cents: u64,
            _currency: &Currency,
        ) -> Result<ChargeOutcome> {
            Err(PaymentError::CardNotFound { card_id })
        }

        async fn delete_card(&self, card_id: CardId, _user_id: UserId) -> Result<()> {
            Err(PaymentError::CardNotFound { card_id })
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDriver {
        opens: AtomicUsize,
    }

    impl Driver for CountingDriver {
        fn open(
            &self,
            _store: Arc<dyn Store>,
            _routes: &mut RouteInstaller,
            _config: &DriverConfig,
        ) -> Result<Arc<dyn Conn>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullConn))
        }
    }

    fn store() -> Arc<dyn Store> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = DriverRegistry::new();
        registry
            .register("null", Arc::new(CountingDriver::default()))
            .unwrap();

        let err = registry
            .register("null", Arc::new(CountingDriver::default()))
            .unwrap_err();
        assert!(matches!(err, PaymentError::DuplicateDriver { name } if name == "null"));
    }

    #[test]
    fn open_unknown_driver_fails() {
        let mut registry = DriverRegistry::new();
        let mut routes = RouteInstaller::new();
        let err = registry
            .open("paypal", store(), &mut routes, &DriverConfig::default())
            .err()
            .expect("open should fail");
        assert!(matches!(err, PaymentError::DriverNotFound { name } if name == "paypal"));
    }

    #[test]
    fn open_is_idempotent_per_name() {
        let driver = Arc::new(CountingDriver::default());
        let mut registry = DriverRegistry::new();
        registry.register("null", driver.clone()).unwrap();

        let mut routes = RouteInstaller::new();
        let first = registry
            .open("null", store(), &mut routes, &DriverConfig::default())
            .unwrap();
        let second = registry
            .open("null", store(), &mut routes, &DriverConfig::default())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(driver.opens.load(Ordering::SeqCst), 1);
        assert!(registry.is_open("null"));
    }

    #[test]
    fn default_drivers_include_stripe() {
        let registry = DriverRegistry::with_default_drivers();
        assert_eq!(registry.names(), vec!["stripe"]);
    }

    #[test]
    fn registries_are_independent() {
        let mut a = DriverRegistry::new();
        let mut b = DriverRegistry::new();
        a.register("null", Arc::new(CountingDriver::default())).unwrap();
        b.register("null", Arc::new(CountingDriver::default())).unwrap();
        assert_eq!(a.names(), b.names());
    }

    #[tokio::test]
    async fn close_all_drains_open_conns() {
        let mut registry = DriverRegistry::new();
        registry
            .register("null", Arc::new(CountingDriver::default()))
            .unwrap();
        let mut routes = RouteInstaller::new();
        registry
            .open("null", store(), &mut routes, &DriverConfig::default())
            .unwrap();

        registry.close_all().await.unwrap();
        assert!(!registry.is_open("null"));
    }
}
