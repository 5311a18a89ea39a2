//! Common test utilities for tender integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;

use tender_core::{
    CardParams, ChargeOutcome, Currency, RemoteCustomerId, ServiceToken, SourceRef, User,
};
use tender_service::{
    create_router, BackendConn, BackendError, BackendResult, Conn, Driver, DriverConfig,
    DriverRegistry, PaymentBackend, RouteInstaller, ServiceConfig,
};
use tender_store::{MemoryStore, Store};

// ============================================================================
// Backend double
// ============================================================================

/// A charge the backend was asked to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeCall {
    pub amount: u64,
    pub currency: String,
    pub customer: String,
    pub source: String,
}

/// In-process payment backend with scriptable failures and latency.
#[derive(Default)]
pub struct MockBackend {
    next_id: AtomicUsize,
    customer_ids: Mutex<VecDeque<String>>,
    failures: Mutex<HashMap<&'static str, BackendError>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    sources: Mutex<Vec<(String, String)>>,
    charges: Mutex<Vec<ChargeCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `operation` fail with `err`.
    pub fn fail(&self, operation: &'static str, err: BackendError) {
        self.failures.lock().unwrap().insert(operation, err);
    }

    /// Stop failing `operation`.
    pub fn heal(&self, operation: &'static str) {
        self.failures.lock().unwrap().remove(operation);
    }

    /// Make every later call to `operation` sleep first.
    pub fn delay(&self, operation: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(operation, delay);
    }

    /// Hand out `id` for the next created customer.
    pub fn next_customer_id(&self, id: &str) {
        self.customer_ids.lock().unwrap().push_back(id.to_string());
    }

    pub fn calls(&self, operation: &'static str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Card sources that exist remotely, as `(customer, source)`.
    pub fn live_sources(&self) -> Vec<(String, String)> {
        self.sources.lock().unwrap().clone()
    }

    pub fn charges(&self) -> Vec<ChargeCall> {
        self.charges.lock().unwrap().clone()
    }

    async fn enter(&self, operation: &'static str) -> BackendResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;

        let delay = self.delays.lock().unwrap().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.lock().unwrap().get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn next(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}_{n}")
    }
}

#[async_trait]
impl PaymentBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_customer(&self, _email: &str) -> BackendResult<RemoteCustomerId> {
        self.enter("create_customer").await?;
        let scripted = self.customer_ids.lock().unwrap().pop_front();
        let id = scripted.unwrap_or_else(|| self.next("cus"));
        Ok(RemoteCustomerId::new(id).unwrap())
    }

    async fn create_card_source(
        &self,
        customer: &RemoteCustomerId,
        token: &ServiceToken,
    ) -> BackendResult<SourceRef> {
        self.enter("create_card_source").await?;
        if !token.expose().starts_with("tok_") {
            return Err(BackendError::Rejected {
                message: format!("No such token: {}", token.expose()),
                code: Some("resource_missing".into()),
                kind: Some("invalid_request_error".into()),
            });
        }
        let source = self.next("card");
        self.sources
            .lock()
            .unwrap()
            .push((customer.as_str().to_string(), source.clone()));
        Ok(SourceRef::new(source).unwrap())
    }

    async fn delete_card_source(
        &self,
        source: &SourceRef,
        customer: &RemoteCustomerId,
    ) -> BackendResult<()> {
        self.enter("delete_card_source").await?;
        let mut sources = self.sources.lock().unwrap();
        let before = sources.len();
        sources.retain(|(c, s)| !(c == customer.as_str() && s == source.as_str()));
        if sources.len() == before {
            return Err(BackendError::rejected(format!(
                "No such source: {}",
                source.as_str()
            )));
        }
        Ok(())
    }

    async fn create_charge(
        &self,
        amount_in_cents: u64,
        currency: &Currency,
        customer: &RemoteCustomerId,
        source: &SourceRef,
    ) -> BackendResult<ChargeOutcome> {
        self.enter("create_charge").await?;
        self.charges.lock().unwrap().push(ChargeCall {
            amount: amount_in_cents,
            currency: currency.as_str().to_string(),
            customer: customer.as_str().to_string(),
            source: source.as_str().to_string(),
        });
        Ok(ChargeOutcome {
            id: self.next("ch"),
            amount: amount_in_cents,
            currency: currency.clone(),
            status: "succeeded".into(),
            paid: true,
        })
    }
}

// ============================================================================
// Driver double
// ============================================================================

/// Driver that opens a conn over a shared [`MockBackend`].
pub struct MockDriver {
    pub backend: Arc<MockBackend>,
}

impl Driver for MockDriver {
    fn open(
        &self,
        store: Arc<dyn Store>,
        routes: &mut RouteInstaller,
        config: &DriverConfig,
    ) -> tender_core::Result<Arc<dyn Conn>> {
        let conn: Arc<dyn Conn> = Arc::new(BackendConn::new(
            Arc::clone(&self.backend),
            Arc::clone(&store),
            config.operation_timeout,
        ));
        routes.install(
            "mock",
            tender_service::handlers::cards::router(tender_service::CardState::new(
                Arc::clone(&conn),
                store,
            )),
        )?;
        Ok(conn)
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A conn over a memory store and a mock backend.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub backend: Arc<MockBackend>,
    pub conn: BackendConn<MockBackend>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(MockBackend::new());
        let conn = BackendConn::new(
            Arc::clone(&backend),
            Arc::clone(&store) as Arc<dyn Store>,
            timeout,
        );
        Self {
            store,
            backend,
            conn,
        }
    }

    /// A second conn over the same store and backend.
    pub fn conn_with_timeout(&self, timeout: Duration) -> BackendConn<MockBackend> {
        BackendConn::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.store) as Arc<dyn Store>,
            timeout,
        )
    }

    /// A stored user without a remote customer.
    pub async fn user(&self, email: &str) -> User {
        let id = self.store.create_user(email).await;
        self.store.get_user(id).await.unwrap().unwrap()
    }

    /// A stored user bound to a remote customer.
    pub async fn bound_user(&self, email: &str) -> User {
        let mut user = self.user(email).await;
        self.conn.register_user(&mut user).await.unwrap();
        user
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// The full service router over a registry-opened mock driver.
pub struct HttpHarness {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub backend: Arc<MockBackend>,
    pub conn: Arc<dyn Conn>,
}

impl HttpHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(MockBackend::new());

        let mut registry = DriverRegistry::new();
        registry
            .register(
                "mock",
                Arc::new(MockDriver {
                    backend: Arc::clone(&backend),
                }),
            )
            .expect("Failed to register driver");

        let mut routes = RouteInstaller::new();
        let conn = registry
            .open(
                "mock",
                Arc::clone(&store) as Arc<dyn Store>,
                &mut routes,
                &DriverConfig::default(),
            )
            .expect("Failed to open driver");

        let router = create_router(routes, &ServiceConfig::default());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            backend,
            conn,
        }
    }

    /// A stored user bound to a remote customer.
    pub async fn bound_user(&self, email: &str) -> User {
        let id = self.store.create_user(email).await;
        let mut user = self.store.get_user(id).await.unwrap().unwrap();
        self.conn.register_user(&mut user).await.unwrap();
        user
    }
}

impl Default for HttpHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Card parameters as a browser form would submit them.
pub fn card_params(token: &str, zip: &str) -> CardParams {
    CardParams {
        service_token: ServiceToken::new(token).unwrap(),
        cardholder_name: "Ada Lovelace".into(),
        last4: "4242".into(),
        brand: "Visa".into(),
        exp_month: 12,
        exp_year: 2030,
        address_zip: zip.into(),
    }
}

pub fn usd() -> Currency {
    Currency::new("usd").unwrap()
}
