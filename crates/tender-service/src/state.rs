//! Handler state.

use std::sync::Arc;

use tender_store::Store;

use crate::driver::Conn;

/// State shared by the card handlers a driver installs.
#[derive(Clone)]
pub struct CardState {
    /// The conn the handlers drive.
    pub conn: Arc<dyn Conn>,

    /// The storage handle, for loading users.
    pub store: Arc<dyn Store>,
}

impl CardState {
    /// Create a new card state.
    #[must_use]
    pub fn new(conn: Arc<dyn Conn>, store: Arc<dyn Store>) -> Self {
        Self { conn, store }
    }
}
