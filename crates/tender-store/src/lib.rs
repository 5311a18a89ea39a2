//! Storage layer for tender.
//!
//! This crate provides the storage handle payment drivers are bound to. It
//! issues exactly four query shapes against two tables:
//!
//! - select-one-by-id (`users`, `cards`)
//! - select-scalar-by-id (`users.remote_customer_id`)
//! - insert-returning-id (`cards`)
//! - delete-by-two-keys (`cards` by `id` and `user_id`)
//!
//! plus the single conditional update that binds a user to a remote customer.
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx, schema created by embedded migrations
//! - [`MemoryStore`] - in-process maps, for tests and local development
//!
//! Every mutation is a single-row, single-statement operation, so concurrent
//! callers racing on the same card can observe "not found" but never a
//! half-written record.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use tender_core::{CardId, CardRecord, NewCard, RemoteCustomerId, User, UserId};

/// The storage trait defining all database operations a driver needs.
///
/// This trait abstracts the storage layer so a driver can be opened against
/// `PostgreSQL` in production and an in-memory store in tests.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Read a user's remote customer binding.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    async fn remote_customer_id(&self, user_id: UserId) -> Result<Option<RemoteCustomerId>>;

    /// Bind a user to a remote customer, only if it is not bound yet.
    ///
    /// Returns the number of rows affected: `0` means the user is missing or
    /// was already bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn bind_remote_customer(
        &self,
        user_id: UserId,
        customer: &RemoteCustomerId,
    ) -> Result<u64>;

    // =========================================================================
    // Cards
    // =========================================================================

    /// Get a card by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_card(&self, card_id: CardId) -> Result<Option<CardRecord>>;

    /// Insert a card and return its new ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_card(&self, card: &NewCard) -> Result<CardId>;

    /// Delete a card only if it belongs to `user_id`.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn delete_card(&self, card_id: CardId, user_id: UserId) -> Result<u64>;
}
