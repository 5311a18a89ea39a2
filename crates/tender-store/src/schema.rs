//! Database schema definitions.
//!
//! The DDL lives in `migrations/` and is embedded at compile time.

use sqlx::migrate::Migrator;

/// Table names, also used as the entity in `StoreError::NotFound`.
pub mod table {
    /// Host-owned users; tender touches only `remote_customer_id`.
    pub const USERS: &str = "users";

    /// Card records, keyed by `id`, owned by `user_id`.
    pub const CARDS: &str = "cards";
}

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Returns all table names created by the migrations.
#[must_use]
pub fn all_tables() -> Vec<&'static str> {
    vec![table::USERS, table::CARDS]
}
