//! `PostgreSQL` storage implementation.
//!
//! This module provides the `PgStore` implementation of the `Store` trait.
//! Queries use runtime-checked `sqlx::query*` so the crate builds without a
//! live database.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use tender_core::{
    CardId, CardRecord, NewCard, RemoteCustomerId, SourceRef, User, UserId, Zip5Hash,
};

use crate::error::{Result, StoreError};
use crate::schema::{table, MIGRATOR};
use crate::Store;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    remote_customer_id: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        let remote_customer_id = row
            .remote_customer_id
            .map(RemoteCustomerId::new)
            .transpose()
            .map_err(|e| StoreError::DataCorruption(format!("user {}: {e}", row.id)))?;

        Ok(Self {
            id: UserId::new(row.id),
            email: row.email,
            remote_customer_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    id: i64,
    user_id: i64,
    last4: String,
    cardholder_name: String,
    exp_month: i16,
    exp_year: i32,
    brand: String,
    remote_token: String,
    zip5_hash: String,
}

impl TryFrom<CardRow> for CardRecord {
    type Error = StoreError;

    fn try_from(row: CardRow) -> Result<Self> {
        let id = row.id;
        let corrupt = |what: &str| StoreError::DataCorruption(format!("card {id}: {what}"));

        let exp_month = u8::try_from(row.exp_month).map_err(|_| corrupt("exp_month"))?;
        let exp_year = u16::try_from(row.exp_year).map_err(|_| corrupt("exp_year"))?;
        let remote_token = SourceRef::new(row.remote_token).map_err(|_| corrupt("remote_token"))?;

        Ok(Self {
            id: CardId::new(id),
            user_id: UserId::new(row.user_id),
            last4: row.last4,
            cardholder_name: row.cardholder_name,
            exp_month,
            exp_year,
            brand: row.brand,
            remote_token,
            zip5_hash: Zip5Hash::from_stored(row.zip5_hash),
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::debug!(max_connections, "PostgreSQL pool connected");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Create an unbound user. Users belong to the host; this exists for
    /// hosts without their own user table and for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_user(&self, email: &str) -> Result<UserId> {
        let id: i64 = sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(UserId::new(id))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, remote_customer_id FROM users WHERE id = $1",
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn remote_customer_id(&self, user_id: UserId) -> Result<Option<RemoteCustomerId>> {
        let scalar: Option<Option<String>> =
            sqlx::query_scalar::<_, Option<String>>("SELECT remote_customer_id FROM users WHERE id = $1")
                .bind(user_id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        let Some(value) = scalar else {
            return Err(StoreError::NotFound {
                entity: table::USERS,
                id: user_id.to_string(),
            });
        };

        value
            .map(RemoteCustomerId::new)
            .transpose()
            .map_err(|e| StoreError::DataCorruption(format!("user {user_id}: {e}")))
    }

    async fn bind_remote_customer(
        &self,
        user_id: UserId,
        customer: &RemoteCustomerId,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET remote_customer_id = $1 \
             WHERE id = $2 AND remote_customer_id IS NULL",
        )
        .bind(customer.as_str())
        .bind(user_id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_card(&self, card_id: CardId) -> Result<Option<CardRecord>> {
        let row = sqlx::query_as::<_, CardRow>(
            "SELECT id, user_id, last4, cardholder_name, exp_month, exp_year, brand, \
                    remote_token, zip5_hash \
             FROM cards WHERE id = $1",
        )
        .bind(card_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert_card(&self, card: &NewCard) -> Result<CardId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO cards \
                 (user_id, last4, cardholder_name, exp_month, exp_year, brand, \
                  remote_token, zip5_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(card.user_id.as_i64())
        .bind(&card.last4)
        .bind(&card.cardholder_name)
        .bind(i16::from(card.exp_month))
        .bind(i32::from(card.exp_year))
        .bind(&card.brand)
        .bind(card.remote_token.as_str())
        .bind(card.zip5_hash.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(CardId::new(id))
    }

    async fn delete_card(&self, card_id: CardId, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1 AND user_id = $2")
            .bind(card_id.as_i64())
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
