//! In-memory storage implementation.
//!
//! `MemoryStore` mirrors the semantics of `PgStore` (conditional bind,
//! owner-scoped delete, monotonically increasing ids) using maps behind
//! `tokio::sync::RwLock`. Each lock is held for a single map operation only.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tender_core::{CardId, CardRecord, NewCard, RemoteCustomerId, User, UserId};

use crate::error::{Result, StoreError};
use crate::schema::table;
use crate::Store;

/// A thread-safe in-memory store.
///
/// Cloning shares the underlying maps.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    cards: Arc<RwLock<BTreeMap<CardId, CardRecord>>>,
    next_user_id: Arc<AtomicI64>,
    next_card_id: Arc<AtomicI64>,
}

impl MemoryStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unbound user and return its ID.
    pub async fn create_user(&self, email: &str) -> UserId {
        let id = UserId::new(self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.users.write().await.insert(id, User::new(id, email));
        id
    }

    /// Number of stored cards.
    pub async fn card_count(&self) -> usize {
        self.cards.read().await.len()
    }

    /// All cards owned by `user_id`, ordered by id.
    pub async fn cards_for(&self, user_id: UserId) -> Vec<CardRecord> {
        self.cards
            .read()
            .await
            .values()
            .filter(|card| card.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn remote_customer_id(&self, user_id: UserId) -> Result<Option<RemoteCustomerId>> {
        self.users
            .read()
            .await
            .get(&user_id)
            .map(|user| user.remote_customer_id.clone())
            .ok_or_else(|| StoreError::NotFound {
                entity: table::USERS,
                id: user_id.to_string(),
            })
    }

    async fn bind_remote_customer(
        &self,
        user_id: UserId,
        customer: &RemoteCustomerId,
    ) -> Result<u64> {
        let mut users = self.users.write().await;
        match users.get_mut(&user_id) {
            Some(user) if user.remote_customer_id.is_none() => {
                user.remote_customer_id = Some(customer.clone());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn get_card(&self, card_id: CardId) -> Result<Option<CardRecord>> {
        Ok(self.cards.read().await.get(&card_id).cloned())
    }

    async fn insert_card(&self, card: &NewCard) -> Result<CardId> {
        if !self.users.read().await.contains_key(&card.user_id) {
            return Err(StoreError::Database(format!(
                "foreign key violation: user {} does not exist",
                card.user_id
            )));
        }

        let id = CardId::new(self.next_card_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.cards
            .write()
            .await
            .insert(id, CardRecord::from_new(id, card.clone()));
        Ok(id)
    }

    async fn delete_card(&self, card_id: CardId, user_id: UserId) -> Result<u64> {
        let mut cards = self.cards.write().await;
        let owned = cards
            .get(&card_id)
            .is_some_and(|card| card.user_id == user_id);
        if owned {
            cards.remove(&card_id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
