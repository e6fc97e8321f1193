//! In-memory storage backend.
//!
//! Mirrors the `PostgreSQL` backend's semantics (conflicts, cascading store
//! deletes, result ordering) so tests exercise handlers against the same
//! contract without a database.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use ledgerflow_core::{GrantId, StoreId, TransactionId, UserId};

use super::{Storage, StorageError};
use crate::models::{
    NewGrant, NewStore, NewTransaction, Store, StoreGrant, StoreUpdate, Transaction,
    TransactionTotals, TransactionUpdate, UpsertUser, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    stores: HashMap<StoreId, Store>,
    grants: HashMap<GrantId, StoreGrant>,
    transactions: HashMap<TransactionId, Transaction>,
}

/// Storage backend held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<Tables>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: UpsertUser) -> Result<User, StorageError> {
        let mut tables = self.inner.write().await;

        // Without a stable ID the email is the identity, matching the
        // database backend's conflict targets
        let id = match user.id {
            Some(id) => {
                if tables
                    .users
                    .values()
                    .any(|u| u.id != id && u.email == user.email)
                {
                    return Err(StorageError::Conflict("email already exists".to_owned()));
                }
                id
            }
            None => tables
                .users
                .values()
                .find(|u| u.email == user.email)
                .map_or_else(UserId::random, |u| u.id),
        };

        let now = Utc::now();
        if let Some(existing) = tables.users.get_mut(&id) {
            existing.email = user.email;
            existing.first_name = user.first_name;
            existing.last_name = user.last_name;
            existing.profile_image_url = user.profile_image_url;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = User {
            id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_image_url: user.profile_image_url,
            role: user.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn create_store(&self, store: NewStore) -> Result<Store, StorageError> {
        let now = Utc::now();
        let created = Store {
            id: StoreId::random(),
            name: store.name,
            description: store.description,
            owner_id: store.owner_id,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.inner.write().await;
        tables.stores.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables.stores.get(&id).cloned())
    }

    async fn list_stores_owned_by(&self, owner_id: UserId) -> Result<Vec<Store>, StorageError> {
        let tables = self.inner.read().await;
        let mut stores: Vec<Store> = tables
            .stores
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        stores.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stores)
    }

    async fn list_stores_for_user(&self, user_id: UserId) -> Result<Vec<Store>, StorageError> {
        let tables = self.inner.read().await;
        let mut stores: Vec<Store> = tables
            .stores
            .values()
            .filter(|s| {
                s.owner_id == user_id
                    || tables
                        .grants
                        .values()
                        .any(|g| g.store_id == s.id && g.user_id == user_id)
            })
            .cloned()
            .collect();
        stores.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stores)
    }

    async fn list_all_stores(&self) -> Result<Vec<Store>, StorageError> {
        let tables = self.inner.read().await;
        let mut stores: Vec<Store> = tables.stores.values().cloned().collect();
        stores.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stores)
    }

    async fn update_store(&self, id: StoreId, update: StoreUpdate) -> Result<Store, StorageError> {
        let mut tables = self.inner.write().await;
        let store = tables.stores.get_mut(&id).ok_or(StorageError::NotFound)?;

        if let Some(name) = update.name {
            store.name = name;
        }
        if let Some(description) = update.description {
            store.description = Some(description);
        }
        store.updated_at = Utc::now();
        Ok(store.clone())
    }

    async fn delete_store(&self, id: StoreId) -> Result<(), StorageError> {
        let mut tables = self.inner.write().await;
        if tables.stores.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }

        // Cascade like the database foreign keys do
        tables.grants.retain(|_, g| g.store_id != id);
        tables.transactions.retain(|_, t| t.store_id != id);
        Ok(())
    }

    async fn get_grant(
        &self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<Option<StoreGrant>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables
            .grants
            .values()
            .find(|g| g.store_id == store_id && g.user_id == user_id)
            .cloned())
    }

    async fn create_grant(&self, grant: NewGrant) -> Result<StoreGrant, StorageError> {
        let mut tables = self.inner.write().await;

        if tables
            .grants
            .values()
            .any(|g| g.store_id == grant.store_id && g.user_id == grant.user_id)
        {
            return Err(StorageError::Conflict(
                "user already has access to this store".to_owned(),
            ));
        }

        let created = StoreGrant {
            id: GrantId::random(),
            store_id: grant.store_id,
            user_id: grant.user_id,
            role_in_store: grant.role_in_store,
            created_at: Utc::now(),
        };
        tables.grants.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_transactions(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Transaction>, StorageError> {
        let tables = self.inner.read().await;
        let mut transactions: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|t| t.store_id == store_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables.transactions.get(&id).cloned())
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, StorageError> {
        let now = Utc::now();
        let created = Transaction {
            id: TransactionId::random(),
            store_id: transaction.store_id,
            date: transaction.date,
            amount_supplied: transaction.amount_supplied,
            amount_remaining: transaction.amount_remaining,
            notes: transaction.notes,
            created_by: transaction.created_by,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.inner.write().await;
        tables.transactions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, StorageError> {
        let mut tables = self.inner.write().await;
        let transaction = tables
            .transactions
            .get_mut(&id)
            .ok_or(StorageError::NotFound)?;

        if let Some(date) = update.date {
            transaction.date = date;
        }
        if let Some(amount_supplied) = update.amount_supplied {
            transaction.amount_supplied = amount_supplied;
        }
        if let Some(amount_remaining) = update.amount_remaining {
            transaction.amount_remaining = amount_remaining;
        }
        if let Some(notes) = update.notes {
            transaction.notes = Some(notes);
        }
        transaction.updated_at = Utc::now();
        Ok(transaction.clone())
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), StorageError> {
        let mut tables = self.inner.write().await;
        if tables.transactions.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn transaction_totals(
        &self,
        store_ids: &[StoreId],
    ) -> Result<TransactionTotals, StorageError> {
        let tables = self.inner.read().await;
        let mut totals = TransactionTotals::default();
        for transaction in tables
            .transactions
            .values()
            .filter(|t| store_ids.contains(&t.store_id))
        {
            totals.supplied += transaction.amount_supplied.as_decimal();
            totals.remaining += transaction.amount_remaining.as_decimal();
        }
        Ok(totals)
    }
}
