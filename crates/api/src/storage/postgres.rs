//! `PostgreSQL` storage backend.
//!
//! Queries use the runtime sqlx API with typed row structs; database strings
//! are parsed back into domain types so corrupt rows surface as
//! `StorageError::DataCorruption` instead of silently flowing onward.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ledgerflow_core::{Amount, Email, GrantId, StoreId, TransactionId, UserId};

use super::{Storage, StorageError};
use crate::models::{
    NewGrant, NewStore, NewTransaction, Store, StoreGrant, StoreUpdate, Transaction,
    TransactionTotals, TransactionUpdate, UpsertUser, User,
};

/// Run pending database migrations from `crates/api/migrations/`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Storage backend over a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Create a new `PostgreSQL` storage backend.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_on_unique(e: sqlx::Error, message: &str) -> StorageError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StorageError::Conflict(message.to_owned())
        }
        other => StorageError::Database(other),
    }
}

/// Raw `users` row.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    profile_image_url: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            StorageError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse()
            .map_err(|e| StorageError::DataCorruption(format!("invalid role in database: {e}")))?;

        Ok(Self {
            id: row.id,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            profile_image_url: row.profile_image_url,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Raw `stores` row.
#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    description: Option<String>,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Raw `store_users` row.
#[derive(sqlx::FromRow)]
struct GrantRow {
    id: GrantId,
    store_id: StoreId,
    user_id: UserId,
    role_in_store: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<GrantRow> for StoreGrant {
    type Error = StorageError;

    fn try_from(row: GrantRow) -> Result<Self, Self::Error> {
        let role_in_store = row.role_in_store.parse().map_err(|e| {
            StorageError::DataCorruption(format!("invalid store role in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            user_id: row.user_id,
            role_in_store,
            created_at: row.created_at,
        })
    }
}

/// Raw `transactions` row.
#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: TransactionId,
    store_id: StoreId,
    date: DateTime<Utc>,
    amount_supplied: Decimal,
    amount_remaining: Decimal,
    notes: Option<String>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StorageError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let amount_supplied = Amount::from_decimal(row.amount_supplied).map_err(|e| {
            StorageError::DataCorruption(format!("invalid supplied amount in database: {e}"))
        })?;
        let amount_remaining = Amount::from_decimal(row.amount_remaining).map_err(|e| {
            StorageError::DataCorruption(format!("invalid remaining amount in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            date: row.date,
            amount_supplied,
            amount_remaining,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Raw totals row from the aggregate query.
#[derive(sqlx::FromRow)]
struct TotalsRow {
    supplied: Decimal,
    remaining: Decimal,
}

#[async_trait::async_trait]
impl Storage for PgStorage {
    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, first_name, last_name, profile_image_url, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn upsert_user(&self, user: UpsertUser) -> Result<User, StorageError> {
        let role = user.role.unwrap_or_default();

        // With a stable identity ID the conflict target is the ID and a
        // colliding email is an error; without one the email itself is the
        // identity and a repeat call refreshes the existing row.
        let row = if let Some(id) = user.id {
            sqlx::query_as::<_, UserRow>(
                r"
                INSERT INTO users (id, email, first_name, last_name, profile_image_url, role)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE
                SET email = EXCLUDED.email,
                    first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    profile_image_url = EXCLUDED.profile_image_url,
                    updated_at = NOW()
                RETURNING id, email, first_name, last_name, profile_image_url, role,
                          created_at, updated_at
                ",
            )
            .bind(id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.profile_image_url)
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "email already exists"))?
        } else {
            sqlx::query_as::<_, UserRow>(
                r"
                INSERT INTO users (id, email, first_name, last_name, profile_image_url, role)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (email) DO UPDATE
                SET first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    profile_image_url = EXCLUDED.profile_image_url,
                    updated_at = NOW()
                RETURNING id, email, first_name, last_name, profile_image_url, role,
                          created_at, updated_at
                ",
            )
            .bind(UserId::random())
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.profile_image_url)
            .bind(role)
            .fetch_one(&self.pool)
            .await?
        };

        User::try_from(row)
    }

    async fn create_store(&self, store: NewStore) -> Result<Store, StorageError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO stores (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at, updated_at
            ",
        )
        .bind(&store.name)
        .bind(&store.description)
        .bind(store.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, StorageError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Store::from))
    }

    async fn list_stores_owned_by(&self, owner_id: UserId) -> Result<Vec<Store>, StorageError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM stores
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn list_stores_for_user(&self, user_id: UserId) -> Result<Vec<Store>, StorageError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM stores
            WHERE owner_id = $1
               OR id IN (SELECT store_id FROM store_users WHERE user_id = $1)
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn list_all_stores(&self) -> Result<Vec<Store>, StorageError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM stores
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn update_store(&self, id: StoreId, update: StoreUpdate) -> Result<Store, StorageError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            UPDATE stores
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, owner_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Store::from).ok_or(StorageError::NotFound)
    }

    async fn delete_store(&self, id: StoreId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn get_grant(
        &self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<Option<StoreGrant>, StorageError> {
        let row = sqlx::query_as::<_, GrantRow>(
            r"
            SELECT id, store_id, user_id, role_in_store, created_at
            FROM store_users
            WHERE store_id = $1 AND user_id = $2
            ",
        )
        .bind(store_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoreGrant::try_from).transpose()
    }

    async fn create_grant(&self, grant: NewGrant) -> Result<StoreGrant, StorageError> {
        let row = sqlx::query_as::<_, GrantRow>(
            r"
            INSERT INTO store_users (store_id, user_id, role_in_store)
            VALUES ($1, $2, $3)
            RETURNING id, store_id, user_id, role_in_store, created_at
            ",
        )
        .bind(grant.store_id)
        .bind(grant.user_id)
        .bind(grant.role_in_store)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "user already has access to this store"))?;

        StoreGrant::try_from(row)
    }

    async fn list_transactions(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Transaction>, StorageError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT id, store_id, date, amount_supplied, amount_remaining, notes,
                   created_by, created_at, updated_at
            FROM transactions
            WHERE store_id = $1
            ORDER BY date DESC
            ",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StorageError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT id, store_id, date, amount_supplied, amount_remaining, notes,
                   created_by, created_at, updated_at
            FROM transactions
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, StorageError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            INSERT INTO transactions (store_id, date, amount_supplied, amount_remaining,
                                      notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, store_id, date, amount_supplied, amount_remaining, notes,
                      created_by, created_at, updated_at
            ",
        )
        .bind(transaction.store_id)
        .bind(transaction.date)
        .bind(transaction.amount_supplied)
        .bind(transaction.amount_remaining)
        .bind(&transaction.notes)
        .bind(transaction.created_by)
        .fetch_one(&self.pool)
        .await?;

        Transaction::try_from(row)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, StorageError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            UPDATE transactions
            SET date = COALESCE($2, date),
                amount_supplied = COALESCE($3, amount_supplied),
                amount_remaining = COALESCE($4, amount_remaining),
                notes = COALESCE($5, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, store_id, date, amount_supplied, amount_remaining, notes,
                      created_by, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.date)
        .bind(update.amount_supplied)
        .bind(update.amount_remaining)
        .bind(&update.notes)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from)
            .transpose()?
            .ok_or(StorageError::NotFound)
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn transaction_totals(
        &self,
        store_ids: &[StoreId],
    ) -> Result<TransactionTotals, StorageError> {
        let ids: Vec<Uuid> = store_ids.iter().map(StoreId::as_uuid).collect();

        let row = sqlx::query_as::<_, TotalsRow>(
            r"
            SELECT COALESCE(SUM(amount_supplied), 0) AS supplied,
                   COALESCE(SUM(amount_remaining), 0) AS remaining
            FROM transactions
            WHERE store_id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(TransactionTotals {
            supplied: row.supplied,
            remaining: row.remaining,
        })
    }
}
