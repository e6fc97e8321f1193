//! Transaction routes.
//!
//! Creation and listing are store-scoped; updates and deletes address a
//! transaction directly and derive the store from the stored record, so a
//! request can never smuggle in a different store's ID to dodge the
//! permission check.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use ledgerflow_core::{StoreId, TransactionId};

use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, Transaction};
use crate::services::AccessService;
use crate::state::AppState;
use crate::validation::{self, TransactionPayload};

use super::stores::load_accessible_store;

/// Fetch a transaction, deriving and checking its store.
///
/// Existence first, permission second, same as the store routes.
async fn load_accessible_transaction(
    state: &AppState,
    user: &CurrentUser,
    transaction_id: TransactionId,
) -> Result<Transaction, ApiError> {
    let transaction = state
        .storage()
        .get_transaction(transaction_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_owned()))?;

    let access = AccessService::new(state.storage());
    if !access.can_access_store(user.id, transaction.store_id).await? {
        return Err(ApiError::Forbidden("Access denied".to_owned()));
    }

    Ok(transaction)
}

/// List a store's transactions, newest activity first.
///
/// GET /api/stores/{id}/transactions
///
/// # Errors
///
/// Returns 404 if the store does not exist, 403 if the caller may not
/// access it.
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    load_accessible_store(&state, &user, store_id).await?;

    let transactions = state.storage().list_transactions(store_id).await?;

    Ok(Json(transactions))
}

/// Record a transaction against a store.
///
/// POST /api/stores/{id}/transactions
///
/// `amountRemaining` defaults to `"0.00"` when absent or empty.
///
/// # Errors
///
/// Returns 404/403 as for listing, 400 with field errors on invalid
/// amounts or dates.
pub async fn create_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    Json(payload): Json<TransactionPayload>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    load_accessible_store(&state, &user, store_id).await?;

    let new_transaction = validation::validate_new_transaction(&payload, store_id, user.id)?;
    let transaction = state.storage().create_transaction(new_transaction).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Partially update a transaction.
///
/// PATCH /api/transactions/{id}
///
/// Absent fields keep their stored values; an empty body returns the
/// record unchanged.
///
/// # Errors
///
/// Returns 404 if the transaction does not exist, 403 if the caller may
/// not access its store, 400 on invalid fields.
pub async fn update_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Json<Transaction>, ApiError> {
    load_accessible_transaction(&state, &user, transaction_id).await?;

    let update = validation::validate_transaction_update(&payload)?;
    let transaction = state
        .storage()
        .update_transaction(transaction_id, update)
        .await?;

    Ok(Json(transaction))
}

/// Delete a transaction.
///
/// DELETE /api/transactions/{id}
///
/// # Errors
///
/// Returns 404/403 as for updates.
pub async fn delete_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, ApiError> {
    load_accessible_transaction(&state, &user, transaction_id).await?;

    state.storage().delete_transaction(transaction_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
