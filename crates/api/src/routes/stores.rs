//! Store CRUD and balance routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use ledgerflow_core::StoreId;

use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, Store};
use crate::services::{AccessService, BalanceService, StoreBalance};
use crate::state::AppState;
use crate::validation::{self, StorePayload};

/// Fetch a store, enforcing existence before permission.
///
/// A missing store is 404 for every caller; one the caller may not touch
/// is 403. The order is fixed so responses never vary by who asks.
pub(super) async fn load_accessible_store(
    state: &AppState,
    user: &CurrentUser,
    store_id: StoreId,
) -> Result<Store, ApiError> {
    let store = state
        .storage()
        .get_store(store_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_owned()))?;

    let access = AccessService::new(state.storage());
    if !access.can_access_store(user.id, store.id).await? {
        return Err(ApiError::Forbidden("Access denied".to_owned()));
    }

    Ok(store)
}

/// List stores visible to the current user.
///
/// GET /api/stores
///
/// Admins see every store. Other roles see stores they own, plus stores
/// they were granted access to when the deployment opts in.
///
/// # Errors
///
/// Returns 401 without a session.
pub async fn list_stores(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Store>>, ApiError> {
    let role = AccessService::new(state.storage()).user_role(user.id).await?;
    let stores = BalanceService::new(state.storage())
        .visible_stores(user.id, role, state.config().store_visibility)
        .await?;

    Ok(Json(stores))
}

/// Create a store owned by the current user.
///
/// POST /api/stores
///
/// # Errors
///
/// Returns 400 with field errors if the name is missing or too long.
pub async fn create_store(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(payload): Json<StorePayload>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let new_store = validation::validate_new_store(&payload, user.id)?;
    let store = state.storage().create_store(new_store).await?;

    Ok((StatusCode::CREATED, Json(store)))
}

/// Get a single store.
///
/// GET /api/stores/{id}
///
/// # Errors
///
/// Returns 404 if the store does not exist, 403 if the caller may not
/// access it.
pub async fn get_store(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Store>, ApiError> {
    let store = load_accessible_store(&state, &user, store_id).await?;

    Ok(Json(store))
}

/// Partially update a store.
///
/// PATCH /api/stores/{id}
///
/// Absent fields keep their stored values.
///
/// # Errors
///
/// Returns 404/403 as for GET, 400 if a present name is invalid.
pub async fn update_store(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    Json(payload): Json<StorePayload>,
) -> Result<Json<Store>, ApiError> {
    load_accessible_store(&state, &user, store_id).await?;

    let update = validation::validate_store_update(&payload)?;
    let store = state.storage().update_store(store_id, update).await?;

    Ok(Json(store))
}

/// Delete a store and everything recorded against it.
///
/// DELETE /api/stores/{id}
///
/// Grants and transactions go with the store.
///
/// # Errors
///
/// Returns 404/403 as for GET.
pub async fn delete_store(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<StatusCode, ApiError> {
    load_accessible_store(&state, &user, store_id).await?;

    state.storage().delete_store(store_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get the aggregated balance for a store.
///
/// GET /api/stores/{id}/balance
///
/// # Errors
///
/// Returns 404/403 as for GET.
pub async fn store_balance(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<StoreBalance>, ApiError> {
    load_accessible_store(&state, &user, store_id).await?;

    let balance = BalanceService::new(state.storage())
        .store_balance(store_id)
        .await?;

    Ok(Json(balance))
}
