//! Admin-only routes.

use axum::{Json, extract::State};

use ledgerflow_core::Role;

use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::Store;
use crate::services::AccessService;
use crate::state::AppState;

/// List every store, regardless of ownership.
///
/// GET /api/admin/stores
///
/// The role is read from storage on every call, so a demoted admin loses
/// this endpoint without logging out.
///
/// # Errors
///
/// Returns 403 for any caller whose stored role is not `Admin`.
pub async fn list_all_stores(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Store>>, ApiError> {
    let role = AccessService::new(state.storage()).user_role(user.id).await?;
    if role != Role::Admin {
        return Err(ApiError::Forbidden("Admin access required".to_owned()));
    }

    let stores = state.storage().list_all_stores().await?;

    Ok(Json(stores))
}
