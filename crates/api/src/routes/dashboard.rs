//! Dashboard routes.

use axum::{Json, extract::State};

use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::services::{AccessService, BalanceService, DashboardStats};
use crate::state::AppState;

/// Get totals across the caller's visible stores.
///
/// GET /api/dashboard/stats
///
/// Uses the same visibility rules as `GET /api/stores`, so the figures
/// always add up over exactly the stores that listing returns.
///
/// # Errors
///
/// Returns 401 without a session.
pub async fn stats(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<DashboardStats>, ApiError> {
    let role = AccessService::new(state.storage()).user_role(user.id).await?;
    let stats = BalanceService::new(state.storage())
        .dashboard_stats(user.id, role, state.config().store_visibility)
        .await?;

    Ok(Json(stats))
}
