//! Authentication routes.
//!
//! The API itself never handles credentials. In production an identity
//! provider in front of the service establishes the session; the login
//! endpoint here is a config-gated stand-in used by tests and local
//! development to provision a user and open a session in one call.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use ledgerflow_core::{Email, Role, UserId};

use crate::error::{ApiError, clear_sentry_user};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UpsertUser, User};
use crate::state::AppState;
use crate::validation::FieldError;

/// Dev login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Stable identity ID; omit to mint a fresh user.
    pub id: Option<UserId>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    /// Role applied only when the user is first created.
    pub role: Option<Role>,
}

/// Get the current user's profile.
///
/// GET /api/auth/user
///
/// # Errors
///
/// Returns 401 without a session, 404 if the user row has been deleted
/// since login.
pub async fn current_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .storage()
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;

    Ok(Json(user))
}

/// Provision a user and open a session.
///
/// POST /api/auth/login
///
/// Upserts the user (matched by ID when given, by email otherwise; profile
/// fields refresh, the stored role never changes) and stores the identity in
/// the session.
///
/// # Errors
///
/// Returns 404 when dev login is disabled, 400 on an invalid email.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>, ApiError> {
    // The endpoint pretends not to exist unless explicitly enabled
    if !state.config().dev_login {
        return Err(ApiError::NotFound("Not found".to_owned()));
    }

    let email = Email::parse(&body.email).map_err(|e| ApiError::Validation {
        message: "Invalid login data".to_owned(),
        errors: vec![FieldError {
            field: "email".to_owned(),
            message: e.to_string(),
        }],
    })?;

    let user = state
        .storage()
        .upsert_user(UpsertUser {
            id: body.id,
            email,
            first_name: body.first_name,
            last_name: body.last_name,
            profile_image_url: body.profile_image_url,
            role: body.role,
        })
        .await?;

    set_current_user(
        &session,
        &CurrentUser {
            id: user.id,
            email: user.email.clone(),
        },
    )
    .await
    .map_err(|e| ApiError::Internal(format!("session error: {e}")))?;

    Ok(Json(user))
}

/// Log out and destroy the session.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// Returns 500 if the session store rejects the update.
pub async fn logout(session: Session) -> Result<StatusCode, ApiError> {
    clear_current_user(&session)
        .await
        .map_err(|e| ApiError::Internal(format!("session error: {e}")))?;

    // Also destroy the entire session
    session
        .flush()
        .await
        .map_err(|e| ApiError::Internal(format!("session error: {e}")))?;

    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}
