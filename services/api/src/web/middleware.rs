//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.
//!
//! Sign-in itself is handled by the identity provider; callers present the
//! signed-in email in `x-user-email` and the portal looks up its role.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use campus_vault_core::Account;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const PROFILE_HEADER: &str = "x-profile-id";

async fn resolve_account(state: &AppState, headers: &HeaderMap) -> Result<Account, ApiError> {
    let email = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(ApiError::Unauthenticated)?;

    state.accounts.find_by_email(email).await?.ok_or_else(|| {
        debug!("Rejected unknown account {}.", email);
        ApiError::Unauthenticated
    })
}

/// Requires a known account and inserts it into request extensions.
///
/// If missing or unknown, returns 401 Unauthorized.
pub async fn require_account(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account = resolve_account(&state, req.headers()).await?;
    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}

/// Like `require_account`, but students get 403 Forbidden.
pub async fn require_faculty(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account = resolve_account(&state, req.headers()).await?;
    if !account.role.is_faculty() {
        return Err(ApiError::Forbidden);
    }
    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}

/// The bookmark profile named by the caller, if any.
pub fn profile_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(PROFILE_HEADER).and_then(|v| v.to_str().ok())
}
