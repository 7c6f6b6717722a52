//! Authentication extractors for the dashboard API.
//!
//! The signed-in [`CurrentUser`] lives in the session. Handlers take
//! [`RequireDashboard`] (admin or vendor) or [`RequireAdmin`]; a missing
//! session answers 401, a role without access answers 403.
//!
//! The session only names the user. Every request reloads the account, so
//! a deactivated user or a vendor detached from their vendor is signed out
//! on their next call.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use bazaar_core::{Mode, UserRole};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::services::auth::dashboard_identity;
use crate::state::AppState;

/// Extractor that requires a signed-in admin or vendor user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireDashboard(user): RequireDashboard) -> impl IntoResponse {
///     format!("{} mode", if user.is_admin() { "admin" } else { "vendor" })
/// }
/// ```
pub struct RequireDashboard(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when a request lacks the required sign-in or role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No session, or nobody signed in.
    Unauthorized,
    /// Signed in, but the role may not use this endpoint.
    Forbidden,
    /// The account could not be reloaded.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => AppError::Unauthorized("sign in required".to_string()),
            Self::Forbidden => {
                AppError::Forbidden("your account cannot access this resource".to_string())
            }
            Self::Unavailable => AppError::Internal("could not load account".to_string()),
        }
        .into_response()
    }
}

/// Resolve the signed-in user against the current state of their account.
async fn current_user(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let stored = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)?;

    let account = UserRepository::new(state.pool())
        .get(stored.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %stored.id, "could not reload signed-in user");
            AuthRejection::Unavailable
        })?;

    let Some(user) = account.as_ref().and_then(|u| dashboard_identity(u).ok()) else {
        tracing::info!(user_id = %stored.id, "signed-in user lost dashboard access, ending session");
        if let Err(e) = clear_current_user(session).await {
            tracing::warn!(error = %e, "failed to clear revoked session");
        }
        return Err(AuthRejection::Unauthorized);
    };

    if user != stored {
        if let Err(e) = session.insert(keys::CURRENT_USER, &user).await {
            tracing::warn!(error = %e, "failed to refresh session user");
        }
    }
    Ok(user)
}

impl<S> FromRequestParts<S> for RequireDashboard
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, &AppState::from_ref(state)).await?;

        match (user.mode(), user.vendor_id) {
            (Some(Mode::Admin), _) | (Some(Mode::Vendor), Some(_)) => Ok(Self(user)),
            // A vendor without a vendor would otherwise get the unscoped admin view.
            (Some(Mode::Vendor), None) | (None, _) => Err(AuthRejection::Forbidden),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, &AppState::from_ref(state)).await?;

        if user.role != UserRole::Admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// The session ID is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthRejection::Unavailable.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
