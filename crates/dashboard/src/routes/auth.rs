//! Authentication route handlers.
//!
//! Password login for admin and vendor accounts. The signed-in identity is
//! kept in the session; the response tells the client which mode to render.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use bazaar_core::Mode;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireDashboard, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// The signed-in user and the dashboard mode it gets.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub user: CurrentUser,
    pub mode: Mode,
}

impl From<CurrentUser> for SessionInfo {
    fn from(user: CurrentUser) -> Self {
        Self {
            mode: user.view_mode(),
            user,
        }
    }
}

/// POST /auth/login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginInput>,
) -> Result<Json<SessionInfo>, AppError> {
    let user = AuthService::new(state.pool())
        .login(&input.email, &input.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "dashboard login rejected"))?;

    set_current_user(&session, &user).await.map_err(|e| {
        tracing::error!(error = %e, "failed to store session");
        AppError::Internal("session error".to_string())
    })?;
    set_sentry_user(user.id.as_i32());

    Ok(Json(user.into()))
}

/// POST /auth/logout
async fn logout(session: Session) -> StatusCode {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "failed to clear session");
    }
    clear_sentry_user();
    StatusCode::NO_CONTENT
}

/// GET /auth/me
async fn me(RequireDashboard(user): RequireDashboard) -> Json<SessionInfo> {
    Json(user.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{Email, UserId, UserRole, VendorId};

    #[test]
    fn test_session_info_carries_mode() {
        let user = CurrentUser {
            id: UserId::new(9),
            email: Email::parse("sam@bazaar.test").unwrap(),
            name: "Sam".to_string(),
            role: UserRole::Vendor,
            vendor_id: Some(VendorId::new(4)),
        };
        let body = serde_json::to_value(SessionInfo::from(user)).unwrap();
        assert_eq!(body["mode"], "vendor");
        assert_eq!(body["user"]["vendorId"], 4);
        assert_eq!(body["user"]["email"], "sam@bazaar.test");
    }
}
