//! Dashboard account routes. Admin only.
//!
//! Accounts are created with a password and can be deactivated, never
//! deleted, so orders and reviews keep their author.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::UserId;

use super::{ListPage, ListQuery, Toggled, not_found};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{NewUserInput, User, Validate};
use crate::services::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(create))
        .route("/api/users/query", post(list))
        .route("/api/users/table", get(table))
        .route("/api/users/form", get(form))
        .route("/api/users/{id}", get(show))
        .route("/api/users/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %admin.id))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<User>>, AppError> {
    let page = UserRepository::new(state.pool())
        .list(&query.request)
        .await?;
    Ok(Json(ListPage::new(
        page,
        query.mutation_state.as_ref(),
        tables::users_table,
    )))
}

async fn table(RequireAdmin(_): RequireAdmin) -> Json<DataTableConfig> {
    Json(tables::users_table())
}

async fn form(RequireAdmin(_): RequireAdmin) -> Json<FormSchema> {
    Json(forms::user_form())
}

#[instrument(skip_all, fields(user_id = %admin.id, target_user_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    UserRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("user", id))
}

#[instrument(skip_all, fields(user_id = %admin.id))]
async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<NewUserInput>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let fields = input.validate()?;
    let user = AuthService::new(state.pool()).register(&fields).await?;
    tracing::info!(created_user_id = %user.id, role = %user.role, "dashboard user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Activate or deactivate an account. Admins cannot deactivate themselves.
#[instrument(skip_all, fields(user_id = %admin.id, target_user_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<Toggled>, AppError> {
    let value = UserRepository::new(state.pool())
        .toggle(id, admin.id)
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}
