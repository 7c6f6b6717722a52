//! Review moderation routes.
//!
//! Customers write reviews on the storefront. Vendors approve or hide the
//! reviews of their own products; admins can also delete them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::ReviewId;

use super::{ListPage, ListQuery, Toggled, not_found};
use crate::components::{DataTableConfig, tables};
use crate::db::ReviewRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireDashboard};
use crate::models::Review;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reviews/query", post(list))
        .route("/api/reviews/table", get(table))
        .route("/api/reviews/{id}", get(show).delete(destroy))
        .route("/api/reviews/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Review>>, AppError> {
    let page = ReviewRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::reviews_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::reviews_table(user.view_mode()))
}

#[instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ReviewId>,
) -> Result<Json<Review>, AppError> {
    ReviewRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("review", id))
}

/// Approve a hidden review or hide an approved one.
#[instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ReviewId>,
) -> Result<Json<Toggled>, AppError> {
    let value = ReviewRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled {
        id: id.as_i32(),
        field: "isApproved",
        value,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode, AppError> {
    ReviewRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
