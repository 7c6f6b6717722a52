//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::CategoryId;

use super::{ListPage, ListQuery, Toggled, not_found, shop_options, target_shop};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::{Category, CategoryInput, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", post(create))
        .route("/api/categories/query", post(list))
        .route("/api/categories/table", get(table))
        .route("/api/categories/form", get(form))
        .route("/api/categories/{id}", get(show).put(update).delete(destroy))
        .route("/api/categories/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Category>>, AppError> {
    let page = CategoryRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::categories_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::categories_table(user.view_mode()))
}

async fn form(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
) -> Result<Json<FormSchema>, AppError> {
    let shops = shop_options(&state, &user).await?;
    Ok(Json(forms::category_form(user.view_mode(), &shops)))
}

#[instrument(skip_all, fields(user_id = %user.id, category_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, AppError> {
    CategoryRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("category", id))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let requested_shop = input.shop_id;
    let fields = input.validate()?;
    let shop_id = target_shop(&state, &user, requested_shop).await?;

    let created = CategoryRepository::new(state.pool())
        .create(shop_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(user_id = %user.id, category_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    let fields = input.validate()?;
    let updated = CategoryRepository::new(state.pool())
        .update(id, &fields, user.vendor_scope())
        .await?;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(user_id = %user.id, category_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<CategoryId>,
) -> Result<Json<Toggled>, AppError> {
    let value = CategoryRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

#[instrument(skip_all, fields(user_id = %user.id, category_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    CategoryRepository::new(state.pool())
        .delete(id, user.vendor_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
