//! Brand routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::BrandId;

use super::{ListPage, ListQuery, Toggled, not_found, shop_options, target_shop};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::BrandRepository;
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::{Brand, BrandInput, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/brands", post(create))
        .route("/api/brands/query", post(list))
        .route("/api/brands/table", get(table))
        .route("/api/brands/form", get(form))
        .route("/api/brands/{id}", get(show).put(update).delete(destroy))
        .route("/api/brands/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Brand>>, AppError> {
    let page = BrandRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::brands_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::brands_table(user.view_mode()))
}

async fn form(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
) -> Result<Json<FormSchema>, AppError> {
    let shops = shop_options(&state, &user).await?;
    Ok(Json(forms::brand_form(user.view_mode(), &shops)))
}

#[instrument(skip_all, fields(user_id = %user.id, brand_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<BrandId>,
) -> Result<Json<Brand>, AppError> {
    BrandRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("brand", id))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(input): Json<BrandInput>,
) -> Result<(StatusCode, Json<Brand>), AppError> {
    let requested_shop = input.shop_id;
    let fields = input.validate()?;
    let shop_id = target_shop(&state, &user, requested_shop).await?;

    let created = BrandRepository::new(state.pool())
        .create(shop_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(user_id = %user.id, brand_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<BrandId>,
    Json(input): Json<BrandInput>,
) -> Result<Json<Brand>, AppError> {
    let fields = input.validate()?;
    let updated = BrandRepository::new(state.pool())
        .update(id, &fields, user.vendor_scope())
        .await?;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(user_id = %user.id, brand_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<BrandId>,
) -> Result<Json<Toggled>, AppError> {
    let value = BrandRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

#[instrument(skip_all, fields(user_id = %user.id, brand_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<BrandId>,
) -> Result<StatusCode, AppError> {
    BrandRepository::new(state.pool())
        .delete(id, user.vendor_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
