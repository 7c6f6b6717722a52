//! Product routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::ProductId;

use super::{BulkResult, ListPage, ListQuery, Toggled, not_found, shop_options, target_shop};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::{ListContext, ProductRepository};
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::{
    BulkProductAction, BulkProductInput, Product, ProductDetail, ProductInput, Validate,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", post(create))
        .route("/api/products/query", post(list))
        .route("/api/products/bulk", post(bulk))
        .route("/api/products/table", get(table))
        .route("/api/products/form", get(form))
        .route("/api/products/{id}", get(show).put(update).delete(destroy))
        .route("/api/products/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Product>>, AppError> {
    let page = ProductRepository::new(state.pool())
        .list(&query.request, &ListContext::scoped(user.vendor_scope()))
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::products_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::products_table(user.view_mode()))
}

async fn form(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
) -> Result<Json<FormSchema>, AppError> {
    let shops = shop_options(&state, &user).await?;
    Ok(Json(forms::product_form(user.view_mode(), &shops)))
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>, AppError> {
    ProductRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("product", id))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductDetail>), AppError> {
    let requested_shop = input.shop_id;
    let fields = input.validate()?;
    let shop_id = target_shop(&state, &user, requested_shop).await?;

    let created = ProductRepository::new(state.pool())
        .create(shop_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ProductDetail>, AppError> {
    let fields = input.validate()?;
    let updated = ProductRepository::new(state.pool())
        .update(id, &fields, user.vendor_scope())
        .await?;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ProductId>,
) -> Result<Json<Toggled>, AppError> {
    let value = ProductRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool())
        .delete(id, user.vendor_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activate, deactivate or delete a selection. Rows outside the caller's
/// shops are skipped and not counted.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn bulk(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(input): Json<BulkProductInput>,
) -> Result<Json<BulkResult>, AppError> {
    let (action, ids) = input.validate()?;
    let products = ProductRepository::new(state.pool());
    let scope = user.vendor_scope();

    let affected = match action {
        BulkProductAction::Activate => products.set_active_many(&ids, true, scope).await?,
        BulkProductAction::Deactivate => products.set_active_many(&ids, false, scope).await?,
        BulkProductAction::Delete => products.delete_many(&ids, scope).await?,
    };
    Ok(Json(BulkResult {
        requested: ids.len(),
        affected,
    }))
}
