//! Shipping method routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::ShippingMethodId;

use super::{ListPage, ListQuery, Toggled, not_found, shop_options, target_shop};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::ShippingMethodRepository;
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::{ShippingMethod, ShippingMethodInput, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shipping-methods", post(create))
        .route("/api/shipping-methods/query", post(list))
        .route("/api/shipping-methods/table", get(table))
        .route("/api/shipping-methods/form", get(form))
        .route("/api/shipping-methods/{id}", get(show).put(update).delete(destroy))
        .route("/api/shipping-methods/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<ShippingMethod>>, AppError> {
    let page = ShippingMethodRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::shipping_methods_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::shipping_methods_table(user.view_mode()))
}

async fn form(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
) -> Result<Json<FormSchema>, AppError> {
    let shops = shop_options(&state, &user).await?;
    Ok(Json(forms::shipping_method_form(user.view_mode(), &shops)))
}

#[instrument(skip_all, fields(user_id = %user.id, shipping_method_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShippingMethodId>,
) -> Result<Json<ShippingMethod>, AppError> {
    ShippingMethodRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("shipping method", id))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(input): Json<ShippingMethodInput>,
) -> Result<(StatusCode, Json<ShippingMethod>), AppError> {
    let requested_shop = input.shop_id;
    let fields = input.validate()?;
    let shop_id = target_shop(&state, &user, requested_shop).await?;

    let created = ShippingMethodRepository::new(state.pool())
        .create(shop_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(user_id = %user.id, shipping_method_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShippingMethodId>,
    Json(input): Json<ShippingMethodInput>,
) -> Result<Json<ShippingMethod>, AppError> {
    let fields = input.validate()?;
    let updated = ShippingMethodRepository::new(state.pool())
        .update(id, &fields, user.vendor_scope())
        .await?;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(user_id = %user.id, shipping_method_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShippingMethodId>,
) -> Result<Json<Toggled>, AppError> {
    let value = ShippingMethodRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

#[instrument(skip_all, fields(user_id = %user.id, shipping_method_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShippingMethodId>,
) -> Result<StatusCode, AppError> {
    ShippingMethodRepository::new(state.pool())
        .delete(id, user.vendor_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
