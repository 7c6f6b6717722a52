//! Attribute routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::AttributeId;

use super::{ListPage, ListQuery, Toggled, not_found, shop_options, target_shop};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::AttributeRepository;
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::{Attribute, AttributeInput, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/attributes", post(create))
        .route("/api/attributes/query", post(list))
        .route("/api/attributes/table", get(table))
        .route("/api/attributes/form", get(form))
        .route("/api/attributes/{id}", get(show).put(update).delete(destroy))
        .route("/api/attributes/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Attribute>>, AppError> {
    let page = AttributeRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::attributes_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::attributes_table(user.view_mode()))
}

async fn form(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
) -> Result<Json<FormSchema>, AppError> {
    let shops = shop_options(&state, &user).await?;
    Ok(Json(forms::attribute_form(user.view_mode(), &shops)))
}

#[instrument(skip_all, fields(user_id = %user.id, attribute_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<AttributeId>,
) -> Result<Json<Attribute>, AppError> {
    AttributeRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("attribute", id))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(input): Json<AttributeInput>,
) -> Result<(StatusCode, Json<Attribute>), AppError> {
    let requested_shop = input.shop_id;
    let fields = input.validate()?;
    let shop_id = target_shop(&state, &user, requested_shop).await?;

    let created = AttributeRepository::new(state.pool())
        .create(shop_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(user_id = %user.id, attribute_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<AttributeId>,
    Json(input): Json<AttributeInput>,
) -> Result<Json<Attribute>, AppError> {
    let fields = input.validate()?;
    let updated = AttributeRepository::new(state.pool())
        .update(id, &fields, user.vendor_scope())
        .await?;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(user_id = %user.id, attribute_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<AttributeId>,
) -> Result<Json<Toggled>, AppError> {
    let value = AttributeRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

#[instrument(skip_all, fields(user_id = %user.id, attribute_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<AttributeId>,
) -> Result<StatusCode, AppError> {
    AttributeRepository::new(state.pool())
        .delete(id, user.vendor_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
