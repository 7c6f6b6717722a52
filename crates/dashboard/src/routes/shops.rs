//! Shop routes.
//!
//! Admins manage every shop; vendors list, edit and toggle their own but
//! cannot open or delete shops.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::{FieldErrors, ShopId};

use super::{ListPage, ListQuery, Toggled, not_found};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::ShopRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireDashboard};
use crate::models::{Shop, ShopInput, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shops", post(create))
        .route("/api/shops/query", post(list))
        .route("/api/shops/table", get(table))
        .route("/api/shops/form", get(form))
        .route("/api/shops/{id}", get(show).put(update).delete(destroy))
        .route("/api/shops/{id}/toggle", post(toggle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Shop>>, AppError> {
    let page = ShopRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::shops_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::shops_table(user.view_mode()))
}

async fn form(RequireDashboard(user): RequireDashboard) -> Json<FormSchema> {
    Json(forms::shop_form(user.view_mode()))
}

#[instrument(skip_all, fields(user_id = %user.id, shop_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShopId>,
) -> Result<Json<Shop>, AppError> {
    ShopRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("shop", id))
}

/// Open a shop for a vendor. Admin only.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Json(input): Json<ShopInput>,
) -> Result<(StatusCode, Json<Shop>), AppError> {
    let vendor_required = input.vendor_id.is_none();
    let fields = match input.validate() {
        Ok(fields) => fields,
        Err(mut errors) => {
            if vendor_required {
                errors.add("vendorId", "is required");
            }
            return Err(errors.into());
        }
    };
    let Some(vendor_id) = fields.vendor_id else {
        return Err(FieldErrors::single("vendorId", "is required").into());
    };

    let shop = ShopRepository::new(state.pool())
        .create(vendor_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(shop)))
}

/// Edit a shop. The owning vendor never changes here.
#[instrument(skip_all, fields(user_id = %user.id, shop_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShopId>,
    Json(input): Json<ShopInput>,
) -> Result<Json<Shop>, AppError> {
    let fields = input.validate()?;
    let shop = ShopRepository::new(state.pool())
        .update(id, &fields, user.vendor_scope())
        .await?;
    Ok(Json(shop))
}

#[instrument(skip_all, fields(user_id = %user.id, shop_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<ShopId>,
) -> Result<Json<Toggled>, AppError> {
    let value = ShopRepository::new(state.pool())
        .toggle(id, user.vendor_scope())
        .await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

/// Delete a shop and everything in it. Admin only.
#[instrument(skip_all, fields(user_id = %user.id, shop_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ShopId>,
) -> Result<StatusCode, AppError> {
    ShopRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
