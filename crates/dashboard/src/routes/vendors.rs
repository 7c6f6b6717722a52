//! Vendor routes. Admin only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::VendorId;

use super::{ListPage, ListQuery, Toggled, not_found};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::VendorRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{Validate, Vendor, VendorInput, VendorStatusInput};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/vendors", post(create))
        .route("/api/vendors/query", post(list))
        .route("/api/vendors/table", get(table))
        .route("/api/vendors/form", get(form))
        .route("/api/vendors/{id}", get(show).put(update).delete(destroy))
        .route("/api/vendors/{id}/toggle", post(toggle))
        .route("/api/vendors/{id}/status", post(set_status))
}

#[instrument(skip_all, fields(user_id = %admin.id))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Vendor>>, AppError> {
    let page = VendorRepository::new(state.pool())
        .list(&query.request)
        .await?;
    Ok(Json(ListPage::new(
        page,
        query.mutation_state.as_ref(),
        tables::vendors_table,
    )))
}

async fn table(RequireAdmin(_): RequireAdmin) -> Json<DataTableConfig> {
    Json(tables::vendors_table())
}

async fn form(RequireAdmin(_): RequireAdmin) -> Json<FormSchema> {
    Json(forms::vendor_form())
}

#[instrument(skip_all, fields(user_id = %admin.id, vendor_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<VendorId>,
) -> Result<Json<Vendor>, AppError> {
    VendorRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("vendor", id))
}

#[instrument(skip_all, fields(user_id = %admin.id))]
async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<VendorInput>,
) -> Result<(StatusCode, Json<Vendor>), AppError> {
    let fields = input.validate()?;
    let vendor = VendorRepository::new(state.pool()).create(&fields).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

#[instrument(skip_all, fields(user_id = %admin.id, vendor_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<VendorId>,
    Json(input): Json<VendorInput>,
) -> Result<Json<Vendor>, AppError> {
    let fields = input.validate()?;
    let vendor = VendorRepository::new(state.pool())
        .update(id, &fields)
        .await?;
    Ok(Json(vendor))
}

/// Approve, suspend or reset a vendor to pending.
#[instrument(skip_all, fields(user_id = %admin.id, vendor_id = %id, status = %input.status))]
async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<VendorId>,
    Json(input): Json<VendorStatusInput>,
) -> Result<Json<Vendor>, AppError> {
    let vendor = VendorRepository::new(state.pool())
        .set_status(id, input.status)
        .await?;
    Ok(Json(vendor))
}

#[instrument(skip_all, fields(user_id = %admin.id, vendor_id = %id))]
async fn toggle(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<VendorId>,
) -> Result<Json<Toggled>, AppError> {
    let value = VendorRepository::new(state.pool()).toggle(id).await?;
    Ok(Json(Toggled::active(id.as_i32(), value)))
}

#[instrument(skip_all, fields(user_id = %admin.id, vendor_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<VendorId>,
) -> Result<StatusCode, AppError> {
    VendorRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
