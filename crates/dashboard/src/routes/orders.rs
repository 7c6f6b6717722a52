//! Order routes.
//!
//! Orders arrive from checkout. The dashboard lists them, moves their status
//! along and keeps notes; only admins delete them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::OrderId;

use super::{ListPage, ListQuery, not_found};
use crate::components::{DataTableConfig, FormSchema, forms, tables};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireDashboard};
use crate::models::{Order, OrderDetail, OrderUpdateInput, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders/query", post(list))
        .route("/api/orders/table", get(table))
        .route("/api/orders/form", get(form))
        .route("/api/orders/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Order>>, AppError> {
    let page = OrderRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::orders_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::orders_table(user.view_mode()))
}

async fn form(RequireDashboard(_): RequireDashboard) -> Json<FormSchema> {
    Json(forms::order_form())
}

#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>, AppError> {
    OrderRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("order", id))
}

#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<OrderId>,
    Json(input): Json<OrderUpdateInput>,
) -> Result<Json<OrderDetail>, AppError> {
    let update = input.validate()?;
    let order = OrderRepository::new(state.pool())
        .update(id, &update, user.vendor_scope())
        .await?;
    Ok(Json(order))
}

#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<StatusCode, AppError> {
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
