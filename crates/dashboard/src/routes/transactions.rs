//! Transaction routes. Read-only: payments are recorded by checkout.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tracing::instrument;

use bazaar_core::TransactionId;

use super::{ListPage, ListQuery, not_found};
use crate::components::{DataTableConfig, tables};
use crate::db::TransactionRepository;
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::Transaction;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/transactions/query", post(list))
        .route("/api/transactions/table", get(table))
        .route("/api/transactions/{id}", get(show))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Json(query): Json<ListQuery>,
) -> Result<Json<ListPage<Transaction>>, AppError> {
    let page = TransactionRepository::new(state.pool())
        .list(&query.request, user.vendor_scope())
        .await?;
    Ok(Json(ListPage::new(page, query.mutation_state.as_ref(), || {
        tables::transactions_table(user.view_mode())
    })))
}

async fn table(RequireDashboard(user): RequireDashboard) -> Json<DataTableConfig> {
    Json(tables::transactions_table(user.view_mode()))
}

#[instrument(skip_all, fields(user_id = %user.id, transaction_id = %id))]
async fn show(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
    Path(id): Path<TransactionId>,
) -> Result<Json<Transaction>, AppError> {
    TransactionRepository::new(state.pool())
        .get(id, user.vendor_scope())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("transaction", id))
}
