//! Public storefront routes.
//!
//! Anyone may browse the active products of an active shop whose vendor is
//! approved. Inactive products never leave this endpoint, whatever the
//! request's filters say.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse};

use super::not_found;
use crate::db::{ListContext, ProductRepository, ShopRepository};
use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/storefront/shops/{slug}/products/query", post(products))
}

#[instrument(skip(state, request))]
async fn products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<FetchRequest>,
) -> Result<Json<FetchResponse<Product>>, AppError> {
    let shop = ShopRepository::new(state.pool())
        .find_active_by_slug(&slug)
        .await?
        .ok_or_else(|| not_found("shop", &slug))?;

    let page = ProductRepository::new(state.pool())
        .list(&request, &ListContext::storefront(shop))
        .await?;
    Ok(Json(page))
}
