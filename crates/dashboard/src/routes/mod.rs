//! HTTP route handlers for the dashboard API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database round-trip)
//!
//! # Auth
//! POST /auth/login             - Password login
//! POST /auth/logout            - Logout
//! GET  /auth/me                - Signed-in user and mode
//!
//! # Dashboard
//! GET  /api/dashboard/summary  - Counts and revenue for the caller's scope
//!
//! # Entities ({entity} = shops, products, categories, brands, tags,
//! #   attributes, coupons, tax-rates, shipping-methods, orders,
//! #   transactions, staff, reviews, vendors, users)
//! POST   /api/{entity}/query       - One page (fetch contract)
//! GET    /api/{entity}/table       - Table configuration for the caller's mode
//! GET    /api/{entity}/form        - Form schema for the caller's mode
//! POST   /api/{entity}             - Create
//! GET    /api/{entity}/{id}        - Get
//! PUT    /api/{entity}/{id}        - Update
//! POST   /api/{entity}/{id}/toggle - Flip is_active (is_approved for reviews)
//! DELETE /api/{entity}/{id}        - Delete
//! POST   /api/products/bulk        - Activate, deactivate or delete many products
//! POST   /api/vendors/{id}/status  - Approve or suspend a vendor
//!
//! # Storefront (public)
//! POST /api/storefront/shops/{slug}/products/query - Active products of an active shop
//! ```
//!
//! Not every entity offers every operation: orders have no create or toggle,
//! transactions are read-only, reviews are moderated only.

pub mod attributes;
pub mod auth;
pub mod brands;
pub mod categories;
pub mod coupons;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod shipping_methods;
pub mod shops;
pub mod staff;
pub mod storefront;
pub mod tags;
pub mod tax_rates;
pub mod transactions;
pub mod users;
pub mod vendors;

use std::collections::BTreeMap;
use std::fmt::Display;

use axum::Router;
use serde::{Deserialize, Serialize};

use bazaar_core::{FetchRequest, FetchResponse, FieldErrors, MutationState, ShopId};

use crate::components::{DataTableConfig, RowActionState, ToolbarState};
use crate::db::ShopRepository;
use crate::error::AppError;
use crate::models::{
    Attribute, Brand, Category, Coupon, CurrentUser, Order, Product, Review, ShippingMethod, Shop,
    ShopOption, Staff, Tag, TaxRate, Transaction, User, Vendor,
};
use crate::state::AppState;

/// Every route of the service, without layers or state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(storefront::router())
        .merge(shops::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(brands::router())
        .merge(tags::router())
        .merge(attributes::router())
        .merge(coupons::router())
        .merge(tax_rates::router())
        .merge(shipping_methods::router())
        .merge(orders::router())
        .merge(transactions::router())
        .merge(staff::router())
        .merge(reviews::router())
        .merge(vendors::router())
        .merge(users::router())
}

// =============================================================================
// List Requests
// =============================================================================

/// Body of `POST /api/{entity}/query`: the fetch request, plus the client's
/// in-flight writes when it wants button states back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(flatten)]
    pub request: FetchRequest,
    #[serde(default)]
    pub mutation_state: Option<MutationState>,
}

/// A page of rows, with row action and toolbar states when the request
/// carried a `mutationState`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(flatten)]
    pub page: FetchResponse<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_actions: Option<BTreeMap<i32, Vec<RowActionState>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbar: Option<ToolbarState>,
}

impl<T: RowId> ListPage<T> {
    /// Wrap `page`; `table` is only built when there are states to compute.
    pub fn new(
        page: FetchResponse<T>,
        mutations: Option<&MutationState>,
        table: impl FnOnce() -> DataTableConfig,
    ) -> Self {
        let Some(mutations) = mutations else {
            return Self {
                page,
                row_actions: None,
                toolbar: None,
            };
        };

        let table = table();
        let row_actions = page
            .rows
            .iter()
            .map(|row| (row.row_id(), table.row_actions(row.row_id(), mutations)))
            .collect();

        Self {
            toolbar: Some(table.toolbar_state(mutations)),
            row_actions: Some(row_actions),
            page,
        }
    }
}

/// The primary key a list row is addressed by in row action states.
pub trait RowId {
    fn row_id(&self) -> i32;
}

macro_rules! impl_row_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RowId for $ty {
                fn row_id(&self) -> i32 {
                    self.id.as_i32()
                }
            }
        )*
    };
}

impl_row_id!(
    Attribute,
    Brand,
    Category,
    Coupon,
    Order,
    Product,
    Review,
    ShippingMethod,
    Shop,
    Staff,
    Tag,
    TaxRate,
    Transaction,
    User,
    Vendor,
);

// =============================================================================
// Shared Responses
// =============================================================================

/// Result of a toggle: the row and the new value of the flipped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggled {
    pub id: i32,
    pub field: &'static str,
    pub value: bool,
}

impl Toggled {
    #[must_use]
    pub const fn active(id: i32, value: bool) -> Self {
        Self {
            id,
            field: "isActive",
            value,
        }
    }
}

/// Result of a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkResult {
    pub requested: usize,
    pub affected: u64,
}

pub(crate) fn not_found(what: &str, id: impl Display) -> AppError {
    AppError::NotFound(format!("{what} {id}"))
}

// =============================================================================
// Shop Targeting
// =============================================================================

/// Shops the caller may pick in a form: all of them for admins.
pub(crate) async fn shop_options(
    state: &AppState,
    user: &CurrentUser,
) -> Result<Vec<ShopOption>, AppError> {
    Ok(ShopRepository::new(state.pool())
        .options(user.vendor_scope())
        .await?)
}

/// The shop a new shop-scoped row goes into.
///
/// Admins must name an existing shop. Vendors may only name their own; a
/// vendor with exactly one shop may leave it out.
pub(crate) async fn target_shop(
    state: &AppState,
    user: &CurrentUser,
    requested: Option<ShopId>,
) -> Result<ShopId, AppError> {
    let shops = ShopRepository::new(state.pool());

    let rejected = match (user.vendor_scope(), requested) {
        (None, Some(shop)) => {
            if shops.exists(shop).await? {
                return Ok(shop);
            }
            "does not exist"
        }
        (Some(vendor), Some(shop)) => {
            if shops.is_owned_by(shop, vendor).await? {
                return Ok(shop);
            }
            "must be one of your shops"
        }
        (Some(vendor), None) => match shops.options(Some(vendor)).await?.as_slice() {
            [only] => return Ok(only.id),
            _ => "is required",
        },
        (None, None) => "is required",
    };

    Err(FieldErrors::single("shopId", rejected).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{MutationKind, StaffId};
    use chrono::Utc;
    use serde_json::json;

    use crate::components::tables;

    fn staff(id: i32) -> Staff {
        Staff {
            id: StaffId::new(id),
            shop_id: ShopId::new(1),
            shop_name: "Corner Café".to_string(),
            name: format!("Member {id}"),
            email: format!("member{id}@bazaar.test"),
            position: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_query_flattens_fetch_request() {
        let query: ListQuery = serde_json::from_value(json!({
            "pageIndex": 2,
            "pageSize": 25,
            "globalFilter": "mug",
            "mutationState": {"deleting": [4]}
        }))
        .unwrap();
        assert_eq!(query.request.page_index, 2);
        assert_eq!(query.request.page_size, 25);
        assert_eq!(query.request.search_term(), Some("mug"));
        assert!(query.mutation_state.unwrap().is_deleting(4));
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.request, FetchRequest::default());
        assert!(query.mutation_state.is_none());
    }

    #[test]
    fn test_list_page_without_mutation_state() {
        let page = FetchResponse::new(vec![staff(1)], 1, 10);
        let list = ListPage::new(page, None, || unreachable!("table not needed"));
        let body = serde_json::to_value(&list).unwrap();
        assert_eq!(body["total"], 1);
        assert_eq!(body["pageCount"], 1);
        assert!(body.get("rowActions").is_none());
        assert!(body.get("toolbar").is_none());
    }

    #[test]
    fn test_list_page_with_mutation_state() {
        let mut mutations = MutationState::default();
        mutations.begin(MutationKind::Delete, Some(2));
        mutations.begin(MutationKind::Create, None);

        let page = FetchResponse::new(vec![staff(1), staff(2)], 2, 10);
        let list = ListPage::new(page, Some(&mutations), || {
            tables::staff_table(bazaar_core::Mode::Vendor)
        });
        let body = serde_json::to_value(&list).unwrap();

        let idle = body["rowActions"]["1"].as_array().unwrap();
        assert!(idle.iter().all(|a| a["disabled"] == false && a["busy"] == false));

        let deleting = body["rowActions"]["2"].as_array().unwrap();
        assert!(deleting.iter().all(|a| a["disabled"] == true));
        let delete = deleting.iter().find(|a| a["key"] == "delete").unwrap();
        assert_eq!(delete["busy"], true);
        let edit = deleting.iter().find(|a| a["key"] == "edit").unwrap();
        assert_eq!(edit["busy"], false);

        assert_eq!(body["toolbar"]["createDisabled"], true);
    }

    #[test]
    fn test_toggled_shape() {
        let body = serde_json::to_value(Toggled::active(3, false)).unwrap();
        assert_eq!(body, json!({"id": 3, "field": "isActive", "value": false}));
    }
}
