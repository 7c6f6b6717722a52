//! Database operations for payment transactions (read-only).

use sqlx::PgPool;

use bazaar_core::{FetchRequest, FetchResponse, SortDirection, TransactionId, VendorId};

use super::RepositoryError;
use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use crate::models::Transaction;

pub const LIST: ListSpec = ListSpec {
    entity: "transactions",
    select: "t.id, t.order_id, o.order_number, t.shop_id, s.name AS shop_name, t.amount, \
             t.currency, t.provider, t.reference, t.status, t.created_at",
    from: "transactions t JOIN orders o ON o.id = t.order_id JOIN shops s ON s.id = t.shop_id",
    key_column: "t.id",
    sort_fields: &[
        SortField::new("orderNumber", "o.order_number"),
        SortField::new("amount", "t.amount"),
        SortField::new("provider", "t.provider"),
        SortField::new("status", "t.status"),
        SortField::new("shopName", "s.name"),
        SortField::new("createdAt", "t.created_at"),
    ],
    filter_fields: &[
        FilterField::new("orderNumber", "o.order_number", FilterKind::Text),
        FilterField::new("orderId", "t.order_id", FilterKind::Id),
        FilterField::new("provider", "t.provider", FilterKind::Exact),
        FilterField::new("status", "t.status", FilterKind::OneOf),
        FilterField::new("amount", "t.amount", FilterKind::NumberRange),
        FilterField::new("shopId", "t.shop_id", FilterKind::Id),
        FilterField::new("createdAt", "t.created_at", FilterKind::DateRange),
    ],
    search_columns: &["o.order_number", "t.provider", "t.reference"],
    default_sort: ("t.created_at", SortDirection::Desc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("t.shop_id"),
    active_column: None,
};

/// Repository for transaction database operations.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of transactions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Transaction>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: TransactionId,
        vendor: Option<VendorId>,
    ) -> Result<Option<Transaction>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }
}
