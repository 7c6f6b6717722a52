//! Database operations for orders.
//!
//! Orders are created by checkout, outside the dashboard. The dashboard reads
//! them, moves them through their status, and (admins only) deletes them.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, OrderId, SortDirection, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Order, OrderDetail, OrderItem, OrderUpdate};

pub(crate) const TABLE: EntityTable = EntityTable::new("orders", "order", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "orders",
    select: "o.id, o.shop_id, s.name AS shop_name, o.customer_id, o.order_number, \
             o.customer_name, o.customer_email, o.status, o.payment_status, o.subtotal, \
             o.tax_total, o.shipping_total, o.discount_total, o.total, o.currency, o.notes, \
             (SELECT COUNT(*) FROM order_items i WHERE i.order_id = o.id) AS item_count, \
             o.created_at, o.updated_at",
    from: "orders o JOIN shops s ON s.id = o.shop_id",
    key_column: "o.id",
    sort_fields: &[
        SortField::new("orderNumber", "o.order_number"),
        SortField::new("customerName", "o.customer_name"),
        SortField::new("status", "o.status"),
        SortField::new("paymentStatus", "o.payment_status"),
        SortField::new("total", "o.total"),
        SortField::new("shopName", "s.name"),
        SortField::new("createdAt", "o.created_at"),
    ],
    filter_fields: &[
        FilterField::new("orderNumber", "o.order_number", FilterKind::Text),
        FilterField::new("customerName", "o.customer_name", FilterKind::Text),
        FilterField::new("customerEmail", "o.customer_email", FilterKind::Text),
        FilterField::new("status", "o.status", FilterKind::OneOf),
        FilterField::new("paymentStatus", "o.payment_status", FilterKind::OneOf),
        FilterField::new("total", "o.total", FilterKind::NumberRange),
        FilterField::new("shopId", "o.shop_id", FilterKind::Id),
        FilterField::new("createdAt", "o.created_at", FilterKind::DateRange),
    ],
    search_columns: &["o.order_number", "o.customer_name", "o.customer_email"],
    default_sort: ("o.created_at", SortDirection::Desc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("o.shop_id"),
    active_column: None,
};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Order>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId, vendor: Option<VendorId>) -> Result<Option<OrderDetail>, RepositoryError> {
        let order: Option<Order> =
            fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await?;
        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, product_id, product_name, unit_price, quantity, line_total
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items }))
    }

    /// Change status, payment status and/or notes. Fields left `None` keep
    /// their current value; `notes: Some(None)` clears the notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not visible.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: OrderId,
        update: &OrderUpdate,
        vendor: Option<VendorId>,
    ) -> Result<OrderDetail, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE orders
            SET status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status),
                notes = CASE WHEN $4 THEN $5 ELSE notes END,
                updated_at = NOW()
            WHERE id = $1
              AND ($6::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $6))
            RETURNING id
            ",
        )
        .bind(id)
        .bind(update.status)
        .bind(update.payment_status)
        .bind(update.notes.is_some())
        .bind(update.notes.clone().flatten())
        .bind(vendor)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(order_id = %id, status = ?update.status, payment_status = ?update.payment_status, "order updated");
        self.get(id, None).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an order with its items and transactions. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_filter_uses_any() {
        let request = FetchRequest::default().filter("status", json!(["pending", "shipped"]));
        let plan = fetch::plan(&LIST, &request).unwrap();
        let qb = fetch::count_query(&LIST, &plan, &ListContext::vendor(VendorId::new(3)));
        assert!(qb.sql().ends_with("WHERE s.vendor_id = $1 AND o.status::text = ANY($2)"));
    }
}
