//! Aggregate numbers for the dashboard landing page.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::VendorId;

use super::RepositoryError;
use crate::models::DashboardSummary;

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Shop, product and order counts plus paid revenue, platform-wide for
    /// `None` or limited to one vendor's shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn summary(&self, vendor: Option<VendorId>) -> Result<DashboardSummary, RepositoryError> {
        let summary = sqlx::query_as::<_, DashboardSummary>(
            r"
            WITH scoped_shops AS (
                SELECT id FROM shops WHERE $1::int IS NULL OR vendor_id = $1
            )
            SELECT
                (SELECT COUNT(*) FROM scoped_shops) AS shops,
                (SELECT COUNT(*) FROM products WHERE shop_id IN (SELECT id FROM scoped_shops))
                    AS products,
                (SELECT COUNT(*) FROM products
                    WHERE is_active AND shop_id IN (SELECT id FROM scoped_shops)) AS active_products,
                (SELECT COUNT(*) FROM orders WHERE shop_id IN (SELECT id FROM scoped_shops))
                    AS orders,
                (SELECT COUNT(*) FROM orders
                    WHERE status = 'pending' AND shop_id IN (SELECT id FROM scoped_shops))
                    AS pending_orders,
                (SELECT COALESCE(SUM(total), 0) FROM orders
                    WHERE payment_status = 'paid' AND shop_id IN (SELECT id FROM scoped_shops))
                    AS revenue
            ",
        )
        .bind(vendor)
        .fetch_one(self.pool)
        .await?;

        Ok(summary)
    }
}
