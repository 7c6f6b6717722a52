//! Dashboard landing page numbers.

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub shops: i64,
    pub products: i64,
    pub active_products: i64,
    pub orders: i64,
    pub pending_orders: i64,
    /// Sum of `total` over paid orders.
    pub revenue: Decimal,
}
