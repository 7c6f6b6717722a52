//! Payment transactions (read-only in the dashboard).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{OrderId, ShopId, TransactionId, TransactionStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub order_number: String,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub amount: Decimal,
    pub currency: String,
    /// Payment provider name, e.g. `stripe`.
    pub provider: String,
    pub reference: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}
