//! Product reviews. The dashboard only moderates them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{ProductId, ReviewId, ShopId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub author_name: String,
    /// 1 to 5 stars.
    pub rating: i16,
    pub title: Option<String>,
    pub body: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
