//! Order models.
//!
//! Orders are created by checkout, never by the dashboard; the dashboard only
//! moves them through their status lifecycle and keeps notes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{
    FieldErrors, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, ShopId, UserId,
};

use super::validate::{MAX_TEXT_LENGTH, Validate, optional_text};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub customer_id: Option<UserId>,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub shipping_total: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item, priced at the time of purchase.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Dashboard edit of an order. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateInput {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

impl Validate for OrderUpdateInput {
    type Output = OrderUpdate;

    fn validate(self) -> Result<OrderUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let notes = self
            .notes
            .map(|notes| optional_text(&mut errors, "notes", Some(notes), MAX_TEXT_LENGTH));

        if self.status.is_none() && self.payment_status.is_none() && notes.is_none() {
            errors.add("status", "nothing to update");
        }

        if errors.is_empty() {
            Ok(OrderUpdate {
                status: self.status,
                payment_status: self.payment_status,
                notes,
            })
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_update() {
        let update = serde_json::from_value::<OrderUpdateInput>(json!({
            "status": "shipped",
            "notes": "  "
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(update.status, Some(OrderStatus::Shipped));
        assert_eq!(update.payment_status, None);
        assert_eq!(update.notes, Some(None));
    }

    #[test]
    fn test_empty_update_rejected() {
        let errors = serde_json::from_value::<OrderUpdateInput>(json!({}))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(errors.has("status"));
    }

    #[test]
    fn test_unknown_status_fails_to_deserialize() {
        assert!(serde_json::from_value::<OrderUpdateInput>(json!({"status": "lost"})).is_err());
    }
}
