//! Shipping method models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{FieldErrors, ShippingMethodId, ShopId};

use super::validate::{
    MAX_NAME_LENGTH, MAX_TEXT_LENGTH, Validate, default_true, money, optional_text, required_text,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub estimated_days: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethodInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub estimated_days: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingMethodFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub estimated_days: Option<i32>,
    pub is_active: bool,
}

impl Validate for ShippingMethodInput {
    type Output = ShippingMethodFields;

    fn validate(self) -> Result<ShippingMethodFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let description = optional_text(&mut errors, "description", self.description, MAX_TEXT_LENGTH);
        match self.price {
            Some(price) => money(&mut errors, "price", price),
            None => errors.add("price", "is required"),
        }
        if self.estimated_days.is_some_and(|days| days < 0) {
            errors.add("estimatedDays", "must be at least 0");
        }

        match self.price {
            Some(price) if errors.is_empty() => Ok(ShippingMethodFields {
                name,
                description,
                price,
                estimated_days: self.estimated_days,
                is_active: self.is_active,
            }),
            _ => Err(errors),
        }
    }
}
