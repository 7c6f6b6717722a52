//! Coupon models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CategoryId, CouponId, DiscountType, FieldErrors, ProductId, ShopId};

use super::validate::{
    MAX_TEXT_LENGTH, MONEY, Validate, default_true, fits, money, optional_text,
};

pub const MAX_CODE_LENGTH: usize = 40;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub shop_id: ShopId,
    pub shop_name: String,
    /// Uppercase redemption code, unique per shop.
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_order_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A coupon with the products and categories it applies to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDetail {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub product_ids: Vec<ProductId>,
    pub category_ids: Vec<CategoryId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    #[serde(default)]
    pub minimum_order_amount: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponFields {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_order_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub product_ids: Vec<ProductId>,
    pub category_ids: Vec<CategoryId>,
}

/// Uppercase the code; only ASCII letters, digits, `-` and `_` are kept valid.
fn normalize_code(errors: &mut FieldErrors, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() {
        errors.add("code", "is required");
    } else if code.len() > MAX_CODE_LENGTH {
        errors.add("code", format!("must be at most {MAX_CODE_LENGTH} characters"));
    } else if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.add("code", "may only contain letters, digits, '-' and '_'");
    }
    code
}

impl Validate for CouponInput {
    type Output = CouponFields;

    fn validate(self) -> Result<CouponFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let code = normalize_code(&mut errors, &self.code);
        let description = optional_text(&mut errors, "description", self.description, MAX_TEXT_LENGTH);

        let value = self.discount_value.unwrap_or_default();
        match (self.discount_type, self.discount_value) {
            (None, _) => errors.add("discountType", "is required"),
            (_, None) => errors.add("discountValue", "is required"),
            (Some(DiscountType::Percentage), Some(v)) if v <= Decimal::ZERO || v > Decimal::ONE_HUNDRED => {
                errors.add("discountValue", "must be greater than 0 and at most 100");
            }
            (Some(DiscountType::Fixed), Some(v)) if v <= Decimal::ZERO => {
                errors.add("discountValue", "must be greater than 0");
            }
            (Some(_), Some(v)) => fits(&mut errors, "discountValue", v, MONEY),
        }

        if let Some(minimum) = self.minimum_order_amount {
            money(&mut errors, "minimumOrderAmount", minimum);
        }
        if self.usage_limit.is_some_and(|limit| limit <= 0) {
            errors.add("usageLimit", "must be greater than 0");
        }
        if let (Some(starts), Some(expires)) = (self.starts_at, self.expires_at)
            && expires <= starts
        {
            errors.add("expiresAt", "must be after the start date");
        }

        let mut product_ids = self.product_ids;
        product_ids.sort_unstable();
        product_ids.dedup();
        let mut category_ids = self.category_ids;
        category_ids.sort_unstable();
        category_ids.dedup();

        match self.discount_type {
            Some(discount_type) if errors.is_empty() => Ok(CouponFields {
                code,
                description,
                discount_type,
                discount_value: value,
                minimum_order_amount: self.minimum_order_amount,
                usage_limit: self.usage_limit,
                starts_at: self.starts_at,
                expires_at: self.expires_at,
                is_active: self.is_active,
                product_ids,
                category_ids,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: serde_json::Value) -> Result<CouponFields, FieldErrors> {
        serde_json::from_value::<CouponInput>(value).unwrap().validate()
    }

    #[test]
    fn test_code_is_uppercased() {
        let fields = validate(json!({
            "code": " spring-10 ",
            "discountType": "percentage",
            "discountValue": "10",
            "productIds": [5, 2, 5]
        }))
        .unwrap();
        assert_eq!(fields.code, "SPRING-10");
        assert_eq!(fields.product_ids, [ProductId::new(2), ProductId::new(5)]);
    }

    #[test]
    fn test_percentage_bounds() {
        for bad in ["0", "100.01", "-5"] {
            let errors = validate(json!({
                "code": "X", "discountType": "percentage", "discountValue": bad
            }))
            .unwrap_err();
            assert!(errors.has("discountValue"), "{bad}");
        }
        assert!(
            validate(json!({"code": "X", "discountType": "percentage", "discountValue": "100"}))
                .is_ok()
        );
    }

    #[test]
    fn test_fixed_must_be_positive() {
        let errors = validate(json!({"code": "X", "discountType": "fixed", "discountValue": 0}))
            .unwrap_err();
        assert_eq!(errors.get("discountValue"), ["must be greater than 0"]);
        assert!(validate(json!({"code": "X", "discountType": "fixed", "discountValue": 250})).is_ok());
    }

    #[test]
    fn test_amounts_must_fit_the_column() {
        let errors = validate(json!({
            "code": "X",
            "discountType": "fixed",
            "discountValue": "99999999999999",
            "minimumOrderAmount": "10000000000"
        }))
        .unwrap_err();
        assert_eq!(errors.get("discountValue"), ["must be less than 10000000000"]);
        assert_eq!(errors.get("minimumOrderAmount"), ["must be less than 10000000000"]);

        let errors = validate(json!({
            "code": "X", "discountType": "percentage", "discountValue": "12.555"
        }))
        .unwrap_err();
        assert_eq!(errors.get("discountValue"), ["must have at most 2 decimal places"]);
    }

    #[test]
    fn test_expiry_after_start() {
        let errors = validate(json!({
            "code": "X",
            "discountType": "fixed",
            "discountValue": 5,
            "startsAt": "2026-06-01T00:00:00Z",
            "expiresAt": "2026-05-01T00:00:00Z"
        }))
        .unwrap_err();
        assert!(errors.has("expiresAt"));
    }

    #[test]
    fn test_bad_code_characters() {
        let errors = validate(json!({"code": "10% OFF", "discountType": "fixed", "discountValue": 1}))
            .unwrap_err();
        assert!(errors.has("code"));
    }
}
