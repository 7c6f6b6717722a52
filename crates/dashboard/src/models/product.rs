//! Product models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{BrandId, CategoryId, FieldErrors, ProductId, ShopId, Slug, TagId};

use super::validate::{
    MAX_NAME_LENGTH, MAX_TEXT_LENGTH, MONEY, Validate, default_true, fits, money,
    non_negative_int, optional_text, optional_url, required_text, slug_for,
};

/// A product as listed in the dashboard and the storefront.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    pub name: String,
    pub slug: Slug,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    /// Strike-through price; never below `price`.
    pub compare_at_price: Option<Decimal>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product with its tag set, for the edit dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub tag_ids: Vec<TagId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// Replaces the product's tag set.
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub name: String,
    pub slug: Slug,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    /// Sorted and deduplicated.
    pub tag_ids: Vec<TagId>,
}

impl Validate for ProductInput {
    type Output = ProductFields;

    fn validate(self) -> Result<ProductFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);
        let sku = optional_text(&mut errors, "sku", self.sku, 64);
        let description = optional_text(&mut errors, "description", self.description, MAX_TEXT_LENGTH);
        let image_url = optional_url(&mut errors, "imageUrl", self.image_url);

        let price = self.price.unwrap_or_default();
        if self.price.is_none() {
            errors.add("price", "is required");
        }
        money(&mut errors, "price", price);
        if let Some(compare_at) = self.compare_at_price {
            if compare_at < price {
                errors.add("compareAtPrice", "must be at least the price");
            }
            fits(&mut errors, "compareAtPrice", compare_at, MONEY);
        }
        non_negative_int(&mut errors, "stock", self.stock);

        let mut tag_ids = self.tag_ids;
        tag_ids.sort_unstable();
        tag_ids.dedup();

        match slug {
            Some(slug) if errors.is_empty() => Ok(ProductFields {
                category_id: self.category_id,
                brand_id: self.brand_id,
                name,
                slug,
                sku,
                description,
                image_url,
                price,
                compare_at_price: self.compare_at_price,
                stock: self.stock,
                is_active: self.is_active,
                is_featured: self.is_featured,
                tag_ids,
            }),
            _ => Err(errors),
        }
    }
}

/// Largest selection a single bulk request may touch.
pub const MAX_BULK_IDS: usize = 100;

/// What a bulk request does to every selected product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkProductAction {
    Activate,
    Deactivate,
    Delete,
}

/// Payload for `POST /api/products/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkProductInput {
    pub action: BulkProductAction,
    #[serde(default)]
    pub ids: Vec<ProductId>,
}

impl Validate for BulkProductInput {
    type Output = (BulkProductAction, Vec<ProductId>);

    fn validate(self) -> Result<Self::Output, FieldErrors> {
        let mut ids = self.ids;
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Err(FieldErrors::single("ids", "select at least one product"));
        }
        if ids.len() > MAX_BULK_IDS {
            return Err(FieldErrors::single(
                "ids",
                format!("at most {MAX_BULK_IDS} products at a time"),
            ));
        }
        Ok((self.action, ids))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: serde_json::Value) -> Result<ProductFields, FieldErrors> {
        serde_json::from_value::<ProductInput>(value).unwrap().validate()
    }

    #[test]
    fn test_valid_product() {
        let fields = validate(json!({
            "name": "Ceramic Mug",
            "price": "12.50",
            "compareAtPrice": "15.00",
            "stock": 40,
            "tagIds": [3, 1, 3]
        }))
        .unwrap();
        assert_eq!(fields.slug.as_str(), "ceramic-mug");
        assert_eq!(fields.price, Decimal::new(1250, 2));
        assert_eq!(fields.tag_ids, [TagId::new(1), TagId::new(3)]);
        assert!(fields.is_active);
        assert!(!fields.is_featured);
    }

    #[test]
    fn test_price_rules() {
        let errors = validate(json!({"name": "Mug", "price": "-1", "stock": -2})).unwrap_err();
        assert_eq!(errors.get("price"), ["must be at least 0"]);
        assert!(errors.has("stock"));

        let errors = validate(json!({"name": "Mug", "price": "10", "compareAtPrice": "9.99"}))
            .unwrap_err();
        assert_eq!(errors.get("compareAtPrice"), ["must be at least the price"]);

        let errors = validate(json!({"name": "Mug"})).unwrap_err();
        assert_eq!(errors.get("price"), ["is required"]);
    }

    #[test]
    fn test_price_must_fit_the_column() {
        let errors = validate(json!({"name": "Mug", "price": "10000000000000"})).unwrap_err();
        assert_eq!(errors.get("price"), ["must be less than 10000000000"]);

        let errors = validate(json!({
            "name": "Mug",
            "price": "10",
            "compareAtPrice": "99999999999.99"
        }))
        .unwrap_err();
        assert_eq!(errors.get("compareAtPrice"), ["must be less than 10000000000"]);

        let errors = validate(json!({"name": "Mug", "price": "1.999"})).unwrap_err();
        assert_eq!(errors.get("price"), ["must have at most 2 decimal places"]);
        assert!(validate(json!({"name": "Mug", "price": "1.500"})).is_ok());
    }

    #[test]
    fn test_zero_price_is_allowed() {
        assert!(validate(json!({"name": "Freebie", "price": 0})).is_ok());
    }

    #[test]
    fn test_bulk_input() {
        let (action, ids) = serde_json::from_value::<BulkProductInput>(json!({
            "action": "deactivate",
            "ids": [4, 2, 4]
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(action, BulkProductAction::Deactivate);
        assert_eq!(ids, [ProductId::new(2), ProductId::new(4)]);

        let errors = serde_json::from_value::<BulkProductInput>(json!({"action": "delete"}))
            .unwrap()
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("ids"), ["select at least one product"]);
    }
}
