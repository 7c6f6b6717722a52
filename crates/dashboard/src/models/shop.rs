//! Shop models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{FieldErrors, ShopId, Slug, VendorId};

use super::validate::{
    MAX_NAME_LENGTH, MAX_TEXT_LENGTH, Validate, default_true, optional_text, optional_url,
    required_text, slug_for,
};

/// A shop row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shop id and name, for select options.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShopOption {
    pub id: ShopId,
    pub name: String,
}

/// Create/update payload for a shop.
///
/// `vendor_id` is required when an admin creates a shop and ignored
/// otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInput {
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopFields {
    pub vendor_id: Option<VendorId>,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
}

impl Validate for ShopInput {
    type Output = ShopFields;

    fn validate(self) -> Result<ShopFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);
        let description = optional_text(&mut errors, "description", self.description, MAX_TEXT_LENGTH);
        let logo_url = optional_url(&mut errors, "logoUrl", self.logo_url);

        match slug {
            Some(slug) if errors.is_empty() => Ok(ShopFields {
                vendor_id: self.vendor_id,
                name,
                slug,
                description,
                logo_url,
                is_active: self.is_active,
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

    #[test]
    fn test_shop_input() {
        let fields: ShopFields = serde_json::from_value::<ShopInput>(json!({
            "name": "Corner Café",
            "logoUrl": "https://cdn.bazaar.test/cafe.png",
            "description": "  "
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(fields.slug.as_str(), "corner-caf");
        assert_eq!(fields.description, None);
    }

    #[test]
    fn test_bad_logo_url() {
        let errors = serde_json::from_value::<ShopInput>(json!({"name": "X", "logoUrl": "cafe.png"}))
            .unwrap()
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("logoUrl"), ["must be a valid URL"]);
    }
}
