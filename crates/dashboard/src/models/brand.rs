//! Brand models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{BrandId, FieldErrors, ShopId, Slug};

use super::validate::{
    MAX_NAME_LENGTH, MAX_TEXT_LENGTH, Validate, default_true, optional_text, optional_url,
    required_text, slug_for,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandFields {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub is_active: bool,
}

impl Validate for BrandInput {
    type Output = BrandFields;

    fn validate(self) -> Result<BrandFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);
        let description = optional_text(&mut errors, "description", self.description, MAX_TEXT_LENGTH);
        let logo_url = optional_url(&mut errors, "logoUrl", self.logo_url);
        let website_url = optional_url(&mut errors, "websiteUrl", self.website_url);

        match slug {
            Some(slug) if errors.is_empty() => Ok(BrandFields {
                name,
                slug,
                description,
                logo_url,
                website_url,
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
    fn test_brand_urls_are_checked_independently() {
        let errors = serde_json::from_value::<BrandInput>(json!({
            "name": "Northwind",
            "logoUrl": "https://cdn.bazaar.test/nw.svg",
            "websiteUrl": "northwind"
        }))
        .unwrap()
        .validate()
        .unwrap_err();
        assert!(!errors.has("logoUrl"));
        assert!(errors.has("websiteUrl"));
    }
}
