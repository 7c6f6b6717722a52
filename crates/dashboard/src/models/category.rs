//! Category models.
//!
//! Categories form a per-shop tree through `parent_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{CategoryId, FieldErrors, ShopId, Slug};

use super::validate::{
    MAX_NAME_LENGTH, MAX_TEXT_LENGTH, Validate, default_true, optional_text, optional_url,
    required_text, slug_for,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub parent_id: Option<CategoryId>,
    pub parent_name: Option<String>,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Position among siblings, ascending.
    pub sort_order: i32,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub parent_id: Option<CategoryId>,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl Validate for CategoryInput {
    type Output = CategoryFields;

    fn validate(self) -> Result<CategoryFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);
        let description = optional_text(&mut errors, "description", self.description, MAX_TEXT_LENGTH);
        let image_url = optional_url(&mut errors, "imageUrl", self.image_url);

        match slug {
            Some(slug) if errors.is_empty() => Ok(CategoryFields {
                parent_id: self.parent_id,
                name,
                slug,
                description,
                image_url,
                sort_order: self.sort_order,
                is_active: self.is_active,
            }),
            _ => Err(errors),
        }
    }
}
