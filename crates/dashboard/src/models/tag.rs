//! Tag models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{FieldErrors, ShopId, Slug, TagId};

use super::validate::{MAX_NAME_LENGTH, Validate, default_true, required_text, slug_for};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub name: String,
    pub slug: Slug,
    pub is_active: bool,
    /// Products carrying the tag.
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFields {
    pub name: String,
    pub slug: Slug,
    pub is_active: bool,
}

impl Validate for TagInput {
    type Output = TagFields;

    fn validate(self) -> Result<TagFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);

        match slug {
            Some(slug) if errors.is_empty() => Ok(TagFields {
                name,
                slug,
                is_active: self.is_active,
            }),
            _ => Err(errors),
        }
    }
}
