//! Product attribute models (e.g. "Size" with values S, M, L).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{AttributeId, FieldErrors, ShopId, Slug};

use super::validate::{MAX_NAME_LENGTH, Validate, default_true, required_text, slug_for};

/// Most values a single attribute may carry.
pub const MAX_ATTRIBUTE_VALUES: usize = 100;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: AttributeId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub name: String,
    pub slug: Slug,
    pub values: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFields {
    pub name: String,
    pub slug: Slug,
    /// Trimmed, non-empty, first occurrence kept.
    pub values: Vec<String>,
    pub is_active: bool,
}

impl Validate for AttributeInput {
    type Output = AttributeFields;

    fn validate(self) -> Result<AttributeFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);

        let mut values: Vec<String> = Vec::with_capacity(self.values.len());
        for value in self.values {
            let value = value.trim();
            if !value.is_empty() && !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                values.push(value.to_string());
            }
        }
        if values.is_empty() {
            errors.add("values", "must contain at least one value");
        } else if values.len() > MAX_ATTRIBUTE_VALUES {
            errors.add("values", format!("must contain at most {MAX_ATTRIBUTE_VALUES} values"));
        }

        match slug {
            Some(slug) if errors.is_empty() => Ok(AttributeFields {
                name,
                slug,
                values,
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
    fn test_values_are_cleaned() {
        let fields = serde_json::from_value::<AttributeInput>(json!({
            "name": "Size",
            "values": [" S ", "M", "", "m", "L"]
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(fields.values, ["S", "M", "L"]);
    }

    #[test]
    fn test_values_required() {
        let errors = serde_json::from_value::<AttributeInput>(json!({"name": "Size", "values": ["  "]}))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(errors.has("values"));
    }
}
