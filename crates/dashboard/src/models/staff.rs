//! Shop staff members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, FieldErrors, ShopId, StaffId};

use super::validate::{MAX_NAME_LENGTH, Validate, default_true, optional_text, required_text};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: StaffId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffFields {
    pub name: String,
    pub email: Email,
    pub position: Option<String>,
    pub is_active: bool,
}

impl Validate for StaffInput {
    type Output = StaffFields;

    fn validate(self) -> Result<StaffFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();
        let position = optional_text(&mut errors, "position", self.position, MAX_NAME_LENGTH);

        match email {
            Some(email) if errors.is_empty() => Ok(StaffFields {
                name,
                email,
                position,
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
    fn test_staff_email_normalized() {
        let fields = serde_json::from_value::<StaffInput>(json!({
            "name": "Dana",
            "email": " Dana@Shop.Test "
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(fields.email.as_str(), "dana@shop.test");
    }

    #[test]
    fn test_staff_requires_email() {
        let errors = serde_json::from_value::<StaffInput>(json!({"name": "Dana"}))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(errors.has("email"));
    }
}
