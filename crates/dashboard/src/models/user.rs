//! Dashboard user domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, FieldErrors, Mode, UserId, UserRole, VendorId};

use super::validate::{MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH, Validate, required_text};

/// A user account (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, normalized to lowercase.
    pub email: Email,
    /// Display name.
    pub name: String,
    pub role: UserRole,
    /// Vendor the account manages (vendor role only).
    pub vendor_id: Option<VendorId>,
    pub vendor_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Dashboard mode for this user, if the role may sign in at all.
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        Mode::for_role(self.role)
    }
}

/// Payload for creating a dashboard user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<UserRole>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

/// Validated user fields; the password is still plain text here and is
/// hashed by the auth service.
#[derive(Debug, Clone)]
pub struct NewUserFields {
    pub email: Email,
    pub name: String,
    pub password: String,
    pub role: UserRole,
    pub vendor_id: Option<VendorId>,
}

impl Validate for NewUserInput {
    type Output = NewUserFields;

    fn validate(self) -> Result<NewUserFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();
        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }

        match (self.role, self.vendor_id) {
            (None, _) => errors.add("role", "is required"),
            (Some(UserRole::Customer), _) => errors.add("role", "must be admin or vendor"),
            (Some(UserRole::Vendor), None) => errors.add("vendorId", "is required for vendor users"),
            (Some(UserRole::Admin), Some(_)) => {
                errors.add("vendorId", "must be empty for admin users");
            }
            _ => {}
        }

        match (email, self.role) {
            (Some(email), Some(role)) if errors.is_empty() => Ok(NewUserFields {
                email,
                name,
                password: self.password,
                role,
                vendor_id: self.vendor_id,
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

    fn validate(value: serde_json::Value) -> Result<NewUserFields, FieldErrors> {
        serde_json::from_value::<NewUserInput>(value).unwrap().validate()
    }

    #[test]
    fn test_vendor_user_requires_vendor() {
        let errors = validate(json!({
            "email": "sam@acme.test", "name": "Sam", "password": "long-enough-pw", "role": "vendor"
        }))
        .unwrap_err();
        assert_eq!(errors.get("vendorId"), ["is required for vendor users"]);

        let fields = validate(json!({
            "email": "sam@acme.test", "name": "Sam", "password": "long-enough-pw",
            "role": "vendor", "vendorId": 4
        }))
        .unwrap();
        assert_eq!(fields.vendor_id, Some(VendorId::new(4)));
    }

    #[test]
    fn test_customers_cannot_be_created_here() {
        let errors = validate(json!({
            "email": "c@shop.test", "name": "C", "password": "long-enough-pw", "role": "customer"
        }))
        .unwrap_err();
        assert!(errors.has("role"));
    }

    #[test]
    fn test_short_password() {
        let errors = validate(json!({
            "email": "a@bazaar.test", "name": "A", "password": "short", "role": "admin"
        }))
        .unwrap_err();
        assert!(errors.has("password"));
    }
}
