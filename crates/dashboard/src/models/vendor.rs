//! Vendor (tenant) models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, FieldErrors, Slug, VendorId, VendorStatus};

use super::validate::{
    COMMISSION_RATE, MAX_NAME_LENGTH, Validate, default_true, optional_text, percentage,
    required_text, slug_for,
};

/// Commission taken when the form leaves the rate blank.
pub const DEFAULT_COMMISSION_RATE: Decimal = Decimal::TEN;

/// A vendor as listed in the admin dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub slug: Slug,
    /// Contact address for the vendor account.
    pub email: String,
    pub phone: Option<String>,
    pub status: VendorStatus,
    /// Platform commission in percent.
    pub commission_rate: Decimal,
    pub is_active: bool,
    /// Number of shops the vendor owns.
    pub shop_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a vendor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub commission_rate: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Validated vendor fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorFields {
    pub name: String,
    pub slug: Slug,
    pub email: Email,
    pub phone: Option<String>,
    pub commission_rate: Decimal,
    pub is_active: bool,
}

impl Validate for VendorInput {
    type Output = VendorFields;

    fn validate(self) -> Result<VendorFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let slug = slug_for(&mut errors, self.slug.as_deref(), &name);
        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();
        let phone = optional_text(&mut errors, "phone", self.phone, 40);
        let commission_rate = self.commission_rate.unwrap_or(DEFAULT_COMMISSION_RATE);
        percentage(&mut errors, "commissionRate", commission_rate, COMMISSION_RATE);

        match (slug, email) {
            (Some(slug), Some(email)) if errors.is_empty() => Ok(VendorFields {
                name,
                slug,
                email,
                phone,
                commission_rate,
                is_active: self.is_active,
            }),
            _ => Err(errors),
        }
    }
}

/// Payload for `POST /api/vendors/{id}/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VendorStatusInput {
    pub status: VendorStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> VendorInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_vendor_derives_slug_and_defaults() {
        let fields = input(json!({"name": "Acme Goods", "email": "Sales@Acme.test"}))
            .validate()
            .unwrap();
        assert_eq!(fields.slug.as_str(), "acme-goods");
        assert_eq!(fields.email.as_str(), "sales@acme.test");
        assert_eq!(fields.commission_rate, DEFAULT_COMMISSION_RATE);
        assert!(fields.is_active);
    }

    #[test]
    fn test_invalid_vendor_reports_every_field() {
        let errors = input(json!({"name": " ", "email": "nope", "commissionRate": "120"}))
            .validate()
            .unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("email"));
        assert!(errors.has("commissionRate"));
    }
}
