//! Tax rate models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{FieldErrors, ShopId, TaxRateId};

use super::validate::{
    MAX_NAME_LENGTH, TAX_RATE, Validate, default_true, optional_text, percentage, required_text,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub id: TaxRateId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub name: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub region: Option<String>,
    /// Percent, e.g. `7.250`.
    pub rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateInput {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    pub rate: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRateFields {
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub rate: Decimal,
    pub is_active: bool,
}

impl Validate for TaxRateInput {
    type Output = TaxRateFields;

    fn validate(self) -> Result<TaxRateFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let country = self.country.trim().to_ascii_uppercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.add("country", "must be a two-letter country code");
        }
        let region = optional_text(&mut errors, "region", self.region, 100);
        match self.rate {
            Some(rate) => percentage(&mut errors, "rate", rate, TAX_RATE),
            None => errors.add("rate", "is required"),
        }

        match self.rate {
            Some(rate) if errors.is_empty() => Ok(TaxRateFields {
                name,
                country,
                region,
                rate,
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
    fn test_country_is_normalized() {
        let fields = serde_json::from_value::<TaxRateInput>(json!({
            "name": "VAT", "country": "de", "rate": "19"
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(fields.country, "DE");
    }

    #[test]
    fn test_invalid_tax_rate() {
        let errors = serde_json::from_value::<TaxRateInput>(json!({
            "name": "Bad", "country": "Germany", "rate": "140"
        }))
        .unwrap()
        .validate()
        .unwrap_err();
        assert!(errors.has("country"));
        assert!(errors.has("rate"));
    }
}
