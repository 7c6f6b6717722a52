//! Server-side validation of create/update payloads.
//!
//! Each `*Input` type deserializes whatever the form dialog posts and
//! implements [`Validate`], producing typed, normalized `*Fields` or a
//! [`FieldErrors`] map with one entry per offending field. The messages match
//! the ones the form schema shows client-side.

use rust_decimal::Decimal;

use bazaar_core::{FieldErrors, Slug};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 5000;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a submitted payload into its normalized form.
pub trait Validate {
    type Output;

    /// # Errors
    ///
    /// Returns every field-level problem found, not just the first.
    fn validate(self) -> Result<Self::Output, FieldErrors>;
}

pub(crate) const fn default_true() -> bool {
    true
}

/// Trimmed text that must be present.
pub(crate) fn required_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "is required");
    } else if value.chars().count() > max {
        errors.add(field, format!("must be at most {max} characters"));
    }
    value.to_string()
}

/// Trimmed text where blank means absent.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
    if value.chars().count() > max {
        errors.add(field, format!("must be at most {max} characters"));
    }
    Some(value)
}

/// Whether `value` is an absolute `http`/`https` URL.
#[must_use]
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

/// Optional absolute URL.
pub(crate) fn optional_url(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = optional_text(errors, field, value, MAX_TEXT_LENGTH)?;
    if !is_valid_url(&value) {
        errors.add(field, "must be a valid URL");
    }
    Some(value)
}

/// The explicit slug if given, otherwise one derived from `name`.
///
/// A blank name is already reported by the caller, so deriving from it adds
/// no second message.
pub(crate) fn slug_for(errors: &mut FieldErrors, explicit: Option<&str>, name: &str) -> Option<Slug> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => Slug::parse(slug)
            .map_err(|e| errors.add("slug", e.to_string()))
            .ok(),
        None if name.trim().is_empty() => None,
        None => Slug::from_name(name)
            .map_err(|_| errors.add("slug", "could not be derived from the name; enter one"))
            .ok(),
    }
}

/// Shape of a `NUMERIC(precision, scale)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Numeric {
    precision: u32,
    scale: u32,
}

impl Numeric {
    const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Smallest magnitude the column cannot store.
    fn limit(self) -> Decimal {
        Decimal::from(10_i64.pow(self.precision - self.scale))
    }
}

/// Prices, totals and fixed discounts.
pub(crate) const MONEY: Numeric = Numeric::new(12, 2);
pub(crate) const TAX_RATE: Numeric = Numeric::new(6, 3);
pub(crate) const COMMISSION_RATE: Numeric = Numeric::new(5, 2);

/// A value the column stores exactly: no extra decimal places, no overflow.
pub(crate) fn fits(errors: &mut FieldErrors, field: &str, value: Decimal, column: Numeric) {
    if value.normalize().scale() > column.scale {
        errors.add(field, format!("must have at most {} decimal places", column.scale));
    }
    if value.abs() >= column.limit() {
        errors.add(field, format!("must be less than {}", column.limit()));
    }
}

pub(crate) fn non_negative(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value < Decimal::ZERO {
        errors.add(field, "must be at least 0");
    }
}

/// A non-negative amount of money.
pub(crate) fn money(errors: &mut FieldErrors, field: &str, value: Decimal) {
    non_negative(errors, field, value);
    fits(errors, field, value, MONEY);
}

pub(crate) fn non_negative_int(errors: &mut FieldErrors, field: &str, value: i32) {
    if value < 0 {
        errors.add(field, "must be at least 0");
    }
}

/// A value in `0..=100`, stored in `column`.
pub(crate) fn percentage(errors: &mut FieldErrors, field: &str, value: Decimal, column: Numeric) {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        errors.add(field, "must be between 0 and 100");
    } else {
        fits(errors, field, value, column);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "name", "  Mugs ", 10), "Mugs");
        assert!(errors.is_empty());

        required_text(&mut errors, "name", "   ", 10);
        required_text(&mut errors, "title", "abcdefghijk", 10);
        assert_eq!(errors.get("name"), ["is required"]);
        assert_eq!(errors.get("title"), ["must be at most 10 characters"]);
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "d", Some("  ".to_string()), 10), None);
        assert_eq!(optional_text(&mut errors, "d", None, 10), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_urls() {
        assert!(is_valid_url("https://cdn.bazaar.test/logo.png"));
        assert!(is_valid_url("http://localhost:8080/x"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("logo.png"));

        let mut errors = FieldErrors::new();
        optional_url(&mut errors, "logoUrl", Some("nope".to_string()));
        assert!(errors.has("logoUrl"));
    }

    #[test]
    fn test_slug_for() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            slug_for(&mut errors, None, "Summer Sale 2026").unwrap().as_str(),
            "summer-sale-2026"
        );
        assert_eq!(
            slug_for(&mut errors, Some(" custom-slug "), "ignored").unwrap().as_str(),
            "custom-slug"
        );
        assert!(errors.is_empty());

        assert!(slug_for(&mut errors, Some("Not A Slug"), "x").is_none());
        assert!(errors.has("slug"));
    }

    #[test]
    fn test_slug_for_blank_name_adds_nothing() {
        let mut errors = FieldErrors::new();
        assert!(slug_for(&mut errors, None, "  ").is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_numeric_bounds() {
        let mut errors = FieldErrors::new();
        non_negative(&mut errors, "price", Decimal::ZERO);
        non_negative_int(&mut errors, "stock", 0);
        percentage(&mut errors, "rate", Decimal::ONE_HUNDRED, TAX_RATE);
        assert!(errors.is_empty());

        non_negative(&mut errors, "price", Decimal::new(-1, 2));
        non_negative_int(&mut errors, "stock", -3);
        percentage(&mut errors, "rate", Decimal::new(10001, 2), TAX_RATE);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_money_fits_column() {
        let mut errors = FieldErrors::new();
        money(&mut errors, "price", Decimal::new(999_999_999_999, 2));
        money(&mut errors, "cost", Decimal::new(12_500, 3));
        assert!(errors.is_empty());

        money(&mut errors, "price", Decimal::from(10_000_000_000_000_i64));
        money(&mut errors, "total", Decimal::from(10_000_000_000_i64));
        money(&mut errors, "fee", Decimal::new(1_005, 3));
        assert_eq!(errors.get("price"), ["must be less than 10000000000"]);
        assert_eq!(errors.get("total"), ["must be less than 10000000000"]);
        assert_eq!(errors.get("fee"), ["must have at most 2 decimal places"]);
    }

    #[test]
    fn test_percentage_scale_follows_column() {
        let mut errors = FieldErrors::new();
        percentage(&mut errors, "rate", Decimal::new(8_875, 3), TAX_RATE);
        assert!(errors.is_empty());

        percentage(&mut errors, "commissionRate", Decimal::new(8_875, 3), COMMISSION_RATE);
        assert_eq!(errors.get("commissionRate"), ["must have at most 2 decimal places"]);
    }
}
