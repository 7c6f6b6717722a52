//! URL slug type.
//!
//! Shops, vendors and catalog entities are addressed by slugs in storefront
//! URLs. A slug is lowercase ASCII alphanumerics separated by single hyphens.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input is empty (or has no alphanumeric characters).
    #[error("slug cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character other than `a-z`, `0-9` or `-`,
    /// or has leading, trailing or repeated hyphens.
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidFormat,
}

/// A URL-safe identifier such as `summer-sale` or `acme-outdoor`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 120;

    /// Parse a slug, rejecting anything that is not already in canonical form.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the input is empty, too long, or not canonical.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        let valid_chars = s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::InvalidFormat);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name.
    ///
    /// ASCII letters are lowercased, runs of any other characters become a
    /// single hyphen, and the result is truncated to [`Self::MAX_LENGTH`].
    ///
    /// ```
    /// use bazaar_core::Slug;
    ///
    /// assert_eq!(Slug::from_name("Summer Sale -- 2026!").unwrap().as_str(), "summer-sale-2026");
    /// assert!(Slug::from_name("***").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name has no ASCII alphanumerics.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }
        if out.is_empty() {
            return Err(SlugError::Empty);
        }
        if out.len() > Self::MAX_LENGTH {
            out.truncate(Self::MAX_LENGTH);
            while out.ends_with('-') {
                out.pop();
            }
        }
        Ok(Self(out))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the slug and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        assert_eq!(Slug::parse("acme-outdoor").unwrap().as_str(), "acme-outdoor");
        assert_eq!(Slug::parse("x1").unwrap().as_str(), "x1");
    }

    #[test]
    fn test_parse_rejects_non_canonical() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Acme"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("-acme"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("acme-"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("acme--outdoor"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("acme outdoor"), Err(SlugError::InvalidFormat));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Slug::from_name("Men's Shoes").unwrap().as_str(), "men-s-shoes");
        assert_eq!(Slug::from_name("  Café Noir  ").unwrap().as_str(), "caf-noir");
        assert_eq!(Slug::from_name("V-Neck / Cotton").unwrap().as_str(), "v-neck-cotton");
        assert_eq!(Slug::from_name("!!"), Err(SlugError::Empty));
    }

    #[test]
    fn test_from_name_truncates_without_trailing_hyphen() {
        let name = format!("{} {}", "a".repeat(119), "b".repeat(10));
        let slug = Slug::from_name(&name).unwrap();
        assert_eq!(slug.as_str().len(), 119);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_from_name_output_is_parseable() {
        for name in ["Hello World", "2026 Collection", "a--b__c"] {
            let slug = Slug::from_name(name).unwrap();
            assert!(Slug::parse(slug.as_str()).is_ok(), "{name}");
        }
    }
}
