//! Database operations for the marketplace `PostgreSQL` schema.
//!
//! # Tables
//!
//! - `vendors`, `users`, `shops` - tenancy and dashboard accounts
//! - `categories`, `brands`, `tags`, `attributes`, `products` - catalog
//! - `tax_rates`, `shipping_methods`, `coupons` - checkout settings
//! - `orders`, `order_items`, `transactions` - sales
//! - `staff`, `reviews` - per-shop people and feedback
//! - `dashboard.session` - session storage
//!
//! List screens go through [`fetch`]; everything else is a repository per
//! entity. Vendor-mode calls pass the vendor's ID so every read and write is
//! confined to rows of that vendor's shops.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod attributes;
pub mod brands;
pub mod categories;
pub mod coupons;
pub mod dashboard;
pub mod fetch;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod shipping_methods;
pub mod shops;
pub mod staff;
pub mod tags;
pub mod tax_rates;
pub mod transactions;
pub mod users;
pub mod vendors;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use bazaar_core::{FieldErrors, TableRequestError, VendorId};

pub use attributes::AttributeRepository;
pub use brands::BrandRepository;
pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use dashboard::DashboardRepository;
pub use fetch::ListContext;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use shipping_methods::ShippingMethodRepository;
pub use shops::ShopRepository;
pub use staff::StaffRepository;
pub use tags::TagRepository;
pub use tax_rates::TaxRateRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;
pub use vendors::VendorRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found (or is not visible to the caller).
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug, row still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A list request that cannot be turned into a bounded query.
    #[error("invalid list request: {0}")]
    InvalidRequest(#[from] TableRequestError),

    /// A referenced row is missing or belongs to another shop.
    #[error("invalid reference: {0}")]
    Invalid(FieldErrors),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// SQLSTATE raised when a value does not fit its `NUMERIC` column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Map an error from an `INSERT`/`UPDATE`/`DELETE` onto [`RepositoryError`].
///
/// Unique, foreign-key, check and numeric range violations become `Conflict`
/// with a message naming `what`; anything else stays a database error.
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return RepositoryError::Conflict(format!("{what} has a number out of range"));
        }
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!(
                "{what} references a missing record or is still in use"
            ));
        }
        if db_err.is_check_violation() {
            return RepositoryError::Conflict(format!("{what} violates a data constraint"));
        }
    }
    RepositoryError::Database(e)
}

/// How a table's rows are tied to a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Rows carry `shop_id`; the shop carries `vendor_id`.
    Shop,
    /// Rows carry `vendor_id` directly.
    Vendor,
    /// Platform rows no vendor can touch.
    Platform,
}

/// A table that supports the generic toggle/delete/ownership helpers.
#[derive(Debug, Clone, Copy)]
pub struct EntityTable {
    pub name: &'static str,
    /// Human name used in conflict messages.
    pub label: &'static str,
    pub ownership: Ownership,
}

impl EntityTable {
    #[must_use]
    pub const fn new(name: &'static str, label: &'static str, ownership: Ownership) -> Self {
        Self {
            name,
            label,
            ownership,
        }
    }

    /// Append ` AND <vendor scope>` for a vendor caller. Admin calls pass `None`.
    pub(crate) fn push_scope(&self, qb: &mut QueryBuilder<'static, Postgres>, vendor: Option<VendorId>) {
        let Some(vendor_id) = vendor else {
            return;
        };
        match self.ownership {
            Ownership::Shop => {
                qb.push(" AND shop_id IN (SELECT id FROM shops WHERE vendor_id = ")
                    .push_bind(vendor_id)
                    .push(")");
            }
            Ownership::Vendor => {
                qb.push(" AND vendor_id = ").push_bind(vendor_id);
            }
            Ownership::Platform => {
                qb.push(" AND FALSE");
            }
        }
    }

    /// Flip a boolean column and return its new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist or is
    /// outside the vendor's scope.
    pub async fn toggle(
        &self,
        pool: &PgPool,
        column: &'static str,
        id: i32,
        vendor: Option<VendorId>,
    ) -> Result<bool, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "UPDATE {table} SET {column} = NOT {column}, updated_at = NOW() WHERE id = ",
            table = self.name
        ));
        qb.push_bind(id);
        self.push_scope(&mut qb, vendor);
        qb.push(format!(" RETURNING {column}"));

        qb.build_query_scalar::<bool>()
            .fetch_optional(pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted and
    /// `RepositoryError::Conflict` if other rows still reference it.
    pub async fn delete(
        &self,
        pool: &PgPool,
        id: i32,
        vendor: Option<VendorId>,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", self.name));
        qb.push_bind(id);
        self.push_scope(&mut qb, vendor);

        let result = qb
            .build()
            .execute(pool)
            .await
            .map_err(|e| map_write_error(e, self.label))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Whether a row exists and is visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_visible(
        &self,
        pool: &PgPool,
        id: i32,
        vendor: Option<VendorId>,
    ) -> Result<bool, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = ",
            self.name
        ));
        qb.push_bind(id);
        self.push_scope(&mut qb, vendor);
        qb.push(")");

        Ok(qb.build_query_scalar::<bool>().fetch_one(pool).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_scope_sql() {
        let table = EntityTable::new("brands", "brand", Ownership::Shop);
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM brands WHERE id = ");
        qb.push_bind(1);
        table.push_scope(&mut qb, Some(VendorId::new(7)));
        assert_eq!(
            qb.sql(),
            "DELETE FROM brands WHERE id = $1 AND shop_id IN (SELECT id FROM shops WHERE vendor_id = $2)"
        );
    }

    #[test]
    fn test_admin_scope_adds_nothing() {
        let table = EntityTable::new("brands", "brand", Ownership::Shop);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM brands WHERE id = ");
        qb.push_bind(1);
        table.push_scope(&mut qb, None);
        assert_eq!(qb.sql(), "SELECT 1 FROM brands WHERE id = $1");
    }

    #[test]
    fn test_platform_rows_are_invisible_to_vendors() {
        let table = EntityTable::new("vendors", "vendor", Ownership::Platform);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM vendors WHERE id = ");
        qb.push_bind(1);
        table.push_scope(&mut qb, Some(VendorId::new(2)));
        assert!(qb.sql().ends_with("AND FALSE"));
    }

    #[tokio::test]
    #[ignore = "Requires TEST_DATABASE_URL"]
    async fn test_numeric_overflow_is_a_conflict() {
        let url = std::env::var("TEST_DATABASE_URL").unwrap();
        let pool = PgPool::connect(&url).await.unwrap();
        let err = sqlx::query("SELECT 10000000000::NUMERIC(12, 2)")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(matches!(
            map_write_error(err, "product"),
            RepositoryError::Conflict(message) if message == "product has a number out of range"
        ));
    }
}
