//! Database operations for tax rates.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, ShopId, SortDirection, TaxRateId, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{TaxRate, TaxRateFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("tax_rates", "tax rate", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "tax_rates",
    select: "r.id, r.shop_id, s.name AS shop_name, r.name, r.country, r.region, r.rate, \
             r.is_active, r.created_at, r.updated_at",
    from: "tax_rates r JOIN shops s ON s.id = r.shop_id",
    key_column: "r.id",
    sort_fields: &[
        SortField::new("name", "r.name"),
        SortField::new("country", "r.country"),
        SortField::new("region", "r.region"),
        SortField::new("rate", "r.rate"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "r.is_active"),
        SortField::new("createdAt", "r.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "r.name", FilterKind::Text),
        FilterField::new("country", "r.country", FilterKind::Exact),
        FilterField::new("rate", "r.rate", FilterKind::NumberRange),
        FilterField::new("shopId", "r.shop_id", FilterKind::Id),
        FilterField::new("isActive", "r.is_active", FilterKind::Boolean),
    ],
    search_columns: &["r.name", "r.country", "r.region"],
    default_sort: ("r.country", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("r.shop_id"),
    active_column: Some("r.is_active"),
};

/// Repository for tax rate database operations.
pub struct TaxRateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaxRateRepository<'a> {
    /// Create a new tax rate repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of tax rates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<TaxRate>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a tax rate by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TaxRateId, vendor: Option<VendorId>) -> Result<Option<TaxRate>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Create a tax rate in a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, input), fields(country = %input.country))]
    pub async fn create(&self, shop_id: ShopId, input: &TaxRateFields) -> Result<TaxRate, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO tax_rates (shop_id, name, country, region, rate, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.country)
        .bind(&input.region)
        .bind(input.rate)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a tax rate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tax rate is not visible.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: TaxRateId,
        input: &TaxRateFields,
        vendor: Option<VendorId>,
    ) -> Result<TaxRate, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE tax_rates
            SET name = $2, country = $3, region = $4, rate = $5, is_active = $6,
                updated_at = NOW()
            WHERE id = $1
              AND ($7::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $7))
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.country)
        .bind(&input.region)
        .bind(input.rate)
        .bind(input.is_active)
        .bind(vendor)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?
        .ok_or(RepositoryError::NotFound)?;

        fetch::reload(self.pool, &LIST, id.as_i32()).await
    }

    /// Flip `is_active`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tax rate is not visible.
    pub async fn toggle(&self, id: TaxRateId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a tax rate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tax rate is not visible.
    pub async fn delete(&self, id: TaxRateId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }
}
