//! Database operations for brands.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{BrandId, FetchRequest, FetchResponse, ShopId, SortDirection, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Brand, BrandFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("brands", "brand", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "brands",
    select: "b.id, b.shop_id, s.name AS shop_name, b.name, b.slug, b.description, b.logo_url, \
             b.website_url, b.is_active, \
             (SELECT COUNT(*) FROM products p WHERE p.brand_id = b.id) AS product_count, \
             b.created_at, b.updated_at",
    from: "brands b JOIN shops s ON s.id = b.shop_id",
    key_column: "b.id",
    sort_fields: &[
        SortField::new("name", "b.name"),
        SortField::new("slug", "b.slug"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "b.is_active"),
        SortField::new("createdAt", "b.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "b.name", FilterKind::Text),
        FilterField::new("shopId", "b.shop_id", FilterKind::Id),
        FilterField::new("isActive", "b.is_active", FilterKind::Boolean),
    ],
    search_columns: &["b.name", "b.slug"],
    default_sort: ("b.name", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("b.shop_id"),
    active_column: Some("b.is_active"),
};

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of brands.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Brand>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a brand by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BrandId, vendor: Option<VendorId>) -> Result<Option<Brand>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Create a brand in a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken in the shop.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, shop_id: ShopId, input: &BrandFields) -> Result<Brand, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO brands (shop_id, name, slug, description, logo_url, website_url, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.logo_url)
        .bind(&input.website_url)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand is not visible and
    /// `RepositoryError::Conflict` if the slug is taken in the shop.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: BrandId,
        input: &BrandFields,
        vendor: Option<VendorId>,
    ) -> Result<Brand, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE brands
            SET name = $2, slug = $3, description = $4, logo_url = $5, website_url = $6,
                is_active = $7, updated_at = NOW()
            WHERE id = $1
              AND ($8::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $8))
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.logo_url)
        .bind(&input.website_url)
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
    /// Returns `RepositoryError::NotFound` if the brand is not visible.
    pub async fn toggle(&self, id: BrandId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a brand; its products keep existing without one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand is not visible.
    pub async fn delete(&self, id: BrandId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }
}
