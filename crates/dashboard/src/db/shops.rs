//! Database operations for shops.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, ShopId, SortDirection, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Shop, ShopFields, ShopOption};

pub(crate) const TABLE: EntityTable = EntityTable::new("shops", "shop", Ownership::Vendor);

pub const LIST: ListSpec = ListSpec {
    entity: "shops",
    select: "s.id, s.vendor_id, v.name AS vendor_name, s.name, s.slug, s.description, \
             s.logo_url, s.is_active, \
             (SELECT COUNT(*) FROM products p WHERE p.shop_id = s.id) AS product_count, \
             s.created_at, s.updated_at",
    from: "shops s JOIN vendors v ON v.id = s.vendor_id",
    key_column: "s.id",
    sort_fields: &[
        SortField::new("name", "s.name"),
        SortField::new("slug", "s.slug"),
        SortField::new("vendorName", "v.name"),
        SortField::new("isActive", "s.is_active"),
        SortField::new("createdAt", "s.created_at"),
        SortField::new("updatedAt", "s.updated_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "s.name", FilterKind::Text),
        FilterField::new("vendorId", "s.vendor_id", FilterKind::Id),
        FilterField::new("isActive", "s.is_active", FilterKind::Boolean),
        FilterField::new("createdAt", "s.created_at", FilterKind::DateRange),
    ],
    search_columns: &["s.name", "s.slug", "v.name"],
    default_sort: ("s.created_at", SortDirection::Desc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("s.id"),
    active_column: Some("s.is_active"),
};

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Shop>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a shop by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShopId, vendor: Option<VendorId>) -> Result<Option<Shop>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Shops for a select input, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn options(&self, vendor: Option<VendorId>) -> Result<Vec<ShopOption>, RepositoryError> {
        let options = sqlx::query_as::<_, ShopOption>(
            r"
            SELECT id, name FROM shops
            WHERE $1::int IS NULL OR vendor_id = $1
            ORDER BY name, id
            ",
        )
        .bind(vendor)
        .fetch_all(self.pool)
        .await?;

        Ok(options)
    }

    /// Whether `shop` belongs to `vendor`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_owned_by(&self, shop: ShopId, vendor: VendorId) -> Result<bool, RepositoryError> {
        TABLE.is_visible(self.pool, shop.as_i32(), Some(vendor)).await
    }

    /// Whether a shop exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, shop: ShopId) -> Result<bool, RepositoryError> {
        TABLE.is_visible(self.pool, shop.as_i32(), None).await
    }

    /// An active shop by slug, for the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active_by_slug(&self, slug: &str) -> Result<Option<ShopId>, RepositoryError> {
        Ok(sqlx::query_scalar(
            r"
            SELECT s.id FROM shops s
            JOIN vendors v ON v.id = s.vendor_id
            WHERE s.slug = $1 AND s.is_active AND v.is_active AND v.status = 'approved'
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?)
    }

    /// Create a shop for a vendor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken or the vendor
    /// does not exist.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, vendor_id: VendorId, input: &ShopFields) -> Result<Shop, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shops (vendor_id, name, slug, description, logo_url, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(vendor_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.logo_url)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        tracing::info!(shop_id = id, "shop created");
        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a shop. The owning vendor never changes here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist or is
    /// not the vendor's.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ShopId,
        input: &ShopFields,
        vendor: Option<VendorId>,
    ) -> Result<Shop, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE shops
            SET name = $2, slug = $3, description = $4, logo_url = $5, is_active = $6,
                updated_at = NOW()
            WHERE id = $1 AND ($7::int IS NULL OR vendor_id = $7)
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.logo_url)
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
    /// Returns `RepositoryError::NotFound` if the shop is not visible.
    pub async fn toggle(&self, id: ShopId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a shop and its catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` while orders still reference it.
    pub async fn delete(&self, id: ShopId) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_scope_on_shop_list() {
        let plan = fetch::plan(&LIST, &FetchRequest::default().search("north")).unwrap();
        let qb = fetch::count_query(&LIST, &plan, &ListContext::vendor(VendorId::new(3)));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM shops s JOIN vendors v ON v.id = s.vendor_id \
             WHERE s.vendor_id = $1 AND (s.name ILIKE $2 OR s.slug ILIKE $3 OR v.name ILIKE $4)"
        );
    }
}
