//! Database operations for tags.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, ShopId, SortDirection, TagId, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Tag, TagFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("tags", "tag", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "tags",
    select: "t.id, t.shop_id, s.name AS shop_name, t.name, t.slug, t.is_active, \
             (SELECT COUNT(*) FROM product_tags pt WHERE pt.tag_id = t.id) AS product_count, \
             t.created_at, t.updated_at",
    from: "tags t JOIN shops s ON s.id = t.shop_id",
    key_column: "t.id",
    sort_fields: &[
        SortField::new("name", "t.name"),
        SortField::new("slug", "t.slug"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "t.is_active"),
        SortField::new("createdAt", "t.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "t.name", FilterKind::Text),
        FilterField::new("shopId", "t.shop_id", FilterKind::Id),
        FilterField::new("isActive", "t.is_active", FilterKind::Boolean),
    ],
    search_columns: &["t.name", "t.slug"],
    default_sort: ("t.name", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("t.shop_id"),
    active_column: Some("t.is_active"),
};

/// Repository for tag database operations.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Tag>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a tag by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TagId, vendor: Option<VendorId>) -> Result<Option<Tag>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Create a tag in a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken in the shop.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, shop_id: ShopId, input: &TagFields) -> Result<Tag, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO tags (shop_id, name, slug, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tag is not visible.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: TagId,
        input: &TagFields,
        vendor: Option<VendorId>,
    ) -> Result<Tag, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE tags
            SET name = $2, slug = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
              AND ($5::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $5))
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
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
    /// Returns `RepositoryError::NotFound` if the tag is not visible.
    pub async fn toggle(&self, id: TagId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a tag and detach it from products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tag is not visible.
    pub async fn delete(&self, id: TagId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }
}
