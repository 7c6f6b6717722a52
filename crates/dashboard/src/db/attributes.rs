//! Database operations for product attributes.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{AttributeId, FetchRequest, FetchResponse, ShopId, SortDirection, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Attribute, AttributeFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("attributes", "attribute", Ownership::Shop);

// `values` is a reserved word and stays quoted.
pub const LIST: ListSpec = ListSpec {
    entity: "attributes",
    select: "a.id, a.shop_id, s.name AS shop_name, a.name, a.slug, a.\"values\", \
             a.is_active, a.created_at, a.updated_at",
    from: "attributes a JOIN shops s ON s.id = a.shop_id",
    key_column: "a.id",
    sort_fields: &[
        SortField::new("name", "a.name"),
        SortField::new("slug", "a.slug"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "a.is_active"),
        SortField::new("createdAt", "a.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "a.name", FilterKind::Text),
        FilterField::new("shopId", "a.shop_id", FilterKind::Id),
        FilterField::new("isActive", "a.is_active", FilterKind::Boolean),
    ],
    search_columns: &["a.name", "a.slug"],
    default_sort: ("a.name", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("a.shop_id"),
    active_column: Some("a.is_active"),
};

/// Repository for attribute database operations.
pub struct AttributeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AttributeRepository<'a> {
    /// Create a new attribute repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of attributes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Attribute>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get an attribute by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: AttributeId,
        vendor: Option<VendorId>,
    ) -> Result<Option<Attribute>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Create an attribute in a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken in the shop.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &AttributeFields,
    ) -> Result<Attribute, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO attributes (shop_id, name, slug, "values", is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.values)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update an attribute, replacing its value list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the attribute is not visible.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: AttributeId,
        input: &AttributeFields,
        vendor: Option<VendorId>,
    ) -> Result<Attribute, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE attributes
            SET name = $2, slug = $3, "values" = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1
              AND ($6::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $6))
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.values)
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
    /// Returns `RepositoryError::NotFound` if the attribute is not visible.
    pub async fn toggle(&self, id: AttributeId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete an attribute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the attribute is not visible.
    pub async fn delete(&self, id: AttributeId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }
}
