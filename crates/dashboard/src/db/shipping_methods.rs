//! Database operations for shipping methods.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, ShippingMethodId, ShopId, SortDirection, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{ShippingMethod, ShippingMethodFields};

pub(crate) const TABLE: EntityTable =
    EntityTable::new("shipping_methods", "shipping method", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "shipping_methods",
    select: "m.id, m.shop_id, s.name AS shop_name, m.name, m.description, m.price, \
             m.estimated_days, m.is_active, m.created_at, m.updated_at",
    from: "shipping_methods m JOIN shops s ON s.id = m.shop_id",
    key_column: "m.id",
    sort_fields: &[
        SortField::new("name", "m.name"),
        SortField::new("price", "m.price"),
        SortField::new("estimatedDays", "m.estimated_days"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "m.is_active"),
        SortField::new("createdAt", "m.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "m.name", FilterKind::Text),
        FilterField::new("price", "m.price", FilterKind::NumberRange),
        FilterField::new("shopId", "m.shop_id", FilterKind::Id),
        FilterField::new("isActive", "m.is_active", FilterKind::Boolean),
    ],
    search_columns: &["m.name", "m.description"],
    default_sort: ("m.price", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("m.shop_id"),
    active_column: Some("m.is_active"),
};

/// Repository for shipping method database operations.
pub struct ShippingMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShippingMethodRepository<'a> {
    /// Create a new shipping method repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of shipping methods.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<ShippingMethod>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a shipping method by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: ShippingMethodId,
        vendor: Option<VendorId>,
    ) -> Result<Option<ShippingMethod>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Create a shipping method in a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &ShippingMethodFields,
    ) -> Result<ShippingMethod, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shipping_methods (shop_id, name, description, price, estimated_days, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.estimated_days)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a shipping method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method is not visible.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ShippingMethodId,
        input: &ShippingMethodFields,
        vendor: Option<VendorId>,
    ) -> Result<ShippingMethod, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE shipping_methods
            SET name = $2, description = $3, price = $4, estimated_days = $5, is_active = $6,
                updated_at = NOW()
            WHERE id = $1
              AND ($7::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $7))
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.estimated_days)
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
    /// Returns `RepositoryError::NotFound` if the method is not visible.
    pub async fn toggle(
        &self,
        id: ShippingMethodId,
        vendor: Option<VendorId>,
    ) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a shipping method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method is not visible.
    pub async fn delete(&self, id: ShippingMethodId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }
}
