//! Database operations for shop staff.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, ShopId, SortDirection, StaffId, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Staff, StaffFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("staff", "staff member", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "staff",
    select: "m.id, m.shop_id, s.name AS shop_name, m.name, m.email, m.position, m.is_active, \
             m.created_at, m.updated_at",
    from: "staff m JOIN shops s ON s.id = m.shop_id",
    key_column: "m.id",
    sort_fields: &[
        SortField::new("name", "m.name"),
        SortField::new("email", "m.email"),
        SortField::new("position", "m.position"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "m.is_active"),
        SortField::new("createdAt", "m.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "m.name", FilterKind::Text),
        FilterField::new("email", "m.email", FilterKind::Text),
        FilterField::new("position", "m.position", FilterKind::Text),
        FilterField::new("shopId", "m.shop_id", FilterKind::Id),
        FilterField::new("isActive", "m.is_active", FilterKind::Boolean),
    ],
    search_columns: &["m.name", "m.email", "m.position"],
    default_sort: ("m.name", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("m.shop_id"),
    active_column: Some("m.is_active"),
};

/// Repository for staff database operations.
pub struct StaffRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StaffRepository<'a> {
    /// Create a new staff repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of staff members.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Staff>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a staff member by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StaffId, vendor: Option<VendorId>) -> Result<Option<Staff>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Add a staff member to a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already on the
    /// shop's staff.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, shop_id: ShopId, input: &StaffFields) -> Result<Staff, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO staff (shop_id, name, email, position, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.position)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a staff member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the staff member is not visible.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: StaffId,
        input: &StaffFields,
        vendor: Option<VendorId>,
    ) -> Result<Staff, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE staff
            SET name = $2, email = $3, position = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1
              AND ($6::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $6))
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.position)
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
    /// Returns `RepositoryError::NotFound` if the staff member is not visible.
    pub async fn toggle(&self, id: StaffId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Remove a staff member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the staff member is not visible.
    pub async fn delete(&self, id: StaffId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }
}
