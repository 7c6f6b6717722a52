//! Database operations for vendors (admin only).

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{FetchRequest, FetchResponse, SortDirection, VendorId, VendorStatus};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Vendor, VendorFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("vendors", "vendor", Ownership::Platform);

pub const LIST: ListSpec = ListSpec {
    entity: "vendors",
    select: "v.id, v.name, v.slug, v.email, v.phone, v.status, v.commission_rate, v.is_active, \
             (SELECT COUNT(*) FROM shops s WHERE s.vendor_id = v.id) AS shop_count, \
             v.created_at, v.updated_at",
    from: "vendors v",
    key_column: "v.id",
    sort_fields: &[
        SortField::new("name", "v.name"),
        SortField::new("email", "v.email"),
        SortField::new("status", "v.status"),
        SortField::new("commissionRate", "v.commission_rate"),
        SortField::new("isActive", "v.is_active"),
        SortField::new("createdAt", "v.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "v.name", FilterKind::Text),
        FilterField::new("email", "v.email", FilterKind::Text),
        FilterField::new("status", "v.status", FilterKind::OneOf),
        FilterField::new("isActive", "v.is_active", FilterKind::Boolean),
        FilterField::new("createdAt", "v.created_at", FilterKind::DateRange),
    ],
    search_columns: &["v.name", "v.email", "v.slug"],
    default_sort: ("v.created_at", SortDirection::Desc),
    vendor_column: None,
    shop_column: None,
    active_column: Some("v.is_active"),
};

/// Repository for vendor database operations.
pub struct VendorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRepository<'a> {
    /// Create a new vendor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of vendors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidRequest` for a bad page size and
    /// `RepositoryError::Database` if the query fails.
    pub async fn list(&self, request: &FetchRequest) -> Result<FetchResponse<Vendor>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::platform()).await
    }

    /// Get a vendor by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: VendorId) -> Result<Option<Vendor>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::platform()).await
    }

    /// Create a vendor. New vendors start out `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &VendorFields) -> Result<Vendor, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO vendors (name, slug, email, phone, commission_rate, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.commission_rate)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        tracing::info!(vendor_id = id, "vendor created");
        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a vendor's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor does not exist and
    /// `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: VendorId, input: &VendorFields) -> Result<Vendor, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE vendors
            SET name = $2, slug = $3, email = $4, phone = $5, commission_rate = $6,
                is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.commission_rate)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?
        .ok_or(RepositoryError::NotFound)?;

        fetch::reload(self.pool, &LIST, id.as_i32()).await
    }

    /// Move a vendor through its approval lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor does not exist.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: VendorId, status: VendorStatus) -> Result<Vendor, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE vendors SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(vendor_id = %id, status = %status, "vendor status changed");
        fetch::reload(self.pool, &LIST, id.as_i32()).await
    }

    /// Flip `is_active`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor does not exist.
    pub async fn toggle(&self, id: VendorId) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), None).await
    }

    /// Delete a vendor that no longer owns shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` while shops still reference it.
    pub async fn delete(&self, id: VendorId) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), None).await
    }

    /// Look a vendor up by slug, for the CLI.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_id_by_slug(&self, slug: &str) -> Result<Option<VendorId>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT id FROM vendors WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_sql() {
        let request = FetchRequest::default().filter("status", vec!["pending", "approved"]);
        let plan = fetch::plan(&LIST, &request).unwrap();
        let qb = fetch::count_query(&LIST, &plan, &ListContext::platform());
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM vendors v WHERE v.status::text = ANY($1)"
        );
    }

    #[test]
    fn test_vendors_default_newest_first() {
        let plan = fetch::plan(&LIST, &FetchRequest::default()).unwrap();
        assert_eq!(
            plan.order_by,
            [("v.created_at", SortDirection::Desc), ("v.id", SortDirection::Asc)]
        );
    }
}
