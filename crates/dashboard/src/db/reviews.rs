//! Database operations for product reviews.
//!
//! Reviews are written by shoppers; the dashboard approves, hides and (for
//! admins) deletes them.

use sqlx::PgPool;

use bazaar_core::{FetchRequest, FetchResponse, ReviewId, SortDirection, VendorId};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError};
use crate::models::Review;

pub(crate) const TABLE: EntityTable = EntityTable::new("reviews", "review", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "reviews",
    select: "r.id, r.shop_id, s.name AS shop_name, r.product_id, p.name AS product_name, \
             r.author_name, r.rating, r.title, r.body, r.is_approved, r.created_at, r.updated_at",
    from: "reviews r JOIN products p ON p.id = r.product_id JOIN shops s ON s.id = r.shop_id",
    key_column: "r.id",
    sort_fields: &[
        SortField::new("productName", "p.name"),
        SortField::new("authorName", "r.author_name"),
        SortField::new("rating", "r.rating"),
        SortField::new("isApproved", "r.is_approved"),
        SortField::new("shopName", "s.name"),
        SortField::new("createdAt", "r.created_at"),
    ],
    filter_fields: &[
        FilterField::new("productId", "r.product_id", FilterKind::Id),
        FilterField::new("authorName", "r.author_name", FilterKind::Text),
        FilterField::new("rating", "r.rating", FilterKind::NumberRange),
        FilterField::new("isApproved", "r.is_approved", FilterKind::Boolean),
        FilterField::new("shopId", "r.shop_id", FilterKind::Id),
        FilterField::new("createdAt", "r.created_at", FilterKind::DateRange),
    ],
    search_columns: &["r.author_name", "r.title", "r.body", "p.name"],
    default_sort: ("r.created_at", SortDirection::Desc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("r.shop_id"),
    active_column: Some("r.is_approved"),
};

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Review>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId, vendor: Option<VendorId>) -> Result<Option<Review>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Flip `is_approved`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review is not visible.
    pub async fn toggle(&self, id: ReviewId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_approved", id.as_i32(), vendor).await
    }

    /// Delete a review. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), None).await
    }
}
