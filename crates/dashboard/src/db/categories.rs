//! Database operations for categories.
//!
//! Categories form a tree per shop. A parent must live in the same shop, and
//! re-parenting may not create a cycle.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{
    CategoryId, FetchRequest, FetchResponse, FieldErrors, ShopId, SortDirection, VendorId,
};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Category, CategoryFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("categories", "category", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "categories",
    select: "c.id, c.shop_id, s.name AS shop_name, c.parent_id, pc.name AS parent_name, \
             c.name, c.slug, c.description, c.image_url, c.sort_order, c.is_active, \
             (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id) AS product_count, \
             c.created_at, c.updated_at",
    from: "categories c JOIN shops s ON s.id = c.shop_id \
           LEFT JOIN categories pc ON pc.id = c.parent_id",
    key_column: "c.id",
    sort_fields: &[
        SortField::new("name", "c.name"),
        SortField::new("slug", "c.slug"),
        SortField::new("parentName", "pc.name"),
        SortField::new("sortOrder", "c.sort_order"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "c.is_active"),
        SortField::new("createdAt", "c.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "c.name", FilterKind::Text),
        FilterField::new("parentId", "c.parent_id", FilterKind::Id),
        FilterField::new("shopId", "c.shop_id", FilterKind::Id),
        FilterField::new("isActive", "c.is_active", FilterKind::Boolean),
    ],
    search_columns: &["c.name", "c.slug", "c.description"],
    default_sort: ("c.sort_order", SortDirection::Asc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("c.shop_id"),
    active_column: Some("c.is_active"),
};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Category>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: CategoryId,
        vendor: Option<VendorId>,
    ) -> Result<Option<Category>, RepositoryError> {
        fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await
    }

    /// Create a category in a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the parent is not a category of
    /// the same shop and `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, shop_id: ShopId, input: &CategoryFields) -> Result<Category, RepositoryError> {
        if let Some(parent) = input.parent_id {
            self.check_parent(shop_id, None, parent).await?;
        }

        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO categories
                (shop_id, parent_id, name, slug, description, image_url, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(input.parent_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id).await
    }

    /// Update a category, possibly moving it in the tree.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not visible and
    /// `RepositoryError::Invalid` if the new parent is in another shop, is
    /// the category itself, or one of its descendants.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryFields,
        vendor: Option<VendorId>,
    ) -> Result<Category, RepositoryError> {
        let shop_id = self.shop_of(id, vendor).await?;
        if let Some(parent) = input.parent_id {
            self.check_parent(shop_id, Some(id), parent).await?;
        }

        sqlx::query(
            r"
            UPDATE categories
            SET parent_id = $2, name = $3, slug = $4, description = $5, image_url = $6,
                sort_order = $7, is_active = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.parent_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.sort_order)
        .bind(input.is_active)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        fetch::reload(self.pool, &LIST, id.as_i32()).await
    }

    /// Flip `is_active`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not visible.
    pub async fn toggle(&self, id: CategoryId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a category. Children become roots and products lose the link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not visible.
    pub async fn delete(&self, id: CategoryId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }

    /// Shop of a category visible to the caller.
    async fn shop_of(&self, id: CategoryId, vendor: Option<VendorId>) -> Result<ShopId, RepositoryError> {
        sqlx::query_scalar(
            r"
            SELECT shop_id FROM categories
            WHERE id = $1
              AND ($2::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $2))
            ",
        )
        .bind(id)
        .bind(vendor)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Reject a parent outside `shop_id`, or one that would close a loop
    /// when `category` is being moved.
    async fn check_parent(
        &self,
        shop_id: ShopId,
        category: Option<CategoryId>,
        parent: CategoryId,
    ) -> Result<(), RepositoryError> {
        if category == Some(parent) {
            return Err(RepositoryError::Invalid(FieldErrors::single(
                "parentId",
                "a category cannot be its own parent",
            )));
        }

        let same_shop: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND shop_id = $2)",
        )
        .bind(parent)
        .bind(shop_id)
        .fetch_one(self.pool)
        .await?;
        if !same_shop {
            return Err(RepositoryError::Invalid(FieldErrors::single(
                "parentId",
                "must be a category of the same shop",
            )));
        }

        let Some(category) = category else {
            return Ok(());
        };
        let is_descendant: bool = sqlx::query_scalar(
            r"
            WITH RECURSIVE descendants AS (
                SELECT id FROM categories WHERE parent_id = $1
                UNION
                SELECT c.id FROM categories c JOIN descendants d ON c.parent_id = d.id
            )
            SELECT EXISTS (SELECT 1 FROM descendants WHERE id = $2)
            ",
        )
        .bind(category)
        .bind(parent)
        .fetch_one(self.pool)
        .await?;
        if is_descendant {
            return Err(RepositoryError::Invalid(FieldErrors::single(
                "parentId",
                "cannot be one of the category's descendants",
            )));
        }
        Ok(())
    }
}
