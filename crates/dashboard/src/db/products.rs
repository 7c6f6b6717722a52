//! Database operations for products and their tags.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use bazaar_core::{
    FetchRequest, FetchResponse, FieldErrors, ProductId, ShopId, SortDirection, TagId, VendorId,
};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Product, ProductDetail, ProductFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("products", "product", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "products",
    select: "p.id, p.shop_id, s.name AS shop_name, p.category_id, c.name AS category_name, \
             p.brand_id, b.name AS brand_name, p.name, p.slug, p.sku, p.description, \
             p.image_url, p.price, p.compare_at_price, p.stock, p.is_active, p.is_featured, \
             p.created_at, p.updated_at",
    from: "products p JOIN shops s ON s.id = p.shop_id \
           LEFT JOIN categories c ON c.id = p.category_id \
           LEFT JOIN brands b ON b.id = p.brand_id",
    key_column: "p.id",
    sort_fields: &[
        SortField::new("name", "p.name"),
        SortField::new("sku", "p.sku"),
        SortField::new("price", "p.price"),
        SortField::new("stock", "p.stock"),
        SortField::new("categoryName", "c.name"),
        SortField::new("brandName", "b.name"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "p.is_active"),
        SortField::new("isFeatured", "p.is_featured"),
        SortField::new("createdAt", "p.created_at"),
        SortField::new("updatedAt", "p.updated_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "p.name", FilterKind::Text),
        FilterField::new("sku", "p.sku", FilterKind::Text),
        FilterField::new("categoryId", "p.category_id", FilterKind::Id),
        FilterField::new("brandId", "p.brand_id", FilterKind::Id),
        FilterField::new("shopId", "p.shop_id", FilterKind::Id),
        FilterField::new("price", "p.price", FilterKind::NumberRange),
        FilterField::new("stock", "p.stock", FilterKind::NumberRange),
        FilterField::new("isActive", "p.is_active", FilterKind::Boolean),
        FilterField::new("isFeatured", "p.is_featured", FilterKind::Boolean),
        FilterField::new("createdAt", "p.created_at", FilterKind::DateRange),
    ],
    search_columns: &["p.name", "p.sku", "p.description"],
    default_sort: ("p.created_at", SortDirection::Desc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("p.shop_id"),
    active_column: Some("p.is_active"),
};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products under `ctx` (dashboard or storefront scope).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        ctx: &ListContext,
    ) -> Result<FetchResponse<Product>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, ctx).await
    }

    /// Get a product with its tag IDs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: ProductId,
        vendor: Option<VendorId>,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let Some(product) =
            fetch::fetch_by_key::<Product>(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor))
                .await?
        else {
            return Ok(None);
        };
        Ok(Some(self.with_tags(product).await?))
    }

    /// Create a product and attach its tags, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the category, brand or a tag
    /// belongs to another shop and `RepositoryError::Conflict` if the slug
    /// is taken.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &ProductFields,
    ) -> Result<ProductDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, shop_id, input).await?;

        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (
                shop_id, category_id, brand_id, name, slug, sku, description, image_url,
                price, compare_at_price, stock, is_active, is_featured
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.price)
        .bind(input.compare_at_price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        replace_tags(&mut tx, id, &input.tag_ids).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, tags = input.tag_ids.len(), "product created");
        let product = fetch::reload(self.pool, &LIST, id.as_i32()).await?;
        self.with_tags(product).await
    }

    /// Update a product and replace its tag set, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not visible and
    /// `RepositoryError::Invalid` for references into another shop.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductFields,
        vendor: Option<VendorId>,
    ) -> Result<ProductDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let shop_id: ShopId = sqlx::query_scalar(
            r"
            SELECT shop_id FROM products
            WHERE id = $1
              AND ($2::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $2))
            FOR UPDATE
            ",
        )
        .bind(id)
        .bind(vendor)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        check_references(&mut tx, shop_id, input).await?;

        sqlx::query(
            r"
            UPDATE products
            SET category_id = $2, brand_id = $3, name = $4, slug = $5, sku = $6,
                description = $7, image_url = $8, price = $9, compare_at_price = $10,
                stock = $11, is_active = $12, is_featured = $13, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.price)
        .bind(input.compare_at_price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.is_featured)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        replace_tags(&mut tx, id, &input.tag_ids).await?;
        tx.commit().await?;

        let product = fetch::reload(self.pool, &LIST, id.as_i32()).await?;
        self.with_tags(product).await
    }

    /// Flip `is_active`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not visible.
    pub async fn toggle(&self, id: ProductId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a product. Past order lines keep their copied name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not visible.
    pub async fn delete(&self, id: ProductId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }

    /// Set `is_active` on every visible product in `ids`, returning how many
    /// rows changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn set_active_many(
        &self,
        ids: &[ProductId],
        active: bool,
        vendor: Option<VendorId>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET is_active = $2, updated_at = NOW()
            WHERE id = ANY($1)
              AND ($3::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $3))
            ",
        )
        .bind(ids)
        .bind(active)
        .bind(vendor)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every visible product in `ids`, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a product is still referenced.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_many(
        &self,
        ids: &[ProductId],
        vendor: Option<VendorId>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM products
            WHERE id = ANY($1)
              AND ($2::int IS NULL OR shop_id IN (SELECT id FROM shops WHERE vendor_id = $2))
            ",
        )
        .bind(ids)
        .bind(vendor)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        tracing::info!(deleted = result.rows_affected(), "products deleted");
        Ok(result.rows_affected())
    }

    async fn with_tags(&self, product: Product) -> Result<ProductDetail, RepositoryError> {
        let tag_ids = sqlx::query_scalar(
            "SELECT tag_id FROM product_tags WHERE product_id = $1 ORDER BY tag_id",
        )
        .bind(product.id)
        .fetch_all(self.pool)
        .await?;

        Ok(ProductDetail { product, tag_ids })
    }
}

/// Verify that the category, brand and tags all belong to `shop_id`.
async fn check_references(
    conn: &mut PgConnection,
    shop_id: ShopId,
    input: &ProductFields,
) -> Result<(), RepositoryError> {
    let (category_ok, brand_ok, tag_count): (bool, bool, i64) = sqlx::query_as(
        r"
        SELECT
            ($2::int IS NULL OR EXISTS (SELECT 1 FROM categories WHERE id = $2 AND shop_id = $1)),
            ($3::int IS NULL OR EXISTS (SELECT 1 FROM brands WHERE id = $3 AND shop_id = $1)),
            (SELECT COUNT(*) FROM tags WHERE id = ANY($4) AND shop_id = $1)
        ",
    )
    .bind(shop_id)
    .bind(input.category_id)
    .bind(input.brand_id)
    .bind(&input.tag_ids)
    .fetch_one(&mut *conn)
    .await?;

    let mut errors = FieldErrors::new();
    if !category_ok {
        errors.add("categoryId", "must be a category of the same shop");
    }
    if !brand_ok {
        errors.add("brandId", "must be a brand of the same shop");
    }
    if usize::try_from(tag_count).ok() != Some(input.tag_ids.len()) {
        errors.add("tagIds", "must all be tags of the same shop");
    }
    errors.into_result().map_err(RepositoryError::Invalid)
}

async fn replace_tags(
    conn: &mut PgConnection,
    product: ProductId,
    tag_ids: &[TagId],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM product_tags WHERE product_id = $1")
        .bind(product)
        .execute(&mut *conn)
        .await?;

    if !tag_ids.is_empty() {
        sqlx::query(
            "INSERT INTO product_tags (product_id, tag_id) SELECT $1, UNNEST($2::int[])",
        )
        .bind(product)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storefront_scope() {
        let request = FetchRequest::default()
            .filter("price", json!({"min": "5", "max": "20"}))
            .filter("supplierCost", "12");
        let plan = fetch::plan(&LIST, &request).unwrap();
        let qb = fetch::count_query(&LIST, &plan, &ListContext::storefront(ShopId::new(4)));
        assert!(qb.sql().ends_with(
            "WHERE p.shop_id = $1 AND p.is_active = TRUE AND p.price >= $2 AND p.price <= $3"
        ));
    }
}
