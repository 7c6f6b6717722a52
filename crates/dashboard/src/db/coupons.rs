//! Database operations for coupons and the products/categories they cover.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use bazaar_core::{
    CategoryId, CouponId, FetchRequest, FetchResponse, FieldErrors, ProductId, ShopId,
    SortDirection, VendorId,
};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{Coupon, CouponDetail, CouponFields};

pub(crate) const TABLE: EntityTable = EntityTable::new("coupons", "coupon", Ownership::Shop);

pub const LIST: ListSpec = ListSpec {
    entity: "coupons",
    select: "k.id, k.shop_id, s.name AS shop_name, k.code, k.description, k.discount_type, \
             k.discount_value, k.minimum_order_amount, k.usage_limit, k.used_count, \
             k.starts_at, k.expires_at, k.is_active, k.created_at, k.updated_at",
    from: "coupons k JOIN shops s ON s.id = k.shop_id",
    key_column: "k.id",
    sort_fields: &[
        SortField::new("code", "k.code"),
        SortField::new("discountType", "k.discount_type"),
        SortField::new("discountValue", "k.discount_value"),
        SortField::new("usedCount", "k.used_count"),
        SortField::new("startsAt", "k.starts_at"),
        SortField::new("expiresAt", "k.expires_at"),
        SortField::new("shopName", "s.name"),
        SortField::new("isActive", "k.is_active"),
        SortField::new("createdAt", "k.created_at"),
    ],
    filter_fields: &[
        FilterField::new("code", "k.code", FilterKind::Text),
        FilterField::new("discountType", "k.discount_type", FilterKind::Exact),
        FilterField::new("shopId", "k.shop_id", FilterKind::Id),
        FilterField::new("isActive", "k.is_active", FilterKind::Boolean),
        FilterField::new("expiresAt", "k.expires_at", FilterKind::DateRange),
    ],
    search_columns: &["k.code", "k.description"],
    default_sort: ("k.created_at", SortDirection::Desc),
    vendor_column: Some("s.vendor_id"),
    shop_column: Some("k.shop_id"),
    active_column: Some("k.is_active"),
};

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of coupons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        request: &FetchRequest,
        vendor: Option<VendorId>,
    ) -> Result<FetchResponse<Coupon>, RepositoryError> {
        fetch::fetch_page(self.pool, &LIST, request, &ListContext::scoped(vendor)).await
    }

    /// Get a coupon with the products and categories it applies to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: CouponId,
        vendor: Option<VendorId>,
    ) -> Result<Option<CouponDetail>, RepositoryError> {
        let coupon: Option<Coupon> =
            fetch::fetch_by_key(self.pool, &LIST, id.as_i32(), &ListContext::scoped(vendor)).await?;
        match coupon {
            Some(coupon) => Ok(Some(self.with_targets(coupon).await?)),
            None => Ok(None),
        }
    }

    /// Create a coupon and its product/category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if a linked product or category
    /// belongs to another shop and `RepositoryError::Conflict` if the code is
    /// already used in the shop.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, shop_id: ShopId, input: &CouponFields) -> Result<CouponDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        check_targets(&mut tx, shop_id, &input.product_ids, &input.category_ids).await?;

        let id: CouponId = sqlx::query_scalar(
            r"
            INSERT INTO coupons (
                shop_id, code, description, discount_type, discount_value,
                minimum_order_amount, usage_limit, starts_at, expires_at, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.discount_type)
        .bind(input.discount_value)
        .bind(input.minimum_order_amount)
        .bind(input.usage_limit)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        replace_targets(&mut tx, id, &input.product_ids, &input.category_ids).await?;
        tx.commit().await?;

        let coupon = fetch::reload(self.pool, &LIST, id.as_i32()).await?;
        self.with_targets(coupon).await
    }

    /// Update a coupon and replace its product/category links.
    ///
    /// `used_count` is owned by checkout and never written here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon is not visible.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: CouponId,
        input: &CouponFields,
        vendor: Option<VendorId>,
    ) -> Result<CouponDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let shop_id: ShopId = sqlx::query_scalar(
            r"
            SELECT shop_id FROM coupons
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

        check_targets(&mut tx, shop_id, &input.product_ids, &input.category_ids).await?;

        sqlx::query(
            r"
            UPDATE coupons
            SET code = $2, description = $3, discount_type = $4, discount_value = $5,
                minimum_order_amount = $6, usage_limit = $7, starts_at = $8, expires_at = $9,
                is_active = $10, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.discount_type)
        .bind(input.discount_value)
        .bind(input.minimum_order_amount)
        .bind(input.usage_limit)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        replace_targets(&mut tx, id, &input.product_ids, &input.category_ids).await?;
        tx.commit().await?;

        let coupon = fetch::reload(self.pool, &LIST, id.as_i32()).await?;
        self.with_targets(coupon).await
    }

    /// Flip `is_active`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon is not visible.
    pub async fn toggle(&self, id: CouponId, vendor: Option<VendorId>) -> Result<bool, RepositoryError> {
        TABLE.toggle(self.pool, "is_active", id.as_i32(), vendor).await
    }

    /// Delete a coupon and its links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon is not visible.
    pub async fn delete(&self, id: CouponId, vendor: Option<VendorId>) -> Result<(), RepositoryError> {
        TABLE.delete(self.pool, id.as_i32(), vendor).await
    }

    async fn with_targets(&self, coupon: Coupon) -> Result<CouponDetail, RepositoryError> {
        let (product_ids, category_ids) = tokio::try_join!(
            sqlx::query_scalar(
                "SELECT product_id FROM coupon_products WHERE coupon_id = $1 ORDER BY product_id",
            )
            .bind(coupon.id)
            .fetch_all(self.pool),
            sqlx::query_scalar(
                "SELECT category_id FROM coupon_categories WHERE coupon_id = $1 ORDER BY category_id",
            )
            .bind(coupon.id)
            .fetch_all(self.pool),
        )?;

        Ok(CouponDetail {
            coupon,
            product_ids,
            category_ids,
        })
    }
}

async fn check_targets(
    conn: &mut PgConnection,
    shop_id: ShopId,
    product_ids: &[ProductId],
    category_ids: &[CategoryId],
) -> Result<(), RepositoryError> {
    let (products, categories): (i64, i64) = sqlx::query_as(
        r"
        SELECT
            (SELECT COUNT(*) FROM products WHERE id = ANY($2) AND shop_id = $1),
            (SELECT COUNT(*) FROM categories WHERE id = ANY($3) AND shop_id = $1)
        ",
    )
    .bind(shop_id)
    .bind(product_ids)
    .bind(category_ids)
    .fetch_one(&mut *conn)
    .await?;

    let mut errors = FieldErrors::new();
    if usize::try_from(products).ok() != Some(product_ids.len()) {
        errors.add("productIds", "must all be products of the same shop");
    }
    if usize::try_from(categories).ok() != Some(category_ids.len()) {
        errors.add("categoryIds", "must all be categories of the same shop");
    }
    errors.into_result().map_err(RepositoryError::Invalid)
}

async fn replace_targets(
    conn: &mut PgConnection,
    coupon: CouponId,
    product_ids: &[ProductId],
    category_ids: &[CategoryId],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM coupon_products WHERE coupon_id = $1")
        .bind(coupon)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM coupon_categories WHERE coupon_id = $1")
        .bind(coupon)
        .execute(&mut *conn)
        .await?;

    if !product_ids.is_empty() {
        sqlx::query(
            "INSERT INTO coupon_products (coupon_id, product_id) SELECT $1, UNNEST($2::int[])",
        )
        .bind(coupon)
        .bind(product_ids)
        .execute(&mut *conn)
        .await?;
    }
    if !category_ids.is_empty() {
        sqlx::query(
            "INSERT INTO coupon_categories (coupon_id, category_id) SELECT $1, UNNEST($2::int[])",
        )
        .bind(coupon)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
