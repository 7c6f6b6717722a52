//! Properties of the list fetcher against a real database.
//!
//! These tests require a disposable `PostgreSQL` in `TEST_DATABASE_URL`.
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use serde_json::json;

use bazaar_core::table::page_count;
use bazaar_core::{FetchRequest, ProductId, SortSpec};
use bazaar_dashboard::db::{ListContext, ProductRepository};
use bazaar_integration_tests::{seed_shop, test_pool};

const PRODUCTS: i32 = 13;

fn ids(rows: &[bazaar_dashboard::models::Product]) -> Vec<ProductId> {
    rows.iter().map(|p| p.id).collect()
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_rows_never_exceed_page_size() {
    let pool = test_pool().await;
    let shop = seed_shop(&pool, PRODUCTS).await;
    let repo = ProductRepository::new(&pool);

    for page_size in [1, 2, 5, 13, 50] {
        let mut seen = 0;
        let mut page_index = 0;
        loop {
            let request = FetchRequest::default()
                .page(page_index, page_size)
                .filter("shopId", json!(shop.shop_id.as_i32()));
            let page = repo.list(&request, &ListContext::platform()).await.unwrap();

            assert!(page.rows.len() <= page_size as usize);
            assert_eq!(page.total, PRODUCTS as u64);
            assert_eq!(page.page_count, page_count(page.total, page_size));

            if page.rows.is_empty() {
                break;
            }
            seen += page.rows.len();
            page_index += 1;
        }
        assert_eq!(seen, PRODUCTS as usize, "page size {page_size}");
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_filtering_is_idempotent() {
    let pool = test_pool().await;
    let shop = seed_shop(&pool, PRODUCTS).await;
    let repo = ProductRepository::new(&pool);

    let once = FetchRequest::default()
        .filter("shopId", json!(shop.shop_id.as_i32()))
        .filter("isActive", json!("true"));
    let twice = once.clone().filter("isActive", json!(true));

    let first = repo.list(&once, &ListContext::platform()).await.unwrap();
    let second = repo.list(&twice, &ListContext::platform()).await.unwrap();

    assert_eq!(first.total, 10);
    assert_eq!(first.total, second.total);
    assert_eq!(ids(&first.rows), ids(&second.rows));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_opposite_sorts_reverse_rows() {
    let pool = test_pool().await;
    let shop = seed_shop(&pool, PRODUCTS).await;
    let repo = ProductRepository::new(&pool);

    let base = FetchRequest::default()
        .page(0, 100)
        .filter("shopId", json!(shop.shop_id.as_i32()));
    let asc = repo
        .list(&base.clone().sort(SortSpec::asc("price")), &ListContext::platform())
        .await
        .unwrap();
    let desc = repo
        .list(&base.sort(SortSpec::desc("price")), &ListContext::platform())
        .await
        .unwrap();

    let mut reversed = ids(&desc.rows);
    reversed.reverse();
    assert_eq!(ids(&asc.rows), reversed);
    assert!(asc.rows.windows(2).all(|w| w[0].price < w[1].price));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_unknown_fields_are_ignored() {
    let pool = test_pool().await;
    let shop = seed_shop(&pool, PRODUCTS).await;
    let repo = ProductRepository::new(&pool);

    let plain = FetchRequest::default().filter("shopId", json!(shop.shop_id.as_i32()));
    let noisy = plain
        .clone()
        .filter("passwordHash", json!("x"))
        .sort(SortSpec::asc("nonexistent"));

    let expected = repo.list(&plain, &ListContext::platform()).await.unwrap();
    let actual = repo.list(&noisy, &ListContext::platform()).await.unwrap();
    assert_eq!(expected.total, actual.total);
    assert_eq!(ids(&expected.rows), ids(&actual.rows));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_vendor_scope_hides_other_vendors() {
    let pool = test_pool().await;
    let mine = seed_shop(&pool, 3).await;
    let theirs = seed_shop(&pool, 4).await;
    let repo = ProductRepository::new(&pool);

    let request = FetchRequest::default().filter("shopId", json!(theirs.shop_id.as_i32()));
    let page = repo
        .list(&request, &ListContext::vendor(mine.vendor_id))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.rows.is_empty());

    let own = repo
        .list(&FetchRequest::default(), &ListContext::vendor(mine.vendor_id))
        .await
        .unwrap();
    assert_eq!(own.total, 3);
    assert!(own.rows.iter().all(|p| p.shop_id == mine.shop_id));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_storefront_only_sees_active_products() {
    let pool = test_pool().await;
    let shop = seed_shop(&pool, PRODUCTS).await;
    let repo = ProductRepository::new(&pool);

    // Asking for inactive rows does not widen the storefront scope.
    let request = FetchRequest::default()
        .page(0, 100)
        .filter("isActive", json!(false));
    let page = repo
        .list(&request, &ListContext::storefront(shop.shop_id))
        .await
        .unwrap();
    assert!(page.rows.iter().all(|p| p.is_active));

    let all = repo
        .list(&FetchRequest::default().page(0, 100), &ListContext::storefront(shop.shop_id))
        .await
        .unwrap();
    assert_eq!(all.total, 10);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_global_search() {
    let pool = test_pool().await;
    let shop = seed_shop(&pool, PRODUCTS).await;
    let repo = ProductRepository::new(&pool);

    let request = FetchRequest::default()
        .filter("shopId", json!(shop.shop_id.as_i32()))
        .search("  product 1");
    let page = repo.list(&request, &ListContext::platform()).await.unwrap();
    // Product 10 through Product 13
    assert_eq!(page.total, 4);
}
