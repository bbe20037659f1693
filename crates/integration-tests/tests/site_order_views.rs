//! Integration test for the order page view counter.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data
//! - The site server running (cargo run -p clipjoint-site)
//! - The test staff account (see crate docs)
//!
//! Run with: cargo test -p clipjoint-integration-tests -- --ignored

use clipjoint_integration_tests::{client, login_staff, pool, site_url};

async fn view_count(pool: &sqlx::PgPool, order_id: i32) -> i32 {
    sqlx::query_scalar("SELECT view_count FROM shop.orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .expect("order should exist")
}

#[tokio::test]
#[ignore = "Requires running site server, seeded database, and test staff account"]
async fn test_view_count_increments_once_per_session() {
    let pool = pool().await;
    let order_id: i32 = sqlx::query_scalar("SELECT id FROM shop.orders ORDER BY id LIMIT 1")
        .fetch_one(&pool)
        .await
        .expect("seed data should contain orders");
    let before = view_count(&pool, order_id).await;

    // First session: two views, one count.
    let first = client();
    login_staff(&first, &site_url()).await;
    for _ in 0..2 {
        let resp = first
            .get(format!("{}/orders/{order_id}", site_url()))
            .send()
            .await
            .expect("Failed to open order page");
        assert!(resp.status().is_success());
    }
    assert_eq!(view_count(&pool, order_id).await, before + 1);

    // A fresh session counts once more.
    let second = client();
    login_staff(&second, &site_url()).await;
    let resp = second
        .get(format!("{}/orders/{order_id}", site_url()))
        .send()
        .await
        .expect("Failed to open order page");
    assert!(resp.status().is_success());
    assert_eq!(view_count(&pool, order_id).await, before + 2);
}
