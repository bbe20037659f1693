//! Integration tests for the staff console.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data
//! - The console server running (cargo run -p clipjoint-admin)
//! - The test staff account (see crate docs)
//!
//! Run with: cargo test -p clipjoint-integration-tests -- --ignored

use reqwest::StatusCode;

use clipjoint_core::OrderStatus;
use clipjoint_integration_tests::{admin_url, client, login_staff, pool, unique_suffix};

/// Insert a bare order and return its id.
async fn insert_order(pool: &sqlx::PgPool, customer: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO shop.orders (customer_name, phone, status) \
         VALUES ($1, '+7 999 000-00-00', 'new') RETURNING id",
    )
    .bind(customer)
    .fetch_one(pool)
    .await
    .expect("insert test order")
}

async fn order_status(pool: &sqlx::PgPool, id: i32) -> String {
    sqlx::query_scalar("SELECT status FROM shop.orders WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("order should exist")
}

#[tokio::test]
#[ignore = "Requires running console server and seeded database"]
async fn test_console_requires_login() {
    let client = client();
    let resp = client
        .get(format!("{}/orders", admin_url()))
        .send()
        .await
        .expect("Failed to reach console");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        location.starts_with("/auth/login?next="),
        "expected a login redirect carrying the original path, got {location}"
    );
}

#[tokio::test]
#[ignore = "Requires running console server, seeded database, and test staff account"]
async fn test_login_and_dashboard() {
    let client = client();
    login_staff(&client, &admin_url()).await;

    let resp = client
        .get(format!("{}/", admin_url()))
        .send()
        .await
        .expect("Failed to open dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Dashboard"));
    assert!(body.contains("Pending reviews"));
}

#[tokio::test]
#[ignore = "Requires running console server, seeded database, and test staff account"]
async fn test_bulk_status_touches_exactly_the_selected_orders() {
    let client = client();
    let pool = pool().await;
    login_staff(&client, &admin_url()).await;

    let suffix = unique_suffix();
    let first = insert_order(&pool, &format!("Bulk A {suffix}")).await;
    let second = insert_order(&pool, &format!("Bulk B {suffix}")).await;
    let bystander = insert_order(&pool, &format!("Bulk C {suffix}")).await;

    let ids = format!("{first},{second}");
    let resp = client
        .post(format!("{}/orders/bulk/status", admin_url()))
        .form(&[
            ("ids", ids.as_str()),
            ("status", OrderStatus::Confirmed.as_str()),
        ])
        .send()
        .await
        .expect("Failed to post bulk action");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    assert_eq!(order_status(&pool, first).await, "confirmed");
    assert_eq!(order_status(&pool, second).await, "confirmed");
    assert_eq!(
        order_status(&pool, bystander).await,
        "new",
        "unselected orders must not change"
    );

    sqlx::query("DELETE FROM shop.orders WHERE id = ANY($1)")
        .bind(vec![first, second, bystander])
        .execute(&pool)
        .await
        .expect("cleanup");
}

#[tokio::test]
#[ignore = "Requires running console server, seeded database, and test staff account"]
async fn test_edit_rejects_services_outside_the_masters_list() {
    let client = client();
    let pool = pool().await;
    login_staff(&client, &admin_url()).await;

    // A master plus one service they offer and one they do not.
    let (master_id, offered): (i32, i32) = sqlx::query_as(
        "SELECT master_id, service_id FROM shop.master_services LIMIT 1",
    )
    .fetch_one(&pool)
    .await
    .expect("seeded link");
    let outside: Option<(i32, String)> = sqlx::query_as(
        "SELECT s.id, s.name FROM shop.services s \
         WHERE NOT EXISTS (SELECT 1 FROM shop.master_services ms \
                           WHERE ms.master_id = $1 AND ms.service_id = s.id) \
         LIMIT 1",
    )
    .bind(master_id)
    .fetch_optional(&pool)
    .await
    .expect("lookup");
    let Some((outside_id, outside_name)) = outside else {
        // Every master offers everything; nothing to assert against.
        return;
    };

    let order_id = insert_order(&pool, &format!("Edit Guard {}", unique_suffix())).await;

    let resp = client
        .post(format!("{}/orders/{order_id}/edit", admin_url()))
        .form(&[
            ("customer_name", "Edit Guard"),
            ("phone", "+7 999 000-00-00"),
            ("comment", ""),
            ("master_id", &master_id.to_string()),
            ("appointment_date", ""),
            ("status", "confirmed"),
            ("service_ids", &format!("{offered},{outside_id}")),
        ])
        .send()
        .await
        .expect("Failed to post edit");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.expect("body");
    assert!(body.contains("does not offer"));
    assert!(body.contains(&outside_name));

    // The order itself is untouched.
    assert_eq!(order_status(&pool, order_id).await, "new");

    sqlx::query("DELETE FROM shop.orders WHERE id = $1")
        .bind(order_id)
        .execute(&pool)
        .await
        .expect("cleanup");
}
