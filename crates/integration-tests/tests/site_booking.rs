//! Integration tests for the public booking flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data
//! - The site server running (cargo run -p clipjoint-site)
//!
//! Run with: cargo test -p clipjoint-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use clipjoint_integration_tests::{client, pool, site_url, unique_phone, unique_suffix};

/// Find a (master, offered service) pair straight from the link table.
async fn offered_pair(pool: &sqlx::PgPool) -> (i32, i32) {
    sqlx::query_as::<_, (i32, i32)>(
        "SELECT master_id, service_id FROM shop.master_services LIMIT 1",
    )
    .fetch_one(pool)
    .await
    .expect("seed data should contain at least one master-service link")
}

#[tokio::test]
#[ignore = "Requires running site server and seeded database"]
async fn test_site_health() {
    let client = client();
    let resp = client
        .get(format!("{}/health", site_url()))
        .send()
        .await
        .expect("Failed to reach site");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running site server and seeded database"]
async fn test_booking_round_trip() {
    let client = client();
    let pool = pool().await;
    let (master_id, service_id) = offered_pair(&pool).await;

    let customer = format!("Booking Test {}", unique_suffix());
    let resp = client
        .post(format!("{}/orders/create", site_url()))
        .form(&[
            ("customer_name", customer.as_str()),
            ("phone", &unique_phone()),
            ("master_id", &master_id.to_string()),
            ("service_ids", &service_id.to_string()),
            ("appointment_date", ""),
            ("comment", "integration test booking"),
        ])
        .send()
        .await
        .expect("Failed to submit order");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/thanks?from=order");

    let (order_id, status): (i32, String) = sqlx::query_as(
        "SELECT id, status FROM shop.orders WHERE customer_name = $1",
    )
    .bind(&customer)
    .fetch_one(&pool)
    .await
    .expect("submitted order should be stored");
    assert_eq!(status, "new");

    let linked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shop.order_services WHERE order_id = $1 AND service_id = $2",
    )
    .bind(order_id)
    .bind(service_id)
    .fetch_one(&pool)
    .await
    .expect("link lookup");
    assert_eq!(linked, 1);

    sqlx::query("DELETE FROM shop.orders WHERE id = $1")
        .bind(order_id)
        .execute(&pool)
        .await
        .expect("cleanup");
}

#[tokio::test]
#[ignore = "Requires running site server and seeded database"]
async fn test_booking_reports_every_service_the_master_does_not_offer() {
    let client = client();
    let pool = pool().await;
    let (master_id, _) = offered_pair(&pool).await;

    // Two throwaway services nobody offers; both must be named in the error.
    let suffix = unique_suffix();
    let name_a = format!("Offender A {suffix}");
    let name_b = format!("Offender B {suffix}");
    let mut ids = Vec::new();
    for name in [&name_a, &name_b] {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO shop.services (name, price, duration_minutes) \
             VALUES ($1, 100.00, 30) RETURNING id",
        )
        .bind(name)
        .fetch_one(&pool)
        .await
        .expect("insert throwaway service");
        ids.push(id);
    }

    let customer = format!("Offender Test {suffix}");
    let service_ids = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let resp = client
        .post(format!("{}/orders/create", site_url()))
        .form(&[
            ("customer_name", customer.as_str()),
            ("phone", &unique_phone()),
            ("master_id", &master_id.to_string()),
            ("service_ids", &service_ids),
            ("appointment_date", ""),
            ("comment", ""),
        ])
        .send()
        .await
        .expect("Failed to submit order");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.expect("body");
    assert!(body.contains("does not offer"), "error should name the rule");
    assert!(body.contains(&name_a), "first offender must be listed");
    assert!(body.contains(&name_b), "second offender must be listed too");

    let saved: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.orders WHERE customer_name = $1")
        .bind(&customer)
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(saved, 0, "a rejected form must not save anything");

    sqlx::query("DELETE FROM shop.services WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&pool)
        .await
        .expect("cleanup");
}

#[tokio::test]
#[ignore = "Requires running site server and seeded database"]
async fn test_master_services_endpoint() {
    let client = client();
    let pool = pool().await;
    let (master_id, service_id) = offered_pair(&pool).await;

    let resp = client
        .get(format!("{}/api/masters/{master_id}/services", site_url()))
        .send()
        .await
        .expect("Failed to call API");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("valid JSON");
    let services = body
        .get("services")
        .and_then(Value::as_array)
        .expect("services array");
    assert!(
        services
            .iter()
            .any(|s| s.get("id").and_then(Value::as_i64) == Some(i64::from(service_id))),
        "offered service should appear in the payload"
    );

    // Unknown master: JSON 404, not an HTML page.
    let resp = client
        .get(format!("{}/api/masters/999999/services", site_url()))
        .send()
        .await
        .expect("Failed to call API");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("valid JSON");
    assert!(body.get("error").is_some());
}
