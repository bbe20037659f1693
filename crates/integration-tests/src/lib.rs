//! Shared helpers for the ClipJoint integration tests.
//!
//! The tests in `tests/` drive the real binaries over HTTP and check the
//! results in the database, so they are `#[ignore]`d by default. They
//! expect:
//!
//! - A migrated, seeded database: `cj-cli migrate && cj-cli seed`
//! - The site running: `cargo run -p clipjoint-site`
//! - The console running: `cargo run -p clipjoint-admin`
//! - A staff account matching `TEST_STAFF_EMAIL` / `TEST_STAFF_PASSWORD`:
//!   `cj-cli staff create -e staff@test.local -n "Test Staff" -p integration-pass-1 -r admin`
//!
//! Review-moderation tests additionally expect `MODERATION_API_KEY` to be
//! unset for the site process, so the classifier never runs.
//!
//! Run with: `cargo test -p clipjoint-integration-tests -- --ignored`

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Base URL of the public site.
#[must_use]
pub fn site_url() -> String {
    std::env::var("SITE_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the staff console.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_TEST_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Staff login email used by console and staff-page tests.
#[must_use]
pub fn staff_email() -> String {
    std::env::var("TEST_STAFF_EMAIL").unwrap_or_else(|_| "staff@test.local".to_string())
}

/// Staff login password used by console and staff-page tests.
#[must_use]
pub fn staff_password() -> String {
    std::env::var("TEST_STAFF_PASSWORD").unwrap_or_else(|_| "integration-pass-1".to_string())
}

/// A cookie-keeping client that does NOT follow redirects.
///
/// Tests assert on `Location` headers, so automatic redirect following
/// would hide exactly what we want to see.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the database the servers are using.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or unreachable; the test setup is
/// broken at that point, not the behavior under test.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .expect("DATABASE_URL must be set for integration tests");
    PgPool::connect(url.expose_secret())
        .await
        .expect("Failed to connect to the test database")
}

/// Sign the client's session in as the test staff account.
///
/// Works against either binary; pass [`site_url`] or [`admin_url`].
///
/// # Panics
///
/// Panics if the login request fails or is rejected, since every caller
/// needs the signed-in session to test anything else.
pub async fn login_staff(client: &Client, base_url: &str) {
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[
            ("email", staff_email()),
            ("password", staff_password()),
            ("next", "/".to_string()),
        ])
        .send()
        .await
        .expect("Failed to send login request");

    assert!(
        resp.status().is_redirection(),
        "staff login rejected (status {}); create the account with cj-cli staff create",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        !location.contains("error="),
        "staff login rejected: redirected to {location}"
    );
}

/// A short unique suffix for names created by a test run.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect()
}

/// A unique, structurally valid phone number.
#[must_use]
pub fn unique_phone() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("+7 999 {:03}-{:02}-{:02}", nanos % 1000, (nanos / 1000) % 100, (nanos / 100_000) % 100)
}
