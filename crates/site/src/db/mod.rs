//! Database operations for the shared `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! Both binaries read and write the same schema:
//!
//! ## Tables
//!
//! - `masters` - Barbers offering services
//! - `services` - The service catalog
//! - `master_services` - Which master offers which service
//! - `orders` / `order_services` - Booking requests and their service sets
//! - `reviews` - Customer reviews with moderation status
//! - `staff_users` - Staff accounts for the site and console
//!
//! Session storage lives in the `tower_sessions` schema: `session` for
//! the site, `admin_session` for the console.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p clipjoint-cli -- migrate
//! ```
//!
//! Queries use the runtime sqlx API (`query_as` + `FromRow`) rather than the
//! compile-time macros, so builds never need a live database or offline cache.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod masters;
pub mod orders;
pub mod reviews;
pub mod services;
pub mod staff_users;

pub use masters::MasterRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use services::ServiceRepository;
pub use staff_users::StaffUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
