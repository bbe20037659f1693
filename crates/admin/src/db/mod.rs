//! Database operations for the console.
//!
//! The console reads and writes the same `shop` schema the site uses;
//! the repositories here add what staff-facing tables need on top of the
//! site's queries: dynamic filters, pagination, and bulk updates.
//!
//! # Migrations
//!
//! Migrations live in `crates/site/migrations/` and are run via:
//! ```bash
//! cargo run -p clipjoint-cli -- migrate
//! ```

pub mod masters;
pub mod orders;
pub mod reviews;
pub mod services;
pub mod staff_users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use masters::MasterAdminRepository;
pub use orders::OrderAdminRepository;
pub use reviews::ReviewAdminRepository;
pub use services::ServiceAdminRepository;
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
