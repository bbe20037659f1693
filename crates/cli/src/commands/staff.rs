//! Staff account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff account
//! cj-cli staff create -e boss@clipjoint.example -n "Pat the Boss" -p "long password" -r admin
//!
//! # List staff accounts
//! cj-cli staff list
//!
//! # Change a staff account's role
//! cj-cli staff set-role -e boss@clipjoint.example -r manager
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use clipjoint_core::{Email, EmailError, StaffRole};
use clipjoint_site::services::auth::{self, AuthError};

/// Errors that can occur during staff account operations.
#[derive(Debug, Error)]
pub enum StaffError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, manager, viewer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password validation or hashing failed.
    #[error("Password error: {0}")]
    Password(#[from] AuthError),

    /// Account already exists.
    #[error("Staff account already exists with email: {0}")]
    UserExists(String),

    /// No account with that email.
    #[error("No staff account with email: {0}")]
    UserNotFound(String),
}

/// Create a new staff account.
///
/// # Errors
///
/// Returns [`StaffError`] if the role or email is invalid, the password
/// is too weak, or an account with that email already exists.
pub async fn create(email: &str, name: &str, password: &str, role: &str) -> Result<i32, StaffError> {
    dotenvy::dotenv().ok();

    let role: StaffRole = role
        .parse()
        .map_err(|_| StaffError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;

    auth::validate_password(password)?;
    let password_hash = auth::hash_password(password)?;

    let pool = connect().await?;

    tracing::info!("Creating staff account: {} ({})", email, role);

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM shop.staff_users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(StaffError::UserExists(email.as_str().to_owned()));
    }

    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO shop.staff_users (email, name, role, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        ",
    )
    .bind(email.as_str())
    .bind(name)
    .bind(role.as_str())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Staff account created! ID: {}, Email: {}, Role: {}",
        user_id,
        email,
        role
    );

    Ok(user_id)
}

/// List all staff accounts.
///
/// # Errors
///
/// Returns [`StaffError`] if the database is unreachable.
pub async fn list() -> Result<(), StaffError> {
    dotenvy::dotenv().ok();

    let pool = connect().await?;

    let rows: Vec<(i32, String, String, String)> = sqlx::query_as(
        "SELECT id, email, name, role FROM shop.staff_users ORDER BY email",
    )
    .fetch_all(&pool)
    .await?;

    #[allow(clippy::print_stdout)]
    {
        if rows.is_empty() {
            println!("No staff accounts. Create one with: cj-cli staff create");
        }
        for (id, email, name, role) in rows {
            println!("{id:>4}  {role:<8}  {email}  ({name})");
        }
    }

    Ok(())
}

/// Change an existing account's role.
///
/// # Errors
///
/// Returns [`StaffError`] if the role or email is invalid or no account
/// with that email exists.
pub async fn set_role(email: &str, role: &str) -> Result<(), StaffError> {
    dotenvy::dotenv().ok();

    let role: StaffRole = role
        .parse()
        .map_err(|_| StaffError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;

    let pool = connect().await?;

    let result = sqlx::query(
        "UPDATE shop.staff_users SET role = $2, updated_at = NOW() WHERE email = $1",
    )
    .bind(email.as_str())
    .bind(role.as_str())
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StaffError::UserNotFound(email.as_str().to_owned()));
    }

    tracing::info!("Role updated: {} is now {}", email, role);
    Ok(())
}

/// Connect to the database named by `DATABASE_URL`.
async fn connect() -> Result<PgPool, StaffError> {
    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| StaffError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
