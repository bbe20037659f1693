//! Staff account lookups for console login.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{Email, StaffRole, StaffUserId};

use super::RepositoryError;

/// A staff account.
///
/// Not serializable: sessions store [`crate::models::CurrentStaff`] instead,
/// so the password hash never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct StaffUser {
    /// Database ID.
    pub id: StaffUserId,
    /// Sign-in email, unique.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Argon2id PHC hash.
    pub password_hash: String,
    /// Permission level.
    pub role: StaffRole,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct StaffUserRow {
    id: StaffUserId,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StaffUserRow {
    fn into_user(self) -> Result<StaffUser, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse::<StaffRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid staff role in database: {e}"))
        })?;

        Ok(StaffUser {
            id: self.id,
            email,
            name: self.name,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for staff account lookups.
pub struct StaffUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StaffUserRepository<'a> {
    /// Create a new staff user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a staff account by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on invalid stored data.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<StaffUser>, RepositoryError> {
        let row: Option<StaffUserRow> = sqlx::query_as(
            r"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM shop.staff_users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(StaffUserRow::into_user).transpose()
    }
}
