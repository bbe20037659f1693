//! Staff account repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{Email, StaffRole, StaffUserId};

use super::RepositoryError;
use crate::models::StaffUser;

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
    fn into_staff_user(self) -> Result<StaffUser, RepositoryError> {
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

    /// Get a staff user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on invalid stored data.
    #[instrument(skip(self, email))]
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

        row.map(StaffUserRow::into_staff_user).transpose()
    }

    /// Get a staff user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on invalid stored data.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: StaffUserId) -> Result<Option<StaffUser>, RepositoryError> {
        let row: Option<StaffUserRow> = sqlx::query_as(
            r"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM shop.staff_users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(StaffUserRow::into_staff_user).transpose()
    }
}
