//! Master repository.

use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{MasterId, Phone};

use super::RepositoryError;
use super::services::ServiceRow;
use crate::models::{Master, Service};

#[derive(Debug, sqlx::FromRow)]
struct MasterRow {
    id: MasterId,
    name: String,
    phone: String,
    experience_years: i32,
    is_active: bool,
}

impl MasterRow {
    fn into_master(self) -> Result<Master, RepositoryError> {
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Master {
            id: self.id,
            name: self.name,
            phone,
            experience_years: self.experience_years,
            is_active: self.is_active,
        })
    }
}

/// Repository for master database operations.
pub struct MasterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MasterRepository<'a> {
    /// Create a new master repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All active masters, most experienced first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored phone is invalid.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Master>, RepositoryError> {
        let rows: Vec<MasterRow> = sqlx::query_as(
            r"
            SELECT id, name, phone, experience_years, is_active
            FROM shop.masters
            WHERE is_active
            ORDER BY experience_years DESC, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MasterRow::into_master).collect()
    }

    /// Get a master by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored phone is invalid.
    #[instrument(skip(self))]
    pub async fn get(&self, id: MasterId) -> Result<Option<Master>, RepositoryError> {
        let row: Option<MasterRow> = sqlx::query_as(
            r"
            SELECT id, name, phone, experience_years, is_active
            FROM shop.masters
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(MasterRow::into_master).transpose()
    }

    /// The services a master offers, in name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn services_of(&self, id: MasterId) -> Result<Vec<Service>, RepositoryError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(
            r"
            SELECT s.id, s.name, s.description, s.price, s.duration_minutes, s.is_popular
            FROM shop.services s
            JOIN shop.master_services ms ON ms.service_id = s.id
            WHERE ms.master_id = $1
            ORDER BY s.name
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Service::from).collect())
    }
}
