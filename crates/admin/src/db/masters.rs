//! Master queries for the console.
//!
//! Unlike the public site, the console sees inactive masters too and
//! manages the offered-services links alongside the master row.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use clipjoint_core::{MasterId, Phone, ServiceId};

use super::RepositoryError;
use super::services::{Service, ServiceRow};

/// A master as shown and edited in the console.
#[derive(Debug, Clone)]
pub struct Master {
    /// Database ID.
    pub id: MasterId,
    /// Display name.
    pub name: String,
    /// Work phone.
    pub phone: Phone,
    /// Years on the job.
    pub experience_years: i32,
    /// Inactive masters are hidden from the public site.
    pub is_active: bool,
}

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

/// New or updated master fields, including the offered-services set.
#[derive(Debug, Clone)]
pub struct MasterInput {
    /// Display name.
    pub name: String,
    /// Work phone.
    pub phone: Phone,
    /// Years on the job.
    pub experience_years: i32,
    /// Whether the master appears on the public site.
    pub is_active: bool,
    /// Services this master offers; replaces the existing set.
    pub service_ids: Vec<ServiceId>,
}

/// Repository for console master operations.
pub struct MasterAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MasterAdminRepository<'a> {
    /// Create a new master repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every master, active first, then most experienced first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored phone is invalid.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Master>, RepositoryError> {
        let rows: Vec<MasterRow> = sqlx::query_as(
            r"
            SELECT id, name, phone, experience_years, is_active
            FROM shop.masters
            ORDER BY is_active DESC, experience_years DESC, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MasterRow::into_master).collect()
    }

    /// Masters currently visible on the public site (dashboard counter).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM shop.masters WHERE is_active")
                .fetch_one(self.pool)
                .await?;
        Ok(count)
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

    /// Just the offered-service IDs, for pre-ticking the edit form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn service_ids_of(&self, id: MasterId) -> Result<Vec<ServiceId>, RepositoryError> {
        let ids: Vec<ServiceId> = sqlx::query_scalar(
            "SELECT service_id FROM shop.master_services WHERE master_id = $1 ORDER BY service_id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Create a master and link the offered services in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing
    /// is committed in that case.
    #[instrument(skip(self, input), fields(name = %input.name, services = input.service_ids.len()))]
    pub async fn create(&self, input: &MasterInput) -> Result<Master, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: MasterRow = sqlx::query_as(
            r"
            INSERT INTO shop.masters (name, phone, experience_years, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, experience_years, is_active
            ",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(input.experience_years)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await?;

        link_services(&mut tx, row.id, &input.service_ids).await?;

        tx.commit().await?;
        row.into_master()
    }

    /// Rewrite a master and replace the offered-services set in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no master has this ID, or
    /// `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    #[instrument(skip(self, input), fields(name = %input.name, services = input.service_ids.len()))]
    pub async fn update(
        &self,
        id: MasterId,
        input: &MasterInput,
    ) -> Result<Master, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<MasterRow> = sqlx::query_as(
            r"
            UPDATE shop.masters
            SET name = $2, phone = $3, experience_years = $4, is_active = $5
            WHERE id = $1
            RETURNING id, name, phone, experience_years, is_active
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(input.experience_years)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM shop.master_services WHERE master_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_services(&mut tx, id, &input.service_ids).await?;

        tx.commit().await?;
        row.into_master()
    }

    /// Delete a master.
    ///
    /// Reviews cascade away with the master; orders keep their row but
    /// lose the master reference (SET NULL).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no master has this ID, or
    /// `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: MasterId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.masters WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Insert offered-services links for a master inside a transaction.
async fn link_services(
    tx: &mut Transaction<'_, Postgres>,
    master_id: MasterId,
    service_ids: &[ServiceId],
) -> Result<(), RepositoryError> {
    if service_ids.is_empty() {
        return Ok(());
    }
    let raw: Vec<i32> = service_ids.iter().map(|id| id.as_i32()).collect();

    sqlx::query(
        r"
        INSERT INTO shop.master_services (master_id, service_id)
        SELECT $1, UNNEST($2::int4[])
        ",
    )
    .bind(master_id)
    .bind(&raw)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
