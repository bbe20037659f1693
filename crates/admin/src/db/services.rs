//! Service catalog queries for the console.
//!
//! The console owns the catalog, so this repository carries the full
//! CRUD surface. Row counts feed the dashboard.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::ServiceId;

use super::RepositoryError;

/// A service as shown and edited in the console.
#[derive(Debug, Clone)]
pub struct Service {
    /// Database ID.
    pub id: ServiceId,
    /// Display name.
    pub name: String,
    /// Longer description for the catalog page.
    pub description: Option<String>,
    /// Price with two decimal places.
    pub price: Decimal,
    /// Appointment length in minutes.
    pub duration_minutes: i32,
    /// Popular services are listed first on the landing page.
    pub is_popular: bool,
}

/// Row shape shared with the order repository's service lookups.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ServiceRow {
    pub id: ServiceId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_popular: bool,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            duration_minutes: row.duration_minutes,
            is_popular: row.is_popular,
        }
    }
}

/// New or updated service fields.
#[derive(Debug, Clone)]
pub struct ServiceInput {
    /// Display name.
    pub name: String,
    /// Longer description for the catalog page.
    pub description: Option<String>,
    /// Price with two decimal places.
    pub price: Decimal,
    /// Appointment length in minutes.
    pub duration_minutes: i32,
    /// Popular services are listed first on the landing page.
    pub is_popular: bool,
}

/// Repository for console service operations.
pub struct ServiceAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceAdminRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All services, popular first, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, duration_minutes, is_popular
            FROM shop.services
            ORDER BY is_popular DESC, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Total services in the catalog (dashboard counter).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM shop.services")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Get a service by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row: Option<ServiceRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, duration_minutes, is_popular
            FROM shop.services
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Service::from))
    }

    /// Fetch the services matching a set of IDs, in name order.
    ///
    /// IDs with no matching row are silently absent from the result; callers
    /// that care compare lengths.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn list_by_ids(&self, ids: &[ServiceId]) -> Result<Vec<Service>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let rows: Vec<ServiceRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, duration_minutes, is_popular
            FROM shop.services
            WHERE id = ANY($1)
            ORDER BY name
            ",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Create a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ServiceInput) -> Result<Service, RepositoryError> {
        let row: ServiceRow = sqlx::query_as(
            r"
            INSERT INTO shop.services (name, description, price, duration_minutes, is_popular)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, duration_minutes, is_popular
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration_minutes)
        .bind(input.is_popular)
        .fetch_one(self.pool)
        .await?;

        Ok(Service::from(row))
    }

    /// Update a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no service has this ID, or
    /// `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(
        &self,
        id: ServiceId,
        input: &ServiceInput,
    ) -> Result<Service, RepositoryError> {
        let row: Option<ServiceRow> = sqlx::query_as(
            r"
            UPDATE shop.services
            SET name = $2, description = $3, price = $4, duration_minutes = $5, is_popular = $6
            WHERE id = $1
            RETURNING id, name, description, price, duration_minutes, is_popular
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration_minutes)
        .bind(input.is_popular)
        .fetch_optional(self.pool)
        .await?;

        row.map(Service::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a service.
    ///
    /// Links from past orders and masters go with it (cascade), so retired
    /// services disappear from order detail pages too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no service has this ID, or
    /// `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
