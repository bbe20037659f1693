//! Order repository.
//!
//! Order writes always touch two tables (`orders` and `order_services`), so
//! create and update run in a transaction; a failed service link never leaves
//! a half-saved order behind.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{MasterId, OrderId, OrderStatus, Phone, ServiceId};

use super::RepositoryError;
use super::services::ServiceRow;
use crate::models::{Order, Service};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_name: String,
    phone: String,
    comment: Option<String>,
    status: String,
    master_id: Option<MasterId>,
    appointment_date: Option<NaiveDate>,
    view_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: self.id,
            customer_name: self.customer_name,
            phone,
            comment: self.comment,
            status,
            master_id: self.master_id,
            appointment_date: self.appointment_date,
            view_count: self.view_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// One row of the staff order list, with joined master and service data.
#[derive(Debug, Clone)]
pub struct OrderListItem {
    /// Database ID.
    pub id: OrderId,
    /// Customer name.
    pub customer_name: String,
    /// Customer phone as stored.
    pub phone: String,
    /// Workflow status.
    pub status: OrderStatus,
    /// Chosen master's name, if any.
    pub master_name: Option<String>,
    /// Requested appointment date, if any.
    pub appointment_date: Option<NaiveDate>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Sum of the order's service prices.
    pub total_price: Decimal,
    /// Comma-joined service names for the table.
    pub service_names: String,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderListRow {
    id: OrderId,
    customer_name: String,
    phone: String,
    status: String,
    master_name: Option<String>,
    appointment_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    total_price: Decimal,
    service_names: String,
}

impl OrderListRow {
    fn into_item(self) -> Result<OrderListItem, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(OrderListItem {
            id: self.id,
            customer_name: self.customer_name,
            phone: self.phone,
            status,
            master_name: self.master_name,
            appointment_date: self.appointment_date,
            created_at: self.created_at,
            total_price: self.total_price,
            service_names: self.service_names,
        })
    }
}

/// Fields written on order create and update.
///
/// Validation happens before this struct is built; see
/// [`crate::services::booking`].
#[derive(Debug, Clone)]
pub struct OrderInput {
    /// Customer name.
    pub customer_name: String,
    /// Customer phone.
    pub phone: Phone,
    /// Free-form note.
    pub comment: Option<String>,
    /// Chosen master, if any.
    pub master_id: Option<MasterId>,
    /// Requested appointment date, if any.
    pub appointment_date: Option<NaiveDate>,
    /// Services to attach; replaces the existing set on update.
    pub service_ids: Vec<ServiceId>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its service links in one transaction.
    ///
    /// The status starts as `new` via the column default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    #[instrument(skip(self, input), fields(services = input.service_ids.len()))]
    pub async fn create(&self, input: &OrderInput) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO shop.orders (customer_name, phone, comment, master_id, appointment_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, customer_name, phone, comment, status, master_id,
                      appointment_date, view_count, created_at, updated_at
            ",
        )
        .bind(&input.customer_name)
        .bind(&input.phone)
        .bind(&input.comment)
        .bind(input.master_id)
        .bind(input.appointment_date)
        .fetch_one(&mut *tx)
        .await?;

        link_services(&mut tx, row.id, &input.service_ids).await?;

        tx.commit().await?;
        row.into_order()
    }

    /// Rewrite an order and replace its service set in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID, or
    /// `RepositoryError::Database` if any statement fails.
    #[instrument(skip(self, input), fields(services = input.service_ids.len()))]
    pub async fn update(
        &self,
        id: OrderId,
        input: &OrderInput,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(
            r"
            UPDATE shop.orders
            SET customer_name = $2, phone = $3, comment = $4, status = $5,
                master_id = $6, appointment_date = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, customer_name, phone, comment, status, master_id,
                      appointment_date, view_count, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&input.customer_name)
        .bind(&input.phone)
        .bind(&input.comment)
        .bind(status.as_str())
        .bind(input.master_id)
        .bind(input.appointment_date)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM shop.order_services WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_services(&mut tx, id, &input.service_ids).await?;

        tx.commit().await?;
        row.into_order()
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on invalid stored data.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, customer_name, phone, comment, status, master_id,
                   appointment_date, view_count, created_at, updated_at
            FROM shop.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// All orders, newest first, with master names and service totals joined in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an invalid stored status.
    #[instrument(skip(self))]
    pub async fn list_recent(&self) -> Result<Vec<OrderListItem>, RepositoryError> {
        let rows: Vec<OrderListRow> = sqlx::query_as(
            r"
            SELECT o.id, o.customer_name, o.phone, o.status,
                   m.name AS master_name,
                   o.appointment_date, o.created_at,
                   COALESCE(SUM(s.price), 0) AS total_price,
                   COALESCE(STRING_AGG(s.name, ', ' ORDER BY s.name), '') AS service_names
            FROM shop.orders o
            LEFT JOIN shop.masters m ON m.id = o.master_id
            LEFT JOIN shop.order_services os ON os.order_id = o.id
            LEFT JOIN shop.services s ON s.id = os.service_id
            GROUP BY o.id, m.name
            ORDER BY o.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderListRow::into_item).collect()
    }

    /// The services attached to an order, in name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn services_for(&self, id: OrderId) -> Result<Vec<Service>, RepositoryError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(
            r"
            SELECT s.id, s.name, s.description, s.price, s.duration_minutes, s.is_popular
            FROM shop.services s
            JOIN shop.order_services os ON os.service_id = s.id
            WHERE os.order_id = $1
            ORDER BY s.name
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Atomically bump the view counter and return the new value.
    ///
    /// A single `UPDATE ... RETURNING` so concurrent first views from
    /// different sessions never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID, or
    /// `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn increment_view_count(&self, id: OrderId) -> Result<i32, RepositoryError> {
        let count: Option<i32> = sqlx::query_scalar(
            "UPDATE shop.orders SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        count.ok_or(RepositoryError::NotFound)
    }
}

/// Attach a service set to an order inside an open transaction.
async fn link_services(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: OrderId,
    service_ids: &[ServiceId],
) -> Result<(), RepositoryError> {
    if service_ids.is_empty() {
        return Ok(());
    }
    let raw: Vec<i32> = service_ids.iter().map(|id| id.as_i32()).collect();

    sqlx::query(
        r"
        INSERT INTO shop.order_services (order_id, service_id)
        SELECT $1, UNNEST($2::int4[])
        ",
    )
    .bind(order_id)
    .bind(&raw)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
