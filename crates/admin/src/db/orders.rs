//! Order queries for the console.
//!
//! The order table is the busiest console page, so listing supports the
//! full filter set (status, master, text search, submission date range,
//! price bucket) with offset pagination. Status changes come in three
//! shapes: full edit, single-row, and bulk over a selected id set.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{MasterId, OrderId, OrderStatus, Phone, ServiceId};

use super::RepositoryError;
use super::services::{Service, ServiceRow};

/// Rows per console list page.
pub const PAGE_SIZE: i64 = 20;

/// An order as the console sees it.
#[derive(Debug, Clone)]
pub struct Order {
    /// Database ID.
    pub id: OrderId,
    /// Customer name.
    pub customer_name: String,
    /// Customer phone.
    pub phone: Phone,
    /// Free-form note from the customer.
    pub comment: Option<String>,
    /// Workflow status.
    pub status: OrderStatus,
    /// Chosen master, if any.
    pub master_id: Option<MasterId>,
    /// Requested appointment date, if any.
    pub appointment_date: Option<NaiveDate>,
    /// Detail page views.
    pub view_count: i32,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

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

/// One row of the console order table, with joined master and service data.
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

/// Fields written on a console order edit.
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
    /// Services to attach; replaces the existing set.
    pub service_ids: Vec<ServiceId>,
}

/// Order total buckets for the console price filter.
///
/// The buckets partition at their lower edge: a total of exactly 500
/// lands in [`Self::From500`], not [`Self::Under500`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    /// Total under 500.
    Under500,
    /// Total from 500 up to but not including 1000.
    From500,
    /// Total from 1000 up to but not including 2000.
    From1000,
    /// Total of 2000 or more.
    From2000,
}

impl PriceBucket {
    /// Every bucket, in price order, for the filter dropdown.
    pub const ALL: [Self; 4] = [Self::Under500, Self::From500, Self::From1000, Self::From2000];

    /// Parse a query-string value.
    #[must_use]
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "under500" => Some(Self::Under500),
            "500to999" => Some(Self::From500),
            "1000to1999" => Some(Self::From1000),
            "2000up" => Some(Self::From2000),
            _ => None,
        }
    }

    /// Query-string value for links and the dropdown.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Under500 => "under500",
            Self::From500 => "500to999",
            Self::From1000 => "1000to1999",
            Self::From2000 => "2000up",
        }
    }

    /// Human label for the filter dropdown.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Under500 => "Under 500 ₽",
            Self::From500 => "500 to 999.99 ₽",
            Self::From1000 => "1000 to 1999.99 ₽",
            Self::From2000 => "2000 ₽ and up",
        }
    }

    /// HAVING clause over the aggregated service total.
    ///
    /// The boundaries are fixed constants, so no bind parameters are
    /// involved.
    const fn having_sql(self) -> &'static str {
        match self {
            Self::Under500 => "HAVING COALESCE(SUM(s.price), 0) < 500",
            Self::From500 => {
                "HAVING COALESCE(SUM(s.price), 0) >= 500 AND COALESCE(SUM(s.price), 0) < 1000"
            }
            Self::From1000 => {
                "HAVING COALESCE(SUM(s.price), 0) >= 1000 AND COALESCE(SUM(s.price), 0) < 2000"
            }
            Self::From2000 => "HAVING COALESCE(SUM(s.price), 0) >= 2000",
        }
    }

    /// Whether a computed order total belongs to this bucket.
    #[must_use]
    pub fn contains(self, total: Decimal) -> bool {
        let five_hundred = Decimal::from(500);
        let one_thousand = Decimal::from(1000);
        let two_thousand = Decimal::from(2000);
        match self {
            Self::Under500 => total < five_hundred,
            Self::From500 => total >= five_hundred && total < one_thousand,
            Self::From1000 => total >= one_thousand && total < two_thousand,
            Self::From2000 => total >= two_thousand,
        }
    }
}

/// Console order list filter. Empty fields mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to one workflow status.
    pub status: Option<OrderStatus>,
    /// Restrict to one master.
    pub master_id: Option<MasterId>,
    /// Case-insensitive substring over name, phone, and comment.
    pub search: Option<String>,
    /// Earliest submission date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest submission date, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Restrict to one service-total bucket.
    pub price_bucket: Option<PriceBucket>,
}

/// One page of filtered orders plus the total match count.
#[derive(Debug)]
pub struct OrderPage {
    /// The rows on this page.
    pub items: Vec<OrderListItem>,
    /// Total rows matching the filter across all pages.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Total number of pages (at least 1).
    pub pages: i64,
}

/// Dynamically bound filter value.
enum BindValue {
    Text(String),
    Int(i32),
    Date(NaiveDate),
}

/// Build the WHERE clause and bind list for an order filter.
///
/// Returns the clause (empty string when unfiltered), the values to bind
/// in order, and the next free parameter index.
fn build_order_filter(filter: &OrderFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    if let Some(status) = filter.status {
        conditions.push(format!("o.status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.as_str().to_owned()));
    }

    if let Some(master_id) = filter.master_id {
        conditions.push(format!("o.master_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Int(master_id.as_i32()));
    }

    if let Some(ref search) = filter.search {
        // One bind referenced three times
        conditions.push(format!(
            "(o.customer_name ILIKE ${bind_idx} OR o.phone ILIKE ${bind_idx} OR o.comment ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{search}%")));
    }

    if let Some(from) = filter.date_from {
        conditions.push(format!("o.created_at::date >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(from));
    }

    if let Some(to) = filter.date_to {
        conditions.push(format!("o.created_at::date <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_filter_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_filter_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Repository for console order operations.
pub struct OrderAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderAdminRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of orders matching a filter, newest first.
    ///
    /// `page` is 1-based; out-of-range pages come back empty but still
    /// carry the correct total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` on an invalid stored status.
    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: &OrderFilter, page: i64) -> Result<OrderPage, RepositoryError> {
        let page = page.max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let (where_clause, bind_values, bind_idx) = build_order_filter(filter);
        let having_clause = filter.price_bucket.map_or("", PriceBucket::having_sql);

        let query = format!(
            "SELECT o.id, o.customer_name, o.phone, o.status, \
                    m.name AS master_name, \
                    o.appointment_date, o.created_at, \
                    COALESCE(SUM(s.price), 0) AS total_price, \
                    COALESCE(STRING_AGG(s.name, ', ' ORDER BY s.name), '') AS service_names \
             FROM shop.orders o \
             LEFT JOIN shop.masters m ON m.id = o.master_id \
             LEFT JOIN shop.order_services os ON os.order_id = o.id \
             LEFT JOIN shop.services s ON s.id = os.service_id \
             {where_clause} \
             GROUP BY o.id, m.name \
             {having_clause} \
             ORDER BY o.created_at DESC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let q = bind_filter_values(sqlx::query_as::<_, OrderListRow>(&query), &bind_values);
        let rows = q.bind(PAGE_SIZE).bind(offset).fetch_all(self.pool).await?;

        let total = self.count(filter).await?;
        let items = rows
            .into_iter()
            .map(OrderListRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPage {
            items,
            total,
            page,
            pages: (total.max(1) + PAGE_SIZE - 1) / PAGE_SIZE,
        })
    }

    /// Total orders matching a filter.
    ///
    /// The price bucket applies per order after aggregation, so the count
    /// wraps the grouped query instead of counting raw rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, filter))]
    pub async fn count(&self, filter: &OrderFilter) -> Result<i64, RepositoryError> {
        let (where_clause, bind_values, _) = build_order_filter(filter);
        let having_clause = filter.price_bucket.map_or("", PriceBucket::having_sql);

        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM ( \
                SELECT o.id \
                FROM shop.orders o \
                LEFT JOIN shop.order_services os ON os.order_id = o.id \
                LEFT JOIN shop.services s ON s.id = os.service_id \
                {where_clause} \
                GROUP BY o.id \
                {having_clause} \
             ) matching"
        );

        let q = bind_filter_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        Ok(q.fetch_one(self.pool).await?)
    }

    /// Orders currently in a given status (dashboard counter).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn count_with_status(&self, status: OrderStatus) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM shop.orders WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(self.pool)
                .await?;
        Ok(count)
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

    /// Lifetime revenue for a customer phone: the service totals of every
    /// completed order sharing that phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn revenue_for_phone(&self, phone: &str) -> Result<Decimal, RepositoryError> {
        let revenue: Decimal = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(s.price), 0)
            FROM shop.orders o
            JOIN shop.order_services os ON os.order_id = o.id
            JOIN shop.services s ON s.id = os.service_id
            WHERE o.phone = $1 AND o.status = $2
            ",
        )
        .bind(phone)
        .bind(OrderStatus::Completed.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(revenue)
    }

    /// Rewrite an order and replace its service set in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID, or
    /// `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
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

        if !input.service_ids.is_empty() {
            let raw: Vec<i32> = input.service_ids.iter().map(|sid| sid.as_i32()).collect();
            sqlx::query(
                r"
                INSERT INTO shop.order_services (order_id, service_id)
                SELECT $1, UNNEST($2::int4[])
                ",
            )
            .bind(id)
            .bind(&raw)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        row.into_order()
    }

    /// Change one order's status from the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID, or
    /// `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE shop.orders SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Move every order in `ids` to `status` and return how many changed.
    ///
    /// A single `UPDATE ... WHERE id = ANY($1)`, so exactly the selected
    /// set is touched; ids that no longer exist are silently skipped and
    /// show up as a smaller count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self), fields(orders = ids.len()))]
    pub async fn set_status_bulk(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let result = sqlx::query(
            "UPDATE shop.orders SET status = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(&raw)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_price_bucket_boundaries_partition() {
        // Exactly 500 belongs to the second bucket, not the first
        assert!(!PriceBucket::Under500.contains(dec("500")));
        assert!(PriceBucket::From500.contains(dec("500")));

        assert!(PriceBucket::Under500.contains(dec("499.99")));
        assert!(PriceBucket::From500.contains(dec("999.99")));

        assert!(!PriceBucket::From500.contains(dec("1000")));
        assert!(PriceBucket::From1000.contains(dec("1000")));
        assert!(PriceBucket::From1000.contains(dec("1999.99")));

        assert!(!PriceBucket::From1000.contains(dec("2000")));
        assert!(PriceBucket::From2000.contains(dec("2000")));
    }

    #[test]
    fn test_price_bucket_every_total_has_one_bucket() {
        for total in ["0", "499.99", "500", "999.99", "1000", "1999.99", "2000", "99999"] {
            let hits = PriceBucket::ALL
                .iter()
                .filter(|b| b.contains(dec(total)))
                .count();
            assert_eq!(hits, 1, "total {total} matched {hits} buckets");
        }
    }

    #[test]
    fn test_price_bucket_param_round_trip() {
        for bucket in PriceBucket::ALL {
            assert_eq!(PriceBucket::from_param(bucket.as_param()), Some(bucket));
        }
        assert_eq!(PriceBucket::from_param("free"), None);
    }

    #[test]
    fn test_build_order_filter_empty() {
        let (where_clause, binds, next_idx) = build_order_filter(&OrderFilter::default());
        assert!(where_clause.is_empty());
        assert!(binds.is_empty());
        assert_eq!(next_idx, 1);
    }

    #[test]
    fn test_build_order_filter_search_uses_single_bind() {
        let filter = OrderFilter {
            search: Some("Ivan".to_owned()),
            ..OrderFilter::default()
        };
        let (where_clause, binds, next_idx) = build_order_filter(&filter);
        assert_eq!(
            where_clause,
            "WHERE (o.customer_name ILIKE $1 OR o.phone ILIKE $1 OR o.comment ILIKE $1)"
        );
        assert_eq!(binds.len(), 1);
        assert_eq!(next_idx, 2);
    }

    #[test]
    fn test_build_order_filter_orders_conditions() {
        let filter = OrderFilter {
            status: Some(OrderStatus::New),
            master_id: Some(MasterId::new(3)),
            search: None,
            date_from: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            date_to: None,
            price_bucket: Some(PriceBucket::From2000),
        };
        let (where_clause, binds, next_idx) = build_order_filter(&filter);
        assert_eq!(
            where_clause,
            "WHERE o.status = $1 AND o.master_id = $2 AND o.created_at::date >= $3"
        );
        assert_eq!(binds.len(), 3);
        // the bucket contributes HAVING, not WHERE, so no bind for it
        assert_eq!(next_idx, 4);
    }
}
