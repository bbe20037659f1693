//! Review queries for the console.
//!
//! Moderation happens here: the list shows every review regardless of
//! status, and the bulk action publishes a selected set in one update.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{MasterId, Rating, ReviewId, ReviewStatus};

use super::RepositoryError;
use super::orders::PAGE_SIZE;

/// One row of the console review table, with the master's name joined in.
#[derive(Debug, Clone)]
pub struct ReviewListItem {
    /// Database ID.
    pub id: ReviewId,
    /// The reviewed master's name.
    pub master_name: String,
    /// Name the customer gave.
    pub author_name: String,
    /// Review text.
    pub body: String,
    /// 1-5 rating.
    pub rating: Rating,
    /// Uploaded photo, relative to the site's media root.
    pub photo_path: Option<String>,
    /// Moderation status.
    pub status: ReviewStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewListRow {
    id: ReviewId,
    master_name: String,
    author_name: String,
    body: String,
    rating: Rating,
    photo_path: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl ReviewListRow {
    fn into_item(self) -> Result<ReviewListItem, RepositoryError> {
        let status = self.status.parse::<ReviewStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid review status in database: {e}"))
        })?;

        Ok(ReviewListItem {
            id: self.id,
            master_name: self.master_name,
            author_name: self.author_name,
            body: self.body,
            rating: self.rating,
            photo_path: self.photo_path,
            status,
            created_at: self.created_at,
        })
    }
}

/// Console review list filter. Empty fields mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    /// Restrict to one moderation status.
    pub status: Option<ReviewStatus>,
    /// Restrict to one star rating.
    pub rating: Option<Rating>,
    /// Restrict to one master.
    pub master_id: Option<MasterId>,
}

/// One page of filtered reviews plus the total match count.
#[derive(Debug)]
pub struct ReviewPage {
    /// The rows on this page.
    pub items: Vec<ReviewListItem>,
    /// Total rows matching the filter across all pages.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Total number of pages (at least 1).
    pub pages: i64,
}

/// Build the WHERE clause for a review filter.
///
/// All conditions are plain equality, so callers bind the present values
/// in declaration order (status, rating, master) rather than going
/// through a tagged value list. Returns the clause and the next free
/// parameter index.
fn build_review_filter(filter: &ReviewFilter) -> (String, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;

    if filter.status.is_some() {
        conditions.push(format!("r.status = ${bind_idx}"));
        bind_idx += 1;
    }
    if filter.rating.is_some() {
        conditions.push(format!("r.rating = ${bind_idx}"));
        bind_idx += 1;
    }
    if filter.master_id.is_some() {
        conditions.push(format!("r.master_id = ${bind_idx}"));
        bind_idx += 1;
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_idx)
}

/// Repository for console review operations.
pub struct ReviewAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewAdminRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of reviews matching a filter, newest first.
    ///
    /// `page` is 1-based; out-of-range pages come back empty but still
    /// carry the correct total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` on an invalid stored status.
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        filter: &ReviewFilter,
        page: i64,
    ) -> Result<ReviewPage, RepositoryError> {
        let page = page.max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let (where_clause, bind_idx) = build_review_filter(filter);
        let query = format!(
            "SELECT r.id, m.name AS master_name, r.author_name, r.body, r.rating, \
                    r.photo_path, r.status, r.created_at \
             FROM shop.reviews r \
             JOIN shop.masters m ON m.id = r.master_id \
             {where_clause} \
             ORDER BY r.created_at DESC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        // Bind order must match build_review_filter's condition order
        let mut q = sqlx::query_as::<_, ReviewListRow>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(rating) = filter.rating {
            q = q.bind(rating);
        }
        if let Some(master_id) = filter.master_id {
            q = q.bind(master_id);
        }
        let rows = q.bind(PAGE_SIZE).bind(offset).fetch_all(self.pool).await?;

        let total = self.count(filter).await?;
        let items = rows
            .into_iter()
            .map(ReviewListRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReviewPage {
            items,
            total,
            page,
            pages: (total.max(1) + PAGE_SIZE - 1) / PAGE_SIZE,
        })
    }

    /// Total reviews matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, filter))]
    pub async fn count(&self, filter: &ReviewFilter) -> Result<i64, RepositoryError> {
        let (where_clause, _) = build_review_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM shop.reviews r {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(rating) = filter.rating {
            q = q.bind(rating);
        }
        if let Some(master_id) = filter.master_id {
            q = q.bind(master_id);
        }
        Ok(q.fetch_one(self.pool).await?)
    }

    /// Reviews still waiting for moderation (dashboard counter).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM shop.reviews WHERE status = $1")
                .bind(ReviewStatus::Pending.as_str())
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Set one review's moderation status from the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review has this ID, or
    /// `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: ReviewId,
        status: ReviewStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.reviews SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Publish every review in `ids` and return how many changed.
    ///
    /// A single `UPDATE ... WHERE id = ANY($1)`, so exactly the selected
    /// set is touched; ids that no longer exist are silently skipped and
    /// show up as a smaller count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self), fields(reviews = ids.len()))]
    pub async fn publish_bulk(&self, ids: &[ReviewId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let result = sqlx::query("UPDATE shop.reviews SET status = $2 WHERE id = ANY($1)")
            .bind(&raw)
            .bind(ReviewStatus::Published.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_review_filter_empty() {
        let (where_clause, next_idx) = build_review_filter(&ReviewFilter::default());
        assert!(where_clause.is_empty());
        assert_eq!(next_idx, 1);
    }

    #[test]
    fn test_build_review_filter_numbers_conditions_in_order() {
        let filter = ReviewFilter {
            status: Some(ReviewStatus::Pending),
            rating: Some(Rating::new(5).unwrap()),
            master_id: Some(MasterId::new(2)),
        };
        let (where_clause, next_idx) = build_review_filter(&filter);
        assert_eq!(
            where_clause,
            "WHERE r.status = $1 AND r.rating = $2 AND r.master_id = $3"
        );
        assert_eq!(next_idx, 4);
    }

    #[test]
    fn test_build_review_filter_skips_absent_fields() {
        let filter = ReviewFilter {
            status: None,
            rating: None,
            master_id: Some(MasterId::new(9)),
        };
        let (where_clause, next_idx) = build_review_filter(&filter);
        assert_eq!(where_clause, "WHERE r.master_id = $1");
        assert_eq!(next_idx, 2);
    }
}
