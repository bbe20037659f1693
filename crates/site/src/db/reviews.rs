//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clipjoint_core::{MasterId, Rating, ReviewId, ReviewStatus};

use super::RepositoryError;
use crate::models::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    master_id: MasterId,
    author_name: String,
    body: String,
    rating: Rating,
    photo_path: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review, RepositoryError> {
        let status = self.status.parse::<ReviewStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid review status in database: {e}"))
        })?;

        Ok(Review {
            id: self.id,
            master_id: self.master_id,
            author_name: self.author_name,
            body: self.body,
            rating: self.rating,
            photo_path: self.photo_path,
            status,
            created_at: self.created_at,
        })
    }
}

/// A review joined with its master's name, for the landing page.
#[derive(Debug, Clone)]
pub struct PublicReview {
    /// Name the customer gave.
    pub author_name: String,
    /// Review text.
    pub body: String,
    /// 1-5 rating.
    pub rating: Rating,
    /// Uploaded photo, relative to the media root.
    pub photo_path: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// The reviewed master's name.
    pub master_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PublicReviewRow {
    author_name: String,
    body: String,
    rating: Rating,
    photo_path: Option<String>,
    created_at: DateTime<Utc>,
    master_name: String,
}

/// Fields for a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// The reviewed master.
    pub master_id: MasterId,
    /// Name the customer gave.
    pub author_name: String,
    /// Review text.
    pub body: String,
    /// 1-5 rating.
    pub rating: Rating,
    /// Saved photo path, relative to the media root.
    pub photo_path: Option<String>,
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review; the status starts as `pending` via the column default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, input), fields(master_id = %input.master_id))]
    pub async fn create(&self, input: &NewReview) -> Result<Review, RepositoryError> {
        let row: ReviewRow = sqlx::query_as(
            r"
            INSERT INTO shop.reviews (master_id, author_name, body, rating, photo_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, master_id, author_name, body, rating, photo_path, status, created_at
            ",
        )
        .bind(input.master_id)
        .bind(&input.author_name)
        .bind(&input.body)
        .bind(input.rating)
        .bind(&input.photo_path)
        .fetch_one(self.pool)
        .await?;

        row.into_review()
    }

    /// Set a review's moderation status.
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

    /// The newest publicly visible reviews, for the landing page.
    ///
    /// Visible means `ai_approved` or `published`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_public(&self, limit: i64) -> Result<Vec<PublicReview>, RepositoryError> {
        let rows: Vec<PublicReviewRow> = sqlx::query_as(
            r"
            SELECT r.author_name, r.body, r.rating, r.photo_path, r.created_at,
                   m.name AS master_name
            FROM shop.reviews r
            JOIN shop.masters m ON m.id = r.master_id
            WHERE r.status = ANY($1)
            ORDER BY r.created_at DESC
            LIMIT $2
            ",
        )
        .bind(vec![
            ReviewStatus::AiApproved.as_str(),
            ReviewStatus::Published.as_str(),
        ])
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PublicReview {
                author_name: r.author_name,
                body: r.body,
                rating: r.rating,
                photo_path: r.photo_path,
                created_at: r.created_at,
                master_name: r.master_name,
            })
            .collect())
    }
}
