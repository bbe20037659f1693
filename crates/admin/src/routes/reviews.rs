//! Review moderation route handlers.
//!
//! The list shows every review with status, rating, and master filters.
//! Staff publish one review at a time from the row form, or a selected
//! set through the bulk form whose id list is assembled by the console
//! JavaScript into a hidden field.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use clipjoint_core::{MasterId, Rating, ReviewId, ReviewStatus};

use crate::db::masters::{Master, MasterAdminRepository};
use crate::db::reviews::{ReviewAdminRepository, ReviewFilter, ReviewListItem};
use crate::error::{self, AppError, Result};
use crate::filters;
use crate::middleware::{RequireEditor, RequireStaff};
use crate::models::CurrentStaff;
use crate::state::AppState;

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for the reviews list.
///
/// Unknown or malformed values are dropped rather than rejected.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReviewsQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Status filter value.
    pub status: Option<String>,
    /// Rating filter value, `1` through `5`.
    pub rating: Option<String>,
    /// Master id filter value.
    pub master: Option<String>,
}

impl ReviewsQuery {
    /// Requested page, defaulting to the first.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Translate the raw query into a repository filter.
    #[must_use]
    pub fn to_filter(&self) -> ReviewFilter {
        ReviewFilter {
            status: self
                .status
                .as_deref()
                .and_then(|raw| raw.parse::<ReviewStatus>().ok()),
            rating: self
                .rating
                .as_deref()
                .and_then(|raw| raw.parse::<i16>().ok())
                .and_then(|value| Rating::new(value).ok()),
            master_id: self
                .master
                .as_deref()
                .and_then(|raw| raw.parse::<i32>().ok())
                .map(Into::into),
        }
    }

    /// URL parameters for preserving filters across pagination links.
    #[must_use]
    pub fn preserve_params(&self) -> String {
        let mut params = Vec::new();

        if let Some(status) = &self.status
            && !status.is_empty()
        {
            params.push(format!("status={status}"));
        }
        if let Some(rating) = &self.rating
            && !rating.is_empty()
        {
            params.push(format!("rating={rating}"));
        }
        if let Some(master) = &self.master
            && !master.is_empty()
        {
            params.push(format!("master={master}"));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("&{}", params.join("&"))
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Reviews list page template.
#[derive(Template, WebTemplate)]
#[template(path = "reviews/index.html")]
pub struct ReviewsIndexTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    /// Rows on this page.
    pub reviews: Vec<ReviewListItem>,
    /// Total rows across all pages for the active filter.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Total number of pages.
    pub pages: i64,
    /// Status dropdown entries.
    pub statuses: &'static [ReviewStatus],
    /// Rating dropdown entries.
    pub ratings: [i16; 5],
    /// Master dropdown entries.
    pub masters: Vec<Master>,
    /// The raw query, echoed back into the filter form.
    pub query: ReviewsQuery,
    /// Parameters to preserve in pagination links.
    pub preserve_params: String,
}

impl ReviewsIndexTemplate {
    /// Whether this status option is the active filter.
    fn status_selected(&self, status: &ReviewStatus) -> bool {
        self.query.status.as_deref() == Some(status.as_str())
    }

    /// Whether this rating option is the active filter.
    fn rating_selected(&self, rating: &i16) -> bool {
        self.query
            .rating
            .as_deref()
            .is_some_and(|raw| raw == rating.to_string())
    }

    /// Whether this master option is the active filter.
    fn master_selected(&self, id: &MasterId) -> bool {
        self.query
            .master
            .as_deref()
            .is_some_and(|raw| raw == id.to_string())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the filtered, paginated reviews table.
#[instrument(skip(state, staff, query))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(query): Query<ReviewsQuery>,
) -> Result<ReviewsIndexTemplate> {
    let filter = query.to_filter();
    let review_page = ReviewAdminRepository::new(state.pool())
        .list(&filter, query.page())
        .await?;
    let masters = MasterAdminRepository::new(state.pool()).list_all().await?;

    let preserve_params = query.preserve_params();

    Ok(ReviewsIndexTemplate {
        staff,
        current_path: "/reviews",
        reviews: review_page.items,
        total: review_page.total,
        page: review_page.page,
        pages: review_page.pages,
        statuses: &ReviewStatus::ALL,
        ratings: [1, 2, 3, 4, 5],
        masters,
        query,
        preserve_params,
    })
}

/// Input for the single-review status form.
#[derive(Debug, Deserialize)]
pub struct ReviewStatusInput {
    pub status: String,
}

/// Change one review's moderation status from the table.
#[instrument(skip(state, _staff, input))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireEditor(_staff): RequireEditor,
    Path(id): Path<ReviewId>,
    Form(input): Form<ReviewStatusInput>,
) -> Result<Response> {
    let status = input
        .status
        .trim()
        .parse::<ReviewStatus>()
        .map_err(|_| AppError::BadRequest(format!("unknown review status: {}", input.status)))?;

    ReviewAdminRepository::new(state.pool())
        .set_status(id, status)
        .await?;

    tracing::info!(review_id = %id, status = %status, "review status changed");
    Ok(Redirect::to("/reviews").into_response())
}

/// Input for the bulk publish form.
#[derive(Debug, Deserialize)]
pub struct BulkPublishInput {
    /// Comma-separated list of review IDs.
    pub ids: String,
}

/// Publish every selected review.
///
/// Exactly the ids in the hidden field are touched; a missing id shrinks
/// the reported count but never fails the action.
#[instrument(skip(state, _staff, input))]
pub async fn bulk_publish(
    State(state): State<AppState>,
    RequireEditor(_staff): RequireEditor,
    Form(input): Form<BulkPublishInput>,
) -> Result<Response> {
    let ids: Vec<ReviewId> = input
        .ids
        .split(',')
        .filter_map(|segment| segment.trim().parse::<i32>().ok())
        .map(ReviewId::from)
        .collect();

    if ids.is_empty() {
        return Err(AppError::BadRequest("No reviews selected".to_owned()));
    }

    let changed = ReviewAdminRepository::new(state.pool())
        .publish_bulk(&ids)
        .await?;

    error::add_breadcrumb(
        "reviews",
        "Bulk publish",
        Some(&[("count", &changed.to_string())]),
    );
    tracing::info!(count = changed, "bulk review publish");
    Ok(Redirect::to("/reviews").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_filter_parses_known_values() {
        let query = ReviewsQuery {
            page: Some(1),
            status: Some("pending".to_owned()),
            rating: Some("4".to_owned()),
            master: Some("7".to_owned()),
        };

        let filter = query.to_filter();
        assert_eq!(filter.status, Some(ReviewStatus::Pending));
        assert_eq!(filter.rating.map(|r| r.as_i16()), Some(4));
        assert_eq!(filter.master_id.map(|m| m.as_i32()), Some(7));
    }

    #[test]
    fn test_to_filter_drops_out_of_range_rating() {
        let query = ReviewsQuery {
            rating: Some("9".to_owned()),
            ..ReviewsQuery::default()
        };
        assert!(query.to_filter().rating.is_none());
    }

    #[test]
    fn test_preserve_params() {
        let query = ReviewsQuery {
            page: Some(2),
            status: Some("published".to_owned()),
            rating: None,
            master: Some("3".to_owned()),
        };
        assert_eq!(query.preserve_params(), "&status=published&master=3");
    }
}
