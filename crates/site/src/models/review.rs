//! Customer review model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clipjoint_core::{MasterId, Rating, ReviewId, ReviewStatus};

/// A customer review of a master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Database ID.
    pub id: ReviewId,
    /// The reviewed master.
    pub master_id: MasterId,
    /// Name the customer gave on the form.
    pub author_name: String,
    /// Review text, the input to moderation.
    pub body: String,
    /// 1-5 rating.
    pub rating: Rating,
    /// Uploaded photo, relative to the media root.
    pub photo_path: Option<String>,
    /// Moderation status.
    pub status: ReviewStatus,
    /// When the review was submitted.
    pub created_at: DateTime<Utc>,
}
