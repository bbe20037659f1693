//! Landing and thanks page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::masters::MasterRepository;
use crate::db::reviews::{PublicReview, ReviewRepository};
use crate::db::services::ServiceRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalStaff;
use crate::models::CurrentStaff;
use crate::models::catalog::{Master, Service};
use crate::state::AppState;

/// Masters shown in the landing page team section.
const LANDING_MASTERS: usize = 3;

/// Services shown in the landing page price section.
const LANDING_SERVICES: usize = 6;

/// Reviews shown in the landing page carousel.
const LANDING_REVIEWS: i64 = 5;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct LandingTemplate {
    /// Team section, most experienced first.
    pub masters: Vec<Master>,
    /// Price list section, popular services first.
    pub services: Vec<Service>,
    /// Published and AI-approved reviews, newest first.
    pub reviews: Vec<PublicReview>,
    pub staff: Option<CurrentStaff>,
}

/// Display the landing page.
#[instrument(skip(state, staff))]
pub async fn landing(
    State(state): State<AppState>,
    OptionalStaff(staff): OptionalStaff,
) -> Result<LandingTemplate> {
    let mut masters = MasterRepository::new(state.pool()).list_active().await?;
    masters.truncate(LANDING_MASTERS);

    let mut services = ServiceRepository::new(state.pool()).list().await?;
    services.truncate(LANDING_SERVICES);

    let reviews = ReviewRepository::new(state.pool())
        .list_public(LANDING_REVIEWS)
        .await?;

    Ok(LandingTemplate {
        masters,
        services,
        reviews,
        staff,
    })
}

/// Query parameter naming the flow that finished.
#[derive(Debug, Deserialize)]
pub struct ThanksQuery {
    pub from: Option<String>,
}

/// Thanks page template.
#[derive(Template, WebTemplate)]
#[template(path = "thanks.html")]
pub struct ThanksTemplate {
    pub heading: String,
    pub message: String,
    pub staff: Option<CurrentStaff>,
}

/// Display the thanks page after a form submission.
///
/// `?from=order` and `?from=review` pick the wording; anything else gets
/// a generic confirmation.
pub async fn thanks(
    Query(query): Query<ThanksQuery>,
    OptionalStaff(staff): OptionalStaff,
) -> ThanksTemplate {
    let (heading, message) = match query.from.as_deref() {
        Some("order") => (
            "Your booking is in!",
            "We received your order and will call you to confirm the appointment.",
        ),
        Some("review") => (
            "Thanks for the feedback!",
            "Your review was submitted and will appear after a quick check.",
        ),
        _ => ("Thank you!", "Your submission was received."),
    };

    ThanksTemplate {
        heading: heading.to_owned(),
        message: message.to_owned(),
        staff,
    }
}
