//! Review route handlers.
//!
//! The review form is public and accepts an optional photo, so the POST
//! body is multipart. After the review row is stored it is classified by
//! the moderation API in the same request; a classifier failure leaves
//! the review pending and never fails the submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use clipjoint_core::Rating;

use crate::db::masters::MasterRepository;
use crate::db::reviews::{NewReview, ReviewRepository};
use crate::error::{self, AppError, Result};
use crate::filters;
use crate::middleware::OptionalStaff;
use crate::models::CurrentStaff;
use crate::models::catalog::Master;
use crate::models::review::Review;
use crate::services::booking::ValidationErrors;
use crate::services::uploads::{self, UploadError};
use crate::state::AppState;

/// Maximum accepted author name length.
const MAX_AUTHOR_LENGTH: usize = 100;

/// Rating select options, best first.
const RATING_CHOICES: [(&str, &str); 5] = [
    ("5", "5 - Excellent"),
    ("4", "4 - Good"),
    ("3", "3 - Okay"),
    ("2", "2 - Poor"),
    ("1", "1 - Terrible"),
];

/// Raw review form fields, exactly as the browser sent them.
#[derive(Debug, Default, Clone)]
pub struct ReviewSubmission {
    pub author_name: String,
    pub body: String,
    pub rating: String,
    pub master_id: String,
}

/// Review form template, for both the first render and re-renders with
/// validation messages.
#[derive(Template, WebTemplate)]
#[template(path = "reviews/form.html")]
pub struct ReviewFormTemplate {
    pub masters: Vec<Master>,
    pub ratings: &'static [(&'static str, &'static str)],
    pub form: ReviewSubmission,
    pub errors: ValidationErrors,
    pub staff: Option<CurrentStaff>,
}

impl ReviewFormTemplate {
    async fn load(
        state: &AppState,
        form: ReviewSubmission,
        errors: ValidationErrors,
        staff: Option<CurrentStaff>,
    ) -> Result<Self> {
        let masters = MasterRepository::new(state.pool()).list_active().await?;

        Ok(Self {
            masters,
            ratings: &RATING_CHOICES,
            form,
            errors,
            staff,
        })
    }
}

/// Display the review form.
pub async fn create_form(
    State(state): State<AppState>,
    OptionalStaff(staff): OptionalStaff,
) -> Result<ReviewFormTemplate> {
    ReviewFormTemplate::load(
        &state,
        ReviewSubmission::default(),
        ValidationErrors::default(),
        staff,
    )
    .await
}

/// Handle a review submission.
///
/// On success redirects to the thanks page; on validation failure the
/// form is shown again with every field message. The photo is not kept
/// across re-renders, browsers drop file inputs on their own.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    OptionalStaff(staff): OptionalStaff,
    multipart: Multipart,
) -> Result<Response> {
    let (form, photo) = read_multipart(multipart).await?;

    let mut errors = ValidationErrors::default();
    let parsed = validate(&state, &form, &mut errors).await?;

    if !errors.is_empty() {
        let template = ReviewFormTemplate::load(&state, form, errors, staff).await?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }
    // Checked by validate when errors is empty.
    let Some((master_id, author_name, body, rating)) = parsed else {
        return Err(AppError::Internal(
            "review validation produced no value".to_owned(),
        ));
    };

    let photo_path = match photo {
        Some((content_type, data)) => {
            match uploads::save_review_photo(&state.config().media_root, &content_type, &data).await
            {
                Ok(path) => Some(path),
                Err(UploadError::UnsupportedType(_)) => {
                    errors.push("photo", "Upload a JPEG, PNG, or WebP image.");
                    None
                }
                Err(UploadError::TooLarge { limit, .. }) => {
                    errors.push("photo", format!("Photo must be {} MB or smaller.", limit / (1024 * 1024)));
                    None
                }
                Err(UploadError::Io(e)) => {
                    return Err(AppError::Internal(format!("failed to store photo: {e}")));
                }
            }
        }
        None => None,
    };

    if !errors.is_empty() {
        let template = ReviewFormTemplate::load(&state, form, errors, staff).await?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }

    let review = ReviewRepository::new(state.pool())
        .create(&NewReview {
            master_id,
            author_name,
            body,
            rating,
            photo_path,
        })
        .await?;

    error::add_breadcrumb(
        "review",
        "Review submitted",
        Some(&[("id", &review.id.to_string())]),
    );
    tracing::info!(review_id = %review.id, master_id = %review.master_id, "review submitted");

    moderate(&state, &review).await;

    Ok(Redirect::to("/thanks?from=review").into_response())
}

/// Pull the known fields out of the multipart body.
///
/// The photo is returned separately as `(content type, bytes)`; an empty
/// file input is treated as no photo.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(ReviewSubmission, Option<(String, Bytes)>)> {
    let mut form = ReviewSubmission::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "author_name" => form.author_name = field.text().await.map_err(bad_multipart)?,
            "body" => form.body = field.text().await.map_err(bad_multipart)?,
            "rating" => form.rating = field.text().await.map_err(bad_multipart)?,
            "master_id" => form.master_id = field.text().await.map_err(bad_multipart)?,
            "photo" => {
                let content_type = field.content_type().map(ToOwned::to_owned);
                let data = field.bytes().await.map_err(bad_multipart)?;
                if let Some(content_type) = content_type {
                    if !data.is_empty() {
                        photo = Some((content_type, data));
                    }
                }
            }
            _ => {}
        }
    }

    Ok((form, photo))
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("malformed form upload: {e}"))
}

type ValidReview = (clipjoint_core::MasterId, String, String, Rating);

/// Validate the text fields, collecting every problem into `errors`.
///
/// Returns the parsed values when everything checked out.
async fn validate(
    state: &AppState,
    form: &ReviewSubmission,
    errors: &mut ValidationErrors,
) -> Result<Option<ValidReview>> {
    let author_name = form.author_name.trim().to_owned();
    if author_name.is_empty() {
        errors.push("author_name", "Enter your name.");
    } else if author_name.len() > MAX_AUTHOR_LENGTH {
        errors.push(
            "author_name",
            format!("Name must be at most {MAX_AUTHOR_LENGTH} characters."),
        );
    }

    let body = form.body.trim().to_owned();
    if body.is_empty() {
        errors.push("body", "Write a few words about your visit.");
    }

    let rating = match form.rating.trim().parse::<i16>().ok().map(Rating::new) {
        Some(Ok(rating)) => Some(rating),
        _ => {
            errors.push("rating", "Pick a rating from 1 to 5.");
            None
        }
    };

    let master = match form.master_id.trim() {
        "" => {
            errors.push("master_id", "Select your master.");
            None
        }
        raw => match raw.parse::<i32>() {
            Ok(id) => {
                let master = MasterRepository::new(state.pool()).get(id.into()).await?;
                if master.is_none() {
                    errors.push("master_id", "Select a valid master.");
                }
                master
            }
            Err(_) => {
                errors.push("master_id", "Select a valid master.");
                None
            }
        },
    };

    if !errors.is_empty() {
        return Ok(None);
    }

    match (master, rating) {
        (Some(master), Some(rating)) => Ok(Some((master.id, author_name, body, rating))),
        _ => Ok(None),
    }
}

/// Classify a stored review and record the verdict.
///
/// Whatever goes wrong here, the review just stays `pending` for manual
/// moderation; the customer's submission already succeeded.
async fn moderate(state: &AppState, review: &Review) {
    let Some(client) = state.moderation() else {
        tracing::debug!(review_id = %review.id, "moderation disabled, review stays pending");
        return;
    };

    match client.classify(&review.body).await {
        Ok(verdict) => {
            if verdict.flagged {
                tracing::info!(
                    review_id = %review.id,
                    categories = ?verdict.flagged_categories,
                    "review flagged by moderation"
                );
            }
            let status = verdict.review_status();
            if let Err(e) = ReviewRepository::new(state.pool())
                .set_status(review.id, status)
                .await
            {
                tracing::warn!(
                    review_id = %review.id,
                    error = %e,
                    "failed to record moderation verdict, review stays pending"
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                review_id = %review.id,
                error = %e,
                "moderation call failed, review stays pending"
            );
        }
    }
}
