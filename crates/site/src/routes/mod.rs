//! HTTP route handlers for the public site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Health check
//! GET  /thanks                 - Thanks page after a form submission
//!
//! # Orders
//! GET  /orders                 - Orders list (staff)
//! GET  /orders/create          - Booking form
//! POST /orders/create          - Place an order
//! GET  /orders/{id}            - Order detail (staff)
//! GET  /orders/{id}/update     - Edit form (staff with edit rights)
//! POST /orders/{id}/update     - Update an order
//!
//! # Reviews
//! GET  /reviews/create         - Review form
//! POST /reviews/create         - Submit a review (multipart, photo upload)
//!
//! # Services
//! GET  /services               - Service catalog
//! GET  /services/create        - Create form (staff with edit rights)
//! POST /services/create        - Create a service
//! GET  /services/{id}/update   - Edit form (staff with edit rights)
//! POST /services/{id}/update   - Update a service
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (rate limited)
//! POST /auth/logout            - Logout action
//!
//! # JSON API
//! GET  /api/masters/{id}/services - Services a master offers, with prices
//! POST /api/masters/services      - Legacy form-encoded variant, no prices
//! ```

pub mod api;
pub mod auth;
pub mod home;
pub mod orders;
pub mod reviews;
pub mod services;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Body limit for the review form: the photo cap plus headroom for the
/// text fields and multipart framing.
const MAX_UPLOAD_BODY_BYTES: usize = crate::services::uploads::MAX_PHOTO_BYTES + 64 * 1024;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/create", get(orders::create_form))
        .route("/create", post(orders::create).layer(form_rate_limiter()))
        .route("/{id}", get(orders::show))
        .route("/{id}/update", get(orders::update_form).post(orders::update))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/create", get(reviews::create_form))
        .route(
            "/create",
            post(reviews::create)
                .layer::<_, std::convert::Infallible>(form_rate_limiter())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
}

/// Create the service catalog routes router.
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(services::index))
        .route(
            "/create",
            get(services::create_form).post(services::create),
        )
        .route(
            "/{id}/update",
            get(services::update_form).post(services::update),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/login", post(auth::login).layer(auth_rate_limiter()))
        .route("/logout", post(auth::logout))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/masters/{id}/services", get(api::master_services))
        .route("/masters/services", post(api::master_services_legacy))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing and thanks pages
        .route("/", get(home::landing))
        .route("/thanks", get(home::thanks))
        // Orders
        .nest("/orders", order_routes())
        // Reviews
        .nest("/reviews", review_routes())
        // Service catalog
        .nest("/services", service_routes())
        // Auth
        .nest("/auth", auth_routes())
        // JSON API
        .nest("/api", api_routes())
        // Unknown paths get the same page as a missing entity
        .fallback(fallback)
}

async fn fallback() -> AppError {
    AppError::NotFound("page".to_owned())
}
