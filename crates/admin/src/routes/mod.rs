//! HTTP route handlers for the staff console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Dashboard with workload counters
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action (rate limited)
//! POST /auth/logout             - Logout action
//!
//! # Orders
//! GET  /orders                  - Filtered, paginated order table
//! GET  /orders/{id}             - Order detail with customer revenue
//! GET  /orders/{id}/edit        - Full edit form (edit rights)
//! POST /orders/{id}/edit        - Rewrite an order
//! POST /orders/{id}/status      - Change one order's status
//! POST /orders/bulk/status      - Change the selected orders' status
//!
//! # Reviews
//! GET  /reviews                 - Filtered, paginated review table
//! POST /reviews/{id}/status     - Change one review's status
//! POST /reviews/bulk/publish    - Publish the selected reviews
//!
//! # Services
//! GET  /services                - Catalog table
//! GET  /services/create         - Create form (edit rights)
//! POST /services/create         - Create a service
//! GET  /services/{id}/edit      - Edit form (edit rights)
//! POST /services/{id}/edit      - Update a service
//! POST /services/{id}/delete    - Delete a service
//!
//! # Masters
//! GET  /masters                 - Master table, inactive ones included
//! GET  /masters/create          - Create form (edit rights)
//! POST /masters/create          - Create a master with offered services
//! GET  /masters/{id}/edit       - Edit form (edit rights)
//! POST /masters/{id}/edit       - Update a master and its services
//! POST /masters/{id}/delete     - Delete a master
//! ```

pub mod auth;
pub mod dashboard;
pub mod masters;
pub mod orders;
pub mod reviews;
pub mod services;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/edit", get(orders::edit_form).post(orders::edit))
        .route("/{id}/status", post(orders::set_status))
        .route("/bulk/status", post(orders::bulk_status))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::index))
        .route("/{id}/status", post(reviews::set_status))
        .route("/bulk/publish", post(reviews::bulk_publish))
}

/// Create the service routes router.
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(services::index))
        .route(
            "/create",
            get(services::create_form).post(services::create),
        )
        .route(
            "/{id}/edit",
            get(services::edit_form).post(services::update),
        )
        .route("/{id}/delete", post(services::delete))
}

/// Create the master routes router.
pub fn master_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(masters::index))
        .route("/create", get(masters::create_form).post(masters::create))
        .route("/{id}/edit", get(masters::edit_form).post(masters::update))
        .route("/{id}/delete", post(masters::delete))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/login", post(auth::login).layer(auth_rate_limiter()))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
        .nest("/reviews", review_routes())
        .nest("/services", service_routes())
        .nest("/masters", master_routes())
        .fallback(fallback)
}

async fn fallback() -> AppError {
    AppError::NotFound("page".to_owned())
}
