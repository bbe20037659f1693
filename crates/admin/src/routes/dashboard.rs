//! Console dashboard handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use clipjoint_core::OrderStatus;

use crate::db::masters::MasterAdminRepository;
use crate::db::orders::OrderAdminRepository;
use crate::db::reviews::ReviewAdminRepository;
use crate::db::services::ServiceAdminRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::CurrentStaff;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    /// Orders waiting to be confirmed.
    pub new_orders: i64,
    /// Reviews waiting for moderation.
    pub pending_reviews: i64,
    /// Masters visible on the public site.
    pub active_masters: i64,
    /// Services in the catalog.
    pub services: i64,
}

/// Display the dashboard counters.
#[instrument(skip(state, staff))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<DashboardTemplate> {
    let orders = OrderAdminRepository::new(state.pool());
    let reviews = ReviewAdminRepository::new(state.pool());
    let masters = MasterAdminRepository::new(state.pool());
    let services = ServiceAdminRepository::new(state.pool());

    // The four counters are independent, fetch them in parallel
    let (new_orders, pending_reviews, active_masters, service_count) = tokio::join!(
        orders.count_with_status(OrderStatus::New),
        reviews.count_pending(),
        masters.count_active(),
        services.count(),
    );

    Ok(DashboardTemplate {
        staff,
        current_path: "/",
        new_orders: new_orders?,
        pending_reviews: pending_reviews?,
        active_masters: active_masters?,
        services: service_count?,
    })
}
