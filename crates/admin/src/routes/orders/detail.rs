//! Order detail page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use clipjoint_core::{OrderId, OrderStatus};

use crate::db::masters::{Master, MasterAdminRepository};
use crate::db::orders::{Order, OrderAdminRepository};
use crate::db::services::Service;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::CurrentStaff;
use crate::state::AppState;

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderShowTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    pub order: Order,
    pub master: Option<Master>,
    pub services: Vec<Service>,
    /// Sum of this order's service prices.
    pub total: Decimal,
    /// Sum of completed-order totals sharing this customer's phone.
    pub revenue: Decimal,
    /// Status dropdown entries for the inline status form.
    pub statuses: &'static [OrderStatus],
    /// Show the "order updated" banner after a successful edit.
    pub updated: bool,
}

/// Query parameter set by a redirect after a successful edit.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub updated: Option<u8>,
}

/// Display one order with its services and the customer's lifetime revenue.
#[instrument(skip(state, staff))]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<OrderId>,
    Query(query): Query<DetailQuery>,
) -> Result<OrderShowTemplate> {
    let repo = OrderAdminRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let services = repo.services_for(id).await?;
    let total: Decimal = services.iter().map(|s| s.price).sum();
    let revenue = repo.revenue_for_phone(order.phone.as_str()).await?;

    let master = match order.master_id {
        Some(master_id) => MasterAdminRepository::new(state.pool()).get(master_id).await?,
        None => None,
    };

    Ok(OrderShowTemplate {
        staff,
        current_path: "/orders",
        order,
        master,
        services,
        total,
        revenue,
        statuses: &OrderStatus::ALL,
        updated: query.updated.is_some(),
    })
}
