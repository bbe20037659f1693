//! Status action handlers for orders.
//!
//! Two shapes: a single-order form on the detail page, and a bulk form
//! on the list page whose id list is assembled by the console JavaScript
//! into a hidden field.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use clipjoint_core::{OrderId, OrderStatus};

use crate::db::orders::OrderAdminRepository;
use crate::error::{self, AppError, Result};
use crate::middleware::RequireEditor;
use crate::state::AppState;

/// Input for the single-order status form.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

/// Input for the bulk status form.
#[derive(Debug, Deserialize)]
pub struct BulkStatusInput {
    /// Comma-separated list of order IDs.
    pub ids: String,
    pub status: String,
}

/// Change one order's status from the detail page.
#[instrument(skip(state, _staff, input))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireEditor(_staff): RequireEditor,
    Path(id): Path<OrderId>,
    Form(input): Form<StatusInput>,
) -> Result<Response> {
    let status = parse_status(&input.status)?;

    OrderAdminRepository::new(state.pool())
        .set_status(id, status)
        .await?;

    tracing::info!(order_id = %id, status = %status, "order status changed");
    Ok(Redirect::to(&format!("/orders/{id}")).into_response())
}

/// Move every selected order to the chosen status.
///
/// Exactly the ids in the hidden field are touched; a missing id shrinks
/// the reported count but never fails the action.
#[instrument(skip(state, _staff, input))]
pub async fn bulk_status(
    State(state): State<AppState>,
    RequireEditor(_staff): RequireEditor,
    Form(input): Form<BulkStatusInput>,
) -> Result<Response> {
    let status = parse_status(&input.status)?;
    let ids = parse_order_ids(&input.ids);

    if ids.is_empty() {
        return Err(AppError::BadRequest("No orders selected".to_owned()));
    }

    let changed = OrderAdminRepository::new(state.pool())
        .set_status_bulk(&ids, status)
        .await?;

    error::add_breadcrumb(
        "orders",
        "Bulk status change",
        Some(&[
            ("status", status.as_str()),
            ("count", &changed.to_string()),
        ]),
    );
    tracing::info!(count = changed, status = %status, "bulk order status change");
    Ok(Redirect::to("/orders").into_response())
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.trim()
        .parse::<OrderStatus>()
        .map_err(|_| AppError::BadRequest(format!("unknown order status: {raw}")))
}

/// Parse the comma-separated id field; non-numeric segments are skipped.
fn parse_order_ids(raw: &str) -> Vec<OrderId> {
    raw.split(',')
        .filter_map(|segment| segment.trim().parse::<i32>().ok())
        .map(OrderId::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_ids_skips_garbage() {
        let ids = parse_order_ids("5, 9,,x,12");
        assert_eq!(
            ids,
            vec![OrderId::from(5), OrderId::from(9), OrderId::from(12)]
        );
    }

    #[test]
    fn test_parse_order_ids_empty() {
        assert!(parse_order_ids("").is_empty());
    }

    #[test]
    fn test_parse_status_rejects_unknown() {
        assert!(parse_status("deleted").is_err());
        assert_eq!(parse_status(" confirmed ").unwrap(), OrderStatus::Confirmed);
    }
}
