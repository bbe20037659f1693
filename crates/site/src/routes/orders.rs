//! Order route handlers.
//!
//! The booking form is public; the list, detail, and edit pages are for
//! staff. The detail page bumps the per-order view counter at most once
//! per browser session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use clipjoint_core::{OrderId, OrderStatus};

use crate::db::masters::MasterRepository;
use crate::db::orders::{OrderListItem, OrderRepository};
use crate::db::services::ServiceRepository;
use crate::error::{self, AppError, Result};
use crate::filters;
use crate::middleware::{OptionalStaff, RequireEditor, RequireStaff};
use crate::models::catalog::{Master, Service};
use crate::models::order::Order;
use crate::models::{CurrentStaff, session_keys};
use crate::services::booking::{BookingError, BookingService, OrderSubmission, ValidationErrors};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Orders list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderListItem>,
    pub staff: Option<CurrentStaff>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub order: Order,
    pub master: Option<Master>,
    pub services: Vec<Service>,
    pub total: Decimal,
    pub view_count: i32,
    /// Show the "order updated" banner after a successful edit.
    pub updated: bool,
    pub staff: Option<CurrentStaff>,
}

/// Shared template for the booking form and the staff edit form.
#[derive(Template, WebTemplate)]
#[template(path = "orders/form.html")]
pub struct OrderFormTemplate {
    pub heading: String,
    pub action: String,
    pub masters: Vec<Master>,
    pub services: Vec<Service>,
    pub form: OrderSubmission,
    pub errors: ValidationErrors,
    /// Current status, present on the staff edit form only.
    pub status: Option<OrderStatus>,
    pub statuses: &'static [OrderStatus],
    pub staff: Option<CurrentStaff>,
}

impl OrderFormTemplate {
    /// Whether a service id appears in the submitted comma-separated list.
    fn service_selected(&self, id: &clipjoint_core::ServiceId) -> bool {
        self.form
            .service_ids
            .split(',')
            .any(|segment| segment.trim() == id.to_string())
    }

    /// Assemble the form template with fresh master and service lists.
    async fn load(
        state: &AppState,
        heading: String,
        action: String,
        form: OrderSubmission,
        errors: ValidationErrors,
        status: Option<OrderStatus>,
        staff: Option<CurrentStaff>,
    ) -> Result<Self> {
        let masters = MasterRepository::new(state.pool()).list_active().await?;
        let services = ServiceRepository::new(state.pool()).list().await?;

        Ok(Self {
            heading,
            action,
            masters,
            services,
            form,
            errors,
            status,
            statuses: &OrderStatus::ALL,
            staff,
        })
    }
}

// =============================================================================
// Staff Pages
// =============================================================================

/// Display the orders list, newest first.
#[instrument(skip(state, staff))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<OrdersIndexTemplate> {
    let orders = OrderRepository::new(state.pool()).list_recent().await?;

    Ok(OrdersIndexTemplate {
        orders,
        staff: Some(staff),
    })
}

/// Query parameter set by a redirect after a successful edit.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub updated: Option<u8>,
}

/// Display one order.
///
/// The view counter ticks once per browser session: a session flag keyed
/// by order id suppresses repeat increments, and the increment itself is
/// a single atomic UPDATE so concurrent first views cannot lose counts.
#[instrument(skip(state, staff, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    session: Session,
    Path(id): Path<OrderId>,
    Query(query): Query<DetailQuery>,
) -> Result<OrderDetailTemplate> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let services = repo.services_for(id).await?;
    let total: Decimal = services.iter().map(|s| s.price).sum();

    let master = match order.master_id {
        Some(master_id) => MasterRepository::new(state.pool()).get(master_id).await?,
        None => None,
    };

    let viewed_key = session_keys::viewed_order(id);
    let view_count = if session.get::<bool>(&viewed_key).await?.unwrap_or(false) {
        order.view_count
    } else {
        let count = repo.increment_view_count(id).await?;
        session.insert(&viewed_key, true).await?;
        count
    };

    Ok(OrderDetailTemplate {
        order,
        master,
        services,
        total,
        view_count,
        updated: query.updated.is_some(),
        staff: Some(staff),
    })
}

// =============================================================================
// Public Booking Form
// =============================================================================

/// Display the booking form.
pub async fn create_form(
    State(state): State<AppState>,
    OptionalStaff(staff): OptionalStaff,
) -> Result<OrderFormTemplate> {
    OrderFormTemplate::load(
        &state,
        "Book an appointment".to_owned(),
        "/orders/create".to_owned(),
        OrderSubmission::default(),
        ValidationErrors::default(),
        None,
        staff,
    )
    .await
}

/// Handle a booking form submission.
///
/// On success redirects to the thanks page; on validation failure the
/// form is shown again with every field message and the submitted values
/// kept in place.
#[instrument(skip(state, staff, form), fields(master_id = %form.master_id))]
pub async fn create(
    State(state): State<AppState>,
    OptionalStaff(staff): OptionalStaff,
    Form(form): Form<OrderSubmission>,
) -> Result<Response> {
    let booking = BookingService::new(state.pool());

    match booking.place_order(&form).await {
        Ok(order) => {
            error::add_breadcrumb("order", "Order placed", Some(&[("id", &order.id.to_string())]));
            tracing::info!(order_id = %order.id, "order placed");
            Ok(Redirect::to("/thanks?from=order").into_response())
        }
        Err(BookingError::Invalid(errors)) => {
            let template = OrderFormTemplate::load(
                &state,
                "Book an appointment".to_owned(),
                "/orders/create".to_owned(),
                form,
                errors,
                None,
                staff,
            )
            .await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(BookingError::Repository(e)) => Err(e.into()),
    }
}

// =============================================================================
// Staff Edit Form
// =============================================================================

/// Update form data: the booking fields plus the status select.
#[derive(Debug, Deserialize)]
pub struct OrderUpdateForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub master_id: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub service_ids: String,
    #[serde(default)]
    pub status: String,
}

impl OrderUpdateForm {
    fn into_parts(self) -> (OrderSubmission, String) {
        (
            OrderSubmission {
                customer_name: self.customer_name,
                phone: self.phone,
                comment: self.comment,
                master_id: self.master_id,
                appointment_date: self.appointment_date,
                service_ids: self.service_ids,
            },
            self.status,
        )
    }
}

/// Display the staff edit form, prefilled from the stored order.
#[instrument(skip(state, staff))]
pub async fn update_form(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<OrderId>,
) -> Result<OrderFormTemplate> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let services = repo.services_for(id).await?;

    let submission = OrderSubmission {
        customer_name: order.customer_name,
        phone: order.phone.to_string(),
        comment: order.comment.unwrap_or_default(),
        master_id: order.master_id.map(|m| m.to_string()).unwrap_or_default(),
        appointment_date: order
            .appointment_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        service_ids: services
            .iter()
            .map(|s| s.id.to_string())
            .collect::<Vec<_>>()
            .join(","),
    };

    OrderFormTemplate::load(
        &state,
        format!("Update order #{id}"),
        format!("/orders/{id}/update"),
        submission,
        ValidationErrors::default(),
        Some(order.status),
        Some(staff),
    )
    .await
}

/// Handle a staff edit submission.
#[instrument(skip(state, staff, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderUpdateForm>,
) -> Result<Response> {
    let (submission, status_raw) = form.into_parts();
    let status: OrderStatus = status_raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown order status: {status_raw}")))?;

    let booking = BookingService::new(state.pool());

    match booking.update_order(id, &submission, status).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, status = %order.status, "order updated");
            Ok(Redirect::to(&format!("/orders/{id}?updated=1")).into_response())
        }
        Err(BookingError::Invalid(errors)) => {
            let template = OrderFormTemplate::load(
                &state,
                format!("Update order #{id}"),
                format!("/orders/{id}/update"),
                submission,
                errors,
                Some(status),
                Some(staff),
            )
            .await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(BookingError::Repository(e)) => Err(e.into()),
    }
}
