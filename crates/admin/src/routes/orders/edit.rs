//! Order edit page handlers.
//!
//! The console edit form covers every order field including the status.
//! The service selection obeys the same rule as the public booking form:
//! every chosen service must be offered by the assigned master, and a
//! violation lists all offending services in one message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use clipjoint_core::{OrderId, OrderStatus, ServiceId};

use crate::db::masters::{Master, MasterAdminRepository};
use crate::db::orders::OrderAdminRepository;
use crate::db::services::{Service, ServiceAdminRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireEditor;
use crate::models::CurrentStaff;
use crate::services::orders::{OrderEditError, OrderEditService, OrderEditSubmission, ValidationErrors};
use crate::state::AppState;

/// Order edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/form.html")]
pub struct OrderEditTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    pub heading: String,
    pub action: String,
    /// Master dropdown entries, inactive ones included.
    pub masters: Vec<Master>,
    pub services: Vec<Service>,
    pub form: OrderEditSubmission,
    pub errors: ValidationErrors,
    pub statuses: &'static [OrderStatus],
}

impl OrderEditTemplate {
    /// Whether a service id appears in the submitted comma-separated list.
    fn service_selected(&self, id: &ServiceId) -> bool {
        self.form
            .service_ids
            .split(',')
            .any(|segment| segment.trim() == id.to_string())
    }

    /// Whether this status option matches the submitted value.
    fn status_selected(&self, status: &OrderStatus) -> bool {
        self.form.status == status.as_str()
    }

    /// Whether this master option matches the submitted value.
    fn master_selected(&self, master: &Master) -> bool {
        self.form.master_id == master.id.to_string()
    }

    /// Assemble the form template with fresh master and service lists.
    async fn load(
        state: &AppState,
        id: OrderId,
        form: OrderEditSubmission,
        errors: ValidationErrors,
        staff: CurrentStaff,
    ) -> Result<Self> {
        let masters = MasterAdminRepository::new(state.pool()).list_all().await?;
        let services = ServiceAdminRepository::new(state.pool()).list().await?;

        Ok(Self {
            staff,
            current_path: "/orders",
            heading: format!("Edit order #{id}"),
            action: format!("/orders/{id}/edit"),
            masters,
            services,
            form,
            errors,
            statuses: &OrderStatus::ALL,
        })
    }
}

/// Display the edit form, prefilled from the stored order.
#[instrument(skip(state, staff))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<OrderId>,
) -> Result<OrderEditTemplate> {
    let repo = OrderAdminRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let services = repo.services_for(id).await?;

    let submission = OrderEditSubmission {
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
        status: order.status.as_str().to_owned(),
    };

    OrderEditTemplate::load(&state, id, submission, ValidationErrors::default(), staff).await
}

/// Handle an edit submission.
///
/// On success redirects to the detail page; on validation failure the form
/// is shown again with every field message and the submitted values kept
/// in place.
#[instrument(skip(state, staff, form))]
pub async fn edit(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderEditSubmission>,
) -> Result<Response> {
    let service = OrderEditService::new(state.pool());

    match service.update_order(id, &form).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, status = %order.status, "order updated");
            Ok(Redirect::to(&format!("/orders/{id}?updated=1")).into_response())
        }
        Err(OrderEditError::Invalid(errors)) => {
            let template = OrderEditTemplate::load(&state, id, form, errors, staff).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(OrderEditError::Repository(e)) => Err(e.into()),
    }
}
