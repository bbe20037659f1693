//! Service catalog route handlers.
//!
//! The catalog page is public; creating and editing services is for
//! staff with edit rights. Mutations invalidate the cached per-master
//! service lists so the booking form picks changes up immediately.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use clipjoint_core::ServiceId;

use crate::db::services::{ServiceInput, ServiceRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalStaff, RequireEditor};
use crate::models::CurrentStaff;
use crate::models::catalog::Service;
use crate::services::booking::ValidationErrors;
use crate::state::AppState;

/// Maximum accepted service name length.
const MAX_NAME_LENGTH: usize = 100;

/// Services list template.
#[derive(Template, WebTemplate)]
#[template(path = "services/index.html")]
pub struct ServicesIndexTemplate {
    pub services: Vec<Service>,
    pub staff: Option<CurrentStaff>,
}

/// Shared template for the create and edit forms.
#[derive(Template, WebTemplate)]
#[template(path = "services/form.html")]
pub struct ServiceFormTemplate {
    pub heading: String,
    pub action: String,
    pub form: ServiceForm,
    pub errors: ValidationErrors,
    pub staff: Option<CurrentStaff>,
}

/// Raw service form fields, exactly as the browser sent them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServiceForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub duration_minutes: String,
    /// Checkbox value; `on` when ticked, absent otherwise.
    #[serde(default)]
    pub is_popular: String,
}

impl ServiceForm {
    fn from_service(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            description: service.description.clone().unwrap_or_default(),
            price: service.price.to_string(),
            duration_minutes: service.duration_minutes.to_string(),
            is_popular: if service.is_popular {
                "on".to_owned()
            } else {
                String::new()
            },
        }
    }
}

/// Display the catalog.
pub async fn index(
    State(state): State<AppState>,
    OptionalStaff(staff): OptionalStaff,
) -> Result<ServicesIndexTemplate> {
    let services = ServiceRepository::new(state.pool()).list().await?;

    Ok(ServicesIndexTemplate { services, staff })
}

/// Display the empty create form.
pub async fn create_form(RequireEditor(staff): RequireEditor) -> ServiceFormTemplate {
    ServiceFormTemplate {
        heading: "Add a service".to_owned(),
        action: "/services/create".to_owned(),
        form: ServiceForm::default(),
        errors: ValidationErrors::default(),
        staff: Some(staff),
    }
}

/// Handle a create submission.
#[instrument(skip(state, staff, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    match validate(&form) {
        Ok(input) => {
            let service = ServiceRepository::new(state.pool()).create(&input).await?;
            state.invalidate_services();
            tracing::info!(service_id = %service.id, "service created");
            Ok(Redirect::to("/services").into_response())
        }
        Err(errors) => {
            let template = ServiceFormTemplate {
                heading: "Add a service".to_owned(),
                action: "/services/create".to_owned(),
                form,
                errors,
                staff: Some(staff),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Display the edit form, prefilled from the stored service.
#[instrument(skip(state, staff))]
pub async fn update_form(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<ServiceId>,
) -> Result<ServiceFormTemplate> {
    let service = ServiceRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;

    Ok(ServiceFormTemplate {
        heading: format!("Edit {}", service.name),
        action: format!("/services/{id}/update"),
        form: ServiceForm::from_service(&service),
        errors: ValidationErrors::default(),
        staff: Some(staff),
    })
}

/// Handle an edit submission.
#[instrument(skip(state, staff, form), fields(name = %form.name))]
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<ServiceId>,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    match validate(&form) {
        Ok(input) => {
            let service = ServiceRepository::new(state.pool())
                .update(id, &input)
                .await?;
            state.invalidate_services();
            tracing::info!(service_id = %service.id, "service updated");
            Ok(Redirect::to("/services").into_response())
        }
        Err(errors) => {
            let template = ServiceFormTemplate {
                heading: "Edit service".to_owned(),
                action: format!("/services/{id}/update"),
                form,
                errors,
                staff: Some(staff),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Check the form fields, collecting every problem at once.
fn validate(form: &ServiceForm) -> std::result::Result<ServiceInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = form.name.trim().to_owned();
    if name.is_empty() {
        errors.push("name", "Enter a service name.");
    } else if name.len() > MAX_NAME_LENGTH {
        errors.push(
            "name",
            format!("Name must be at most {MAX_NAME_LENGTH} characters."),
        );
    }

    let description = form.description.trim();
    let description = (!description.is_empty()).then(|| description.to_owned());

    let price = match form.price.trim().parse::<Decimal>() {
        Ok(price) if price <= Decimal::ZERO => {
            errors.push("price", "Price must be greater than zero.");
            Decimal::ZERO
        }
        Ok(price) => price,
        Err(_) => {
            errors.push("price", "Enter a valid price.");
            Decimal::ZERO
        }
    };

    let duration_minutes = match form.duration_minutes.trim().parse::<i32>() {
        Ok(minutes) if minutes <= 0 => {
            errors.push("duration_minutes", "Duration must be at least one minute.");
            0
        }
        Ok(minutes) => minutes,
        Err(_) => {
            errors.push("duration_minutes", "Enter the duration in minutes.");
            0
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ServiceInput {
        name,
        description,
        price,
        duration_minutes,
        is_popular: form.is_popular == "on",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ServiceForm {
        ServiceForm {
            name: "Beard trim".to_owned(),
            description: "Shape and line up".to_owned(),
            price: "700".to_owned(),
            duration_minutes: "30".to_owned(),
            is_popular: "on".to_owned(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let input = validate(&valid_form()).unwrap();

        assert_eq!(input.name, "Beard trim");
        assert_eq!(input.description.as_deref(), Some("Shape and line up"));
        assert_eq!(input.price, Decimal::from(700));
        assert_eq!(input.duration_minutes, 30);
        assert!(input.is_popular);
    }

    #[test]
    fn test_validate_treats_blank_description_as_none() {
        let mut form = valid_form();
        form.description = "   ".to_owned();
        form.is_popular = String::new();

        let input = validate(&form).unwrap();
        assert_eq!(input.description, None);
        assert!(!input.is_popular);
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let form = ServiceForm {
            name: String::new(),
            description: String::new(),
            price: "free".to_owned(),
            duration_minutes: "0".to_owned(),
            is_popular: String::new(),
        };

        let errors = validate(&form).unwrap_err();
        assert!(errors.field("name").is_some());
        assert!(errors.field("price").is_some());
        assert!(errors.field("duration_minutes").is_some());
    }

    #[test]
    fn test_validate_rejects_zero_price() {
        let mut form = valid_form();
        form.price = "0".to_owned();

        let errors = validate(&form).unwrap_err();
        assert_eq!(errors.field("price"), Some("Price must be greater than zero."));
    }
}
