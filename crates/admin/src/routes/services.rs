//! Service catalog management route handlers.

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

use crate::db::services::{Service, ServiceAdminRepository, ServiceInput};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireEditor, RequireStaff};
use crate::models::CurrentStaff;
use crate::services::orders::ValidationErrors;
use crate::state::AppState;

/// Maximum accepted service name length.
const MAX_NAME_LENGTH: usize = 100;

/// Services list template.
#[derive(Template, WebTemplate)]
#[template(path = "services/index.html")]
pub struct ServicesIndexTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    pub services: Vec<Service>,
}

/// Shared template for the create and edit forms.
#[derive(Template, WebTemplate)]
#[template(path = "services/form.html")]
pub struct ServiceFormTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    pub heading: String,
    pub action: String,
    pub form: ServiceForm,
    pub errors: ValidationErrors,
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

/// Display the catalog table.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<ServicesIndexTemplate> {
    let services = ServiceAdminRepository::new(state.pool()).list().await?;

    Ok(ServicesIndexTemplate {
        staff,
        current_path: "/services",
        services,
    })
}

/// Display the empty create form.
pub async fn create_form(RequireEditor(staff): RequireEditor) -> ServiceFormTemplate {
    ServiceFormTemplate {
        staff,
        current_path: "/services",
        heading: "Add a service".to_owned(),
        action: "/services/create".to_owned(),
        form: ServiceForm::default(),
        errors: ValidationErrors::default(),
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
            let service = ServiceAdminRepository::new(state.pool())
                .create(&input)
                .await?;
            tracing::info!(service_id = %service.id, "service created");
            Ok(Redirect::to("/services").into_response())
        }
        Err(errors) => {
            let template = ServiceFormTemplate {
                staff,
                current_path: "/services",
                heading: "Add a service".to_owned(),
                action: "/services/create".to_owned(),
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Display the edit form, prefilled from the stored service.
#[instrument(skip(state, staff))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<ServiceId>,
) -> Result<ServiceFormTemplate> {
    let service = ServiceAdminRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;

    Ok(ServiceFormTemplate {
        staff,
        current_path: "/services",
        heading: format!("Edit {}", service.name),
        action: format!("/services/{id}/edit"),
        form: ServiceForm::from_service(&service),
        errors: ValidationErrors::default(),
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
            let service = ServiceAdminRepository::new(state.pool())
                .update(id, &input)
                .await?;
            tracing::info!(service_id = %service.id, "service updated");
            Ok(Redirect::to("/services").into_response())
        }
        Err(errors) => {
            let template = ServiceFormTemplate {
                staff,
                current_path: "/services",
                heading: "Edit service".to_owned(),
                action: format!("/services/{id}/edit"),
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Delete a service from the list page.
#[instrument(skip(state, _staff))]
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_staff): RequireEditor,
    Path(id): Path<ServiceId>,
) -> Result<Response> {
    ServiceAdminRepository::new(state.pool()).delete(id).await?;

    tracing::info!(service_id = %id, "service deleted");
    Ok(Redirect::to("/services").into_response())
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
            name: "Hot towel shave".to_owned(),
            description: "Straight razor with a hot towel finish".to_owned(),
            price: "1200".to_owned(),
            duration_minutes: "40".to_owned(),
            is_popular: String::new(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let input = validate(&valid_form()).unwrap();

        assert_eq!(input.name, "Hot towel shave");
        assert_eq!(input.price, Decimal::from(1200));
        assert_eq!(input.duration_minutes, 40);
        assert!(!input.is_popular);
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let form = ServiceForm {
            name: String::new(),
            description: String::new(),
            price: "-5".to_owned(),
            duration_minutes: "soon".to_owned(),
            is_popular: String::new(),
        };

        let errors = validate(&form).unwrap_err();
        assert!(errors.field("name").is_some());
        assert!(errors.field("price").is_some());
        assert!(errors.field("duration_minutes").is_some());
    }
}
