//! Master management route handlers.
//!
//! The edit form carries the offered-services assignment: a checkbox per
//! service, mirrored into a hidden comma-separated field by the console
//! JavaScript, exactly like the order service picker.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use clipjoint_core::{MasterId, Phone, ServiceId};

use crate::db::masters::{Master, MasterAdminRepository, MasterInput};
use crate::db::services::{Service, ServiceAdminRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireEditor, RequireStaff};
use crate::models::CurrentStaff;
use crate::services::orders::{ValidationErrors, parse_service_ids};
use crate::state::AppState;

/// Maximum accepted master name length.
const MAX_NAME_LENGTH: usize = 100;

/// Masters list template.
#[derive(Template, WebTemplate)]
#[template(path = "masters/index.html")]
pub struct MastersIndexTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    pub masters: Vec<Master>,
}

/// Shared template for the create and edit forms.
#[derive(Template, WebTemplate)]
#[template(path = "masters/form.html")]
pub struct MasterFormTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    pub heading: String,
    pub action: String,
    /// Every service, for the offered-services checkboxes.
    pub services: Vec<Service>,
    pub form: MasterForm,
    pub errors: ValidationErrors,
}

impl MasterFormTemplate {
    /// Whether a service id appears in the submitted comma-separated list.
    fn service_selected(&self, id: &ServiceId) -> bool {
        self.form
            .service_ids
            .split(',')
            .any(|segment| segment.trim() == id.to_string())
    }
}

/// Raw master form fields, exactly as the browser sent them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MasterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub experience_years: String,
    /// Checkbox value; `on` when ticked, absent otherwise.
    #[serde(default)]
    pub is_active: String,
    /// Comma-separated service ids from the hidden form field.
    #[serde(default)]
    pub service_ids: String,
}

impl MasterForm {
    fn from_master(master: &Master, service_ids: &[ServiceId]) -> Self {
        Self {
            name: master.name.clone(),
            phone: master.phone.to_string(),
            experience_years: master.experience_years.to_string(),
            is_active: if master.is_active {
                "on".to_owned()
            } else {
                String::new()
            },
            service_ids: service_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Display every master, active first.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<MastersIndexTemplate> {
    let masters = MasterAdminRepository::new(state.pool()).list_all().await?;

    Ok(MastersIndexTemplate {
        staff,
        current_path: "/masters",
        masters,
    })
}

/// Display the empty create form.
pub async fn create_form(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
) -> Result<MasterFormTemplate> {
    let services = ServiceAdminRepository::new(state.pool()).list().await?;

    Ok(MasterFormTemplate {
        staff,
        current_path: "/masters",
        heading: "Add a master".to_owned(),
        action: "/masters/create".to_owned(),
        services,
        form: MasterForm::default(),
        errors: ValidationErrors::default(),
    })
}

/// Handle a create submission.
#[instrument(skip(state, staff, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Form(form): Form<MasterForm>,
) -> Result<Response> {
    match validate(&state, &form).await? {
        Ok(input) => {
            let master = MasterAdminRepository::new(state.pool()).create(&input).await?;
            tracing::info!(master_id = %master.id, "master created");
            Ok(Redirect::to("/masters").into_response())
        }
        Err(errors) => {
            let services = ServiceAdminRepository::new(state.pool()).list().await?;
            let template = MasterFormTemplate {
                staff,
                current_path: "/masters",
                heading: "Add a master".to_owned(),
                action: "/masters/create".to_owned(),
                services,
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Display the edit form, prefilled from the stored master.
#[instrument(skip(state, staff))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<MasterId>,
) -> Result<MasterFormTemplate> {
    let repo = MasterAdminRepository::new(state.pool());

    let master = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("master {id}")))?;
    let offered = repo.service_ids_of(id).await?;
    let services = ServiceAdminRepository::new(state.pool()).list().await?;

    Ok(MasterFormTemplate {
        staff,
        current_path: "/masters",
        heading: format!("Edit {}", master.name),
        action: format!("/masters/{id}/edit"),
        services,
        form: MasterForm::from_master(&master, &offered),
        errors: ValidationErrors::default(),
    })
}

/// Handle an edit submission.
#[instrument(skip(state, staff, form), fields(name = %form.name))]
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(staff): RequireEditor,
    Path(id): Path<MasterId>,
    Form(form): Form<MasterForm>,
) -> Result<Response> {
    match validate(&state, &form).await? {
        Ok(input) => {
            let master = MasterAdminRepository::new(state.pool())
                .update(id, &input)
                .await?;
            tracing::info!(master_id = %master.id, "master updated");
            Ok(Redirect::to("/masters").into_response())
        }
        Err(errors) => {
            let services = ServiceAdminRepository::new(state.pool()).list().await?;
            let template = MasterFormTemplate {
                staff,
                current_path: "/masters",
                heading: "Edit master".to_owned(),
                action: format!("/masters/{id}/edit"),
                services,
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Delete a master from the list page.
#[instrument(skip(state, _staff))]
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_staff): RequireEditor,
    Path(id): Path<MasterId>,
) -> Result<Response> {
    MasterAdminRepository::new(state.pool()).delete(id).await?;

    tracing::info!(master_id = %id, "master deleted");
    Ok(Redirect::to("/masters").into_response())
}

/// Check the form fields, collecting every problem at once.
///
/// The outer `Result` is a database failure; the inner one is the usual
/// valid-or-messages split.
async fn validate(
    state: &AppState,
    form: &MasterForm,
) -> Result<std::result::Result<MasterInput, ValidationErrors>> {
    let mut errors = ValidationErrors::default();

    let name = form.name.trim().to_owned();
    if name.is_empty() {
        errors.push("name", "Enter the master's name.");
    } else if name.len() > MAX_NAME_LENGTH {
        errors.push(
            "name",
            format!("Name must be at most {MAX_NAME_LENGTH} characters."),
        );
    }

    let phone = match Phone::parse(&form.phone) {
        Ok(phone) => Some(phone),
        Err(err) => {
            errors.push("phone", err.to_string());
            None
        }
    };

    let experience_years = match form.experience_years.trim().parse::<i32>() {
        Ok(years) if years < 0 => {
            errors.push("experience_years", "Experience cannot be negative.");
            0
        }
        Ok(years) => years,
        Err(_) => {
            errors.push("experience_years", "Enter the experience in years.");
            0
        }
    };

    let service_ids = match parse_service_ids(&form.service_ids) {
        Ok(ids) => {
            if !ids.is_empty() {
                let found = ServiceAdminRepository::new(state.pool())
                    .list_by_ids(&ids)
                    .await?;
                if found.len() != ids.len() {
                    errors.push("services", "Some selected services no longer exist.");
                }
            }
            ids
        }
        Err(()) => {
            errors.push("services", "Select valid services.");
            Vec::new()
        }
    };

    if !errors.is_empty() {
        return Ok(Err(errors));
    }

    // Phone is always Some here, the parse failure above records an error
    let Some(phone) = phone else {
        return Ok(Err(errors));
    };

    Ok(Ok(MasterInput {
        name,
        phone,
        experience_years,
        is_active: form.is_active == "on",
        service_ids,
    }))
}
