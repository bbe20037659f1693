//! Console order editing.
//!
//! The edit form takes the same cross-field rules as the public booking
//! form: validation collects every problem in one pass, and the service
//! check names the full list of selected services the chosen master does
//! not offer rather than just the first mismatch. The console differs in
//! two ways: the status field is part of the submission, and inactive
//! masters are assignable.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use clipjoint_core::{OrderId, OrderStatus, Phone, ServiceId};

use crate::db::RepositoryError;
use crate::db::masters::MasterAdminRepository;
use crate::db::orders::{Order, OrderAdminRepository, OrderInput};
use crate::db::services::{Service, ServiceAdminRepository};

/// Maximum accepted customer name length.
const MAX_NAME_LENGTH: usize = 100;

/// Maximum accepted comment length.
const MAX_COMMENT_LENGTH: usize = 500;

/// Errors that can occur while rewriting an order from the console.
#[derive(Debug, Error)]
pub enum OrderEditError {
    /// The submission failed validation; the form should be shown again.
    #[error("validation failed")]
    Invalid(ValidationErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Raw console edit form fields, exactly as the browser sent them.
///
/// Everything is a string here; parsing is part of validation so that a
/// malformed value becomes a field message instead of a rejected request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OrderEditSubmission {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub comment: String,
    /// Master select value, empty when no master is assigned.
    #[serde(default)]
    pub master_id: String,
    /// Date input value in `YYYY-MM-DD` form, empty when unset.
    #[serde(default)]
    pub appointment_date: String,
    /// Comma-separated service ids from the hidden form field.
    #[serde(default)]
    pub service_ids: String,
    /// Status select value.
    #[serde(default)]
    pub status: String,
}

/// Validation messages keyed by form field.
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

/// A single field-level validation message.
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationErrors {
    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message recorded for a field, for inline display.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.message.as_str())
    }

    /// All messages in submission order, for the form-level summary.
    #[must_use]
    pub fn all(&self) -> &[FieldError] {
        &self.errors
    }
}

/// Console order edit service.
pub struct OrderEditService<'a> {
    masters: MasterAdminRepository<'a>,
    services: ServiceAdminRepository<'a>,
    orders: OrderAdminRepository<'a>,
}

impl<'a> OrderEditService<'a> {
    /// Create a new order edit service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            masters: MasterAdminRepository::new(pool),
            services: ServiceAdminRepository::new(pool),
            orders: OrderAdminRepository::new(pool),
        }
    }

    /// Validate a submission and rewrite an existing order.
    ///
    /// # Errors
    ///
    /// Returns `OrderEditError::Invalid` with every field problem found.
    /// Returns `OrderEditError::Repository` wrapping `NotFound` if the
    /// order does not exist.
    pub async fn update_order(
        &self,
        id: OrderId,
        submission: &OrderEditSubmission,
    ) -> Result<Order, OrderEditError> {
        let (input, status) = self.validate(submission).await?;
        let order = self.orders.update(id, &input, status).await?;
        Ok(order)
    }

    /// Run the full validation pass over a submission.
    async fn validate(
        &self,
        submission: &OrderEditSubmission,
    ) -> Result<(OrderInput, OrderStatus), OrderEditError> {
        let mut errors = ValidationErrors::default();

        let customer_name = submission.customer_name.trim().to_owned();
        if customer_name.is_empty() {
            errors.push("customer_name", "Enter the customer's name.");
        } else if customer_name.len() > MAX_NAME_LENGTH {
            errors.push(
                "customer_name",
                format!("Name must be at most {MAX_NAME_LENGTH} characters."),
            );
        }

        let phone = match Phone::parse(&submission.phone) {
            Ok(phone) => Some(phone),
            Err(err) => {
                errors.push("phone", err.to_string());
                None
            }
        };

        let comment = submission.comment.trim();
        if comment.len() > MAX_COMMENT_LENGTH {
            errors.push(
                "comment",
                format!("Comment must be at most {MAX_COMMENT_LENGTH} characters."),
            );
        }
        let comment = (!comment.is_empty()).then(|| comment.to_owned());

        let appointment_date = match submission.appointment_date.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("appointment_date", "Enter the date as YYYY-MM-DD.");
                    None
                }
            },
        };

        let status = match submission.status.trim().parse::<OrderStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.push("status", "Select a valid status.");
                None
            }
        };

        // Inactive masters are still assignable here, unlike the public form
        let master = match submission.master_id.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(id) => {
                    let master = self.masters.get(id.into()).await?;
                    if master.is_none() {
                        errors.push("master_id", "Select a valid master.");
                    }
                    master
                }
                Err(_) => {
                    errors.push("master_id", "Select a valid master.");
                    None
                }
            },
        };

        let mut service_ids = Vec::new();
        match parse_service_ids(&submission.service_ids) {
            Ok(ids) if ids.is_empty() => {
                errors.push("services", "Select at least one service.");
            }
            Ok(ids) => {
                let selected = self.services.list_by_ids(&ids).await?;
                if selected.len() != ids.len() {
                    errors.push("services", "Some selected services no longer exist.");
                } else if let Some(master) = &master {
                    let offered: HashSet<ServiceId> = self
                        .masters
                        .services_of(master.id)
                        .await?
                        .into_iter()
                        .map(|s| s.id)
                        .collect();
                    let offenders = services_not_offered(&selected, &offered);
                    if !offenders.is_empty() {
                        let names: Vec<&str> =
                            offenders.iter().map(|s| s.name.as_str()).collect();
                        errors.push(
                            "services",
                            format!(
                                "{} does not offer: {}.",
                                master.name,
                                names.join(", ")
                            ),
                        );
                    }
                }
                service_ids = ids;
            }
            Err(()) => {
                errors.push("services", "Select valid services.");
            }
        }

        if !errors.is_empty() {
            return Err(OrderEditError::Invalid(errors));
        }

        // Both are always Some here, each parse failure records an error
        let (Some(phone), Some(status)) = (phone, status) else {
            return Err(OrderEditError::Invalid(errors));
        };

        Ok((
            OrderInput {
                customer_name,
                phone,
                comment,
                master_id: master.map(|m| m.id),
                appointment_date,
                service_ids,
            },
            status,
        ))
    }
}

/// Parse a comma-separated id field assembled by the console JavaScript.
///
/// Empty segments are skipped, duplicates keep their first position. A
/// non-numeric segment fails the whole parse.
pub fn parse_service_ids(raw: &str) -> Result<Vec<ServiceId>, ()> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for segment in raw.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let id: i32 = segment.parse().map_err(|_| ())?;
        let id = ServiceId::from(id);
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Every selected service the master does not offer, in selection order.
fn services_not_offered<'s>(
    selected: &'s [Service],
    offered: &HashSet<ServiceId>,
) -> Vec<&'s Service> {
    selected
        .iter()
        .filter(|service| !offered.contains(&service.id))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn service(id: i32, name: &str) -> Service {
        Service {
            id: ServiceId::from(id),
            name: name.to_owned(),
            description: None,
            price: Decimal::new(80000, 2),
            duration_minutes: 45,
            is_popular: false,
        }
    }

    #[test]
    fn test_parse_service_ids_keeps_order_and_dedups() {
        let ids = parse_service_ids("4, 2,,4,9").unwrap();
        assert_eq!(
            ids,
            vec![ServiceId::from(4), ServiceId::from(2), ServiceId::from(9)]
        );
    }

    #[test]
    fn test_parse_service_ids_rejects_garbage() {
        assert!(parse_service_ids("4,x,9").is_err());
    }

    #[test]
    fn test_services_not_offered_reports_every_mismatch() {
        let selected = vec![
            service(1, "Fade"),
            service(2, "Beard trim"),
            service(3, "Hot towel shave"),
        ];
        let offered: HashSet<ServiceId> = [ServiceId::from(2)].into_iter().collect();

        let offenders = services_not_offered(&selected, &offered);
        let names: Vec<&str> = offenders.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Fade", "Hot towel shave"]);
    }

    #[test]
    fn test_validation_errors_field_lookup() {
        let mut errors = ValidationErrors::default();
        errors.push("status", "Select a valid status.");
        errors.push("services", "Select at least one service.");

        assert_eq!(errors.field("status"), Some("Select a valid status."));
        assert_eq!(errors.field("phone"), None);
        assert_eq!(errors.all().len(), 2);
    }
}
