//! Master and service models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clipjoint_core::{MasterId, Phone, ServiceId};

/// A barber offering services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Master {
    /// Database ID.
    pub id: MasterId,
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: Phone,
    /// Years of experience, shown on the landing page.
    pub experience_years: i32,
    /// Inactive masters are hidden from the booking form.
    pub is_active: bool,
}

/// A bookable service from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Database ID.
    pub id: ServiceId,
    /// Display name.
    pub name: String,
    /// Longer description for the catalog page.
    pub description: Option<String>,
    /// Price with two decimal places.
    pub price: Decimal,
    /// Appointment length in minutes.
    pub duration_minutes: i32,
    /// Popular services are listed first on the landing page.
    pub is_popular: bool,
}
