//! Booking order model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use clipjoint_core::{MasterId, OrderId, OrderStatus, Phone};

/// A customer booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Database ID.
    pub id: OrderId,
    /// Name the customer gave on the form.
    pub customer_name: String,
    /// Contact phone.
    pub phone: Phone,
    /// Free-form note from the customer.
    pub comment: Option<String>,
    /// Workflow status.
    pub status: OrderStatus,
    /// Chosen master, if any.
    pub master_id: Option<MasterId>,
    /// Requested appointment date, if any.
    pub appointment_date: Option<NaiveDate>,
    /// Detail-page views, counted once per session.
    pub view_count: i32,
    /// When the order was submitted.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
