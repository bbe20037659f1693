//! Order management route handlers.
//!
//! This module contains handlers for the order list, detail view, full
//! edit form, and the single and bulk status actions.

mod actions;
mod detail;
mod edit;
mod list;
pub mod types;

pub use types::OrdersQuery;

pub use list::{OrdersIndexTemplate, index};

pub use detail::{DetailQuery, OrderShowTemplate, show};

pub use edit::{OrderEditTemplate, edit, edit_form};

pub use actions::{BulkStatusInput, StatusInput, bulk_status, set_status};
