//! Domain models for the site.

pub mod catalog;
pub mod order;
pub mod review;
pub mod session;
pub mod staff;

pub use catalog::{Master, Service};
pub use order::Order;
pub use review::Review;
pub use session::CurrentStaff;
pub use session::keys as session_keys;
pub use staff::StaffUser;
