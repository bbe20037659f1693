//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Staff password authentication
//! - `booking` - Order intake and cross-field validation
//! - `moderation` - Review text classification client
//! - `uploads` - Review photo storage

pub mod auth;
pub mod booking;
pub mod moderation;
pub mod uploads;

pub use auth::{AuthError, StaffAuthService};
pub use booking::{BookingError, BookingService, OrderSubmission, ValidationErrors};
pub use moderation::{ModerationClient, ModerationError, ModerationVerdict};
