//! Domain models for the console.

pub mod session;

pub use session::CurrentStaff;
pub use session::keys as session_keys;
