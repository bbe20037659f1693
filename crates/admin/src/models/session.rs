//! Session-stored types for console authentication.

use serde::{Deserialize, Serialize};

use clipjoint_core::{Email, StaffRole, StaffUserId};

/// Session-stored staff identity.
///
/// Minimal data stored in the session to identify the signed-in staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStaff {
    /// Staff user's database ID.
    pub id: StaffUserId,
    /// Staff user's email address.
    pub email: Email,
    /// Display name for the header.
    pub name: String,
    /// Permission level.
    pub role: StaffRole,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in staff member.
    pub const CURRENT_STAFF: &str = "current_staff";
}
