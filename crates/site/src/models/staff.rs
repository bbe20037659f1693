//! Staff account model.

use chrono::{DateTime, Utc};

use clipjoint_core::{Email, StaffRole, StaffUserId};

/// A staff account, shared by the site's staff pages and the console.
///
/// Not serializable: sessions store [`super::CurrentStaff`] instead, so the
/// password hash never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct StaffUser {
    /// Database ID.
    pub id: StaffUserId,
    /// Sign-in email, unique.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Argon2id PHC hash.
    pub password_hash: String,
    /// Permission level.
    pub role: StaffRole,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
