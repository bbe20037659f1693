//! Session-related types.
//!
//! Types stored in the session for authentication state and the per-order
//! view-count flag.

use serde::{Deserialize, Serialize};

use clipjoint_core::{Email, OrderId, StaffRole, StaffUserId};

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
    use super::OrderId;

    /// Key for storing the current signed-in staff member.
    pub const CURRENT_STAFF: &str = "current_staff";

    /// Key marking an order's detail page as already viewed this session.
    ///
    /// The counter is only incremented when this key is absent.
    #[must_use]
    pub fn viewed_order(order_id: OrderId) -> String {
        format!("viewed_order:{order_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewed_order_key_is_per_order() {
        assert_eq!(keys::viewed_order(OrderId::new(7)), "viewed_order:7");
        assert_ne!(
            keys::viewed_order(OrderId::new(7)),
            keys::viewed_order(OrderId::new(8))
        );
    }
}
