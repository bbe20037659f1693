//! Status enums for orders, reviews, and staff accounts.
//!
//! Statuses are persisted as TEXT and parsed back through [`std::str::FromStr`]
//! at the repository boundary, so the database never needs custom enum types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Just submitted, not yet reviewed by staff.
    #[default]
    New,
    /// Confirmed by staff; the customer has an appointment.
    Confirmed,
    /// The appointment took place.
    Completed,
    /// Canceled by either side.
    Canceled,
}

impl OrderStatus {
    /// All statuses, in workflow order. Used to build filter and select options.
    pub const ALL: [Self; 4] = [Self::New, Self::Confirmed, Self::Completed, Self::Canceled];

    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Moderation status of a customer review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting moderation; the classifier has not run (or failed).
    #[default]
    Pending,
    /// The classifier found nothing objectionable.
    AiApproved,
    /// The classifier flagged the text.
    AiRejected,
    /// Published by staff.
    Published,
}

impl ReviewStatus {
    /// All statuses. Used to build filter and select options.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::AiApproved,
        Self::AiRejected,
        Self::Published,
    ];

    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AiApproved => "ai_approved",
            Self::AiRejected => "ai_rejected",
            Self::Published => "published",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::AiApproved => "AI approved",
            Self::AiRejected => "AI rejected",
            Self::Published => "Published",
        }
    }

    /// Whether reviews with this status appear on the public site.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::AiApproved | Self::Published)
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ai_approved" => Ok(Self::AiApproved),
            "ai_rejected" => Ok(Self::AiRejected),
            "published" => Ok(Self::Published),
            _ => Err(format!("invalid review status: {s}")),
        }
    }
}

/// Staff role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    /// Full access, including staff account management.
    Admin,
    /// Can edit orders, services, masters, and reviews.
    Manager,
    /// Read-only access to staff pages.
    Viewer,
}

impl StaffRole {
    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Viewer => "viewer",
        }
    }

    /// Whether this role may mutate records.
    #[must_use]
    pub const fn can_edit(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid staff role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_review_status_roundtrip() {
        for status in ReviewStatus::ALL {
            assert_eq!(status.as_str().parse::<ReviewStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_review_visibility() {
        assert!(ReviewStatus::AiApproved.is_public());
        assert!(ReviewStatus::Published.is_public());
        assert!(!ReviewStatus::Pending.is_public());
        assert!(!ReviewStatus::AiRejected.is_public());
    }

    #[test]
    fn test_staff_role_roundtrip() {
        for role in [StaffRole::Admin, StaffRole::Manager, StaffRole::Viewer] {
            assert_eq!(role.as_str().parse::<StaffRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_staff_role_permissions() {
        assert!(StaffRole::Admin.can_edit());
        assert!(StaffRole::Manager.can_edit());
        assert!(!StaffRole::Viewer.can_edit());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ReviewStatus::AiApproved).unwrap();
        assert_eq!(json, "\"ai_approved\"");
    }
}
