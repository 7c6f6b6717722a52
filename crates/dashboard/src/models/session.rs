//! Session-related types for dashboard authentication.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, Mode, UserId, UserRole, VendorId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    /// Set for vendor users.
    pub vendor_id: Option<VendorId>,
}

impl CurrentUser {
    /// Dashboard mode, `None` for customers.
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        Mode::for_role(self.role)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Mode handed to the table and form factories. Everyone who is not an
    /// admin gets the vendor view; customers never pass `RequireDashboard`.
    #[must_use]
    pub const fn view_mode(&self) -> Mode {
        if self.is_admin() { Mode::Admin } else { Mode::Vendor }
    }

    /// Vendor scope applied to queries: `None` for admins (all shops).
    #[must_use]
    pub const fn vendor_scope(&self) -> Option<VendorId> {
        match self.role {
            UserRole::Admin => None,
            UserRole::Vendor | UserRole::Customer => self.vendor_id,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
