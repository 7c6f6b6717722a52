//! Dashboard mode.

use serde::{Deserialize, Serialize};

use super::status::UserRole;

/// Which side of the dashboard a request is served for.
///
/// Admin mode sees every shop; vendor mode is scoped to the vendor's own
/// shops. Table and form factories branch on this to decide which columns,
/// fields and row actions appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Admin,
    Vendor,
}

impl Mode {
    /// Derive the dashboard mode from a user role.
    ///
    /// Returns `None` for roles that have no dashboard access.
    #[must_use]
    pub const fn for_role(role: UserRole) -> Option<Self> {
        match role {
            UserRole::Admin => Some(Self::Admin),
            UserRole::Vendor => Some(Self::Vendor),
            UserRole::Customer => None,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_role() {
        assert_eq!(Mode::for_role(UserRole::Admin), Some(Mode::Admin));
        assert_eq!(Mode::for_role(UserRole::Vendor), Some(Mode::Vendor));
        assert_eq!(Mode::for_role(UserRole::Customer), None);
    }
}
