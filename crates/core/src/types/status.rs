//! Status and role enums for marketplace entities.
//!
//! Each enum maps to a PostgreSQL enum type of the same snake_case values and
//! round-trips through `Display` / `FromStr` for query parameters and CLI
//! arguments.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a variant of a status enum.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $pg:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "postgres", derive(sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(type_name = $pg, rename_all = "snake_case"))]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The snake_case name used on the wire and in the database.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Account role of a user.
    UserRole, "user role", "user_role" {
        /// Platform operator with access to every shop.
        Admin => "admin",
        /// Seller managing their own shops.
        Vendor => "vendor",
        /// Storefront shopper; cannot sign in to the dashboard.
        Customer => "customer",
    }
}

text_enum! {
    /// Onboarding state of a vendor (tenant).
    VendorStatus, "vendor status", "vendor_status" {
        Pending => "pending",
        Approved => "approved",
        Suspended => "suspended",
    }
}

text_enum! {
    /// Fulfilment state of an order.
    OrderStatus, "order status", "order_status" {
        Pending => "pending",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
        Refunded => "refunded",
    }
}

text_enum! {
    /// Payment state of an order.
    PaymentStatus, "payment status", "payment_status" {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
        Refunded => "refunded",
    }
}

text_enum! {
    /// State of a payment transaction.
    TransactionStatus, "transaction status", "transaction_status" {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
}

text_enum! {
    /// How a coupon's `discount_value` is applied.
    DiscountType, "discount type", "discount_type" {
        /// Percentage off the order subtotal, in `(0, 100]`.
        Percentage => "percentage",
        /// Fixed amount off the order subtotal.
        Fixed => "fixed",
    }
}

impl UserRole {
    /// Whether users with this role may sign in to the dashboard.
    #[must_use]
    pub const fn can_use_dashboard(self) -> bool {
        matches!(self, Self::Admin | Self::Vendor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), *status);
        }
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), *role);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "shipped-ish".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "order status");
        assert_eq!(err.to_string(), "invalid order status: shipped-ish");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
        let parsed: VendorStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(parsed, VendorStatus::Suspended);
    }

    #[test]
    fn test_dashboard_roles() {
        assert!(UserRole::Admin.can_use_dashboard());
        assert!(UserRole::Vendor.can_use_dashboard());
        assert!(!UserRole::Customer.can_use_dashboard());
    }
}
