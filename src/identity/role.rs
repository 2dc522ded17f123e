//! Role claims and the admin-area access policy.

use crate::i18n::routing::is_under;

/// Analytics dashboard, the only admin area open to media buyers
pub const ANALYTICS_PATH: &str = "/admin/analytics";

/// Access level carried by a verified identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full admin: every page under `/admin`
    Admin,
    /// Restricted analytics role: the analytics dashboard only
    MediaBuyer,
    /// Storefront shopper: no admin access
    Customer,
}

/// What part of the admin area a role may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    All,
    Prefixes(&'static [&'static str]),
    Denied,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::MediaBuyer, Role::Customer];

    /// Parse the `role` claim. Unrecognized values decode as no role.
    pub fn from_claim(claim: &str) -> Option<Role> {
        match claim {
            "ADMIN" => Some(Role::Admin),
            "MEDIA_BUYER" => Some(Role::MediaBuyer),
            "USER" => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn as_claim(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::MediaBuyer => "MEDIA_BUYER",
            Role::Customer => "USER",
        }
    }

    pub fn admin_access(&self) -> AdminAccess {
        match self {
            Role::Admin => AdminAccess::All,
            Role::MediaBuyer => AdminAccess::Prefixes(&[ANALYTICS_PATH]),
            Role::Customer => AdminAccess::Denied,
        }
    }
}

impl AdminAccess {
    pub fn permits(&self, path: &str) -> bool {
        match self {
            AdminAccess::All => true,
            AdminAccess::Prefixes(prefixes) => prefixes.iter().any(|prefix| is_under(path, prefix)),
            AdminAccess::Denied => false,
        }
    }
}
