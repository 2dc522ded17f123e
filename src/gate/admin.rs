//! Admin authorization gate.
//!
//! The decision depends only on the role claim of the identity resolved for
//! this request. Nothing carries over between requests.

use std::ops::ControlFlow;

use tracing::{debug, info};

use super::{Decision, StageResult};
use crate::i18n::Locale;
use crate::identity::{AdminAccess, Identity, Role};

/// Where the caller stands for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    Unauthenticated,
    FullAdmin,
    RestrictedRole(Role),
    NoAccess(Role),
}

impl AdminState {
    pub fn of(identity: Option<&Identity>) -> AdminState {
        match identity.and_then(|identity| identity.role) {
            None => AdminState::Unauthenticated,
            Some(role) => match role.admin_access() {
                AdminAccess::All => AdminState::FullAdmin,
                AdminAccess::Prefixes(_) => AdminState::RestrictedRole(role),
                AdminAccess::Denied => AdminState::NoAccess(role),
            },
        }
    }
}

/// Allow or redirect an admin-area request.
pub fn authorize(identity: Option<&Identity>, path: &str) -> StageResult {
    let allowed = match AdminState::of(identity) {
        AdminState::Unauthenticated => false,
        AdminState::FullAdmin => true,
        AdminState::RestrictedRole(role) => role.admin_access().permits(path),
        AdminState::NoAccess(_) => false,
    };

    if allowed {
        debug!("Admin access granted for {}", path);
        return ControlFlow::Continue(());
    }

    let role = identity.and_then(|identity| identity.role);
    info!(
        "Admin access denied for {} (role: {})",
        path,
        role.map(|r| r.as_claim()).unwrap_or("none")
    );
    ControlFlow::Break(Decision::Redirect(Locale::default_locale().home_path()))
}
