//! Explicit back-office session passed to admin calls.

use chrono::Utc;

use crate::domain::auth::{ADMIN_ROLE, AuthenticatedUser};
use crate::domain::collection::Collection;

/// Bearer token plus the user it was issued for.
///
/// The server re-validates the token on every call; the helpers here only
/// decide what the back-office should offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user: AuthenticatedUser,
}

impl Session {
    pub fn new(token: impl Into<String>, user: AuthenticatedUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    pub fn is_admin(&self) -> bool {
        self.user.has_role(ADMIN_ROLE)
    }

    pub fn can_manage(&self, collection: &Collection) -> bool {
        self.user.can_manage(collection)
    }

    /// Whether the token expiry has passed according to the local clock.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        self.user.exp <= now
    }
}
