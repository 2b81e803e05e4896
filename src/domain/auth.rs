//! Authenticated back-office user carried by bearer tokens.

use serde::{Deserialize, Serialize};

use crate::domain::collection::Collection;

/// Full access to every collection.
pub const ADMIN_ROLE: &str = "admin";
/// Pharmacist back-office access.
pub const PHARMACIST_ROLE: &str = "pharmacien";

/// Collections pharmacists may manage from their back-office.
pub const PHARMACIST_COLLECTIONS: [Collection; 2] = [Collection::Pharmacies, Collection::Formations];

/// Claims of a validated bearer token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
}

/// Returns `true` when `roles` contains `role`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }

    /// Whether the user may read and write documents of `collection`.
    pub fn can_manage(&self, collection: &Collection) -> bool {
        self.has_role(ADMIN_ROLE)
            || (self.has_role(PHARMACIST_ROLE) && PHARMACIST_COLLECTIONS.contains(collection))
    }
}
