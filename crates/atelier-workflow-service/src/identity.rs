//! Identity collaborator
//!
//! The engine itself never authorizes; role checks gate which dashboard
//! screens can reach it. This module is the narrow contract the surrounding
//! application implements against its auth provider.

use serde::{Deserialize, Serialize};

/// Dashboard role of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shop owner running their own automations
    Seller,
    /// Staff managing stores and automations across tenants
    Admin,
    /// Staff with platform-wide administration rights
    Superadmin,
}

impl Role {
    /// Whether this role may open the automation builder
    pub fn can_manage_automations(&self) -> bool {
        matches!(self, Role::Seller | Role::Admin | Role::Superadmin)
    }

    /// Whether this role may administer other tenants' stores
    pub fn can_administer_tenants(&self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }
}

/// The signed-in user as seen by the service layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub role: Role,
}

/// Source of the current session's identity
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or None for an anonymous session
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Fixed identity, for tests and single-user deployments
pub struct StaticIdentity(Option<UserIdentity>);

impl StaticIdentity {
    /// Provider always answering with the given user
    pub fn signed_in(id: impl Into<String>, role: Role) -> Self {
        Self(Some(UserIdentity {
            id: id.into(),
            role,
        }))
    }

    /// Provider with no signed-in user
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_gates() {
        assert!(Role::Seller.can_manage_automations());
        assert!(!Role::Seller.can_administer_tenants());
        assert!(Role::Admin.can_administer_tenants());
        assert!(Role::Superadmin.can_administer_tenants());
    }

    #[test]
    fn test_static_identity() {
        let provider = StaticIdentity::signed_in("u-1", Role::Admin);
        let user = provider.current_user().unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.role, Role::Admin);

        assert!(StaticIdentity::anonymous().current_user().is_none());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(Role::Superadmin).unwrap();
        assert_eq!(json, "superadmin");
    }
}
