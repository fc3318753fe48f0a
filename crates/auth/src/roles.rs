use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC (`profiles.role`).
///
/// Roles are opaque strings; only the admin role has built-in meaning. Every
/// other role is resolved through `role_module_permissions` rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The privileged role: bypasses table lookups and sees every menu route.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_matched_by_name() {
        assert!(Role::new("admin").is_admin());
        assert!(Role::ADMIN.is_admin());
        assert!(!Role::new("Admin").is_admin());
        assert!(!Role::new("manager").is_admin());
    }
}
