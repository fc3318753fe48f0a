//! Rows the permission resolver reads. They are managed outside this system.

use serde::{Deserialize, Serialize};

use adminhub_core::{ModuleId, RoutePath, UserId};

use crate::Role;

/// `profiles` row: the user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub role: Role,
}

/// `app_modules` row: a named application area addressable by a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppModule {
    pub id: ModuleId,
    pub name: String,
    pub route: RoutePath,
}

/// `role_module_permissions` row.
///
/// At most one row per `(role, module_id)` is meaningful; with duplicates the
/// first one in store order wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleModulePermission {
    pub role: Role,
    pub module_id: ModuleId,
    pub can_view: bool,
}
