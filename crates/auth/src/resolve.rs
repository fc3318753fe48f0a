//! Route permission resolution.
//!
//! One contract feeds both the sidebar filter and the route guard:
//! - admin sees every menu route and may open any route
//! - any other role sees exactly the routes of modules it holds a
//!   `can_view = true` row for; no row means denied
//!
//! No IO, no panics. Callers do the lookups and degrade failures to denial.

use serde::Serialize;

use adminhub_core::RoutePath;

use crate::{AppModule, MenuItem, Role, RoleModulePermission};

/// Ordered, de-duplicated set of routes a role may open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AllowedRoutes {
    routes: Vec<RoutePath>,
}

impl AllowedRoutes {
    /// No access at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, route: &RoutePath) -> bool {
        self.routes.contains(route)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePath> {
        self.routes.iter()
    }

    /// First entry of `menu`, in declaration order, whose route is allowed.
    pub fn first_in<'m>(&self, menu: &'m [MenuItem]) -> Option<&'m MenuItem> {
        menu.iter().find(|item| self.contains(&item.url))
    }
}

impl FromIterator<RoutePath> for AllowedRoutes {
    fn from_iter<I: IntoIterator<Item = RoutePath>>(iter: I) -> Self {
        let mut routes: Vec<RoutePath> = Vec::new();
        for route in iter {
            if !routes.contains(&route) {
                routes.push(route);
            }
        }
        Self { routes }
    }
}

/// Outcome of checking one target route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum RouteDecision {
    Allowed,
    /// Denied, but another menu route is allowed: navigate there instead.
    Redirect(RoutePath),
    /// Denied with nowhere to go.
    Blocked,
}

/// First grant for `module` held by `role`, in store order.
fn grant_for<'g>(
    role: &Role,
    module: &AppModule,
    grants: &'g [RoleModulePermission],
) -> Option<&'g RoleModulePermission> {
    grants
        .iter()
        .find(|g| g.module_id == module.id && &g.role == role)
}

fn module_viewable(role: &Role, module: &AppModule, grants: &[RoleModulePermission]) -> bool {
    grant_for(role, module, grants).is_some_and(|g| g.can_view)
}

/// Resolve the routes `role` may open.
///
/// Admin short-circuits to every route of `menu`; `modules` and `grants` are
/// ignored. Otherwise the result follows module order.
pub fn allowed_routes(
    role: &Role,
    menu: &[MenuItem],
    modules: &[AppModule],
    grants: &[RoleModulePermission],
) -> AllowedRoutes {
    if role.is_admin() {
        return menu.iter().map(|item| item.url.clone()).collect();
    }

    modules
        .iter()
        .filter(|module| module_viewable(role, module, grants))
        .map(|module| module.route.clone())
        .collect()
}

/// Decide what happens when a user with `role` opens `target`.
///
/// `role = None` means no profile was found, which is treated as no access.
pub fn decide_route(
    role: Option<&Role>,
    target: &RoutePath,
    allowed: &AllowedRoutes,
    menu: &[MenuItem],
) -> RouteDecision {
    let Some(role) = role else {
        return RouteDecision::Blocked;
    };

    if role.is_admin() || allowed.contains(target) {
        return RouteDecision::Allowed;
    }

    match allowed.first_in(menu) {
        Some(item) => RouteDecision::Redirect(item.url.clone()),
        None => RouteDecision::Blocked,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Route Access Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a route was allowed, redirected or blocked.
#[derive(Debug, Clone, Serialize)]
pub struct RouteAccessExplanation {
    pub route: RoutePath,
    pub role: Option<Role>,
    pub decision: RouteDecision,
    pub reason: String,
    pub admin_bypass: bool,
    pub matched_module: Option<AppModule>,
    pub matched_grant: Option<RoleModulePermission>,
    pub allowed_routes: AllowedRoutes,
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NoProfile,
    NoModuleForRoute,
    NoPermissionRow,
    ViewNotGranted,
    LookupFailed,
}

impl RouteAccessExplanation {
    /// Blocked explanation for when the profile, module or grant lookup failed.
    pub fn lookup_failed(target: &RoutePath, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            route: target.clone(),
            role: None,
            decision: RouteDecision::Blocked,
            reason: "Permission lookup failed; access is denied".to_string(),
            admin_bypass: false,
            matched_module: None,
            matched_grant: None,
            allowed_routes: AllowedRoutes::none(),
            denial_reason: Some(DenialReason {
                kind: DenialKind::LookupFailed,
                message: error,
                suggestions: vec!["Check that the permission store is reachable".to_string()],
            }),
        }
    }
}

/// Explain the decision [`decide_route`] makes for the same inputs.
pub fn explain_route_access(
    role: Option<&Role>,
    target: &RoutePath,
    menu: &[MenuItem],
    modules: &[AppModule],
    grants: &[RoleModulePermission],
) -> RouteAccessExplanation {
    let Some(role) = role else {
        return RouteAccessExplanation {
            route: target.clone(),
            role: None,
            decision: RouteDecision::Blocked,
            reason: "No profile found for the user".to_string(),
            admin_bypass: false,
            matched_module: None,
            matched_grant: None,
            allowed_routes: AllowedRoutes::none(),
            denial_reason: Some(DenialReason {
                kind: DenialKind::NoProfile,
                message: "The user has no row in 'profiles', so no role can be resolved"
                    .to_string(),
                suggestions: vec!["Create a profile with a role for this user".to_string()],
            }),
        };
    };

    let allowed = allowed_routes(role, menu, modules, grants);
    let decision = decide_route(Some(role), target, &allowed, menu);

    if role.is_admin() {
        return RouteAccessExplanation {
            route: target.clone(),
            role: Some(role.clone()),
            decision,
            reason: format!("Role '{role}' is the admin role and bypasses permission lookups"),
            admin_bypass: true,
            matched_module: None,
            matched_grant: None,
            allowed_routes: allowed,
            denial_reason: None,
        };
    }

    // Prefer the module that actually grants the route when several share it.
    let candidates: Vec<&AppModule> = modules.iter().filter(|m| &m.route == target).collect();
    let matched_module = candidates
        .iter()
        .find(|m| module_viewable(role, m, grants))
        .or_else(|| candidates.first())
        .copied();
    let matched_grant = matched_module.and_then(|m| grant_for(role, m, grants));

    let denial_reason = match (matched_module, matched_grant) {
        _ if decision == RouteDecision::Allowed => None,
        (None, _) => Some(DenialReason {
            kind: DenialKind::NoModuleForRoute,
            message: format!("No module in 'app_modules' is addressed by '{target}'"),
            suggestions: vec![format!("Register a module with route '{target}'")],
        }),
        (Some(module), None) => Some(DenialReason {
            kind: DenialKind::NoPermissionRow,
            message: format!("Role '{role}' has no permission row for module '{}'", module.name),
            suggestions: vec![format!(
                "Add a 'role_module_permissions' row for role '{role}' and module '{}' \
                 with can_view = true",
                module.name
            )],
        }),
        (Some(module), Some(_)) => Some(DenialReason {
            kind: DenialKind::ViewNotGranted,
            message: format!("Role '{role}' has can_view = false for module '{}'", module.name),
            suggestions: vec![format!(
                "Set can_view = true for role '{role}' on module '{}'",
                module.name
            )],
        }),
    };

    let reason = match &decision {
        RouteDecision::Allowed => format!("Role '{role}' may view the module routed at '{target}'"),
        RouteDecision::Redirect(to) => {
            format!("Role '{role}' may not open '{target}'; first allowed menu route is '{to}'")
        }
        RouteDecision::Blocked => {
            format!("Role '{role}' may not open '{target}' or any menu route")
        }
    };

    RouteAccessExplanation {
        route: target.clone(),
        role: Some(role.clone()),
        decision,
        reason,
        admin_bypass: false,
        matched_module: matched_module.cloned(),
        matched_grant: matched_grant.cloned(),
        allowed_routes: allowed,
        denial_reason,
    }
}

#[cfg(test)]
mod tests {
    use adminhub_core::ModuleId;
    use proptest::prelude::*;

    use super::*;
    use crate::MENU;

    fn route(s: &'static str) -> RoutePath {
        RoutePath::from_static(s)
    }

    fn module(name: &str, r: &'static str) -> AppModule {
        AppModule {
            id: ModuleId::new(),
            name: name.to_string(),
            route: route(r),
        }
    }

    fn grant(role: &Role, module: &AppModule, can_view: bool) -> RoleModulePermission {
        RoleModulePermission {
            role: role.clone(),
            module_id: module.id,
            can_view,
        }
    }

    fn routes(allowed: &AllowedRoutes) -> Vec<&str> {
        allowed.iter().map(|r| r.as_str()).collect()
    }

    #[test]
    fn admin_gets_every_menu_route_regardless_of_rows() {
        let reports = module("reports", "/reports");
        let grants = vec![grant(&Role::ADMIN, &reports, false)];

        let allowed = allowed_routes(&Role::ADMIN, &MENU, &[reports], &grants);

        assert_eq!(allowed.len(), MENU.len());
        assert!(MENU.iter().all(|item| allowed.contains(&item.url)));
    }

    #[test]
    fn non_admin_is_whitelisted_by_can_view_rows() {
        let role = Role::new("analyst");
        let dashboard = module("dashboard", "/dashboard");
        let reports = module("reports", "/reports");
        let users = module("users", "/users");
        let grants = vec![grant(&role, &dashboard, true), grant(&role, &reports, false)];

        let allowed = allowed_routes(&role, &MENU, &[dashboard, reports, users], &grants);

        assert_eq!(routes(&allowed), vec!["/dashboard"]);
    }

    #[test]
    fn rows_for_other_roles_do_not_leak() {
        let role = Role::new("analyst");
        let reports = module("reports", "/reports");
        let grants = vec![grant(&Role::new("manager"), &reports, true)];

        assert!(allowed_routes(&role, &MENU, &[reports], &grants).is_empty());
    }

    #[test]
    fn first_duplicate_row_wins() {
        let role = Role::new("analyst");
        let reports = module("reports", "/reports");
        let grants = vec![grant(&role, &reports, false), grant(&role, &reports, true)];

        assert!(allowed_routes(&role, &MENU, &[reports], &grants).is_empty());
    }

    #[test]
    fn allowed_set_follows_module_order_without_duplicates() {
        let role = Role::new("analyst");
        let settings = module("settings", "/settings");
        let dashboard = module("dashboard", "/dashboard");
        let dashboard_alias = module("home", "/dashboard");
        let grants = vec![
            grant(&role, &settings, true),
            grant(&role, &dashboard, true),
            grant(&role, &dashboard_alias, true),
        ];

        let modules = [settings, dashboard, dashboard_alias];
        let allowed = allowed_routes(&role, &MENU, &modules, &grants);

        assert_eq!(routes(&allowed), vec!["/settings", "/dashboard"]);
    }

    #[test]
    fn denied_route_redirects_to_first_allowed_menu_route() {
        let role = Role::new("analyst");
        // Allowed in reverse menu order; the redirect must follow menu order.
        let allowed: AllowedRoutes =
            [route("/settings"), route("/dashboard")].into_iter().collect();

        let decision = decide_route(Some(&role), &route("/reports"), &allowed, &MENU);

        assert_eq!(decision, RouteDecision::Redirect(route("/dashboard")));
    }

    #[test]
    fn no_allowed_route_blocks() {
        let role = Role::new("analyst");
        let decision = decide_route(Some(&role), &route("/reports"), &AllowedRoutes::none(), &MENU);
        assert_eq!(decision, RouteDecision::Blocked);
    }

    #[test]
    fn allowed_route_outside_menu_never_becomes_redirect_target() {
        let role = Role::new("analyst");
        let allowed: AllowedRoutes = [route("/internal-tools")].into_iter().collect();

        let decision = decide_route(Some(&role), &route("/reports"), &allowed, &MENU);

        assert_eq!(decision, RouteDecision::Blocked);
    }

    #[test]
    fn missing_profile_blocks() {
        let allowed: AllowedRoutes = [route("/dashboard")].into_iter().collect();
        assert_eq!(
            decide_route(None, &route("/dashboard"), &allowed, &MENU),
            RouteDecision::Blocked
        );
    }

    #[test]
    fn admin_may_open_routes_outside_the_menu() {
        let allowed = allowed_routes(&Role::ADMIN, &MENU, &[], &[]);
        assert_eq!(
            decide_route(Some(&Role::ADMIN), &route("/companies/new"), &allowed, &MENU),
            RouteDecision::Allowed
        );
    }

    #[test]
    fn explanation_names_missing_row() {
        let role = Role::new("analyst");
        let dashboard = module("dashboard", "/dashboard");
        let reports = module("reports", "/reports");
        let grants = vec![grant(&role, &dashboard, true)];

        let modules = [dashboard, reports];
        let explanation =
            explain_route_access(Some(&role), &route("/reports"), &MENU, &modules, &grants);

        assert_eq!(explanation.decision, RouteDecision::Redirect(route("/dashboard")));
        assert_eq!(explanation.matched_module.unwrap().name, "reports");
        assert!(explanation.matched_grant.is_none());
        assert_eq!(explanation.denial_reason.unwrap().kind, DenialKind::NoPermissionRow);
    }

    #[test]
    fn explanation_distinguishes_view_not_granted_and_unknown_route() {
        let role = Role::new("analyst");
        let reports = module("reports", "/reports");
        let grants = vec![grant(&role, &reports, false)];
        let modules = [reports];

        let denied =
            explain_route_access(Some(&role), &route("/reports"), &MENU, &modules, &grants);
        assert_eq!(denied.denial_reason.unwrap().kind, DenialKind::ViewNotGranted);
        assert_eq!(denied.decision, RouteDecision::Blocked);

        let unknown =
            explain_route_access(Some(&role), &route("/nowhere"), &MENU, &modules, &grants);
        assert_eq!(unknown.denial_reason.unwrap().kind, DenialKind::NoModuleForRoute);
    }

    #[test]
    fn explanation_reports_admin_bypass_and_missing_profile() {
        let admin = explain_route_access(Some(&Role::ADMIN), &route("/reports"), &MENU, &[], &[]);
        assert!(admin.admin_bypass);
        assert_eq!(admin.decision, RouteDecision::Allowed);
        assert!(admin.denial_reason.is_none());

        let nobody = explain_route_access(None, &route("/reports"), &MENU, &[], &[]);
        assert_eq!(nobody.decision, RouteDecision::Blocked);
        assert_eq!(nobody.denial_reason.unwrap().kind, DenialKind::NoProfile);
    }

    #[test]
    fn failed_lookup_explains_as_blocked() {
        let explanation = RouteAccessExplanation::lookup_failed(&route("/reports"), "pool closed");

        assert_eq!(explanation.decision, RouteDecision::Blocked);
        assert!(explanation.allowed_routes.is_empty());
        let denial = explanation.denial_reason.unwrap();
        assert_eq!(denial.kind, DenialKind::LookupFailed);
        assert_eq!(denial.message, "pool closed");
    }

    proptest! {
        /// For any assignment of rows over the menu's modules, a non-admin role
        /// sees exactly the routes whose first row has can_view = true.
        #[test]
        fn resolution_matches_whitelist(
            rows in prop::collection::vec(prop::option::of(any::<bool>()), MENU.len())
        ) {
            let role = Role::new("staff");
            let modules: Vec<AppModule> = MENU
                .iter()
                .map(|item| AppModule {
                    id: ModuleId::new(),
                    name: item.title.to_string(),
                    route: item.url.clone(),
                })
                .collect();
            let grants: Vec<RoleModulePermission> = modules
                .iter()
                .zip(&rows)
                .filter_map(|(m, row)| row.map(|can_view| grant(&role, m, can_view)))
                .collect();

            let allowed = allowed_routes(&role, &MENU, &modules, &grants);

            for (m, row) in modules.iter().zip(&rows) {
                prop_assert_eq!(allowed.contains(&m.route), *row == Some(true));
            }
        }
    }
}
