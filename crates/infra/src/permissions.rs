//! Store-backed permission resolution.
//!
//! Wraps the pure resolver in `adminhub-auth` with the lookups it needs. The
//! role lookup always comes first; admin stops there, anyone else triggers the
//! module and grant lookups concurrently.
//!
//! Every failure degrades to "no access" and is logged at `warn`. Nothing in
//! here returns a store error to the caller.

use std::sync::Arc;

use adminhub_auth::{
    AllowedRoutes, AppModule, GuardState, MENU, MenuItem, Profile, Role, RoleModulePermission,
    RouteAccessExplanation, RouteDecision, RouteGuard, SessionState, allowed_routes, decide_route,
    explain_route_access, filter_menu,
};
use adminhub_core::{RoutePath, UserId};

use crate::store::{DirectoryStore, StoreError};

/// Everything the resolver reads for one user.
#[derive(Debug, Default)]
struct DirectorySnapshot {
    role: Option<Role>,
    modules: Vec<AppModule>,
    grants: Vec<RoleModulePermission>,
}

impl DirectorySnapshot {
    fn allowed(&self, menu: &[MenuItem]) -> AllowedRoutes {
        match &self.role {
            Some(role) => allowed_routes(role, menu, &self.modules, &self.grants),
            None => AllowedRoutes::none(),
        }
    }
}

#[derive(Clone)]
pub struct PermissionService {
    directory: Arc<dyn DirectoryStore>,
    menu: &'static [MenuItem],
}

impl PermissionService {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self::with_menu(directory, &MENU)
    }

    pub fn with_menu(directory: Arc<dyn DirectoryStore>, menu: &'static [MenuItem]) -> Self {
        Self { directory, menu }
    }

    pub fn menu(&self) -> &'static [MenuItem] {
        self.menu
    }

    async fn snapshot(&self, user_id: UserId) -> Result<DirectorySnapshot, StoreError> {
        let Some(Profile { role, .. }) = self.directory.profile(user_id).await? else {
            return Ok(DirectorySnapshot::default());
        };

        if role.is_admin() {
            return Ok(DirectorySnapshot {
                role: Some(role),
                ..DirectorySnapshot::default()
            });
        }

        let (modules, grants) = tokio::try_join!(
            self.directory.list_modules(),
            self.directory.role_permissions(&role),
        )?;

        Ok(DirectorySnapshot {
            role: Some(role),
            modules,
            grants,
        })
    }

    async fn snapshot_or_deny(
        &self,
        user_id: UserId,
        operation: &'static str,
    ) -> DirectorySnapshot {
        match self.snapshot(user_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    operation,
                    error = %e,
                    "permission lookup failed; denying"
                );
                DirectorySnapshot::default()
            }
        }
    }

    /// The user's role, or `None` when there is no profile or the lookup failed.
    pub async fn role(&self, user_id: UserId) -> Option<Role> {
        match self.directory.profile(user_id).await {
            Ok(profile) => profile.map(|p| p.role),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "role lookup failed");
                None
            }
        }
    }

    pub async fn resolve_allowed_routes(&self, user_id: UserId) -> AllowedRoutes {
        let snapshot = self.snapshot_or_deny(user_id, "resolve_allowed_routes").await;
        let allowed = snapshot.allowed(self.menu);
        tracing::debug!(user_id = %user_id, allowed = allowed.len(), "resolved allowed routes");
        allowed
    }

    pub async fn can_access(&self, user_id: UserId, route: &RoutePath) -> bool {
        let snapshot = self.snapshot_or_deny(user_id, "can_access").await;
        match &snapshot.role {
            None => false,
            Some(role) if role.is_admin() => true,
            Some(_) => snapshot.allowed(self.menu).contains(route),
        }
    }

    /// Decision for the route guard: allow, redirect to the first allowed menu
    /// route, or block.
    pub async fn check_route(&self, user_id: UserId, route: &RoutePath) -> RouteDecision {
        let snapshot = self.snapshot_or_deny(user_id, "check_route").await;
        let allowed = snapshot.allowed(self.menu);
        let decision = decide_route(snapshot.role.as_ref(), route, &allowed, self.menu);
        tracing::debug!(user_id = %user_id, route = %route, ?decision, "route checked");
        decision
    }

    /// Menu entries the user may open, in menu order.
    pub async fn navigation(&self, user_id: UserId) -> Vec<MenuItem> {
        let allowed = self.resolve_allowed_routes(user_id).await;
        filter_menu(self.menu, &allowed)
    }

    /// Why `route` is allowed or denied. A failed lookup explains as blocked
    /// and carries the store error as its denial message.
    pub async fn explain(&self, user_id: UserId, route: &RoutePath) -> RouteAccessExplanation {
        match self.snapshot(user_id).await {
            Ok(snapshot) => explain_route_access(
                snapshot.role.as_ref(),
                route,
                self.menu,
                &snapshot.modules,
                &snapshot.grants,
            ),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    operation = "explain",
                    error = %e,
                    "permission lookup failed; denying"
                );
                RouteAccessExplanation::lookup_failed(route, e.to_string())
            }
        }
    }

    /// Run `guard` against `session` until it settles, following redirects.
    ///
    /// Redirects are followed at most once per menu entry; a store that keeps
    /// changing underneath can leave the guard in `Redirecting`.
    pub async fn drive_guard(&self, guard: &mut RouteGuard, session: &SessionState) -> GuardState {
        let Some(user_id) = session.session().map(|s| s.user_id) else {
            guard.on_session(session);
            return guard.state().clone();
        };

        let mut ticket = guard.on_session(session);
        let mut hops = 0;

        while let Some(current) = ticket.take() {
            let decision = self.check_route(user_id, current.route()).await;
            guard.complete(current, decision);

            if hops >= self.menu.len() {
                break;
            }
            hops += 1;
            ticket = guard.follow_redirect();
        }

        guard.state().clone()
    }
}
