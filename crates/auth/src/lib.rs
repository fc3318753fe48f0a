//! `adminhub-auth`: pure authentication/authorization boundary.
//!
//! Route permission resolution, navigation filtering and the route guard state
//! machine live here. This crate is intentionally decoupled from HTTP and storage:
//! callers fetch profiles, modules and grants, then hand them to these functions.

pub mod claims;
pub mod grants;
pub mod guard;
pub mod menu;
pub mod navigation;
pub mod resolve;
pub mod roles;
pub mod session;

pub use claims::{
    Hs256JwtValidator, JwtClaims, JwtError, JwtValidator, TokenValidationError, validate_claims,
};
pub use grants::{AppModule, Profile, RoleModulePermission};
pub use guard::{CheckTicket, GuardState, NO_ACCESS_MESSAGE, RouteGuard};
pub use menu::{IconId, MENU, MenuItem, menu_routes};
pub use navigation::{Sidebar, filter_menu};
pub use resolve::{
    AllowedRoutes, DenialKind, DenialReason, RouteAccessExplanation, RouteDecision,
    allowed_routes, decide_route, explain_route_access,
};
pub use roles::Role;
pub use session::{Session, SessionState};
