//! Route-level authorization for API handlers.
//!
//! Handlers that back a dashboard page require the same route permission the
//! page itself does, so the API never grants more than the sidebar shows.

use adminhub_core::RoutePath;

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

/// Permission required by the module visibility endpoints.
pub const MODULES_ROUTE: RoutePath = RoutePath::from_static("/modules");

/// `Ok(())` when the session's user may open `route`; a 403 response otherwise.
pub async fn require_route(
    services: &AppServices,
    session: &SessionContext,
    route: &RoutePath,
) -> Result<(), axum::response::Response> {
    if services.permissions.can_access(session.user_id(), route).await {
        return Ok(());
    }

    tracing::debug!(user_id = %session.user_id(), route = %route, "api access denied");
    Err(errors::json_error(
        axum::http::StatusCode::FORBIDDEN,
        "forbidden",
        format!("access to '{route}' is required"),
    ))
}
