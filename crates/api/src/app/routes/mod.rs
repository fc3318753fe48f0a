use axum::{
    Router,
    routing::{get, patch, post},
};

pub mod access;
pub mod audit;
pub mod navigation;
pub mod system;
pub mod visibility;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/navigation", get(navigation::navigation))
        .route("/access/check", get(access::check))
        .route("/access/explain", get(access::explain))
        .route(
            "/companies/:company_id/modules",
            get(visibility::list).put(visibility::replace),
        )
        .route(
            "/companies/:company_id/modules/:module_name",
            patch(visibility::toggle),
        )
        .route("/audit/access", post(audit::access))
        .route("/audit/activity", post(audit::activity))
}

/// Parse a route supplied by the client, mapping failures to a 400.
pub(crate) fn parse_route(
    raw: String,
) -> Result<adminhub_core::RoutePath, axum::response::Response> {
    adminhub_core::RoutePath::parse(raw)
        .map_err(|e| super::errors::bad_request("invalid_route", e.to_string()))
}
