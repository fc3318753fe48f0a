//! Route guard and permission debugging endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Extension, Query},
    http::HeaderMap,
    response::IntoResponse,
};

use adminhub_auth::RouteGuard;
use adminhub_core::AccessLogEntry;

use crate::app::{
    dto::{AccessCheckResponse, ExplainResponse, RouteQuery},
    routes::parse_route,
    services::AppServices,
};
use crate::context::{ClientInfo, SessionContext};

/// GET /access/check?route=/x - one guard pass for `route`.
///
/// A redirect is reported, not followed; the client navigates and checks again.
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<RouteQuery>,
) -> axum::response::Response {
    let route = match parse_route(query.route) {
        Ok(route) => route,
        Err(resp) => return resp,
    };

    let mut guard = RouteGuard::new(Some(route.clone()), services.login_route.clone());
    if let Some(ticket) = guard.on_session(&session.state()) {
        let decision = services
            .permissions
            .check_route(session.user_id(), ticket.route())
            .await;
        guard.complete(ticket, decision);
    }

    let (body, outcome) = AccessCheckResponse::from_guard(guard.state());

    let client = ClientInfo::from_request(&headers, connect_info.map(|c| c.0));
    services.audit.spawn_access(
        AccessLogEntry::new(session.user_id(), route, outcome)
            .with_company(session.company_id())
            .with_client(client.ip_address, client.user_agent),
    );

    Json(body).into_response()
}

/// GET /access/explain?route=/x - why the caller may or may not open `route`.
///
/// Store failures come back as a blocked explanation, never as an error.
pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<RouteQuery>,
) -> axum::response::Response {
    let route = match parse_route(query.route) {
        Ok(route) => route,
        Err(resp) => return resp,
    };

    let explanation = services.permissions.explain(session.user_id(), &route).await;
    Json(ExplainResponse { explanation }).into_response()
}
