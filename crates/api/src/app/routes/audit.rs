//! Client-reported audit events. Accepted immediately, persisted in the background.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use adminhub_core::{AccessLogEntry, AccessOutcome, ActivityLogEntry};

use crate::app::{
    dto::{AccessLogRequest, ActivityLogRequest},
    errors,
    routes::parse_route,
    services::AppServices,
};
use crate::context::{ClientInfo, SessionContext};

/// POST /audit/access
pub async fn access(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<AccessLogRequest>,
) -> axum::response::Response {
    let route = match parse_route(req.route) {
        Ok(route) => route,
        Err(resp) => return resp,
    };

    let client = ClientInfo::from_request(&headers, connect_info.map(|c| c.0));
    services.audit.spawn_access(
        AccessLogEntry::new(
            session.user_id(),
            route,
            req.outcome.unwrap_or(AccessOutcome::Granted),
        )
        .with_company(session.company_id())
        .with_client(client.ip_address, client.user_agent),
    );

    StatusCode::ACCEPTED.into_response()
}

/// POST /audit/activity
pub async fn activity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<ActivityLogRequest>,
) -> axum::response::Response {
    if req.action.trim().is_empty() {
        return errors::bad_request("validation_error", "action cannot be empty");
    }

    let client = ClientInfo::from_request(&headers, connect_info.map(|c| c.0));
    let mut entry = ActivityLogEntry::new(session.user_id(), req.action.trim())
        .with_company(session.company_id())
        .with_client(client.ip_address, client.user_agent);
    if let Some(entity_type) = req.entity_type {
        entry = entry.with_entity(entity_type, req.entity_id);
    }
    if let Some(details) = req.details {
        entry = entry.with_details(details);
    }

    services.audit.spawn_activity(entry);

    StatusCode::ACCEPTED.into_response()
}
