//! Per-company module visibility endpoints.
//!
//! All of them require access to the Modules page.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Extension, Path},
    http::HeaderMap,
    response::IntoResponse,
};
use serde_json::json;

use adminhub_core::{ActivityLogEntry, CompanyId, module_label};

use crate::app::{
    dto::{ModulesBody, ToggleModuleRequest},
    errors,
    services::AppServices,
};
use crate::authz::{self, MODULES_ROUTE};
use crate::context::{ClientInfo, SessionContext};

fn parse_company(raw: &str) -> Result<CompanyId, axum::response::Response> {
    raw.parse::<CompanyId>()
        .map_err(|e| errors::bad_request("invalid_company_id", e.to_string()))
}

fn record_activity(
    services: &AppServices,
    session: &SessionContext,
    client: ClientInfo,
    company_id: CompanyId,
    action: &str,
    details: serde_json::Value,
) {
    services.audit.spawn_activity(
        ActivityLogEntry::new(session.user_id(), action)
            .with_company(session.company_id())
            .with_entity("company_module_visibility", Some(company_id.to_string()))
            .with_details(details)
            .with_client(client.ip_address, client.user_agent),
    );
}

/// GET /companies/:company_id/modules
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(company_id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_route(&services, &session, &MODULES_ROUTE).await {
        return resp;
    }
    let company_id = match parse_company(&company_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.visibility.load(company_id).await {
        Ok(settings) => Json(ModulesBody::from(settings)).into_response(),
        Err(e) => errors::visibility_error_to_response(e),
    }
}

/// PUT /companies/:company_id/modules - replace the company's list.
pub async fn replace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(company_id): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<ModulesBody>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_route(&services, &session, &MODULES_ROUTE).await {
        return resp;
    }
    let company_id = match parse_company(&company_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(e) = services.visibility.save(company_id, &body.modules).await {
        return errors::visibility_error_to_response(e);
    }

    record_activity(
        &services,
        &session,
        ClientInfo::from_request(&headers, connect_info.map(|c| c.0)),
        company_id,
        "modules.visibility_saved",
        json!({ "modules": body.modules }),
    );

    Json(body).into_response()
}

/// PATCH /companies/:company_id/modules/:module_name - flip one module.
pub async fn toggle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path((company_id, module_name)): Path<(String, String)>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<ToggleModuleRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_route(&services, &session, &MODULES_ROUTE).await {
        return resp;
    }
    let company_id = match parse_company(&company_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let settings = match services
        .visibility
        .toggle_and_save(company_id, &module_name, req.visible)
        .await
    {
        Ok(settings) => settings,
        Err(e) => return errors::visibility_error_to_response(e),
    };

    record_activity(
        &services,
        &session,
        ClientInfo::from_request(&headers, connect_info.map(|c| c.0)),
        company_id,
        "modules.visibility_toggled",
        json!({
            "module_name": module_name,
            "label": module_label(&module_name),
            "visible": req.visible,
        }),
    );

    Json(ModulesBody::from(settings)).into_response()
}
