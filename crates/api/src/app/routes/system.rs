use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{dto::WhoAmIResponse, services::AppServices};
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    let role = services.permissions.role(session.user_id()).await;

    Json(WhoAmIResponse {
        user_id: session.user_id(),
        company_id: session.company_id(),
        role: role.map(|r| r.as_str().to_string()),
    })
}
