use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::{dto::NavigationResponse, services::AppServices};
use crate::context::SessionContext;

/// GET /navigation - sidebar entries the caller may open, in menu order.
pub async fn navigation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    Json(NavigationResponse {
        items: services.permissions.navigation(session.user_id()).await,
    })
}
