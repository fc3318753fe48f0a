//! Request/response bodies.

use serde::{Deserialize, Serialize};

use adminhub_auth::{GuardState, MenuItem, RouteAccessExplanation};
use adminhub_core::{
    AccessOutcome, CompanyId, ModuleVisibility, RoutePath, UserId, VisibilitySettings,
};

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub route: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessCheckState {
    Granted,
    Redirecting,
    Denied,
}

#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub state: AccessCheckState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<RoutePath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AccessCheckResponse {
    /// Map a settled guard to the response and the outcome to audit.
    ///
    /// `Pending` and `Unauthenticated` cannot occur for an authenticated
    /// request with a required route; they are reported as denied.
    pub fn from_guard(state: &GuardState) -> (Self, AccessOutcome) {
        match state {
            GuardState::Granted => (
                Self {
                    state: AccessCheckState::Granted,
                    redirect_to: None,
                    message: None,
                },
                AccessOutcome::Granted,
            ),
            GuardState::Redirecting { to } => (
                Self {
                    state: AccessCheckState::Redirecting,
                    redirect_to: Some(to.clone()),
                    message: None,
                },
                AccessOutcome::Redirected,
            ),
            GuardState::Denied { message } => (
                Self {
                    state: AccessCheckState::Denied,
                    redirect_to: None,
                    message: Some(message.clone()),
                },
                AccessOutcome::Denied,
            ),
            GuardState::Pending | GuardState::Unauthenticated { .. } => (
                Self {
                    state: AccessCheckState::Denied,
                    redirect_to: None,
                    message: None,
                },
                AccessOutcome::Denied,
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanation: RouteAccessExplanation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModulesBody {
    pub modules: Vec<ModuleVisibility>,
}

impl From<VisibilitySettings> for ModulesBody {
    fn from(settings: VisibilitySettings) -> Self {
        Self {
            modules: settings.into_entries(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleModuleRequest {
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct AccessLogRequest {
    pub route: String,
    pub outcome: Option<AccessOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityLogRequest {
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<serde_json::Value>,
}
