//! Append-only audit records.
//!
//! Entries are written once and never read back by the permission logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{CompanyId, UserId};
use crate::route::RoutePath;

/// What happened when a user hit a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    Granted,
    Redirected,
    Denied,
    Unauthenticated,
}

impl AccessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Granted => "granted",
            AccessOutcome::Redirected => "redirected",
            AccessOutcome::Denied => "denied",
            AccessOutcome::Unauthenticated => "unauthenticated",
        }
    }
}

impl core::str::FromStr for AccessOutcome {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(AccessOutcome::Granted),
            "redirected" => Ok(AccessOutcome::Redirected),
            "denied" => Ok(AccessOutcome::Denied),
            "unauthenticated" => Ok(AccessOutcome::Unauthenticated),
            other => Err(crate::DomainError::validation(format!(
                "unknown access outcome '{other}'"
            ))),
        }
    }
}

/// Row of `access_logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub company_id: Option<CompanyId>,
    pub route: RoutePath,
    pub outcome: AccessOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub accessed_at: DateTime<Utc>,
}

impl AccessLogEntry {
    pub fn new(user_id: UserId, route: RoutePath, outcome: AccessOutcome) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            company_id: None,
            route,
            outcome,
            ip_address: None,
            user_agent: None,
            accessed_at: Utc::now(),
        }
    }

    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// Row of `activity_logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub company_id: Option<CompanyId>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    pub fn new(user_id: UserId, action: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            company_id: None,
            action: action.into(),
            entity_type: None,
            entity_id: None,
            details: serde_json::Value::Null,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: Option<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = entity_id;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}
