//! Relational store boundary.
//!
//! The dashboard reaches its data through equality-filtered selects, inserts and
//! deletes against six named tables. The traits below split those by concern so
//! each service depends only on what it touches:
//!
//! | Trait | Tables |
//! |-------|--------|
//! | [`DirectoryStore`] | `profiles`, `app_modules`, `role_module_permissions` |
//! | [`VisibilityStore`] | `company_module_visibility` |
//! | [`AuditStore`] | `access_logs`, `activity_logs` |

use async_trait::async_trait;
use thiserror::Error;

use adminhub_auth::{AppModule, Profile, Role, RoleModulePermission};
use adminhub_core::{AccessLogEntry, ActivityLogEntry, CompanyId, CompanyModuleVisibility, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryBackend;
pub use postgres::PostgresBackend;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (network, pool closed, poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed a statement.
    #[error("query '{operation}' failed: {message}")]
    Query { operation: &'static str, message: String },

    /// A row came back in a shape the domain does not accept.
    #[error("malformed row in '{table}': {message}")]
    Decode { table: &'static str, message: String },
}

impl StoreError {
    pub fn query(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Query {
            operation,
            message: message.into(),
        }
    }

    pub fn decode(table: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            table,
            message: message.into(),
        }
    }
}

/// Keep the `app_modules` rows that decode; log and drop the rest.
///
/// A module whose route does not parse can never match a request, so losing it
/// must not cost the user every other module.
pub(crate) fn usable_modules<I>(rows: I) -> Vec<AppModule>
where
    I: IntoIterator<Item = Result<AppModule, StoreError>>,
{
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(module) => Some(module),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed app_modules row");
                None
            }
        })
        .collect()
}

/// Read-only view of roles, modules and role grants (managed externally).
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// `profiles` row of the user, if any.
    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Every well-formed `app_modules` row, in store order.
    async fn list_modules(&self) -> Result<Vec<AppModule>, StoreError>;

    /// `role_module_permissions` rows for `role`, in store order.
    async fn role_permissions(&self, role: &Role) -> Result<Vec<RoleModulePermission>, StoreError>;
}

/// Per-company module visibility rows.
#[async_trait]
pub trait VisibilityStore: Send + Sync {
    async fn company_visibility(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<CompanyModuleVisibility>, StoreError>;

    /// Delete every row of the company. Returns the number of rows removed.
    async fn delete_company_visibility(&self, company_id: CompanyId) -> Result<u64, StoreError>;

    async fn insert_company_visibility(
        &self,
        rows: &[CompanyModuleVisibility],
    ) -> Result<(), StoreError>;
}

/// Append-only audit tables.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_access_log(&self, entry: &AccessLogEntry) -> Result<(), StoreError>;

    async fn insert_activity_log(&self, entry: &ActivityLogEntry) -> Result<(), StoreError>;
}
