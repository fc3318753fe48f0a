//! `adminhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, route paths, company module visibility and audit records.

pub mod audit;
pub mod error;
pub mod id;
pub mod route;
pub mod visibility;

pub use audit::{AccessLogEntry, AccessOutcome, ActivityLogEntry};
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, ModuleId, UserId};
pub use route::RoutePath;
pub use visibility::{
    CompanyModuleVisibility, KNOWN_MODULES, KnownModule, ModuleVisibility, VisibilitySettings,
    module_label,
};
