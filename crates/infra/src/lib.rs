//! Infrastructure layer: stores, configuration and the services built on them.
//!
//! - `store`: relational store boundary (in-memory and Postgres back ends)
//! - `permissions`: store-backed route permission resolution
//! - `visibility`: per-company module visibility
//! - `audit` / `ip_lookup`: best-effort access and activity logging

pub mod audit;
pub mod config;
pub mod ip_lookup;
pub mod permissions;
pub mod store;
pub mod visibility;

pub use audit::AuditSink;
pub use config::{AppConfig, ConfigError, StoreBackend};
pub use ip_lookup::{HttpIpLookup, IpLookup, IpLookupError, NoopIpLookup};
pub use permissions::PermissionService;
pub use store::{
    AuditStore, DirectoryStore, InMemoryBackend, PostgresBackend, StoreError, VisibilityStore,
};
pub use visibility::{ModuleVisibilityService, VisibilityError};
