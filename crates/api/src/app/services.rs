//! Service wiring: picks the store back end and builds the services on it.

use std::sync::Arc;

use adminhub_core::RoutePath;
use adminhub_infra::{
    AppConfig, AuditSink, HttpIpLookup, InMemoryBackend, IpLookup, ModuleVisibilityService,
    NoopIpLookup, PermissionService, PostgresBackend, StoreBackend, StoreError,
};

/// Shared services for all request handlers.
#[derive(Clone)]
pub struct AppServices {
    pub permissions: PermissionService,
    pub visibility: ModuleVisibilityService,
    pub audit: AuditSink,
    pub login_route: RoutePath,
}

impl AppServices {
    /// Every service over one in-memory back end (dev and tests).
    pub fn in_memory(
        backend: Arc<InMemoryBackend>,
        ip_lookup: Arc<dyn IpLookup>,
        login_route: RoutePath,
    ) -> Self {
        Self {
            permissions: PermissionService::new(backend.clone()),
            visibility: ModuleVisibilityService::new(backend.clone()),
            audit: AuditSink::new(backend, ip_lookup),
            login_route,
        }
    }

    pub fn postgres(
        backend: Arc<PostgresBackend>,
        ip_lookup: Arc<dyn IpLookup>,
        login_route: RoutePath,
    ) -> Self {
        Self {
            permissions: PermissionService::new(backend.clone()),
            visibility: ModuleVisibilityService::new(backend.clone()),
            audit: AuditSink::new(backend, ip_lookup),
            login_route,
        }
    }
}

fn build_ip_lookup(config: &AppConfig) -> Arc<dyn IpLookup> {
    let Some(url) = &config.ip_lookup_url else {
        tracing::info!("IP lookup disabled");
        return Arc::new(NoopIpLookup);
    };

    match HttpIpLookup::new(url.clone(), config.ip_lookup_timeout) {
        Ok(lookup) => Arc::new(lookup),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "failed to build IP lookup client; audit entries will not be enriched"
            );
            Arc::new(NoopIpLookup)
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let ip_lookup = build_ip_lookup(config);

    match &config.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory(
                Arc::new(InMemoryBackend::new()),
                ip_lookup,
                config.login_route.clone(),
            ))
        }
        StoreBackend::Postgres { database_url } => {
            let backend = PostgresBackend::connect(database_url).await?;
            backend.ensure_schema().await?;
            tracing::info!("using Postgres stores");
            Ok(AppServices::postgres(
                Arc::new(backend),
                ip_lookup,
                config.login_route.clone(),
            ))
        }
    }
}
