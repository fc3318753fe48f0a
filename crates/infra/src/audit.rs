//! Best-effort audit sink.
//!
//! Callers fill the IP from the request (forwarded header or peer address).
//! Entries that still have none are enriched through [`IpLookup`] before
//! being written. Neither the lookup nor the write can fail the caller: lookup
//! errors leave the address empty, write errors are logged at `error` and
//! dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;

use adminhub_core::{AccessLogEntry, ActivityLogEntry};

use crate::ip_lookup::{IpLookup, IpLookupError, NoopIpLookup};
use crate::store::AuditStore;

#[derive(Clone)]
pub struct AuditSink {
    store: Arc<dyn AuditStore>,
    ip_lookup: Arc<dyn IpLookup>,
}

impl AuditSink {
    pub fn new(store: Arc<dyn AuditStore>, ip_lookup: Arc<dyn IpLookup>) -> Self {
        Self { store, ip_lookup }
    }

    /// Sink that never enriches entries.
    pub fn without_ip_lookup(store: Arc<dyn AuditStore>) -> Self {
        Self::new(store, Arc::new(NoopIpLookup))
    }

    async fn resolve_ip(&self, current: Option<String>) -> Option<String> {
        if current.is_some() {
            return current;
        }

        match self.ip_lookup.public_ip().await {
            Ok(ip) => Some(ip),
            Err(IpLookupError::Disabled) => None,
            Err(e) => {
                tracing::debug!(error = %e, "ip lookup failed; recording entry without address");
                None
            }
        }
    }

    pub async fn log_access(&self, mut entry: AccessLogEntry) {
        entry.ip_address = self.resolve_ip(entry.ip_address.take()).await;

        match self.store.insert_access_log(&entry).await {
            Ok(()) => tracing::debug!(
                user_id = %entry.user_id,
                route = %entry.route,
                outcome = entry.outcome.as_str(),
                "access logged"
            ),
            Err(e) => tracing::error!(
                user_id = %entry.user_id,
                route = %entry.route,
                error = %e,
                "failed to persist access log"
            ),
        }
    }

    pub async fn log_activity(&self, mut entry: ActivityLogEntry) {
        entry.ip_address = self.resolve_ip(entry.ip_address.take()).await;

        match self.store.insert_activity_log(&entry).await {
            Ok(()) => tracing::debug!(
                user_id = %entry.user_id,
                action = %entry.action,
                "activity logged"
            ),
            Err(e) => tracing::error!(
                user_id = %entry.user_id,
                action = %entry.action,
                error = %e,
                "failed to persist activity log"
            ),
        }
    }

    /// Fire-and-forget [`AuditSink::log_access`]. Must be called inside a tokio runtime.
    pub fn spawn_access(&self, entry: AccessLogEntry) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move { sink.log_access(entry).await })
    }

    /// Fire-and-forget [`AuditSink::log_activity`]. Must be called inside a tokio runtime.
    pub fn spawn_activity(&self, entry: ActivityLogEntry) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move { sink.log_activity(entry).await })
    }
}
