//! Process configuration read from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | `dev-secret` (logged as insecure) |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when persistent |
//! | `IP_LOOKUP_URL` | `https://api.ipify.org?format=json`; empty disables |
//! | `IP_LOOKUP_TIMEOUT_MS` | `3000` |
//! | `LOGIN_ROUTE` | `/login` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use adminhub_core::RoutePath;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEV_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_IP_LOOKUP_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_LOGIN_ROUTE: RoutePath = RoutePath::from_static("/login");

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            var,
            message: message.to_string(),
        }
    }
}

/// Where the store traits are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreBackend,
    /// `None` disables IP enrichment of audit entries.
    pub ip_lookup_url: Option<String>,
    pub ip_lookup_timeout: Duration,
    pub login_route: RoutePath,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            store: StoreBackend::InMemory,
            ip_lookup_url: Some(DEFAULT_IP_LOOKUP_URL.to_string()),
            ip_lookup_timeout: DEFAULT_IP_LOOKUP_TIMEOUT,
            login_route: DEFAULT_LOGIN_ROUTE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and unreadable variables are
    /// both `None`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e))?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map_err(|e| ConfigError::invalid("USE_PERSISTENT_STORES", e))?,
        };

        let store = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        let ip_lookup_url = match lookup("IP_LOOKUP_URL") {
            None => Some(DEFAULT_IP_LOOKUP_URL.to_string()),
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url.trim().to_string()),
        };

        let ip_lookup_timeout = match lookup("IP_LOOKUP_TIMEOUT_MS") {
            None => DEFAULT_IP_LOOKUP_TIMEOUT,
            Some(raw) => {
                let ms = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid("IP_LOOKUP_TIMEOUT_MS", e))?;
                if ms == 0 {
                    return Err(ConfigError::invalid(
                        "IP_LOOKUP_TIMEOUT_MS",
                        "must be greater than zero",
                    ));
                }
                Duration::from_millis(ms)
            }
        };

        let login_route = match lookup("LOGIN_ROUTE") {
            None => DEFAULT_LOGIN_ROUTE,
            Some(raw) => RoutePath::parse(raw).map_err(|e| ConfigError::invalid("LOGIN_ROUTE", e))?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
            ip_lookup_url,
            ip_lookup_timeout,
            login_route,
        })
    }
}
