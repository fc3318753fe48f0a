//! Public IP lookup used to enrich audit entries.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpLookupError {
    #[error("ip lookup request failed: {0}")]
    Request(String),

    #[error("ip lookup returned status {0}")]
    Status(u16),

    #[error("ip lookup returned an invalid body: {0}")]
    InvalidResponse(String),

    #[error("ip lookup disabled")]
    Disabled,
}

#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn public_ip(&self) -> Result<String, IpLookupError>;
}

/// Never resolves an address.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIpLookup;

#[async_trait]
impl IpLookup for NoopIpLookup {
    async fn public_ip(&self) -> Result<String, IpLookupError> {
        Err(IpLookupError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Asks an HTTP endpoint answering `{"ip": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpIpLookup {
    client: reqwest::Client,
    url: String,
}

impl HttpIpLookup {
    /// `timeout` bounds the whole request, connect included.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, IpLookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IpLookupError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IpLookup for HttpIpLookup {
    async fn public_ip(&self) -> Result<String, IpLookupError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| IpLookupError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IpLookupError::Status(status.as_u16()));
        }

        let body: IpResponse = response
            .json()
            .await
            .map_err(|e| IpLookupError::InvalidResponse(e.to_string()))?;

        let ip = body
            .ip
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| IpLookupError::InvalidResponse(format!("'{}': {e}", body.ip)))?;

        Ok(ip.to_string())
    }
}
