use std::net::SocketAddr;

use axum::http::HeaderMap;

use adminhub_auth::{Session, SessionState};
use adminhub_core::{CompanyId, UserId};

/// Authenticated session for a request.
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn user_id(&self) -> UserId {
        self.session.user_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.session.company_id
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn state(&self) -> SessionState {
        SessionState::SignedIn(self.session)
    }
}

/// Caller details recorded on audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// First `X-Forwarded-For` hop, else the TCP peer.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// `peer` comes from `ConnectInfo` and is `None` when the server was not
    /// started with connection info.
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let ip_address = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()));

        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            ip_address,
            user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn takes_first_forwarded_hop_and_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.9 , 10.0.0.1"));
        headers.insert("user-agent", HeaderValue::from_static("Mozilla/5.0"));

        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();

        let info = ClientInfo::from_request(&headers, Some(peer));

        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn peer_address_is_used_without_forwarded_header() {
        let peer: SocketAddr = "[2001:db8::7]:443".parse().unwrap();

        let info = ClientInfo::from_request(&HeaderMap::new(), Some(peer));

        assert_eq!(info.ip_address.as_deref(), Some("2001:db8::7"));
        assert_eq!(info.user_agent, None);
    }

    #[test]
    fn missing_headers_and_peer_leave_fields_empty() {
        assert_eq!(ClientInfo::from_request(&HeaderMap::new(), None), ClientInfo::default());
    }
}
