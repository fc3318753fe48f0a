use serde::{Deserialize, Serialize};

use adminhub_core::{CompanyId, UserId};

use crate::claims::JwtClaims;

/// An authenticated session, passed explicitly to whatever needs it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub company_id: CompanyId,
}

impl From<&JwtClaims> for Session {
    fn from(claims: &JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            company_id: claims.company_id,
        }
    }
}

/// Session as seen by a page render: the auth provider may still be loading.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn(session) => Some(session),
            SessionState::Loading | SessionState::SignedOut => None,
        }
    }
}
