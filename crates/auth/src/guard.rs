//! Route guard: the per-render gate in front of a protected page.
//!
//! ```text
//! Pending ──no user──────────────▶ Unauthenticated
//!    │ ───no required route──────▶ Granted
//!    │ ───check: Allowed─────────▶ Granted
//!    │ ───check: Blocked─────────▶ Denied
//!    └────check: Redirect(to)────▶ Redirecting ──follow_redirect──▶ Pending
//! ```
//!
//! Checks are asynchronous and cannot be cancelled. Every check is tagged with a
//! generation; anything that restarts the gate bumps it, and completions carrying
//! an older generation are dropped.

use serde::Serialize;

use adminhub_core::RoutePath;

use crate::{RouteDecision, SessionState};

/// Message rendered when a user may open no module at all.
pub const NO_ACCESS_MESSAGE: &str =
    "You do not have access to any module. Contact your administrator.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    Pending,
    Redirecting { to: RoutePath },
    Unauthenticated { login: RoutePath },
    Denied { message: String },
    Granted,
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GuardState::Unauthenticated { .. } | GuardState::Denied { .. } | GuardState::Granted
        )
    }
}

/// Handle for one in-flight permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTicket {
    generation: u64,
    route: RoutePath,
}

impl CheckTicket {
    pub fn route(&self) -> &RoutePath {
        &self.route
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: Option<RoutePath>,
    login_route: RoutePath,
    state: GuardState,
    generation: u64,
}

impl RouteGuard {
    pub fn new(required: Option<RoutePath>, login_route: RoutePath) -> Self {
        Self {
            required,
            login_route,
            state: GuardState::Pending,
            generation: 0,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn required(&self) -> Option<&RoutePath> {
        self.required.as_ref()
    }

    /// React to the current session. Returns a ticket when a permission check
    /// must be started for the required route.
    pub fn on_session(&mut self, session: &SessionState) -> Option<CheckTicket> {
        self.generation += 1;

        match session {
            SessionState::Loading => {
                self.state = GuardState::Pending;
                None
            }
            SessionState::SignedOut => {
                self.state = GuardState::Unauthenticated {
                    login: self.login_route.clone(),
                };
                None
            }
            SessionState::SignedIn(_) => match self.required.clone() {
                None => {
                    self.state = GuardState::Granted;
                    None
                }
                Some(route) => {
                    self.state = GuardState::Pending;
                    Some(self.ticket(route))
                }
            },
        }
    }

    /// Change the protected route; any check still in flight becomes stale.
    pub fn set_required(
        &mut self,
        required: Option<RoutePath>,
        session: &SessionState,
    ) -> Option<CheckTicket> {
        self.required = required;
        self.on_session(session)
    }

    /// Apply a finished check. Returns `false` (and changes nothing) when the
    /// ticket has been superseded.
    pub fn complete(&mut self, ticket: CheckTicket, decision: RouteDecision) -> bool {
        if ticket.generation != self.generation || self.state != GuardState::Pending {
            tracing::debug!(
                route = %ticket.route,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale route check"
            );
            return false;
        }

        self.state = match decision {
            RouteDecision::Allowed => GuardState::Granted,
            RouteDecision::Redirect(to) => GuardState::Redirecting { to },
            RouteDecision::Blocked => GuardState::Denied {
                message: NO_ACCESS_MESSAGE.to_string(),
            },
        };
        true
    }

    /// Navigate to the redirect target and restart the check against it.
    pub fn follow_redirect(&mut self) -> Option<CheckTicket> {
        let GuardState::Redirecting { to } = &self.state else {
            return None;
        };
        let to = to.clone();

        self.generation += 1;
        self.required = Some(to.clone());
        self.state = GuardState::Pending;
        Some(self.ticket(to))
    }

    fn ticket(&self, route: RoutePath) -> CheckTicket {
        CheckTicket {
            generation: self.generation,
            route,
        }
    }
}

#[cfg(test)]
mod tests {
    use adminhub_core::{CompanyId, UserId};

    use super::*;
    use crate::Session;

    fn route(s: &'static str) -> RoutePath {
        RoutePath::from_static(s)
    }

    fn signed_in() -> SessionState {
        SessionState::SignedIn(Session {
            user_id: UserId::new(),
            company_id: CompanyId::new(),
        })
    }

    fn guard(required: Option<&'static str>) -> RouteGuard {
        RouteGuard::new(required.map(route), route("/login"))
    }

    #[test]
    fn starts_pending_and_waits_for_auth() {
        let mut g = guard(Some("/reports"));
        assert_eq!(g.state(), &GuardState::Pending);
        assert!(g.on_session(&SessionState::Loading).is_none());
        assert_eq!(g.state(), &GuardState::Pending);
        assert!(!g.state().is_terminal());
    }

    #[test]
    fn signed_out_is_unauthenticated() {
        let mut g = guard(Some("/reports"));
        assert!(g.on_session(&SessionState::SignedOut).is_none());
        assert_eq!(g.state(), &GuardState::Unauthenticated { login: route("/login") });
        assert!(g.state().is_terminal());
    }

    #[test]
    fn no_required_route_grants_once_signed_in() {
        let mut g = guard(None);
        assert!(g.on_session(&signed_in()).is_none());
        assert_eq!(g.state(), &GuardState::Granted);
    }

    #[test]
    fn redirect_then_grant_on_new_route() {
        let mut g = guard(Some("/reports"));
        let ticket = g.on_session(&signed_in()).unwrap();
        assert_eq!(ticket.route(), &route("/reports"));

        assert!(g.complete(ticket, RouteDecision::Redirect(route("/dashboard"))));
        assert_eq!(g.state(), &GuardState::Redirecting { to: route("/dashboard") });
        assert!(!g.state().is_terminal());

        let ticket = g.follow_redirect().unwrap();
        assert_eq!(ticket.route(), &route("/dashboard"));
        assert_eq!(g.required(), Some(&route("/dashboard")));

        assert!(g.complete(ticket, RouteDecision::Allowed));
        assert_eq!(g.state(), &GuardState::Granted);
    }

    #[test]
    fn blocked_renders_message_without_navigation() {
        let mut g = guard(Some("/reports"));
        let ticket = g.on_session(&signed_in()).unwrap();

        assert!(g.complete(ticket, RouteDecision::Blocked));
        assert_eq!(
            g.state(),
            &GuardState::Denied { message: NO_ACCESS_MESSAGE.to_string() }
        );
        assert!(g.follow_redirect().is_none());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let session = signed_in();
        let mut g = guard(Some("/reports"));
        let old = g.on_session(&session).unwrap();

        let new = g.set_required(Some(route("/users")), &session).unwrap();

        // The older check lands late and must not overwrite the newer one.
        assert!(!g.complete(old, RouteDecision::Allowed));
        assert_eq!(g.state(), &GuardState::Pending);

        assert!(g.complete(new, RouteDecision::Blocked));
        assert!(matches!(g.state(), GuardState::Denied { .. }));
    }

    #[test]
    fn completion_after_sign_out_is_discarded() {
        let mut g = guard(Some("/reports"));
        let ticket = g.on_session(&signed_in()).unwrap();
        g.on_session(&SessionState::SignedOut);

        assert!(!g.complete(ticket, RouteDecision::Allowed));
        assert!(matches!(g.state(), GuardState::Unauthenticated { .. }));
    }

    #[test]
    fn double_completion_is_ignored() {
        let mut g = guard(Some("/reports"));
        let ticket = g.on_session(&signed_in()).unwrap();

        assert!(g.complete(ticket.clone(), RouteDecision::Allowed));
        assert!(!g.complete(ticket, RouteDecision::Blocked));
        assert_eq!(g.state(), &GuardState::Granted);
    }
}
