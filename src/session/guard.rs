//! Two-state route guard for admin-only views.
//!
//! The guard only tracks whether a credential is present. It never validates the
//! token with the server: an expired-but-present token is discovered the first
//! time a protected request returns 401, and the session manager then drives the
//! `RefreshFailed` transition if the refresh also fails.

use crate::session::route::Route;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    Authenticated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    LoginSucceeded,
    /// A new access token was stored by a refresh.
    Refreshed,
    LoggedOut,
    RefreshFailed,
}

impl GuardState {
    #[must_use]
    pub const fn apply(self, transition: Transition) -> Self {
        match transition {
            Transition::LoginSucceeded | Transition::Refreshed => Self::Authenticated,
            Transition::LoggedOut | Transition::RefreshFailed => Self::Unauthenticated,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(Route),
}

#[derive(Debug)]
pub struct RouteGuard {
    state: watch::Sender<GuardState>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(initial: GuardState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    /// Initial state from the stored access token: present and non-empty means
    /// `Authenticated`.
    #[must_use]
    pub fn from_access_token(token: Option<&str>) -> Self {
        let initial = match token {
            Some(token) if !token.trim().is_empty() => GuardState::Authenticated,
            _ => GuardState::Unauthenticated,
        };
        Self::new(initial)
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == GuardState::Authenticated
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// Applies a transition and returns the resulting state. Subscribers are only
    /// notified when the state actually changes.
    pub fn transition(&self, transition: Transition) -> GuardState {
        self.state.send_if_modified(|state| {
            let next = state.apply(transition);
            let changed = next != *state;
            if changed {
                debug!(from = ?*state, to = ?next, ?transition, "guard transition");
            }
            *state = next;
            changed
        });
        self.state()
    }

    #[must_use]
    pub fn check(&self, route: &Route) -> GuardDecision {
        if route.is_admin_only() && !self.is_authenticated() {
            GuardDecision::Redirect(Route::AdminLogin)
        } else {
            GuardDecision::Render
        }
    }
}

/// Receives the redirect issued when a session ends on a terminal failure.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &Route);
}

/// Navigator that only records the redirect in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, route: &Route) {
        warn!(route = %route, "session ended, redirecting");
    }
}
