//! # portfolio-admin
//!
//! Client-side session handling and admin tooling for the portfolio dashboard API.
//!
//! ## Session Model
//!
//! The dashboard authenticates with a bearer-token pair: a short-lived access token
//! and a longer-lived refresh token. Both live in a persistent key-value store under
//! fixed keys (`access_token`, `refresh_token`) next to a cached `user_info` record.
//! The pair is either fully present or fully absent.
//!
//! - **Login:** credentials are exchanged for a token pair, then `/api/accounts/me/`
//!   is called with the new access token. Only staff accounts get a session; for any
//!   other account the tokens are discarded and nothing is persisted.
//! - **Authenticated requests:** every protected call goes through
//!   [`session::SessionManager::authed_request`]. A 401 triggers exactly one refresh
//!   and one retry. Concurrent refreshes are collapsed into a single call.
//! - **Teardown:** a missing or rejected refresh token clears the whole session and
//!   sends the user back to the login view.
//!
//! ## Route Guard
//!
//! [`session::guard::RouteGuard`] is a two-state machine (`Unauthenticated`,
//! `Authenticated`) that gates admin-only routes on token presence alone. Token
//! validity is only discovered when a protected request comes back with 401.

pub mod api;
pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
