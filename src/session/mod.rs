//! Session guard and authenticated fetch.
//!
//! One `SessionManager` owns the credential, the route guard and the refresh
//! logic. Everything that talks to protected endpoints goes through it, so token
//! lookup and 401 recovery exist in exactly one place. This module handles token
//! material and must never log it.

pub mod credential;
mod error;
pub mod guard;
mod manager;
mod request;
pub mod response;
pub mod route;
mod store;

pub use credential::{Credential, Role, SessionUser};
pub use error::SessionError;
pub use guard::{GuardDecision, GuardState, LogNavigator, Navigator, RouteGuard, Transition};
pub use manager::{
    parse_base_url, SessionConfig, SessionManager, CURRENT_USER_PATH, TOKEN_BLACKLIST_PATH,
    TOKEN_PATH, TOKEN_REFRESH_PATH,
};
pub use request::{ApiRequest, FormPart, RequestBody};
pub use route::Route;
pub use store::{FileStore, MemoryStore, SessionStore};
