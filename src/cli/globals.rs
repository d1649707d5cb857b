use crate::{
    api::PortfolioClient,
    cli::commands::api::Options,
    session::{FileStore, Navigator, Route, SessionConfig, SessionManager},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};
use url::Url;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            api_url: options.api_url,
            session_file: options.session_file,
            timeout: options.timeout,
        }
    }

    /// Session backed by the session file.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the session file is unreadable.
    pub fn session(&self) -> Result<Arc<SessionManager>> {
        let config = SessionConfig {
            base_url: self.api_url.clone(),
            user_agent: crate::APP_USER_AGENT.to_string(),
            request_timeout: self.timeout,
        };
        let store = Arc::new(FileStore::new(&self.session_file));
        let manager = SessionManager::new(config, store, Arc::new(TerminalNavigator))
            .with_context(|| {
                format!("failed to open session {}", self.session_file.display())
            })?;
        Ok(Arc::new(manager))
    }

    /// # Errors
    /// Same as [`GlobalArgs::session`].
    pub fn client(&self) -> Result<PortfolioClient> {
        Ok(PortfolioClient::new(self.session()?))
    }
}

/// The terminal's login redirect: tell the user to sign in again.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, route: &Route) {
        if *route == Route::AdminLogin {
            eprintln!(
                "session expired, run `{} login` to sign in again",
                env!("CARGO_PKG_NAME")
            );
        } else {
            eprintln!("redirected to {route}");
        }
    }
}
