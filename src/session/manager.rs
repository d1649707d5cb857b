//! Session manager: credential lifecycle, authenticated fetch, and the guard.
//!
//! Flow Overview:
//! - `login` exchanges credentials for a token pair, checks the staff flag through
//!   the current-user endpoint, and only then persists tokens and user together.
//! - `authed_request` attaches the bearer token. On 401 it refreshes once and
//!   retries once; a second 401 is returned as `Unauthorized`.
//! - Refreshes are serialized behind `refresh_lock`. Every successful login or
//!   refresh bumps `generation`, so a caller that waited on the lock while a
//!   sibling refreshed reuses the new token instead of refreshing again.
//! - A missing or rejected refresh token tears the session down: storage is
//!   cleared, the guard moves to `Unauthenticated`, and the navigator is asked to
//!   show the login view.

use crate::session::{
    credential::{
        Credential, CurrentUser, RefreshRequest, RefreshResponse, SessionUser, TokenPair,
        TokenRequest, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_INFO_KEY,
    },
    guard::{Navigator, RouteGuard, Transition},
    response::{handle_json_response, sanitize_body},
    route::Route,
    ApiRequest, SessionError, SessionStore,
};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, info_span, warn, Instrument};
use url::Url;

pub const TOKEN_PATH: &str = "/api/token/";
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";
pub const TOKEN_BLACKLIST_PATH: &str = "/api/token/blacklist/";
pub const CURRENT_USER_PATH: &str = "/api/accounts/me/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl SessionConfig {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            user_agent: crate::APP_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Validates the API base URL.
/// # Errors
/// Returns an error if the value cannot be parsed, has no host, or is not http(s).
pub fn parse_base_url(raw: &str) -> Result<Url, SessionError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| SessionError::Config(format!("invalid API URL {raw}: {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(SessionError::Config(format!(
                "invalid API URL {raw}: unsupported scheme {scheme}"
            )))
        }
    }

    if url.host().is_none() {
        return Err(SessionError::Config(format!(
            "invalid API URL {raw}: no host specified"
        )));
    }

    Ok(url)
}

pub struct SessionManager {
    client: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    guard: RouteGuard,
    navigator: Arc<dyn Navigator>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.base_url)
            .field("guard", &self.guard.state())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Builds a manager and derives the initial guard state from the stored
    /// access token.
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the store cannot be read.
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| SessionError::Config(format!("failed to build HTTP client: {err}")))?;

        let access_token = store.get(ACCESS_TOKEN_KEY)?;
        let guard = RouteGuard::from_access_token(access_token.as_deref());

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            store,
            guard,
            navigator,
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.guard.is_authenticated()
    }

    /// Resolves a path against the API base URL. Absolute URLs pass through.
    #[must_use]
    pub fn endpoint_url(&self, target: &str) -> String {
        let target = target.trim();
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}/{}", self.base_url, target.trim_start_matches('/'))
        }
    }

    /// Current access token, if a non-empty one is stored.
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn access_token(&self) -> Result<Option<SecretString>, SessionError> {
        self.read_secret(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Result<Option<SecretString>, SessionError> {
        self.read_secret(REFRESH_TOKEN_KEY)
    }

    fn read_secret(&self, key: &str) -> Result<Option<SecretString>, SessionError> {
        Ok(self
            .store
            .get(key)?
            .filter(|value| !value.trim().is_empty())
            .map(SecretString::from))
    }

    /// Both tokens, or `None` when logged out.
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn credential(&self) -> Result<Option<Credential>, SessionError> {
        match (self.access_token()?, self.refresh_token()?) {
            (Some(access), Some(refresh)) => Ok(Some(Credential::new(access, refresh))),
            _ => Ok(None),
        }
    }

    /// Cached user from the last login. An unreadable record is treated as absent.
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn current_user(&self) -> Result<Option<SessionUser>, SessionError> {
        let Some(raw) = self.store.get(USER_INFO_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!("ignoring unreadable cached user: {err}");
                Ok(None)
            }
        }
    }

    /// Exchanges credentials for a session. Only staff accounts are admitted;
    /// anything else leaves storage and the guard untouched.
    /// # Errors
    /// Returns `InvalidCredentials`, `AccessDenied`, or a transport/decoding error.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SessionUser, SessionError> {
        let token_url = self.endpoint_url(TOKEN_PATH);
        let span = info_span!("session.login", http.method = "POST", url = %token_url);
        let response = self
            .client
            .post(&token_url)
            .json(&TokenRequest {
                username,
                password: password.expose_secret(),
            })
            .send()
            .instrument(span)
            .await
            .map_err(SessionError::from_transport)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            warn!(%username, %status, "login rejected");
            return Err(SessionError::InvalidCredentials);
        }
        let pair: TokenPair = handle_json_response(response).await?;

        let me_url = self.endpoint_url(CURRENT_USER_PATH);
        let span = info_span!("session.whoami", http.method = "GET", url = %me_url);
        let response = self
            .client
            .get(&me_url)
            .bearer_auth(&pair.access)
            .send()
            .instrument(span)
            .await
            .map_err(SessionError::from_transport)?;
        let me: CurrentUser = handle_json_response(response).await?;

        if !me.is_staff {
            warn!(%username, "login rejected: account is not staff");
            return Err(SessionError::AccessDenied);
        }

        let user = SessionUser::from(me);
        let user_json = serde_json::to_string(&user)
            .map_err(|err| SessionError::Store(format!("failed to encode user: {err}")))?;

        self.store.set_many(&[
            (ACCESS_TOKEN_KEY, pair.access.as_str()),
            (REFRESH_TOKEN_KEY, pair.refresh.as_str()),
            (USER_INFO_KEY, user_json.as_str()),
        ])?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.guard.transition(Transition::LoginSucceeded);

        info!(username = %user.username, "session established");
        Ok(user)
    }

    /// Revokes the refresh token (best effort) and clears the session.
    /// # Errors
    /// Returns an error only if the store cannot be cleared.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Some(refresh) = self.refresh_token()? {
            match self.revoke(&refresh).await {
                Ok(()) => debug!("refresh token revoked"),
                Err(err) => warn!("failed to revoke refresh token: {err}"),
            }
        }
        self.end_session(Transition::LoggedOut)?;
        info!("logged out");
        Ok(())
    }

    async fn revoke(&self, refresh: &SecretString) -> Result<(), SessionError> {
        let url = self.endpoint_url(TOKEN_BLACKLIST_PATH);
        let span = info_span!("session.revoke", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest {
                refresh: refresh.expose_secret(),
            })
            .send()
            .instrument(span)
            .await
            .map_err(SessionError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SessionError::from_status(status, sanitize_body(&body)))
        }
    }

    /// Mints a new access token from the stored refresh token and persists it.
    /// Serialized with every other refresh issued through this manager.
    /// # Errors
    /// Returns `NoRefreshToken`, `RefreshRejected`, or a transport/decoding error.
    pub async fn refresh_access_token(&self) -> Result<SecretString, SessionError> {
        let _permit = self.refresh_lock.lock().await;
        self.request_new_access_token().await
    }

    /// Refresh on behalf of a request that was sent under `seen_generation`.
    async fn refresh_after(&self, seen_generation: u64) -> Result<SecretString, SessionError> {
        let _permit = self.refresh_lock.lock().await;

        if self.generation.load(Ordering::SeqCst) != seen_generation {
            if let Some(token) = self.access_token()? {
                debug!("reusing access token refreshed by a concurrent request");
                return Ok(token);
            }
        }

        self.request_new_access_token().await
    }

    async fn request_new_access_token(&self) -> Result<SecretString, SessionError> {
        let Some(refresh) = self.refresh_token()? else {
            debug!("no refresh token stored");
            return Err(SessionError::NoRefreshToken);
        };

        let url = self.endpoint_url(TOKEN_REFRESH_PATH);
        let span = info_span!("session.refresh", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest {
                refresh: refresh.expose_secret(),
            })
            .send()
            .instrument(span)
            .await
            .map_err(SessionError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "refresh token rejected");
            return Err(SessionError::RefreshRejected {
                status: status.as_u16(),
            });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|err| SessionError::Decode(err.to_string()))?;

        let mut entries = vec![(ACCESS_TOKEN_KEY, body.access.as_str())];
        if let Some(rotated) = body.refresh.as_deref() {
            entries.push((REFRESH_TOKEN_KEY, rotated));
        }
        self.store.set_many(&entries)?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.guard.transition(Transition::Refreshed);

        debug!("access token refreshed");
        Ok(SecretString::from(body.access))
    }

    /// Sends a protected request, recovering once from an expired access token.
    ///
    /// Returns the first non-401 response or the retried response. A 401 on the
    /// retry is `Unauthorized`. A missing or rejected refresh token ends the
    /// session and is returned as-is.
    /// # Errors
    /// Returns transport errors, `Unauthorized`, or the terminal refresh error.
    pub async fn authed_request(&self, request: &ApiRequest) -> Result<Response, SessionError> {
        let url = self.endpoint_url(request.target());
        let seen_generation = self.generation.load(Ordering::SeqCst);
        let token = self.access_token()?;

        let response = self.send(request, &url, token.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url = %url, "access token rejected, refreshing");
        let token = match self.refresh_after(seen_generation).await {
            Ok(token) => token,
            Err(err) if err.is_terminal() => {
                self.teardown();
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let retried = self.send(request, &url, Some(&token)).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "request still unauthorized after refresh");
            return Err(SessionError::Unauthorized);
        }
        Ok(retried)
    }

    /// Sends a request without credentials and without refresh handling.
    /// # Errors
    /// Returns transport errors.
    pub async fn public_request(&self, request: &ApiRequest) -> Result<Response, SessionError> {
        let url = self.endpoint_url(request.target());
        self.send(request, &url, None).await
    }

    async fn send(
        &self,
        request: &ApiRequest,
        url: &str,
        token: Option<&SecretString>,
    ) -> Result<Response, SessionError> {
        let span = info_span!(
            "session.request",
            http.method = %request.method(),
            url = %url,
            authenticated = token.is_some()
        );

        let mut builder = request.build(&self.client, url)?;
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder
            .send()
            .instrument(span)
            .await
            .map_err(SessionError::from_transport)
    }

    fn teardown(&self) {
        if let Err(err) = self.end_session(Transition::RefreshFailed) {
            error!("failed to clear session after refresh failure: {err}");
        }
        self.navigator.redirect(&Route::AdminLogin);
    }

    fn end_session(&self, transition: Transition) -> Result<(), SessionError> {
        let cleared = self.store.remove_many(&SESSION_KEYS);
        self.guard.transition(transition);
        cleared
    }
}
