#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    extract::{Multipart, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get, patch, post},
    Json, Router,
};
use portfolio_admin::{
    api::{ImageFile, NewContactMessage, PortfolioClient, ProjectForm},
    session::{
        credential::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY},
        ApiRequest, GuardState, MemoryStore, Navigator, Role, Route, SessionConfig, SessionError,
        SessionManager, SessionStore,
    },
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::net::TcpListener;

const REFRESH_TOKEN: &str = "refresh-1";
const ROTATED_REFRESH_TOKEN: &str = "refresh-2";

/// In-process stand-in for the portfolio API.
#[derive(Default)]
struct MockApi {
    valid_access: Mutex<String>,
    issued: AtomicUsize,
    refresh_calls: AtomicUsize,
    blacklist_calls: AtomicUsize,
    protected_calls: AtomicUsize,
    reject_refresh: AtomicBool,
    rotate_refresh: AtomicBool,
    slow_refresh: AtomicBool,
    always_unauthorized: AtomicBool,
    staff: AtomicBool,
    auth_headers: Mutex<Vec<Option<String>>>,
    multipart_fields: Mutex<Vec<Vec<String>>>,
}

type Shared = Arc<MockApi>;

impl MockApi {
    fn issue_access(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("access-{n}");
        *self.valid_access.lock().unwrap() = token.clone();
        token
    }

    /// Records the Authorization header and reports whether it carries the
    /// currently valid access token.
    fn authorize(&self, headers: &HeaderMap) -> bool {
        self.protected_calls.fetch_add(1, Ordering::SeqCst);
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(header.clone());

        if self.always_unauthorized.load(Ordering::SeqCst) {
            return false;
        }
        let valid = self.valid_access.lock().unwrap().clone();
        header.as_deref() == Some(format!("Bearer {valid}").as_str())
    }
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type", "code": "token_not_valid"})),
    )
}

async fn token(State(api): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] != "correct horse" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        );
    }
    let access = api.issue_access();
    (
        StatusCode::OK,
        Json(json!({"access": access, "refresh": REFRESH_TOKEN})),
    )
}

async fn me(State(api): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !api.authorize(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 1,
            "username": "ada",
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "",
            "is_staff": api.staff.load(Ordering::SeqCst),
        })),
    )
}

async fn refresh(State(api): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    api.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Keep the refresh in flight long enough for concurrent callers to queue up.
    let delay = if api.slow_refresh.load(Ordering::SeqCst) {
        Duration::from_secs(2)
    } else {
        Duration::from_millis(100)
    };
    tokio::time::sleep(delay).await;

    if api.reject_refresh.load(Ordering::SeqCst) || body["refresh"] != REFRESH_TOKEN {
        return unauthorized();
    }
    let access = api.issue_access();
    if api.rotate_refresh.load(Ordering::SeqCst) {
        (
            StatusCode::OK,
            Json(json!({"access": access, "refresh": ROTATED_REFRESH_TOKEN})),
        )
    } else {
        (StatusCode::OK, Json(json!({"access": access})))
    }
}

async fn blacklist(State(api): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    api.blacklist_calls.fetch_add(1, Ordering::SeqCst);
    if body["refresh"] == REFRESH_TOKEN {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn skills(State(api): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !api.authorize(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([{"id": 1, "name": "Rust", "level": "Expert"}])),
    )
}

async fn update_project(
    State(api): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut fields = Vec::new();
    let mut title = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        if name == "title" {
            title = String::from_utf8_lossy(&bytes).to_string();
        }
        fields.push(name);
    }
    api.multipart_fields.lock().unwrap().push(fields);

    if !api.authorize(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "title": title,
            "description": "unchanged",
            "image": "http://127.0.0.1/media/projects/site.png",
            "link": null,
            "created_at": "2024-01-01T00:00:00Z",
        })),
    )
}

async fn delete_message(State(api): State<Shared>, headers: HeaderMap) -> StatusCode {
    if api.authorize(&headers) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn contact(State(api): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    api.authorize(&headers);
    (
        StatusCode::CREATED,
        Json(json!({"detail": "Message sent successfully!"})),
    )
}

async fn spawn_api(api: Shared) -> String {
    let app = Router::new()
        .route("/api/token/", post(token))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/token/blacklist/", post(blacklist))
        .route("/api/accounts/me/", get(me))
        .route("/api/portfolio/skills/", get(skills))
        .route("/api/portfolio/admin/projects/:id/", patch(update_project))
        .route(
            "/api/dashboard/contact/messages/delete/:id/",
            delete(delete_message),
        )
        .route("/api/portfolio/contact/", post(contact))
        .with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Default)]
struct RecordingNavigator {
    redirects: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    fn redirects(&self) -> Vec<Route> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &Route) {
        self.redirects.lock().unwrap().push(*route);
    }
}

struct Harness {
    api: Shared,
    store: Arc<MemoryStore>,
    navigator: Arc<RecordingNavigator>,
    session: Arc<SessionManager>,
}

impl Harness {
    /// Starts a mock API. `access` and `refresh` seed the store.
    async fn new(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self::with_timeout(access, refresh, Duration::from_secs(5)).await
    }

    async fn with_timeout(access: Option<&str>, refresh: Option<&str>, timeout: Duration) -> Self {
        let api = Shared::default();
        api.staff.store(true, Ordering::SeqCst);
        // Nothing in the store is valid until the server issues a token.
        *api.valid_access.lock().unwrap() = "access-0".to_string();
        let base = spawn_api(api.clone()).await;

        let store = Arc::new(MemoryStore::new());
        if let Some(access) = access {
            store.set(ACCESS_TOKEN_KEY, access).unwrap();
        }
        if let Some(refresh) = refresh {
            store.set(REFRESH_TOKEN_KEY, refresh).unwrap();
        }
        if access.is_some() {
            store
                .set(
                    USER_INFO_KEY,
                    r#"{"username":"ada","email":"ada@example.com","role":"admin"}"#,
                )
                .unwrap();
        }

        let navigator = Arc::new(RecordingNavigator::default());
        let config = SessionConfig::new(&base)
            .unwrap()
            .with_timeout(timeout);
        let session =
            SessionManager::new(config, store.clone(), navigator.clone()).unwrap();

        Self {
            api,
            store,
            navigator,
            session: Arc::new(session),
        }
    }

    fn client(&self) -> PortfolioClient {
        PortfolioClient::new(self.session.clone())
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }

    fn assert_cleared(&self) {
        assert_eq!(self.stored(ACCESS_TOKEN_KEY), None);
        assert_eq!(self.stored(REFRESH_TOKEN_KEY), None);
        assert_eq!(self.stored(USER_INFO_KEY), None);
        assert_eq!(self.session.guard().state(), GuardState::Unauthenticated);
    }

    fn refresh_calls(&self) -> usize {
        self.api.refresh_calls.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_retried_once() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;

    let skills = harness.client().skills().list().await?;

    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0].name, "Rust");
    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.api.protected_calls.load(Ordering::SeqCst), 2);
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
    assert_eq!(
        harness.stored(REFRESH_TOKEN_KEY).as_deref(),
        Some(REFRESH_TOKEN)
    );
    assert!(harness.session.is_authenticated());
    assert!(harness.navigator.redirects().is_empty());

    let headers = harness.api.auth_headers.lock().unwrap().clone();
    assert_eq!(
        headers,
        vec![
            Some("Bearer stale".to_string()),
            Some("Bearer access-1".to_string())
        ]
    );
    Ok(())
}

#[tokio::test]
async fn rotated_refresh_token_is_persisted() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;
    harness.api.rotate_refresh.store(true, Ordering::SeqCst);

    harness.client().skills().list().await?;

    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
    assert_eq!(
        harness.stored(REFRESH_TOKEN_KEY).as_deref(),
        Some(ROTATED_REFRESH_TOKEN)
    );
    assert!(harness.stored(USER_INFO_KEY).is_some());
    Ok(())
}

#[tokio::test]
async fn refresh_timeout_keeps_session() {
    let harness =
        Harness::with_timeout(Some("stale"), Some(REFRESH_TOKEN), Duration::from_millis(500))
            .await;
    harness.api.slow_refresh.store(true, Ordering::SeqCst);

    let err = harness.client().skills().list().await.unwrap_err();

    assert!(matches!(err, SessionError::Timeout), "unexpected error: {err:?}");
    assert!(!err.is_terminal());
    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("stale"));
    assert_eq!(
        harness.stored(REFRESH_TOKEN_KEY).as_deref(),
        Some(REFRESH_TOKEN)
    );
    assert!(harness.stored(USER_INFO_KEY).is_some());
    assert_eq!(harness.session.guard().state(), GuardState::Authenticated);
    assert!(harness.navigator.redirects().is_empty());
}

#[tokio::test]
async fn refresh_token_alone_restores_authenticated_session() -> anyhow::Result<()> {
    let harness = Harness::new(None, Some(REFRESH_TOKEN)).await;
    assert_eq!(harness.session.guard().state(), GuardState::Unauthenticated);

    let skills = harness.client().skills().list().await?;

    assert_eq!(skills.len(), 1);
    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
    assert_eq!(harness.session.guard().state(), GuardState::Authenticated);
    assert!(harness.navigator.redirects().is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_refresh_token_clears_session_and_redirects() {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;
    harness.api.reject_refresh.store(true, Ordering::SeqCst);
    assert!(harness.session.is_authenticated());

    let err = harness
        .session
        .authed_request(&ApiRequest::get("/api/portfolio/skills/"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::RefreshRejected { status: 401 }));
    assert!(err.is_terminal());
    assert_eq!(harness.refresh_calls(), 1);
    harness.assert_cleared();
    assert_eq!(harness.navigator.redirects(), vec![Route::AdminLogin]);
}

#[tokio::test]
async fn no_tokens_sends_anonymous_request_and_clears_idempotently() {
    let harness = Harness::new(None, None).await;
    assert!(!harness.session.is_authenticated());

    for _ in 0..2 {
        let err = harness
            .session
            .authed_request(&ApiRequest::get("/api/portfolio/skills/"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoRefreshToken));
        harness.assert_cleared();
    }

    let headers = harness.api.auth_headers.lock().unwrap().clone();
    assert_eq!(headers, vec![None, None]);
    assert_eq!(harness.refresh_calls(), 0);
    assert_eq!(
        harness.navigator.redirects(),
        vec![Route::AdminLogin, Route::AdminLogin]
    );
}

#[tokio::test]
async fn second_unauthorized_is_not_refreshed_again() {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;
    harness.api.always_unauthorized.store(true, Ordering::SeqCst);

    let err = harness.client().skills().list().await.unwrap_err();

    assert!(matches!(err, SessionError::Unauthorized));
    assert!(!err.is_terminal());
    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.api.protected_calls.load(Ordering::SeqCst), 2);
    // The refresh itself succeeded, so the session stays.
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
    assert!(harness.navigator.redirects().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_requests_share_one_refresh() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;
    let client = harness.client();

    let mut tasks = Vec::new();
    for _ in 0..6 {
        let skills = client.skills();
        tasks.push(tokio::spawn(async move { skills.list().await }));
    }
    for task in tasks {
        let skills = task.await??;
        assert_eq!(skills.len(), 1);
    }

    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
    Ok(())
}

#[tokio::test]
async fn staff_login_persists_session() -> anyhow::Result<()> {
    let harness = Harness::new(None, None).await;
    let mut state = harness.session.guard().subscribe();

    let user = harness
        .session
        .login("ada", &SecretString::from("correct horse".to_string()))
        .await?;

    assert_eq!(user.username, "ada");
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.first_name.as_deref(), Some("Ada"));
    assert_eq!(user.last_name, None);

    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
    assert_eq!(
        harness.stored(REFRESH_TOKEN_KEY).as_deref(),
        Some(REFRESH_TOKEN)
    );
    let cached = harness.session.current_user()?.expect("cached user");
    assert_eq!(cached, user);

    assert!(harness.session.is_authenticated());
    assert!(state.has_changed()?);
    assert_eq!(*state.borrow_and_update(), GuardState::Authenticated);
    assert_eq!(
        harness.session.guard().check(&Route::MessagesView),
        portfolio_admin::session::GuardDecision::Render
    );
    Ok(())
}

#[tokio::test]
async fn non_staff_login_persists_nothing() {
    let harness = Harness::new(None, None).await;
    harness.api.staff.store(false, Ordering::SeqCst);

    let err = harness
        .session
        .login("ada", &SecretString::from("correct horse".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::AccessDenied));
    harness.assert_cleared();
    assert_eq!(
        harness.session.guard().check(&Route::Dashboard),
        portfolio_admin::session::GuardDecision::Redirect(Route::AdminLogin)
    );
    assert!(harness.navigator.redirects().is_empty());
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let harness = Harness::new(None, None).await;

    let err = harness
        .session
        .login("ada", &SecretString::from("wrong".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::InvalidCredentials));
    harness.assert_cleared();
}

#[tokio::test]
async fn logout_revokes_refresh_token_and_clears() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;

    harness.session.logout().await?;

    assert_eq!(harness.api.blacklist_calls.load(Ordering::SeqCst), 1);
    harness.assert_cleared();
    assert!(harness.navigator.redirects().is_empty());

    // Nothing left to revoke.
    harness.session.logout().await?;
    assert_eq!(harness.api.blacklist_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn logout_clears_even_when_revocation_fails() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some("unknown-refresh")).await;

    harness.session.logout().await?;

    assert_eq!(harness.api.blacklist_calls.load(Ordering::SeqCst), 1);
    harness.assert_cleared();
    Ok(())
}

#[tokio::test]
async fn multipart_body_is_resent_after_refresh() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;

    let form = ProjectForm {
        title: Some("New site".to_string()),
        image: Some(ImageFile {
            file_name: "site.png".to_string(),
            mime: Some("image/png".to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }),
        ..ProjectForm::default()
    };
    let project = harness.client().projects().update(3, form).await?;

    assert_eq!(project.id, 3);
    assert_eq!(project.title, "New site");
    assert_eq!(harness.refresh_calls(), 1);

    let attempts = harness.api.multipart_fields.lock().unwrap().clone();
    assert_eq!(attempts.len(), 2);
    for fields in attempts {
        assert_eq!(fields, vec!["title".to_string(), "image".to_string()]);
    }
    Ok(())
}

#[tokio::test]
async fn delete_accepts_no_content() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;

    harness.client().messages().delete(11).await?;

    assert_eq!(harness.refresh_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn contact_form_is_sent_without_credentials() -> anyhow::Result<()> {
    let harness = Harness::new(Some("stale"), Some(REFRESH_TOKEN)).await;

    let ack = harness
        .client()
        .contact()
        .send(&NewContactMessage {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            message: "Hello".to_string(),
        })
        .await?;

    assert_eq!(ack.detail, "Message sent successfully!");
    let headers = harness.api.auth_headers.lock().unwrap().clone();
    assert_eq!(headers, vec![None]);
    assert_eq!(harness.refresh_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_contact_form_is_not_sent() {
    let harness = Harness::new(None, None).await;

    let err = harness
        .client()
        .contact()
        .send(&NewContactMessage {
            name: "Grace".to_string(),
            email: "not-an-email".to_string(),
            message: "Hello".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Validation { .. }));
    assert_eq!(harness.api.protected_calls.load(Ordering::SeqCst), 0);
}
