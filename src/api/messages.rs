use crate::{
    api::{paths, ContactMessage},
    session::{
        response::{handle_empty_response, handle_json_response},
        ApiRequest, SessionError, SessionManager,
    },
};
use std::sync::Arc;

/// Messages left through the public contact form.
#[derive(Clone, Debug)]
pub struct MessagesClient {
    session: Arc<SessionManager>,
}

impl MessagesClient {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn list(&self) -> Result<Vec<ContactMessage>, SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::get(paths::MESSAGES))
            .await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn delete(&self, id: u64) -> Result<(), SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::delete(paths::detail(
                paths::MESSAGE_DELETE,
                id,
            )))
            .await?;
        handle_empty_response(response).await
    }
}
