use crate::{
    api::{paths, ContactAck, NewContactMessage},
    session::{response::handle_json_response, ApiRequest, SessionError, SessionManager},
};
use std::sync::Arc;
use tracing::info;

/// Public contact form. Sent without credentials.
#[derive(Clone, Debug)]
pub struct ContactClient {
    session: Arc<SessionManager>,
}

impl ContactClient {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Validates locally, then posts the message.
    /// # Errors
    /// Returns a `Validation` error for bad input, or a transport/HTTP error.
    pub async fn send(&self, message: &NewContactMessage) -> Result<ContactAck, SessionError> {
        message.validate()?;
        let request = ApiRequest::post(paths::CONTACT).json(message)?;
        let response = self.session.public_request(&request).await?;
        let ack: ContactAck = handle_json_response(response).await?;
        info!("contact message sent");
        Ok(ack)
    }
}
