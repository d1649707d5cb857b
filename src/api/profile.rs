use crate::{
    api::{paths, ImageFile, Profile},
    session::{
        response::{handle_empty_response, handle_json_response},
        ApiRequest, SessionError, SessionManager,
    },
};
use std::sync::Arc;

const IMAGE_FIELD: &str = "profile_image";

#[derive(Clone, Debug)]
pub struct ProfileClient {
    session: Arc<SessionManager>,
}

impl ProfileClient {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn list(&self) -> Result<Vec<Profile>, SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::get(paths::PROFILE))
            .await?;
        handle_json_response(response).await
    }

    /// The first profile record, if any.
    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn current(&self) -> Result<Option<Profile>, SessionError> {
        Ok(self.list().await?.into_iter().next())
    }

    /// # Errors
    /// Returns a session, transport, validation, or HTTP error.
    pub async fn upload(&self, image: ImageFile) -> Result<Profile, SessionError> {
        let request = ApiRequest::post(paths::PROFILE).multipart(vec![image.into_part(IMAGE_FIELD)]);
        let response = self.session.authed_request(&request).await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, validation, or HTTP error.
    pub async fn replace(&self, id: u64, image: ImageFile) -> Result<Profile, SessionError> {
        let request = ApiRequest::patch(paths::detail(paths::PROFILE_DETAIL, id))
            .multipart(vec![image.into_part(IMAGE_FIELD)]);
        let response = self.session.authed_request(&request).await?;
        handle_json_response(response).await
    }

    /// Replaces the existing profile image, or creates the record if none exists.
    /// # Errors
    /// Returns a session, transport, validation, or HTTP error.
    pub async fn set_image(&self, image: ImageFile) -> Result<Profile, SessionError> {
        match self.current().await? {
            Some(profile) => self.replace(profile.id, image).await,
            None => self.upload(image).await,
        }
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn delete(&self, id: u64) -> Result<(), SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::delete(paths::detail(
                paths::PROFILE_DETAIL,
                id,
            )))
            .await?;
        handle_empty_response(response).await
    }
}
