//! Typed clients for the portfolio resources.
//!
//! Every admin call goes through [`SessionManager::authed_request`]; the public
//! contact form uses [`SessionManager::public_request`].

mod contact;
mod messages;
pub mod paths;
mod profile;
mod projects;
pub mod types;

pub use contact::ContactClient;
pub use messages::MessagesClient;
pub use profile::ProfileClient;
pub use projects::ProjectsClient;
pub use types::{
    ContactAck, ContactMessage, Education, EducationInput, Experience, ExperienceInput, ImageFile,
    NewContactMessage, Profile, Project, ProjectForm, Skill, SkillInput,
};

use crate::session::{
    response::{handle_empty_response, handle_json_response},
    ApiRequest, SessionError, SessionManager,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct PortfolioClient {
    session: Arc<SessionManager>,
}

impl PortfolioClient {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    #[must_use]
    pub fn projects(&self) -> ProjectsClient {
        ProjectsClient::new(self.session.clone())
    }

    #[must_use]
    pub fn skills(&self) -> JsonCollection<Skill, SkillInput> {
        JsonCollection::new(self.session.clone(), paths::SKILLS, paths::SKILL_DETAIL)
    }

    #[must_use]
    pub fn education(&self) -> JsonCollection<Education, EducationInput> {
        JsonCollection::new(
            self.session.clone(),
            paths::EDUCATION,
            paths::EDUCATION_DETAIL,
        )
    }

    #[must_use]
    pub fn experience(&self) -> JsonCollection<Experience, ExperienceInput> {
        JsonCollection::new(
            self.session.clone(),
            paths::EXPERIENCE,
            paths::EXPERIENCE_DETAIL,
        )
    }

    #[must_use]
    pub fn messages(&self) -> MessagesClient {
        MessagesClient::new(self.session.clone())
    }

    #[must_use]
    pub fn profile(&self) -> ProfileClient {
        ProfileClient::new(self.session.clone())
    }

    #[must_use]
    pub fn contact(&self) -> ContactClient {
        ContactClient::new(self.session.clone())
    }

    /// Skills as shown on the public site. No credentials are sent.
    /// # Errors
    /// Returns a transport or HTTP error.
    pub async fn public_skills(&self) -> Result<Vec<Skill>, SessionError> {
        let response = self
            .session
            .public_request(&ApiRequest::get(paths::SKILLS))
            .await?;
        handle_json_response(response).await
    }
}

/// CRUD over a JSON resource: list/create on `collection`, get/update/delete on
/// `{detail}{id}/`. Updates are full `PUT`s.
pub struct JsonCollection<T, I> {
    session: Arc<SessionManager>,
    collection: &'static str,
    detail: &'static str,
    _marker: PhantomData<fn() -> (T, I)>,
}

impl<T, I> JsonCollection<T, I>
where
    T: DeserializeOwned,
    I: Serialize,
{
    #[must_use]
    pub fn new(session: Arc<SessionManager>, collection: &'static str, detail: &'static str) -> Self {
        Self {
            session,
            collection,
            detail,
            _marker: PhantomData,
        }
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn list(&self) -> Result<Vec<T>, SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::get(self.collection))
            .await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn get(&self, id: u64) -> Result<T, SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::get(paths::detail(self.detail, id)))
            .await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, validation, or HTTP error.
    pub async fn create(&self, input: &I) -> Result<T, SessionError> {
        let request = ApiRequest::post(self.collection).json(input)?;
        let response = self.session.authed_request(&request).await?;
        let created = handle_json_response(response).await?;
        debug!(collection = self.collection, "created");
        Ok(created)
    }

    /// # Errors
    /// Returns a session, transport, validation, or HTTP error.
    pub async fn update(&self, id: u64, input: &I) -> Result<T, SessionError> {
        let request = ApiRequest::put(paths::detail(self.detail, id)).json(input)?;
        let response = self.session.authed_request(&request).await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn delete(&self, id: u64) -> Result<(), SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::delete(paths::detail(self.detail, id)))
            .await?;
        handle_empty_response(response).await?;
        debug!(collection = self.collection, id, "deleted");
        Ok(())
    }
}
