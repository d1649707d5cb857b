use crate::{
    api::{paths, Project, ProjectForm},
    session::{
        response::{handle_empty_response, handle_json_response},
        ApiRequest, SessionError, SessionManager,
    },
};
use std::sync::Arc;
use tracing::debug;

/// Projects are created and edited through multipart forms so the image can
/// travel with the other fields.
#[derive(Clone, Debug)]
pub struct ProjectsClient {
    session: Arc<SessionManager>,
}

impl ProjectsClient {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn list(&self) -> Result<Vec<Project>, SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::get(paths::PROJECTS))
            .await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn get(&self, id: u64) -> Result<Project, SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::get(paths::detail(paths::PROJECT_DETAIL, id)))
            .await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a `Validation` error before sending when a required field is
    /// missing, otherwise a session, transport, or HTTP error.
    pub async fn create(&self, form: ProjectForm) -> Result<Project, SessionError> {
        form.validate_new()?;
        let request = ApiRequest::post(paths::PROJECTS).multipart(form.into_parts());
        let response = self.session.authed_request(&request).await?;
        let project: Project = handle_json_response(response).await?;
        debug!(id = project.id, "project created");
        Ok(project)
    }

    /// Partial update; fields left as `None` are not sent.
    /// # Errors
    /// Returns a session, transport, validation, or HTTP error.
    pub async fn update(&self, id: u64, form: ProjectForm) -> Result<Project, SessionError> {
        let request =
            ApiRequest::patch(paths::detail(paths::PROJECT_DETAIL, id)).multipart(form.into_parts());
        let response = self.session.authed_request(&request).await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns a session, transport, or HTTP error.
    pub async fn delete(&self, id: u64) -> Result<(), SessionError> {
        let response = self
            .session
            .authed_request(&ApiRequest::delete(paths::detail(
                paths::PROJECT_DETAIL,
                id,
            )))
            .await?;
        handle_empty_response(response).await
    }
}
