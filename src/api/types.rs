//! Request and response types for the portfolio resources.

use crate::session::{FormPart, SessionError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Image attached to a multipart upload.
#[derive(Clone, Debug)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Reads an image from disk; the MIME type is guessed from the extension.
    /// # Errors
    /// Returns an error if the file cannot be read or has no file name.
    pub fn from_path(path: &Path) -> Result<Self, SessionError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SessionError::Request(format!("invalid file name: {}", path.display())))?
            .to_string();
        let bytes = fs::read(path).map_err(|err| {
            SessionError::Request(format!("failed to read {}: {err}", path.display()))
        })?;
        Ok(Self {
            mime: mime_guess::from_path(path)
                .first()
                .map(|mime| mime.essence_str().to_string()),
            file_name,
            bytes,
        })
    }

    pub(crate) fn into_part(self, field: &str) -> FormPart {
        FormPart::File {
            name: field.to_string(),
            file_name: self.file_name,
            mime: self.mime,
            bytes: self.bytes,
        }
    }
}

/// Multipart form for creating or editing a project. On update, absent fields
/// are left unchanged on the server.
#[derive(Clone, Debug, Default)]
pub struct ProjectForm {
    pub order: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image: Option<ImageFile>,
}

impl ProjectForm {
    /// A new project needs a title, a description and an image.
    /// # Errors
    /// Returns a `Validation` error naming the first missing field.
    pub fn validate_new(&self) -> Result<(), SessionError> {
        let missing = if self.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            Some("title")
        } else if self
            .description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
        {
            Some("description")
        } else if self.image.is_none() {
            Some("image")
        } else {
            None
        };

        match missing {
            Some(field) => Err(SessionError::Validation {
                status: 0,
                message: format!("{field} is required"),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn into_parts(self) -> Vec<FormPart> {
        let mut parts = Vec::new();
        if let Some(order) = self.order {
            parts.push(FormPart::text("order", order.to_string()));
        }
        if let Some(title) = self.title {
            parts.push(FormPart::text("title", title));
        }
        if let Some(description) = self.description {
            parts.push(FormPart::text("description", description));
        }
        if let Some(link) = self.link {
            parts.push(FormPart::text("link", link));
        }
        if let Some(image) = self.image {
            parts.push(image.into_part("image"));
        }
        parts
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub id: u64,
    pub name: String,
    pub level: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillInput {
    pub name: String,
    pub level: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub id: u64,
    pub institution: String,
    pub degree_title: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    pub start_year: i32,
    #[serde(default)]
    pub end_year: Option<i32>,
    /// Decimal serialized by the API as a string, e.g. `"87.50"`.
    #[serde(default)]
    pub marks_percentage: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EducationInput {
    pub institution: String,
    pub degree_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    pub start_year: i32,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks_percentage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experience {
    pub id: u64,
    pub job_title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperienceInput {
    pub job_title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date: String,
    /// Cleared when the position is current.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub order: u32,
}

impl ExperienceInput {
    /// A current position has no end date.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.is_current {
            self.end_date = None;
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactMessage {
    /// Not every API version exposes the id in listings.
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContactMessage {
    /// # Errors
    /// Returns a `Validation` error for an empty name or message or a malformed email.
    pub fn validate(&self) -> Result<(), SessionError> {
        let invalid = |message: &str| SessionError::Validation {
            status: 0,
            message: message.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is required"));
        }
        if !valid_email(self.email.trim()) {
            return Err(invalid("email is invalid"));
        }
        if self.message.trim().is_empty() {
            return Err(invalid("message is required"));
        }
        Ok(())
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: u64,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContactAck {
    #[serde(default)]
    pub detail: String,
}
