//! Owned request descriptions.
//!
//! An authenticated call may be sent twice (original + retry after refresh), and
//! `reqwest` request builders with multipart bodies cannot be cloned. Requests are
//! therefore described by value and rebuilt for every attempt.

use crate::session::SessionError;
use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::File {
                name,
                file_name,
                mime,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    target: String,
    body: RequestBody,
}

impl ApiRequest {
    /// `target` is either a path relative to the API base URL or an absolute URL.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    #[must_use]
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    #[must_use]
    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::PUT, target)
    }

    #[must_use]
    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::PATCH, target)
    }

    #[must_use]
    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// # Errors
    /// Returns an error if the body cannot be encoded as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, SessionError> {
        let value = serde_json::to_value(body)
            .map_err(|err| SessionError::Request(format!("failed to encode request: {err}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Builds a fresh `reqwest` request for one attempt.
    pub(crate) fn build(&self, client: &Client, url: &str) -> Result<RequestBuilder, SessionError> {
        let builder = client.request(self.method.clone(), url);

        let builder = match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        Ok(builder)
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, SessionError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime).map_err(|err| {
                        SessionError::Request(format!("invalid mime type {mime}: {err}"))
                    })?;
                }
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_is_encoded() {
        let request = ApiRequest::post("/api/portfolio/skills/")
            .json(&json!({"name": "Rust", "level": "Expert"}))
            .unwrap();
        assert_eq!(request.method(), &Method::POST);
        match request.body() {
            RequestBody::Json(value) => assert_eq!(value["name"], "Rust"),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn builds_repeatedly() {
        let client = Client::new();
        let request = ApiRequest::patch("/api/portfolio/profile/1/")
            .multipart(vec![
                FormPart::text("title", "Site"),
                FormPart::File {
                    name: "profile_image".to_string(),
                    file_name: "me.png".to_string(),
                    mime: Some("image/png".to_string()),
                    bytes: vec![0x89, 0x50],
                },
            ]);

        for _ in 0..2 {
            let built = request
                .build(&client, "http://127.0.0.1:1/api/portfolio/profile/1/")
                .unwrap()
                .build()
                .unwrap();
            assert_eq!(built.method(), Method::PATCH);
            let content_type = built.headers().get("content-type").unwrap();
            assert!(content_type
                .to_str()
                .unwrap()
                .starts_with("multipart/form-data"));
        }
    }

    #[test]
    fn invalid_mime_is_rejected() {
        let client = Client::new();
        let request = ApiRequest::post("/x").multipart(vec![FormPart::File {
            name: "image".to_string(),
            file_name: "a.bin".to_string(),
            mime: Some("not a mime".to_string()),
            bytes: vec![1],
        }]);
        assert!(matches!(
            request.build(&client, "http://127.0.0.1:1/x"),
            Err(SessionError::Request(_))
        ));
    }

    #[test]
    fn file_part_debug_hides_bytes() {
        let part = FormPart::File {
            name: "image".to_string(),
            file_name: "a.png".to_string(),
            mime: None,
            bytes: vec![7; 64],
        };
        let debug = format!("{part:?}");
        assert!(debug.contains("len: 64"));
        assert_eq!(part.name(), "image");
    }
}
