use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation failed ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("no refresh token stored")]
    NoRefreshToken,
    #[error("refresh token rejected ({status})")]
    RefreshRejected { status: u16 },
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("access denied: account does not have admin privileges")]
    AccessDenied,
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("session store error: {0}")]
    Store(String),
    #[error("invalid request: {0}")]
    Request(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Errors that end the session: the stored credential was torn down.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoRefreshToken | Self::RefreshRejected { .. })
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }

    /// Classifies a non-success status and its (already sanitized) body.
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation {
                status: status.as_u16(),
                message,
            },
            _ => Self::Http {
                status: status.as_u16(),
                message,
            },
        }
    }
}
