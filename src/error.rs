use thiserror::Error;

/// Failures surfaced by catalog operations. Each carries the text shown to the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// Transport failure or the service is down.
    #[error("{0}")]
    Unavailable(String),
    /// Non-2xx answer; `message` is the service's own text when it sent one.
    #[error("{message}")]
    Service { status: u16, message: String },
    /// Bad input caught before anything was sent.
    #[error("{0}")]
    Validation(String),
}

impl SyncError {
    pub fn user_message(&self) -> &str {
        match self {
            SyncError::Unavailable(msg) | SyncError::Validation(msg) => msg,
            SyncError::Service { message, .. } => message,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SyncError::Unavailable(_))
    }
}

/// What went wrong on the wire, before any user-facing wording is chosen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service answered {status}")]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Transport(err.to_string())
    }
}
