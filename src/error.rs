//! Typed errors and user-facing messages.

use serde::Serialize;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network request failed, check your connection and try again";
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later";
pub const UNAUTHORIZED_MESSAGE: &str = "Session expired, please sign in again";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("row key must not be empty")]
    EmptyRowKey,
    #[error("duplicate {kind} field: {name}")]
    DuplicateField { kind: &'static str, name: String },
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("default page size {size} is not one of the page size options {options:?}")]
    PageSizeNotOffered { size: u32, options: Vec<u32> },
    #[error("default value of select field '{0}' is not one of its options")]
    DefaultNotInOptions(String),
    #[error("invalid pattern for field '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },
    #[error("endpoint '{0}' must contain an {{id}} placeholder")]
    MissingIdPlaceholder(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("environment: {0}")]
    Env(String),
}

/// One failed field check from client-side validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Network failure or a non-2xx HTTP status.
    #[error("transport: {message}")]
    Transport { status: Option<u16>, message: String },
    /// HTTP 401. Credentials have already been cleared when this is returned.
    #[error("unauthorized")]
    Unauthorized,
    /// 2xx response whose embedded business code signals failure.
    #[error("business code {code}: {}", .message.as_deref().unwrap_or(REQUEST_FAILED_MESSAGE))]
    Business { code: i64, message: Option<String> },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("operation not configured: {0}")]
    Unsupported(&'static str),
    #[error("record has no value for row key '{0}'")]
    MissingRowKey(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("storage: {0}")]
    Storage(String),
}

impl AdminError {
    /// Message suitable for an error banner or toast.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Transport { status: Some(s), .. } if *s >= 500 => SERVER_ERROR_MESSAGE.to_string(),
            AdminError::Transport { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            AdminError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            AdminError::Business { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(REQUEST_FAILED_MESSAGE)
                .to_string(),
            AdminError::Validation(errors) => errors
                .0
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Invalid input".to_string()),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return AdminError::Decode(e.to_string());
        }
        AdminError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        AdminError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for AdminError {
    fn from(e: std::io::Error) -> Self {
        AdminError::Storage(e.to_string())
    }
}
