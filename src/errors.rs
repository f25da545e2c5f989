//! # Error Types
//!
//! `ApiError` is what the API client and transport propagate. State stores
//! never surface it directly: they call [`ApiError::classify`] to turn it into
//! a [`Rejection`], which carries only what a view may show (status code,
//! human-readable detail and optional field errors).

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field name to list of messages, as returned by the backend on validation failures.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}")]
    Status {
        status: StatusCode,
        body: Option<serde_json::Value>,
    },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Decode(error.to_string())
    }
}

/// A failure after classification, ready to be stored in a state container.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{detail}")]
pub struct Rejection {
    pub status: Option<u16>,
    pub detail: String,
    pub errors: Option<FieldErrors>,
}

impl Rejection {
    pub fn new(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

impl ApiError {
    /// HTTP status of the failed response, if the failure came from the backend.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classifies the failure for a state container.
    ///
    /// A string `detail` in the response body becomes the message; anything
    /// else (missing body, non-string detail, network or decode failures)
    /// falls back to `fallback`. Raw transport text never leaks into the
    /// result. A well-formed `errors` object is attached as field errors.
    /// Client-side input errors keep their reason and field.
    pub fn classify(&self, fallback: &str) -> Rejection {
        match self {
            ApiError::Status { status, body } => {
                let detail = body
                    .as_ref()
                    .and_then(|b| b.get("detail"))
                    .and_then(|d| d.as_str())
                    .unwrap_or(fallback);

                let mut rejection = Rejection::new(Some(status.as_u16()), detail);
                if let Some(errors) = body.as_ref().and_then(|b| b.get("errors")).and_then(parse_field_errors) {
                    rejection = rejection.with_errors(errors);
                }
                rejection
            }
            ApiError::InvalidField { field, reason } => {
                let mut errors = FieldErrors::new();
                errors.insert(field.clone(), vec![reason.clone()]);
                Rejection::new(None, reason.as_str()).with_errors(errors)
            }
            _ => Rejection::new(None, fallback),
        }
    }
}

fn parse_field_errors(value: &serde_json::Value) -> Option<FieldErrors> {
    let object = value.as_object()?;
    let mut errors = FieldErrors::new();
    for (field, messages) in object {
        let messages = match messages {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect(),
            serde_json::Value::String(single) => vec![single.clone()],
            _ => continue,
        };
        errors.insert(field.clone(), messages);
    }
    Some(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(code: u16, body: serde_json::Value) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: Some(body),
        }
    }

    #[test]
    fn classify_uses_string_detail() {
        let rejection = status_error(401, json!({"detail": "Invalid credentials"})).classify("Login failed");
        assert_eq!(rejection.status, Some(401));
        assert_eq!(rejection.detail, "Invalid credentials");
        assert!(rejection.is_unauthorized());
    }

    #[test]
    fn classify_falls_back_on_non_string_detail() {
        let rejection = status_error(500, json!({"detail": 42})).classify("Failed to load files");
        assert_eq!(rejection.detail, "Failed to load files");
        assert_eq!(rejection.status, Some(500));
    }

    #[test]
    fn classify_never_leaks_transport_text() {
        let rejection = ApiError::Transport("connection refused".into()).classify("Failed to delete file");
        assert_eq!(rejection, Rejection::new(None, "Failed to delete file"));
    }

    #[test]
    fn classify_attaches_field_errors() {
        let rejection = status_error(
            400,
            json!({"detail": "Validation error", "errors": {"username": ["taken"], "email": "bad"}}),
        )
        .classify("Registration failed");

        let errors = rejection.errors.unwrap();
        assert_eq!(errors["username"], vec!["taken".to_string()]);
        assert_eq!(errors["email"], vec!["bad".to_string()]);
    }

    #[test]
    fn classify_keeps_local_input_errors() {
        let rejection = ApiError::InvalidField {
            field: "file".into(),
            reason: "File name is required".into(),
        }
        .classify("Failed to upload file");
        assert_eq!(rejection.detail, "File name is required");
        assert_eq!(rejection.errors.unwrap()["file"], vec!["File name is required".to_string()]);
    }

    #[test]
    fn classify_ignores_non_object_errors() {
        let rejection = status_error(400, json!({"detail": "nope", "errors": ["x"]})).classify("fallback");
        assert!(rejection.errors.is_none());
    }
}
