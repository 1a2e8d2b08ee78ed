//! Backend error types and formatting

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error classes surfaced by the accounts backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or empty caller token
    Unauthenticated,
    /// Missing payload, empty identifier or a schema violation
    InvalidArgument,
    /// No registered path pattern matches
    UnsupportedPath,
    /// The pattern matches but the verb is not bound
    UnsupportedOperation,
    /// The storage gateway failed
    StorageUnavailable,
    /// A stored entry could not be decoded
    CorruptRecord,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::InvalidArgument => "InvalidArgument",
            Self::UnsupportedPath => "UnsupportedPath",
            Self::UnsupportedOperation => "UnsupportedOperation",
            Self::StorageUnavailable => "StorageUnavailable",
            Self::CorruptRecord => "CorruptRecord",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 403,
            Self::InvalidArgument => 400,
            Self::UnsupportedPath => 404,
            Self::UnsupportedOperation => 405,
            Self::CorruptRecord => 500,
            Self::StorageUnavailable => 503,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the backend router and path handlers
#[derive(Debug, Error)]
#[error("{code}: {}", render_message(.message, .operation, .path))]
pub struct BackendError {
    pub code: ErrorCode,
    pub message: String,
    pub operation: Option<String>,
    pub path: Option<String>,
    pub request_id: Option<String>,
}

fn render_message(message: &str, operation: &Option<String>, path: &Option<String>) -> String {
    match (operation, path) {
        (Some(op), Some(path)) => format!("{op} {path}: {message}"),
        (None, Some(path)) => format!("{path}: {message}"),
        (Some(op), None) => format!("{op}: {message}"),
        (None, None) => message.to_string(),
    }
}

impl BackendError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            operation: None,
            path: None,
            request_id: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "client token empty")
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn storage(message: impl fmt::Display) -> Self {
        Self::new(ErrorCode::StorageUnavailable, message.to_string())
    }

    pub fn corrupt_record(message: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CorruptRecord,
            format!("json decoding failed: {message}"),
        )
    }

    /// Attach the operation and mount-relative path the error occurred on.
    ///
    /// Context already present is kept, so the innermost caller wins.
    pub fn with_context(mut self, operation: impl fmt::Display, path: impl Into<String>) -> Self {
        if self.operation.is_none() {
            self.operation = Some(operation.to_string());
        }
        if self.path.is_none() {
            self.path = Some(path.into());
        }
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The message with operation and path context prepended
    pub fn describe(&self) -> String {
        render_message(&self.message, &self.operation, &self.path)
    }

    /// Format as a host-style JSON error body
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct JsonError<'a> {
            errors: Vec<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            request_id: Option<&'a str>,
        }

        let error = JsonError {
            errors: vec![self.describe()],
            request_id: self.request_id.as_deref(),
        };

        serde_json::to_string(&error)
            .unwrap_or_else(|_| format!(r#"{{"errors":["{}"]}}"#, self.code.as_str()))
    }
}
