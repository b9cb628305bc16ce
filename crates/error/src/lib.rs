//! # ferry-error
//!
//! The error every Ferry operation returns to the host database.
//!
//! Module errors (`GenerationError`, `ConfigurationError`, `RewriteError`,
//! ...) stay local to their crates and are converted into [`FerryError`] at
//! the adapter boundary. The host prints the `Display` form in its error
//! message; the CLI emits the JSON form. Codes are grouped by range, see
//! [`ErrorCategory`].

mod code;
mod context;
mod convert;

pub use code::{ErrorCategory, ErrorCode};
pub use context::ErrorContext;
pub use convert::find_closest_match;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A failed adapter request.
///
/// `code` identifies the failure class and never changes meaning between
/// releases. `context` names the property, dialect, function or remote
/// object involved. `hint` tells the operator which property to change or
/// which capability to exclude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FerryError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FerryError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// JSON document for machine consumers. Falls back to code and message
    /// when the context cannot be encoded.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(code = %self.code, error = %e, "Could not encode error context");
                serde_json::json!({ "code": self.code, "message": self.message }).to_string()
            }
        }
    }
}

/// `[FERRY-XXXX] message (Hint: ...)`, the line shown in the host's error.
impl fmt::Display for FerryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        match &self.hint {
            Some(hint) => write!(f, " (Hint: {})", hint),
            None => Ok(()),
        }
    }
}

impl std::error::Error for FerryError {}
