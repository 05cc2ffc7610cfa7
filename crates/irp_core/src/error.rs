use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across backend layers and exposed over RPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Single human-readable message shown in the report forms:
    /// message, then code, then details when present.
    pub fn user_message(&self) -> String {
        let mut out = format!("Error: {}", self.message);
        if !self.code.is_empty() {
            out.push_str(&format!(" (Code: {})", self.code));
        }
        if let Some(details) = &self.details {
            out.push_str(&format!(" Details: {details}"));
        }
        out
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
