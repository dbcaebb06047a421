//! Structured error types shared across splitab crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`AbError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (experiment ids, store keys, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the splitab engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum AbError {
    /// The experiment definition is unusable (too few alternatives, not committed).
    #[error("definition error: {0}")]
    Definition(ErrorInfo),
    /// A forced selection named a value that no alternative carries.
    #[error("invalid override: {0}")]
    InvalidOverride(ErrorInfo),
    /// A recorded override points past the current alternatives.
    #[error("override out of range: {0}")]
    OutOfRange(ErrorInfo),
    /// The shared key-value store failed or was unreachable.
    #[error("store error: {0}")]
    Store(ErrorInfo),
    /// Catalog parsing and IO errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl AbError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            AbError::Definition(info)
            | AbError::InvalidOverride(info)
            | AbError::OutOfRange(info)
            | AbError::Store(info)
            | AbError::Config(info) => info,
        }
    }

    /// Shorthand for a store failure carrying the affected key.
    pub fn store(code: &str, key: &str, err: impl Display) -> Self {
        AbError::Store(
            ErrorInfo::new(code, "key-value store operation failed")
                .with_context("key", key)
                .with_hint(err.to_string()),
        )
    }
}
