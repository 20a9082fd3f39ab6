//! Structured error types shared across the enumeration crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`EnumError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (distribution names, sizes, etc.).
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

/// Canonical error type for enumeration runs.
///
/// `UnsupportedDistribution` and `EmptySupport` are fatal to the whole run:
/// they point at a defect in the model, never at a transient condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum EnumError {
    /// A choice point used a distribution without enumerable support.
    #[error("unsupported distribution: {0}")]
    UnsupportedDistribution(ErrorInfo),
    /// A choice point enumerated an empty support.
    #[error("empty support: {0}")]
    EmptySupport(ErrorInfo),
    /// A branch was requested from an empty frontier.
    #[error("frontier empty: {0}")]
    FrontierEmpty(ErrorInfo),
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and canonical key errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Handler stack misuse.
    #[error("handler error: {0}")]
    Handler(ErrorInfo),
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

impl EnumError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            EnumError::UnsupportedDistribution(info)
            | EnumError::EmptySupport(info)
            | EnumError::FrontierEmpty(info)
            | EnumError::Config(info)
            | EnumError::Serde(info)
            | EnumError::Handler(info) => info,
        }
    }

    /// Returns true for the error kinds that abort a run because the model is malformed.
    pub fn is_model_defect(&self) -> bool {
        matches!(
            self,
            EnumError::UnsupportedDistribution(_) | EnumError::EmptySupport(_)
        )
    }
}
