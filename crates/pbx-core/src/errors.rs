//! Structured error types shared across pbx crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PbxError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (shapes, lengths, replica counts, etc.).
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

/// Canonical error type for pbx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PbxError {
    /// Array rank or shape does not match what the caller requested.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// A box-like value could not be interpreted as a periodic box.
    #[error("box error: {0}")]
    Box(ErrorInfo),
    /// Geometrically inconsistent generation request.
    #[error("geometry error: {0}")]
    Geometry(ErrorInfo),
    /// Randomness and noise distribution errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
    /// Serialization and configuration errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// File system errors raised by loaders and writers.
    #[error("io error: {0}")]
    Io(ErrorInfo),
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

impl PbxError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PbxError::Shape(info)
            | PbxError::Box(info)
            | PbxError::Geometry(info)
            | PbxError::Rng(info)
            | PbxError::Serde(info)
            | PbxError::Io(info) => info,
        }
    }

    /// Returns the stable machine readable code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry to the payload, keeping the error family.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let info = match &mut self {
            PbxError::Shape(info)
            | PbxError::Box(info)
            | PbxError::Geometry(info)
            | PbxError::Rng(info)
            | PbxError::Serde(info)
            | PbxError::Io(info) => info,
        };
        info.context.insert(key.into(), value.into());
        self
    }
}

impl From<std::io::Error> for PbxError {
    fn from(err: std::io::Error) -> Self {
        PbxError::Io(
            ErrorInfo::new("io", err.to_string()).with_context("kind", format!("{:?}", err.kind())),
        )
    }
}
