//! Core error types for map decoding
//!
//! One variant per error kind the decoder can raise. Everything except a
//! dangling connector is fatal and aborts the decode pass.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::{Diagnostics, SourcePosition};

/// Error kinds, without their payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Syntax,
    Validation,
    UnresolvedReference,
    DanglingConnector,
    DefaultMerge,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::UnresolvedReference => write!(f, "unresolved-reference"),
            ErrorKind::DanglingConnector => write!(f, "dangling-connector"),
            ErrorKind::DefaultMerge => write!(f, "default-merge"),
        }
    }
}

/// Errors raised while turning a document into a map
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Syntax error: {message}{}", located(.position))]
    Syntax {
        message: String,
        position: Option<SourcePosition>,
    },

    #[error("Validation error: {message}{}", located(.position))]
    Validation {
        message: String,
        position: Option<SourcePosition>,
    },

    #[error("Unresolved reference '{reference}': {message}{}", located(.position))]
    UnresolvedReference {
        reference: String,
        message: String,
        position: Option<SourcePosition>,
    },

    #[error("Dangling connector {from} -> {to}: node '{missing}' does not exist{}", located(.position))]
    DanglingConnector {
        from: String,
        to: String,
        missing: String,
        position: Option<SourcePosition>,
    },

    #[error("Default merge error: {message}")]
    DefaultMerge { message: String },
}

fn located(position: &Option<SourcePosition>) -> String {
    match position {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

impl MapError {
    /// Create a new syntax error
    pub fn syntax(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self::Validation {
            message: message.into(),
            position,
        }
    }

    /// Create a new unresolved reference error
    pub fn unresolved(
        reference: impl Into<String>,
        message: impl Into<String>,
        position: Option<SourcePosition>,
    ) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            message: message.into(),
            position,
        }
    }

    /// Create a new default merge error
    pub fn default_merge(message: impl Into<String>) -> Self {
        Self::DefaultMerge {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Syntax { .. } => ErrorKind::Syntax,
            MapError::Validation { .. } => ErrorKind::Validation,
            MapError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            MapError::DanglingConnector { .. } => ErrorKind::DanglingConnector,
            MapError::DefaultMerge { .. } => ErrorKind::DefaultMerge,
        }
    }

    /// Fatal errors stop the decode pass and leave no usable map
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MapError::DanglingConnector { .. })
    }

    /// Attach a position if the error does not carry one yet
    pub fn or_at(mut self, at: Option<SourcePosition>) -> Self {
        match &mut self {
            MapError::Syntax { position, .. }
            | MapError::Validation { position, .. }
            | MapError::UnresolvedReference { position, .. }
            | MapError::DanglingConnector { position, .. } => {
                if position.is_none() {
                    *position = at;
                }
            }
            MapError::DefaultMerge { .. } => {}
        }
        self
    }

    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            MapError::Syntax { position, .. }
            | MapError::Validation { position, .. }
            | MapError::UnresolvedReference { position, .. }
            | MapError::DanglingConnector { position, .. } => *position,
            MapError::DefaultMerge { .. } => None,
        }
    }
}

/// A decode pass that stopped on a fatal error
///
/// Carries every diagnostic recorded up to and including the fatal one.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct DecodeFailure {
    #[source]
    pub error: MapError,
    pub diagnostics: Diagnostics,
}

impl DecodeFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
