//! Diagnostics collected during a decode pass
//!
//! Every error the decoder meets is recorded here, fatal or not. The
//! aggregator never drops a record; callers decide what a warning means to
//! them (a CLI might exit non-zero, a server might only log it).

use std::fmt;

use serde::Serialize;

use super::{ErrorKind, MapError, SourcePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recoverable; the map is still usable
    Warning,
    /// Fatal; no map was produced
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Front-end turning text into blocks
    Syntax,
    /// Attribute resolution and entity decoding
    Decode,
    /// Default template merging
    Defaults,
    /// Cross-entity checks after all blocks are decoded
    Validation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Syntax => write!(f, "syntax"),
            Stage::Decode => write!(f, "decode"),
            Stage::Defaults => write!(f, "defaults"),
            Stage::Validation => write!(f, "validation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

impl Diagnostic {
    pub fn from_error(stage: Stage, error: &MapError) -> Self {
        Self {
            severity: if error.is_fatal() {
                Severity::Error
            } else {
                Severity::Warning
            },
            stage,
            kind: error.kind(),
            message: error.to_string(),
            position: error.position(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.stage, self.message)
    }
}

/// Ordered collection of diagnostics for one decode pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.records.push(diagnostic);
    }

    /// Record an error, deriving severity from whether it is fatal
    pub fn record(&mut self, stage: Stage, error: &MapError) {
        self.push(Diagnostic::from_error(stage, error));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    /// Highest severity recorded, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.records.iter().map(|d| d.severity).max()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
