use std::{fmt, ops::Range, path::PathBuf};

use thiserror::Error;

/// Errors surfaced by loading and querying
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Component not found: {0}")]
    ComponentNotFound(String),
    #[error("Net not found: {0}")]
    NetNotFound(String),
    #[error("Failed to detect delimiter")]
    UnknownDelimiter,
    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Root node (\"<Mcu ...\") not found in MCU description")]
    MissingMcuNode,
    #[error("Malformed MCU description: {message} at {at:?}")]
    Xml { message: String, at: Range<usize> },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// Something recoverable that happened while populating a netlist
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A block or net entry that could not be interpreted. It was dropped.
    MalformedBlock { line: usize, reason: String },
    /// A net entry naming a designator no component block defines
    DanglingReference {
        line: usize,
        net: String,
        designator: String,
    },
    /// A second component block with an already used designator
    DuplicateDesignator { line: usize, designator: String },
    WildcardDesignator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
        }
    }

    pub fn error(kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Error,
            kind,
        }
    }

    /// Emit the diagnostic as a tracing event at its severity
    pub(crate) fn emit(&self) {
        match self.severity {
            Severity::Warning => tracing::warn!("{}", self),
            Severity::Error => tracing::error!("{}", self),
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MalformedBlock { line, reason } => {
                write!(f, "line {line}: {reason}")
            }
            DiagnosticKind::DanglingReference {
                line,
                net,
                designator,
            } => write!(
                f,
                "line {line}: net '{net}' references unknown component '{designator}', skipping"
            ),
            DiagnosticKind::DuplicateDesignator { line, designator } => write!(
                f,
                "line {line}: component '{designator}' is already defined, keeping the first definition"
            ),
            DiagnosticKind::WildcardDesignator => {
                write!(f, "created component with wildcard designator")
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.kind),
            Severity::Error => write!(f, "error: {}", self.kind),
        }
    }
}
