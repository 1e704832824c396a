//! Diagnostics recorded while accepting revisions
//!
//! Problems that do not stop a part from being processed (malformed revision
//! markup, paragraph marks that cannot be merged, dangling style references,
//! unpaired moves) are recorded as diagnostics instead of errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What a diagnostic is about
///
/// Serialized as its short code (`W001`, `I001`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Code {
    /// Revision markup whose shape does not match its kind; left in place
    #[serde(rename = "W001")]
    MalformedRevision,
    /// Deleted paragraph mark with no following paragraph to merge into
    #[serde(rename = "W002")]
    UnmergedParagraphMark,
    /// Committed paragraph properties name a style the document lacks
    #[serde(rename = "W003")]
    UnknownStyle,
    /// Committed paragraph properties name a numbering instance the document lacks
    #[serde(rename = "W004")]
    UnknownNumbering,
    /// Move source or destination without its counterpart
    #[serde(rename = "I001")]
    UnpairedMove,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::MalformedRevision => "W001",
            Code::UnmergedParagraphMark => "W002",
            Code::UnknownStyle => "W003",
            Code::UnknownNumbering => "W004",
            Code::UnpairedMove => "I001",
        }
    }

    /// Severity a diagnostic with this code is raised at
    pub fn severity(self) -> Severity {
        match self {
            Code::UnpairedMove => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    /// The output may not be what the author intended
    Warning,
    /// The part could not be processed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One finding, with where in the package it was made
///
/// # Example
///
/// ```
/// use trackless_core::diagnostics::{Code, Diagnostic, Severity};
///
/// let diag = Diagnostic::coded(Code::MalformedRevision, "w:ins wraps a paragraph")
///     .at("document/body/p[3]");
/// assert_eq!(diag.severity, Severity::Warning);
/// assert_eq!(diag.to_string(), "warning[W001]: w:ins wraps a paragraph\n  --> document/body/p[3]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    /// Package path of the part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    /// Element breadcrumb inside the part (e.g. `document/body/tbl[1]/tr[2]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            part: None,
            location: None,
            notes: Vec::new(),
        }
    }

    /// A diagnostic at the severity its code implies
    pub fn coded(code: Code, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            ..Self::with_severity(code.severity(), message)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Info, message)
    }

    /// Attribute to a part
    pub fn in_part(mut self, part: impl Into<String>) -> Self {
        self.part = Some(part.into());
        self
    }

    /// Attach an element location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.code == Some(code)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }

        let origin = match (&self.part, &self.location) {
            (Some(part), Some(location)) => Some(format!("{part}#{location}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        };
        if let Some(origin) = origin {
            write!(f, "\n  --> {origin}")?;
        }

        self.notes
            .iter()
            .try_for_each(|note| write!(f, "\n  = note: {note}"))
    }
}

/// Diagnostics collected while processing
///
/// Recording a diagnostic also emits it as a `tracing` event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let code = diagnostic.code.map_or("", Code::as_str);
        let location = diagnostic.location.as_deref().unwrap_or("");
        if diagnostic.severity == Severity::Info {
            info!(code, location, "{}", diagnostic.message);
        } else {
            warn!(code, location, "{}", diagnostic.message);
        }
        self.items.push(diagnostic);
    }

    /// Attribute every diagnostic without a part to `part`
    pub fn assign_part(&mut self, part: &str) {
        for diagnostic in self.items.iter_mut().filter(|d| d.part.is_none()) {
            diagnostic.part = Some(part.to_string());
        }
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_warning()).count()
    }

    /// Number of diagnostics carrying `code`
    pub fn count_of(&self, code: Code) -> usize {
        self.items.iter().filter(|d| d.has_code(code)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
