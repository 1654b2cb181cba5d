//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Netlist entities carry no source spans, so a diagnostic anchors to a
/// rendered netlist location instead (`module.wire[bit]`), when one exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The stable code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The netlist location the diagnostic anchors to, e.g. `top.clk[0]`.
    pub location: Option<String>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Creates a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Note, code, message)
    }

    /// Sets the netlist location this diagnostic anchors to.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds an explanatory note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_warning() {
        let code = DiagnosticCode::new(Category::Warning, 301);
        let diag = Diagnostic::warning(code, "generated clock");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "generated clock");
        assert_eq!(format!("{}", diag.code), "W301");
        assert!(diag.location.is_none());
    }

    #[test]
    fn create_note_and_error() {
        let note = Diagnostic::note(DiagnosticCode::new(Category::Note, 101), "inserted");
        assert_eq!(note.severity, Severity::Note);
        let err = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), "bad config");
        assert!(err.severity.is_error());
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "generated clock")
            .with_location("top.gclk[0]")
            .with_note("a fabric clock buffer will be used");
        assert_eq!(diag.location.as_deref(), Some("top.gclk[0]"));
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Note, 101), "inserted CLK_BUF")
            .with_location("top.clk[0]");
        let json = serde_json::to_string(&diag).unwrap();
        let restored: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, diag);
    }
}
