//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string, without a
    /// trailing newline.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// warning[W301]: generated clock
///   --> top.gclk[0]
///   = note: a fabric clock buffer will be used for this bit
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_styled(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let code = match diag.severity {
            crate::severity::Severity::Error => "31;1",
            crate::severity::Severity::Warning => "33;1",
            crate::severity::Severity::Note => "36;1",
        };
        format!("\x1b[{code}m{}\x1b[0m", diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}[{}]: {}",
            self.severity_styled(diag),
            diag.code,
            diag.message
        ));
        if let Some(location) = &diag.location {
            out.push_str(&format!("\n  --> {location}"));
        }
        for note in &diag.notes {
            out.push_str(&format!("\n  = note: {note}"));
        }
        out
    }
}

/// Renders each diagnostic as one line of JSON, for machine consumption.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        // Diagnostic contains nothing a JSON value cannot represent.
        serde_json::to_string(diag).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    fn sample() -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "generated clock")
            .with_location("top.gclk[0]")
            .with_note("a fabric clock buffer will be used for this bit")
    }

    #[test]
    fn terminal_plain() {
        let rendered = TerminalRenderer::new(false).render(&sample());
        assert_eq!(
            rendered,
            "warning[W301]: generated clock\n  --> top.gclk[0]\n  = note: a fabric clock buffer will be used for this bit"
        );
    }

    #[test]
    fn terminal_without_location() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), "bad config");
        let rendered = TerminalRenderer::new(false).render(&diag);
        assert_eq!(rendered, "error[E001]: bad config");
    }

    #[test]
    fn terminal_color_wraps_severity() {
        let rendered = TerminalRenderer::new(true).render(&sample());
        assert!(rendered.starts_with("\x1b[33;1mwarning\x1b[0m[W301]"));
    }

    #[test]
    fn json_renders_fields() {
        let rendered = JsonRenderer.render(&sample());
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["message"], "generated clock");
        assert_eq!(value["location"], "top.gclk[0]");
    }
}
