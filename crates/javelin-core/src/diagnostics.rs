use std::fmt;

use crate::Span;

/// A single diagnostic reported while processing a unit.
///
/// ```
/// use javelin_core::{Diagnostic, DiagnosticKind, Span};
///
/// let diagnostic = Diagnostic {
///     kind: DiagnosticKind::Error,
///     message: "@ExtensionMethod can be used on classes and enums only".to_string(),
///     source: Some("Greeter.java".to_string()),
///     span: Span::new(0, 15, 3, 1),
/// };
///
/// assert_eq!(
///     diagnostic.to_string(),
///     "Greeter.java:3:1: error: @ExtensionMethod can be used on classes and enums only"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// The source file the diagnostic belongs to, if known.
    pub source: Option<String>,
    pub span: Span,
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
            DiagnosticKind::Info => write!(f, "info"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}:{}: {}: {}", source, self.span, self.kind, self.message),
            None => write!(f, "{}: {}: {}", self.span, self.kind, self.message),
        }
    }
}

/// Where annotation handlers report problems.
pub trait DiagnosticSink {
    /// Report an error against the node at `span`.
    fn add_error(&mut self, span: Span, message: String);

    /// Report a warning against the node at `span`.
    fn add_warning(&mut self, span: Span, message: String);
}

/// Collected diagnostics for one build.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    source: Option<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequently added diagnostics to `source`.
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.kind == DiagnosticKind::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Move every diagnostic out of `other` into `self`.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.items.append(&mut other.items);
    }

    fn add(&mut self, kind: DiagnosticKind, span: Span, message: String) {
        self.items.push(Diagnostic {
            kind,
            message,
            source: self.source.clone(),
            span,
        });
    }
}

impl DiagnosticSink for Diagnostics {
    fn add_error(&mut self, span: Span, message: String) {
        self.add(DiagnosticKind::Error, span, message);
    }

    fn add_warning(&mut self, span: Span, message: String) {
        self.add(DiagnosticKind::Warning, span, message);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.items {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_records_source_and_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.set_source(Some("A.java".into()));
        diagnostics.add_error(Span::new(0, 1, 1, 1), "bad".into());
        diagnostics.add_warning(Span::new(2, 1, 1, 3), "meh".into());

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(
            diagnostics.errors().next().map(|d| d.to_string()),
            Some("A.java:1:1: error: bad".to_string())
        );
    }

    #[test]
    fn append_drains_other() {
        let mut a = Diagnostics::new();
        let mut b = Diagnostics::new();
        b.add_error(Span::default(), "x".into());
        a.append(&mut b);
        assert!(b.is_empty());
        assert!(a.has_errors());
    }
}
