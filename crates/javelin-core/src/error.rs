//! Error types for every phase of the front end.
//!
//! ```text
//! LexError          - tokenization errors
//! ParseError        - parser errors (with ParseErrorKind), collected in ParseErrors
//! RegistrationError - type/member registration errors
//! ExtensionError    - misuse of @ExtensionMethod, reported through the diagnostics sink
//! ```

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated character literal at {span}")]
    UnterminatedChar { span: Span },

    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedChar { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    // Token-level errors
    ExpectedToken,
    UnexpectedToken,
    UnexpectedEof,

    // Expression errors
    ExpectedExpression,
    InvalidExpression,

    // Type errors
    ExpectedType,

    // Statement errors
    ExpectedStatement,
    ExpectedBlock,

    // Declaration errors
    ExpectedDeclaration,
    ExpectedClassMember,
    ExpectedParameters,

    ExpectedIdentifier,

    // Modifier errors
    InvalidModifier,
    DuplicateModifier,

    // Annotation errors
    InvalidAnnotation,

    InvalidLiteral,
    /// The lexer rejected part of the input.
    LexicalError,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::InvalidExpression => "invalid expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedBlock => "expected block",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::ExpectedClassMember => "expected class member",
            ParseErrorKind::ExpectedParameters => "expected parameters",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::InvalidModifier => "invalid modifier",
            ParseErrorKind::DuplicateModifier => "duplicate modifier",
            ParseErrorKind::InvalidAnnotation => "invalid annotation",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::LexicalError => "lexical error",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("expected type, found {found}"),
        )
    }

    /// Format the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!("Error at {}: {}\n", self.span, self.kind);
        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }

        let line = self.span.line as usize;
        if let Some(text) = line.checked_sub(1).and_then(|i| source.lines().nth(i)) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", line, text));
            let indent = " ".repeat((self.span.col as usize).saturating_sub(1));
            let tail = "~".repeat((self.span.len as usize).saturating_sub(1));
            output.push_str(&format!("  | {indent}^{tail}\n"));
        }

        output
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(ParseErrorKind::LexicalError, error.span(), error.to_string())
    }
}

/// A collection of parse errors, for parsers that recover and keep going.
#[derive(Debug, Clone, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while entering declarations into the symbol registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    #[error("type not found: {0}")]
    TypeNotFound(String),

    #[error("cyclic inheritance involving {0}")]
    CyclicInheritance(String),
}

// ============================================================================
// Extension Errors
// ============================================================================

/// Misuse of `@ExtensionMethod`. These are reported to the diagnostics sink
/// against the annotated declaration and abort that annotation application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// Applied to an interface or annotation type.
    #[error("@ExtensionMethod can be used on classes and enums only")]
    NotClassOrEnum,

    /// The annotation lists no provider types at all.
    #[error("@ExtensionMethod has no effect since no extension types were specified.")]
    NoExtensionTypes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_messages_are_user_facing() {
        assert_eq!(
            ExtensionError::NotClassOrEnum.to_string(),
            "@ExtensionMethod can be used on classes and enums only"
        );
        assert_eq!(
            ExtensionError::NoExtensionTypes.to_string(),
            "@ExtensionMethod has no effect since no extension types were specified."
        );
    }

    #[test]
    fn lex_error_converts_to_parse_error() {
        let span = Span::new(3, 1, 1, 4);
        let err: ParseError = LexError::UnexpectedChar { ch: '#', span }.into();
        assert_eq!(err.kind, ParseErrorKind::LexicalError);
        assert_eq!(err.span, span);
    }

    #[test]
    fn display_with_source_points_at_column() {
        let source = "class A {\n  int = 3;\n}";
        let err = ParseError::expected_identifier(Span::new(16, 1, 2, 7), "'='");
        let rendered = err.display_with_source(source);
        assert!(rendered.contains("  2 |   int = 3;"));
        assert!(rendered.contains("  |       ^"));
    }

    #[test]
    fn parse_errors_collect() {
        let mut errors = ParseErrors::new();
        assert!(errors.is_empty());
        errors.push(ParseError::unexpected_eof(Span::default()));
        errors.push(ParseError::expected_type(Span::default(), "'+'"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string().lines().count(), 2);
    }
}
