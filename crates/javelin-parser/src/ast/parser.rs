//! Parser infrastructure: token navigation, error recovery and lookahead.

use bumpalo::Bump;
use javelin_core::Span;

use crate::ast::{CallId, ParseError, ParseErrorKind, ParseErrors};
use crate::lexer::{Lexer, Token, TokenKind};

/// The parser for Java-subset source code.
///
/// The whole source is tokenized up front, so lookahead of any distance is
/// a buffer index. AST nodes and token lexemes live in `arena`.
pub struct Parser<'ast> {
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
    pub(super) errors: ParseErrors,
    /// Whether we're skipping to a synchronization point.
    pub(super) panic_mode: bool,
    pub(super) arena: &'ast Bump,
    /// Next [`CallId`] to hand out.
    pub(super) next_call_id: u32,
}

impl<'ast> Parser<'ast> {
    /// Create a parser, tokenizing `source` eagerly.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::with_capacity((source.len() / 6).clamp(64, 16384));
        let mut errors = ParseErrors::new();

        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Error {
                for lex_error in lexer.take_errors() {
                    errors.push(lex_error.into());
                }
                continue;
            }

            let is_eof = token.kind == TokenKind::Eof;
            buffer.push(token);
            if is_eof {
                break;
            }
        }

        Self {
            buffer,
            position: 0,
            errors,
            panic_mode: false,
            arena,
            next_call_id: 0,
        }
    }

    /// Start numbering calls from `first`, so several units parsed into one
    /// arena keep distinct ids.
    pub fn with_call_ids_from(mut self, first: u32) -> Self {
        self.next_call_id = first;
        self
    }

    /// The id the next parsed call would receive.
    pub fn next_call_id(&self) -> u32 {
        self.next_call_id
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> ParseErrors {
        std::mem::take(&mut self.errors)
    }

    pub(super) fn fresh_call_id(&mut self) -> CallId {
        let id = CallId(self.next_call_id);
        self.next_call_id += 1;
        id
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    pub fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead `n` tokens; past the end this keeps returning EOF.
    pub fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.buffer.len() - 1;
        &self.buffer[(self.position + n).min(last)]
    }

    pub fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if self.position < self.buffer.len() - 1 {
            self.position += 1;
        }
        token
    }

    /// The most recently consumed token.
    pub fn previous(&self) -> Token<'ast> {
        self.buffer[self.position.saturating_sub(1)]
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub fn check_nth(&self, n: usize, kind: TokenKind) -> bool {
        self.peek_nth(n).kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = *self.peek();
            if token.kind == TokenKind::Eof {
                return Err(ParseError::unexpected_eof(token.span));
            }
            Err(ParseError::expected_token(
                token.span,
                kind.description(),
                token.kind.description(),
            ))
        }
    }

    /// Identifier with the given text (`var`, `record`, ...).
    pub fn check_contextual(&self, name: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.lexeme == name
    }

    /// Consume a closing `>` of a type argument list.
    ///
    /// The lexer produces `>>` and `>>>` as single tokens, so a nested list
    /// like `List<List<String>>` closes by splitting the token in place.
    pub fn expect_closing_angle(&mut self) -> Result<(), ParseError> {
        let token = *self.peek();
        let rest = match token.kind {
            TokenKind::Greater => {
                self.advance();
                return Ok(());
            }
            TokenKind::GreaterGreater => TokenKind::Greater,
            TokenKind::GreaterGreaterGreater => TokenKind::GreaterGreater,
            _ => {
                return Err(ParseError::expected_token(
                    token.span,
                    "'>'",
                    token.kind.description(),
                ));
            }
        };
        let span = Span::new(
            token.span.offset + 1,
            token.span.len - 1,
            token.span.line,
            token.span.col + 1,
        );
        self.buffer[self.position] = Token::new(rest, &token.lexeme[1..], span);
        Ok(())
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous().span)
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    pub fn error(&mut self, kind: ParseErrorKind, span: Span, message: impl Into<String>) {
        self.errors.push(ParseError::new(kind, span, message));
        self.panic_mode = true;
    }

    pub(super) fn record(&mut self, error: ParseError) {
        self.errors.push(error);
        self.panic_mode = true;
    }

    /// Skip tokens until a statement or member boundary.
    ///
    /// Always consumes at least one token so callers that retry cannot loop.
    pub fn synchronize(&mut self) {
        self.panic_mode = false;
        let start = self.position;

        while !self.is_eof() {
            if self.position > start && self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Do
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Throw
                | TokenKind::Switch
                | TokenKind::Try
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Static
                    if self.position > start =>
                {
                    return;
                }
                TokenKind::RightBrace => {
                    if self.position == start {
                        self.advance();
                    }
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ========================================================================
    // Disambiguation Helpers
    // ========================================================================

    /// Whether the current token can start a type.
    pub fn is_type_start(&self) -> bool {
        let kind = self.peek().kind;
        kind.is_primitive_type() || kind == TokenKind::Identifier
    }

    /// Whether the upcoming tokens are `Type name`, i.e. a local variable
    /// declaration rather than an expression statement.
    pub fn is_var_decl(&self) -> bool {
        if !self.is_type_start() {
            return false;
        }
        match self.skip_type(self.position) {
            Some(after) => self.buffer.get(after).is_some_and(|t| t.kind == TokenKind::Identifier),
            None => false,
        }
    }

    /// Skip a type expression starting at token index `pos` without
    /// consuming anything; returns the index just after it.
    pub fn skip_type(&self, mut pos: usize) -> Option<usize> {
        let kind_at = |i: usize| self.buffer.get(i).map(|t| t.kind).unwrap_or(TokenKind::Eof);

        while kind_at(pos) == TokenKind::At {
            pos = self.skip_annotation(pos)?;
        }

        if kind_at(pos).is_primitive_type() {
            pos += 1;
        } else if kind_at(pos) == TokenKind::Identifier {
            pos += 1;
            if kind_at(pos) == TokenKind::Less {
                pos = self.skip_type_args(pos)?;
            }
            while kind_at(pos) == TokenKind::Dot && kind_at(pos + 1) == TokenKind::Identifier {
                pos += 2;
                if kind_at(pos) == TokenKind::Less {
                    pos = self.skip_type_args(pos)?;
                }
            }
        } else {
            return None;
        }

        while kind_at(pos) == TokenKind::LeftBracket && kind_at(pos + 1) == TokenKind::RightBracket {
            pos += 2;
        }
        Some(pos)
    }

    /// Skip `<...>` starting at a `<`, tracking nesting across `>>`/`>>>`.
    fn skip_type_args(&self, mut pos: usize) -> Option<usize> {
        let mut depth: i32 = 0;
        loop {
            let kind = self.buffer.get(pos)?.kind;
            match kind {
                TokenKind::Less => depth += 1,
                TokenKind::Greater => depth -= 1,
                TokenKind::GreaterGreater => depth -= 2,
                TokenKind::GreaterGreaterGreater => depth -= 3,
                TokenKind::Identifier
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::Question
                | TokenKind::Extends
                | TokenKind::Super
                | TokenKind::LeftBracket
                | TokenKind::RightBracket
                | TokenKind::Amp => {}
                k if k.is_primitive_type() => {}
                _ => return None,
            }
            pos += 1;
            if depth <= 0 {
                return (depth == 0).then_some(pos);
            }
        }
    }

    /// Skip `@Name` or `@Name(...)` starting at `@`.
    fn skip_annotation(&self, mut pos: usize) -> Option<usize> {
        let kind_at = |i: usize| self.buffer.get(i).map(|t| t.kind).unwrap_or(TokenKind::Eof);
        pos += 1;
        if kind_at(pos) != TokenKind::Identifier {
            return None;
        }
        pos += 1;
        while kind_at(pos) == TokenKind::Dot && kind_at(pos + 1) == TokenKind::Identifier {
            pos += 2;
        }
        if kind_at(pos) == TokenKind::LeftParen {
            let mut depth = 0;
            loop {
                match kind_at(pos) {
                    TokenKind::LeftParen => depth += 1,
                    TokenKind::RightParen => depth -= 1,
                    TokenKind::Eof => return None,
                    _ => {}
                }
                pos += 1;
                if depth == 0 {
                    break;
                }
            }
        }
        Some(pos)
    }
}
