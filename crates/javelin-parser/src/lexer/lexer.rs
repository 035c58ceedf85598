//! The [`Lexer`] converts source text into a stream of [`Token`]s.
//!
//! Dispatch is on the first character. Lexemes are copied into the arena so
//! the source can be dropped once lexing is complete.

use std::collections::VecDeque;

use bumpalo::Bump;
use javelin_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for Java source code.
///
/// `'src` is the source string being lexed, `'ast` the arena lexemes are
/// allocated in.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    lookahead: VecDeque<Token<'ast>>,
    errors: Vec<LexError>,
}

/// Start position of the token being scanned.
#[derive(Clone, Copy)]
struct Mark {
    offset: u32,
    line: u32,
    col: u32,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            lookahead: VecDeque::with_capacity(4),
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    /// Peek at the nth upcoming token (0 = next) without consuming it.
    pub fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    // =========================================
    // Internal: token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();

            if self.cursor.is_eof() {
                return self.make_eof();
            }

            let mark = self.mark();
            let Some(c) = self.cursor.peek() else {
                return self.make_eof();
            };

            let token = match c {
                '/' if self.cursor.check_str("//") => {
                    self.cursor.eat_while(|c| c != '\n');
                    continue;
                }
                '/' if self.cursor.check_str("/*") => {
                    if let Some(error) = self.skip_block_comment(mark) {
                        return self.make_error(error);
                    }
                    continue;
                }
                '"' => self.scan_string(mark),
                '\'' => self.scan_char(mark),
                c if c.is_ascii_digit() => self.scan_number(mark),
                '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number(mark)
                }
                c if is_ident_start(c) => self.scan_identifier(mark),
                _ => self.scan_operator(mark),
            };
            return token;
        }
    }

    fn skip_whitespace(&mut self) {
        if self.cursor.check_str("\u{FEFF}") {
            self.cursor.advance();
        }
        self.cursor.eat_while(char::is_whitespace);
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.cursor.offset(),
            line: self.cursor.line(),
            col: self.cursor.column(),
        }
    }

    fn span_from(&self, mark: Mark) -> Span {
        Span::new(
            mark.offset,
            self.cursor.offset() - mark.offset,
            mark.line,
            mark.col,
        )
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.offset(), self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token covering `mark..current`, copying the lexeme into the arena.
    fn make_token(&self, kind: TokenKind, mark: Mark) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(mark.offset));
        Token::new(kind, lexeme, self.span_from(mark))
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: comments
    // =========================================

    fn skip_block_comment(&mut self, mark: Mark) -> Option<LexError> {
        self.cursor.advance_bytes(2);
        loop {
            if self.cursor.is_eof() {
                return Some(LexError::UnterminatedComment {
                    span: self.span_from(mark),
                });
            }
            if self.cursor.check_str("*/") {
                self.cursor.advance_bytes(2);
                return None;
            }
            self.cursor.advance();
        }
    }

    // =========================================
    // Scanning: strings and characters
    // =========================================

    fn scan_string(&mut self, mark: Mark) -> Token<'ast> {
        if self.cursor.check_str("\"\"\"") {
            return self.scan_text_block(mark);
        }

        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    let span = self.span_from(mark);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('"') => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::StringLiteral, mark);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_text_block(&mut self, mark: Mark) -> Token<'ast> {
        self.cursor.advance_bytes(3);
        loop {
            if self.cursor.is_eof() {
                let span = self.span_from(mark);
                return self.make_error(LexError::UnterminatedString { span });
            }
            if self.cursor.check_str("\\") {
                self.cursor.advance();
                self.cursor.advance();
                continue;
            }
            if self.cursor.check_str("\"\"\"") {
                self.cursor.advance_bytes(3);
                return self.make_token(TokenKind::StringLiteral, mark);
            }
            self.cursor.advance();
        }
    }

    fn scan_char(&mut self, mark: Mark) -> Token<'ast> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    let span = self.span_from(mark);
                    return self.make_error(LexError::UnterminatedChar { span });
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('\'') => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::CharLiteral, mark);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // =========================================
    // Scanning: numbers
    // =========================================

    fn scan_number(&mut self, mark: Mark) -> Token<'ast> {
        if self.cursor.peek() == Some('0')
            && let Some(radix_char) = self.cursor.peek_nth(1)
        {
            let radix = match radix_char {
                'x' | 'X' => Some(16),
                'b' | 'B' => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                return self.scan_radix_number(mark, radix);
            }
        }

        self.consume_digits(10);
        let mut is_floating = false;

        if self.cursor.peek() == Some('.')
            && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.consume_digits(10);
            is_floating = true;
        } else if self.cursor.peek() == Some('.')
            && !self
                .cursor
                .peek_nth(1)
                .is_some_and(|c| is_ident_start(c) || c == '.')
        {
            // `1.` is a double literal
            self.cursor.advance();
            is_floating = true;
        }

        if let Some('e' | 'E') = self.cursor.peek() {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if !self.cursor.check(|c| c.is_ascii_digit()) {
                let span = self.span_from(mark);
                return self.make_error(LexError::InvalidNumber {
                    span,
                    detail: "missing exponent digits".to_string(),
                });
            }
            self.consume_digits(10);
            is_floating = true;
        }

        let kind = match self.cursor.peek() {
            Some('f' | 'F') => {
                self.cursor.advance();
                TokenKind::FloatLiteral
            }
            Some('d' | 'D') => {
                self.cursor.advance();
                TokenKind::DoubleLiteral
            }
            Some('l' | 'L') if !is_floating => {
                self.cursor.advance();
                TokenKind::LongLiteral
            }
            _ if is_floating => TokenKind::DoubleLiteral,
            _ => TokenKind::IntLiteral,
        };

        if self.cursor.check(is_ident_continue) {
            self.cursor.eat_while(is_ident_continue);
            let span = self.span_from(mark);
            return self.make_error(LexError::InvalidNumber {
                span,
                detail: "invalid suffix".to_string(),
            });
        }

        self.make_token(kind, mark)
    }

    fn scan_radix_number(&mut self, mark: Mark, radix: u32) -> Token<'ast> {
        self.cursor.advance_bytes(2);
        let digits = self.consume_digits(radix);
        if digits == 0 {
            let span = self.span_from(mark);
            return self.make_error(LexError::InvalidNumber {
                span,
                detail: "expected digits after radix prefix".to_string(),
            });
        }
        let kind = if matches!(self.cursor.peek(), Some('l' | 'L')) {
            self.cursor.advance();
            TokenKind::LongLiteral
        } else {
            TokenKind::IntLiteral
        };
        self.make_token(kind, mark)
    }

    /// Consume digits valid in `radix` plus `_` separators; returns the digit count.
    fn consume_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(c) = self.cursor.peek() {
            if c.is_digit(radix) {
                count += 1;
            } else if c != '_' {
                break;
            }
            self.cursor.advance();
        }
        count
    }

    // =========================================
    // Scanning: identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, mark: Mark) -> Token<'ast> {
        self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(self.cursor.slice_from(mark.offset)).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, mark)
    }

    // =========================================
    // Scanning: operators and punctuation
    // =========================================

    fn scan_operator(&mut self, mark: Mark) -> Token<'ast> {
        // Longest match first.
        const OPERATORS: &[(&str, TokenKind)] = &[
            (">>>=", TokenKind::GreaterGreaterGreaterEqual),
            (">>>", TokenKind::GreaterGreaterGreater),
            (">>=", TokenKind::GreaterGreaterEqual),
            ("<<=", TokenKind::LessLessEqual),
            ("...", TokenKind::Ellipsis),
            (">>", TokenKind::GreaterGreater),
            ("<<", TokenKind::LessLess),
            (">=", TokenKind::GreaterEqual),
            ("<=", TokenKind::LessEqual),
            ("==", TokenKind::EqualEqual),
            ("!=", TokenKind::BangEqual),
            ("&&", TokenKind::AmpAmp),
            ("||", TokenKind::PipePipe),
            ("++", TokenKind::PlusPlus),
            ("--", TokenKind::MinusMinus),
            ("+=", TokenKind::PlusEqual),
            ("-=", TokenKind::MinusEqual),
            ("*=", TokenKind::StarEqual),
            ("/=", TokenKind::SlashEqual),
            ("%=", TokenKind::PercentEqual),
            ("&=", TokenKind::AmpEqual),
            ("|=", TokenKind::PipeEqual),
            ("^=", TokenKind::CaretEqual),
            ("->", TokenKind::Arrow),
            ("::", TokenKind::ColonColon),
            ("+", TokenKind::Plus),
            ("-", TokenKind::Minus),
            ("*", TokenKind::Star),
            ("/", TokenKind::Slash),
            ("%", TokenKind::Percent),
            ("=", TokenKind::Equal),
            ("<", TokenKind::Less),
            (">", TokenKind::Greater),
            ("!", TokenKind::Bang),
            ("&", TokenKind::Amp),
            ("|", TokenKind::Pipe),
            ("^", TokenKind::Caret),
            ("~", TokenKind::Tilde),
            ("?", TokenKind::Question),
            (":", TokenKind::Colon),
            ("(", TokenKind::LeftParen),
            (")", TokenKind::RightParen),
            ("[", TokenKind::LeftBracket),
            ("]", TokenKind::RightBracket),
            ("{", TokenKind::LeftBrace),
            ("}", TokenKind::RightBrace),
            (";", TokenKind::Semicolon),
            (",", TokenKind::Comma),
            (".", TokenKind::Dot),
            ("@", TokenKind::At),
        ];

        for (text, kind) in OPERATORS {
            if self.cursor.check_str(text) {
                self.cursor.advance_bytes(text.len());
                return self.make_token(*kind, mark);
            }
        }

        let ch = self.cursor.advance().unwrap_or('\0');
        let span = self.span_from(mark);
        self.make_error(LexError::UnexpectedChar { ch, span })
    }
}

impl<'ast> Iterator for Lexer<'_, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        Lexer::new(source, &arena).map(|t| t.kind).collect()
    }

    #[test]
    fn lex_class_header() {
        assert_eq!(
            kinds("public class Foo extends Bar {"),
            vec![
                TokenKind::Public,
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Extends,
                TokenKind::Identifier,
                TokenKind::LeftBrace,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            kinds("42 42L 0xFF 1.5 1.5f 1e3 2d 1_000"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::LongLiteral,
                TokenKind::IntLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::FloatLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::IntLiteral,
            ]
        );
    }

    #[test]
    fn lex_strings_and_chars() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new(r#""a\"b" '\n' 'x'"#, &arena).collect();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme, r#""a\"b""#);
        assert_eq!(tokens[1].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[2].kind, TokenKind::CharLiteral);
    }

    #[test]
    fn lex_skips_comments() {
        assert_eq!(
            kinds("a // line\n /* block\n */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn lex_longest_operator() {
        assert_eq!(
            kinds("a >>>= b >> c -> d :: e ..."),
            vec![
                TokenKind::Identifier,
                TokenKind::GreaterGreaterGreaterEqual,
                TokenKind::Identifier,
                TokenKind::GreaterGreater,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::ColonColon,
                TokenKind::Identifier,
                TokenKind::Ellipsis,
            ]
        );
    }

    #[test]
    fn lex_member_access_on_int_is_not_double() {
        assert_eq!(
            kinds("x.length"),
            vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier]
        );
    }

    #[test]
    fn lex_spans() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new("int\n  foo", &arena).collect();
        assert_eq!(tokens[1].span, Span::new(6, 3, 2, 3));
    }

    #[test]
    fn lex_unterminated_string_is_error() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("\"abc\nx", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(lexer.has_errors());
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnterminatedString { .. }
        ));
    }

    #[test]
    fn lex_unexpected_char() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("#", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnexpectedChar { ch: '#', .. }
        ));
    }

    #[test]
    fn lex_peek_does_not_consume() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a b", &arena);
        assert_eq!(lexer.peek_nth(1).lexeme, "b");
        assert_eq!(lexer.next_token().lexeme, "a");
        assert_eq!(lexer.next_token().lexeme, "b");
    }
}
