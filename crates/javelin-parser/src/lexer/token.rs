//! Token types for the Java-subset lexer.

use javelin_core::Span;
use std::fmt;

/// A token from the source code.
///
/// The lexeme is copied into the arena, so the source string may be dropped
/// once lexing is done.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`, `0x2A`, `1_000`
    IntLiteral,
    /// `42L`
    LongLiteral,
    /// `1.5f`
    FloatLiteral,
    /// `1.5`, `1e10`, `2d`
    DoubleLiteral,
    /// `'a'`, `'\n'`
    CharLiteral,
    /// `"text"`
    StringLiteral,

    Identifier,

    // =========================================
    // Keywords - primitive types
    // =========================================
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,

    // =========================================
    // Keywords - values
    // =========================================
    True,
    False,
    Null,
    This,
    Super,

    // =========================================
    // Keywords - control flow
    // =========================================
    If,
    Else,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Throw,
    Try,
    Catch,
    Finally,
    Assert,

    // =========================================
    // Keywords - declarations
    // =========================================
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Throws,
    New,
    Instanceof,

    // =========================================
    // Keywords - modifiers
    // =========================================
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    Bang,
    Amp,
    Pipe,
    Caret,
    Tilde,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,
    Question,
    Colon,
    ColonColon,
    Arrow,

    // =========================================
    // Delimiters
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Dot,
    Ellipsis,
    At,

    // =========================================
    // Special
    // =========================================
    Eof,
    /// A lexing error was recorded for this position.
    Error,
}

impl TokenKind {
    /// Primitive type keyword (including `void`).
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Short
                | TokenKind::Char
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
        )
    }

    /// Declaration modifier keyword.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::Native
                | TokenKind::Synchronized
                | TokenKind::Transient
                | TokenKind::Volatile
                | TokenKind::Strictfp
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::FloatLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Human-readable description used in error messages.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::IntLiteral => "integer literal",
            TokenKind::LongLiteral => "long literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::DoubleLiteral => "double literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Void => "'void'",
            TokenKind::Boolean => "'boolean'",
            TokenKind::Byte => "'byte'",
            TokenKind::Short => "'short'",
            TokenKind::Char => "'char'",
            TokenKind::Int => "'int'",
            TokenKind::Long => "'long'",
            TokenKind::Float => "'float'",
            TokenKind::Double => "'double'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::This => "'this'",
            TokenKind::Super => "'super'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Return => "'return'",
            TokenKind::Throw => "'throw'",
            TokenKind::Try => "'try'",
            TokenKind::Catch => "'catch'",
            TokenKind::Finally => "'finally'",
            TokenKind::Assert => "'assert'",
            TokenKind::Package => "'package'",
            TokenKind::Import => "'import'",
            TokenKind::Class => "'class'",
            TokenKind::Interface => "'interface'",
            TokenKind::Enum => "'enum'",
            TokenKind::Extends => "'extends'",
            TokenKind::Implements => "'implements'",
            TokenKind::Throws => "'throws'",
            TokenKind::New => "'new'",
            TokenKind::Instanceof => "'instanceof'",
            TokenKind::Public => "'public'",
            TokenKind::Private => "'private'",
            TokenKind::Protected => "'protected'",
            TokenKind::Static => "'static'",
            TokenKind::Final => "'final'",
            TokenKind::Abstract => "'abstract'",
            TokenKind::Native => "'native'",
            TokenKind::Synchronized => "'synchronized'",
            TokenKind::Transient => "'transient'",
            TokenKind::Volatile => "'volatile'",
            TokenKind::Strictfp => "'strictfp'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Equal => "'='",
            TokenKind::PlusEqual => "'+='",
            TokenKind::MinusEqual => "'-='",
            TokenKind::StarEqual => "'*='",
            TokenKind::SlashEqual => "'/='",
            TokenKind::PercentEqual => "'%='",
            TokenKind::AmpEqual => "'&='",
            TokenKind::PipeEqual => "'|='",
            TokenKind::CaretEqual => "'^='",
            TokenKind::LessLessEqual => "'<<='",
            TokenKind::GreaterGreaterEqual => "'>>='",
            TokenKind::GreaterGreaterGreaterEqual => "'>>>='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::BangEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::LessLess => "'<<'",
            TokenKind::GreaterGreater => "'>>'",
            TokenKind::GreaterGreaterGreater => "'>>>'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::Arrow => "'->'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::At => "'@'",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map an identifier-shaped lexeme to its keyword, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "void" => TokenKind::Void,
        "boolean" => TokenKind::Boolean,
        "byte" => TokenKind::Byte,
        "short" => TokenKind::Short,
        "char" => TokenKind::Char,
        "int" => TokenKind::Int,
        "long" => TokenKind::Long,
        "float" => TokenKind::Float,
        "double" => TokenKind::Double,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "this" => TokenKind::This,
        "super" => TokenKind::Super,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "throw" => TokenKind::Throw,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "assert" => TokenKind::Assert,
        "package" => TokenKind::Package,
        "import" => TokenKind::Import,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "enum" => TokenKind::Enum,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "throws" => TokenKind::Throws,
        "new" => TokenKind::New,
        "instanceof" => TokenKind::Instanceof,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "static" => TokenKind::Static,
        "final" => TokenKind::Final,
        "abstract" => TokenKind::Abstract,
        "native" => TokenKind::Native,
        "synchronized" => TokenKind::Synchronized,
        "transient" => TokenKind::Transient,
        "volatile" => TokenKind::Volatile,
        "strictfp" => TokenKind::Strictfp,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(lookup_keyword("class"), Some(TokenKind::Class));
        assert_eq!(lookup_keyword("instanceof"), Some(TokenKind::Instanceof));
        assert_eq!(lookup_keyword("var"), None);
        assert_eq!(lookup_keyword("String"), None);
    }

    #[test]
    fn categories() {
        assert!(TokenKind::Int.is_primitive_type());
        assert!(TokenKind::Void.is_primitive_type());
        assert!(!TokenKind::Identifier.is_primitive_type());
        assert!(TokenKind::Static.is_modifier());
        assert!(TokenKind::Null.is_literal());
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(TokenKind::Semicolon.to_string(), "';'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
