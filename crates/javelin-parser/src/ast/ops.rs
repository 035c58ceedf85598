//! Operator definitions with precedence for the Pratt parser.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// (left, right) binding power. All binary operators are left-associative.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (3, 4),
            LogicalAnd => (5, 6),
            BitwiseOr => (7, 8),
            BitwiseXor => (9, 10),
            BitwiseAnd => (11, 12),
            Equal | NotEqual => (13, 14),
            Less | LessEqual | Greater | GreaterEqual => (15, 16),
            ShiftLeft | ShiftRight | ShiftRightUnsigned => (17, 18),
            Add | Sub => (19, 20),
            Mul | Div | Mod => (21, 22),
        }
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            Pipe => BinaryOp::BitwiseOr,
            Caret => BinaryOp::BitwiseXor,
            Amp => BinaryOp::BitwiseAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            GreaterGreaterGreater => BinaryOp::ShiftRightUnsigned,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::LogicalOr | BinaryOp::LogicalAnd)
    }

    pub fn is_shift(&self) -> bool {
        use BinaryOp::*;
        matches!(self, ShiftLeft | ShiftRight | ShiftRightUnsigned)
    }

    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding power of `instanceof`, same level as relational operators.
pub const INSTANCEOF_BP: (u8, u8) = (15, 16);

/// Binding power of the conditional operator.
pub const TERNARY_BP: u8 = 2;

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    LogicalNot,
    BitwiseNot,
    PreInc,
    PreDec,
}

impl UnaryOp {
    pub fn binding_power() -> u8 {
        25
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            Minus => UnaryOp::Neg,
            Plus => UnaryOp::Plus,
            Bang => UnaryOp::LogicalNot,
            Tilde => UnaryOp::BitwiseNot,
            PlusPlus => UnaryOp::PreInc,
            MinusMinus => UnaryOp::PreDec,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::LogicalNot => "!",
            UnaryOp::BitwiseNot => "~",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postfix `++` / `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    PostInc,
    PostDec,
}

impl PostfixOp {
    pub fn binding_power() -> u8 {
        27
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::PlusPlus => Some(PostfixOp::PostInc),
            TokenKind::MinusMinus => Some(PostfixOp::PostDec),
            _ => None,
        }
    }
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixOp::PostInc => f.write_str("++"),
            PostfixOp::PostDec => f.write_str("--"),
        }
    }
}

/// Simple and compound assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    UshrAssign,
}

impl AssignOp {
    /// Right-associative, lowest precedence.
    pub fn binding_power() -> (u8, u8) {
        (1, 1)
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            Equal => AssignOp::Assign,
            PlusEqual => AssignOp::AddAssign,
            MinusEqual => AssignOp::SubAssign,
            StarEqual => AssignOp::MulAssign,
            SlashEqual => AssignOp::DivAssign,
            PercentEqual => AssignOp::ModAssign,
            AmpEqual => AssignOp::AndAssign,
            PipeEqual => AssignOp::OrAssign,
            CaretEqual => AssignOp::XorAssign,
            LessLessEqual => AssignOp::ShlAssign,
            GreaterGreaterEqual => AssignOp::ShrAssign,
            GreaterGreaterGreaterEqual => AssignOp::UshrAssign,
            _ => return None,
        })
    }

    pub fn is_simple(&self) -> bool {
        *self == AssignOp::Assign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(BinaryOp::Mul.binding_power().0 > BinaryOp::Add.binding_power().0);
        assert!(BinaryOp::LogicalAnd.binding_power().0 > BinaryOp::LogicalOr.binding_power().0);
    }

    #[test]
    fn from_token_mapping() {
        assert_eq!(BinaryOp::from_token(TokenKind::GreaterGreaterGreater), Some(BinaryOp::ShiftRightUnsigned));
        assert_eq!(BinaryOp::from_token(TokenKind::Equal), None);
        assert_eq!(AssignOp::from_token(TokenKind::PlusEqual), Some(AssignOp::AddAssign));
        assert_eq!(UnaryOp::from_token(TokenKind::Bang), Some(UnaryOp::LogicalNot));
        assert_eq!(PostfixOp::from_token(TokenKind::MinusMinus), Some(PostfixOp::PostDec));
    }

    #[test]
    fn display() {
        assert_eq!(BinaryOp::ShiftRight.to_string(), ">>");
        assert_eq!(UnaryOp::BitwiseNot.to_string(), "~");
    }
}
