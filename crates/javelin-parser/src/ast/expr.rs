//! Expression nodes.
//!
//! Precedence, lowest first:
//! 1. Assignment (`=`, `+=`, ...) - right associative
//! 2. Conditional (`?:`) - right associative
//! 3. `||`, `&&`, `|`, `^`, `&`
//! 4. Equality, then relational and `instanceof`
//! 5. Shifts, additive, multiplicative
//! 6. Prefix unary and casts
//! 7. Postfix: call, field access, index, `++`/`--`, `::`

use javelin_core::Span;

use crate::ast::stmt::Block;
use crate::ast::types::TypeExpr;
use crate::ast::{AssignOp, BinaryOp, CallId, Ident, Member, PostfixOp, UnaryOp};

/// An expression. Every variant is `Copy`; larger payloads live in the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    /// A simple name: local, field, type or package prefix.
    Ident(Ident<'ast>),
    This(Span),
    Super(Span),
    FieldAccess(&'ast FieldAccessExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    NewArray(&'ast NewArrayExpr<'ast>),
    /// `{a, b}` in an array initializer position.
    ArrayInit(&'ast ArrayInitExpr<'ast>),
    Index(&'ast IndexExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    InstanceOf(&'ast InstanceOfExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Ternary(&'ast TernaryExpr<'ast>),
    Cast(&'ast CastExpr<'ast>),
    Postfix(&'ast PostfixExpr<'ast>),
    Paren(&'ast ParenExpr<'ast>),
    /// `Type.class`
    ClassLit(&'ast ClassLitExpr<'ast>),
    Lambda(&'ast LambdaExpr<'ast>),
    /// `target::name`
    MethodRef(&'ast MethodRefExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::This(span) | Self::Super(span) => *span,
            Self::FieldAccess(e) => e.span,
            Self::Call(e) => e.span,
            Self::New(e) => e.span,
            Self::NewArray(e) => e.span,
            Self::ArrayInit(e) => e.span,
            Self::Index(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::InstanceOf(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Ternary(e) => e.span,
            Self::Cast(e) => e.span,
            Self::Postfix(e) => e.span,
            Self::Paren(e) => e.span,
            Self::ClassLit(e) => e.span,
            Self::Lambda(e) => e.span,
            Self::MethodRef(e) => e.span,
        }
    }

    /// The call node, if this expression is a method invocation.
    pub fn as_call(&self) -> Option<&'ast CallExpr<'ast>> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&'ast self) -> &'ast Expr<'ast> {
        match self {
            Self::Paren(paren) => paren.expr.unparenthesized(),
            _ => self,
        }
    }

    /// Render a name or field-access chain (`a.b.C`) as a dotted string.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Self::Ident(ident) => Some(ident.name.to_string()),
            Self::FieldAccess(access) => {
                let mut prefix = access.target.dotted_name()?;
                prefix.push('.');
                prefix.push_str(access.name.name);
                Some(prefix)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    /// String contents with escapes already processed.
    String(&'ast str),
    Bool(bool),
    Null,
}

/// `target.name`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldAccessExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

/// A method invocation.
///
/// The callee is an [`Expr::Ident`] for unqualified calls, an
/// [`Expr::FieldAccess`] for qualified ones, and [`Expr::This`] /
/// [`Expr::Super`] for explicit constructor calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: CallId,
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

impl<'ast> CallExpr<'ast> {
    /// The invoked method's name, with `this`/`super` for constructor calls.
    pub fn method_name(&self) -> Option<&'ast str> {
        match self.callee {
            Expr::Ident(ident) => Some(ident.name),
            Expr::FieldAccess(access) => Some(access.name.name),
            Expr::This(_) => Some("this"),
            Expr::Super(_) => Some("super"),
            _ => None,
        }
    }

    /// The explicit receiver of a qualified call.
    pub fn qualifier(&self) -> Option<&'ast Expr<'ast>> {
        match self.callee {
            Expr::FieldAccess(access) => Some(access.target),
            _ => None,
        }
    }
}

/// `new T(args) { body }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub ty: TypeExpr<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    /// Anonymous class body.
    pub body: Option<&'ast [Member<'ast>]>,
    pub span: Span,
}

/// `new T[n][]` or `new T[] {..}`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewArrayExpr<'ast> {
    /// Element type; `dims` on it is the total array depth of the result.
    pub ty: TypeExpr<'ast>,
    pub dim_exprs: &'ast [&'ast Expr<'ast>],
    pub init: Option<&'ast ArrayInitExpr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayInitExpr<'ast> {
    pub elements: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// `expr instanceof Type` with an optional pattern binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceOfExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub ty: TypeExpr<'ast>,
    pub binding: Option<Ident<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub op: AssignOp,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub ty: TypeExpr<'ast>,
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostfixExpr<'ast> {
    pub operand: &'ast Expr<'ast>,
    pub op: PostfixOp,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassLitExpr<'ast> {
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaExpr<'ast> {
    pub params: &'ast [LambdaParam<'ast>],
    pub body: LambdaBody<'ast>,
    pub span: Span,
}

/// A lambda parameter; the type is absent for implicitly typed lambdas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaParam<'ast> {
    pub ty: Option<TypeExpr<'ast>>,
    pub name: Ident<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LambdaBody<'ast> {
    Expr(&'ast Expr<'ast>),
    Block(Block<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodRefExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    /// Method name, or `new` for constructor references.
    pub name: Ident<'ast>,
    pub span: Span,
}
