//! Statement nodes.

use javelin_core::Span;

use crate::ast::decl::{Modifiers, TypeDecl, VarDeclarator};
use crate::ast::expr::Expr;
use crate::ast::types::TypeExpr;
use crate::ast::Ident;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    Block(Block<'ast>),
    LocalVar(&'ast LocalVarStmt<'ast>),
    /// A class, interface or enum declared inside a block.
    LocalClass(&'ast TypeDecl<'ast>),
    Expr(ExprStmt<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    ForEach(&'ast ForEachStmt<'ast>),
    Return(ReturnStmt<'ast>),
    Break(JumpStmt<'ast>),
    Continue(JumpStmt<'ast>),
    Throw(ThrowStmt<'ast>),
    Try(&'ast TryStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
    Synchronized(&'ast SynchronizedStmt<'ast>),
    Labeled(&'ast LabeledStmt<'ast>),
    Assert(&'ast AssertStmt<'ast>),
    Empty(Span),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Block(s) => s.span,
            Self::LocalVar(s) => s.span,
            Self::LocalClass(s) => s.span,
            Self::Expr(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::DoWhile(s) => s.span,
            Self::For(s) => s.span,
            Self::ForEach(s) => s.span,
            Self::Return(s) => s.span,
            Self::Break(s) | Self::Continue(s) => s.span,
            Self::Throw(s) => s.span,
            Self::Try(s) => s.span,
            Self::Switch(s) => s.span,
            Self::Synchronized(s) => s.span,
            Self::Labeled(s) => s.span,
            Self::Assert(s) => s.span,
            Self::Empty(span) => *span,
        }
    }
}

/// `{ stmts }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// `final int a = 1, b[] = {};`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalVarStmt<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub ty: TypeExpr<'ast>,
    pub vars: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_stmt: Stmt<'ast>,
    pub else_stmt: Option<Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    pub body: Stmt<'ast>,
    pub condition: &'ast Expr<'ast>,
    pub span: Span,
}

/// Classic `for`. `init` holds local variable and expression statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    pub init: &'ast [Stmt<'ast>],
    pub condition: Option<&'ast Expr<'ast>>,
    pub update: &'ast [&'ast Expr<'ast>],
    pub body: Stmt<'ast>,
    pub span: Span,
}

/// `for (T x : iterable)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForEachStmt<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub iterable: &'ast Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// `break`/`continue` with an optional label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpStmt<'ast> {
    pub label: Option<Ident<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    /// try-with-resources declarations.
    pub resources: &'ast [Stmt<'ast>],
    pub body: Block<'ast>,
    pub catches: &'ast [CatchClause<'ast>],
    pub finally: Option<Block<'ast>>,
    pub span: Span,
}

/// `catch (A | B e) { .. }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchClause<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub types: &'ast [TypeExpr<'ast>],
    pub name: Ident<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    pub selector: &'ast Expr<'ast>,
    pub cases: &'ast [SwitchCase<'ast>],
    pub span: Span,
}

/// One `case a, b:` / `default:` group with the statements that follow it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchCase<'ast> {
    /// Empty for `default`.
    pub labels: &'ast [&'ast Expr<'ast>],
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl SwitchCase<'_> {
    pub fn is_default(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynchronizedStmt<'ast> {
    pub lock: &'ast Expr<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledStmt<'ast> {
    pub label: Ident<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssertStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub message: Option<&'ast Expr<'ast>>,
    pub span: Span,
}
