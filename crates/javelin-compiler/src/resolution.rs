//! The type resolution capability annotation handlers depend on.
//!
//! Handlers never see the registry-backed attribution directly; they ask a
//! [`TypeResolver`] for the type of an expression at a [`Site`]. The first
//! query inside a member may trigger attribution of that whole member.

use javelin_core::{DataType, TypeHash};
use javelin_parser::ast::{Expr, Member, TypeExpr};

/// Where an expression lives: file, enclosing type and enclosing member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site<'ast> {
    /// Index of the source file.
    pub file: usize,
    /// The type whose body contains the expression.
    pub owner: TypeHash,
    /// The member containing the expression; `None` for type-level positions
    /// such as annotation arguments.
    pub member: Option<&'ast Member<'ast>>,
}

impl<'ast> Site<'ast> {
    pub fn new(file: usize, owner: TypeHash) -> Self {
        Self {
            file,
            owner,
            member: None,
        }
    }

    pub fn in_member(self, member: &'ast Member<'ast>) -> Self {
        Self {
            member: Some(member),
            ..self
        }
    }
}

/// Maps expressions and type expressions to resolved types.
pub trait TypeResolver<'ast> {
    /// The erased type of `expr`, or `None` if it has none (a type or package
    /// name, a void call) or could not be determined.
    fn resolve(&mut self, site: &Site<'ast>, expr: &'ast Expr<'ast>) -> Option<DataType>;

    /// The class, interface or enum named by `ty`. Primitive and array types
    /// name no such type and yield `None`.
    fn resolve_type(&mut self, site: &Site<'ast>, ty: &TypeExpr<'ast>) -> Option<TypeHash>;
}
