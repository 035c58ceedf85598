//! Type expressions as written in source.

use javelin_core::Span;
use std::fmt;

use crate::ast::Path;

/// A primitive type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

/// The base of a type expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeBase<'ast> {
    Primitive(PrimitiveType),
    /// A possibly qualified class/interface/type-variable name.
    Named(Path<'ast>),
    /// `var` in a local variable declaration.
    Var,
}

/// A type as written: base, generic arguments of the last segment, array dims.
///
/// ```text
/// int[]                 Primitive(Int), dims 1
/// java.util.List<T>     Named(java.util.List), args [T]
/// Map<String, ?>        Named(Map), args [String, ?]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub base: TypeBase<'ast>,
    pub type_args: &'ast [TypeArg<'ast>],
    pub dims: u8,
    pub span: Span,
}

impl<'ast> TypeExpr<'ast> {
    pub fn primitive(primitive: PrimitiveType, span: Span) -> Self {
        Self {
            base: TypeBase::Primitive(primitive),
            type_args: &[],
            dims: 0,
            span,
        }
    }

    pub fn named(path: Path<'ast>) -> Self {
        Self {
            base: TypeBase::Named(path),
            type_args: &[],
            dims: 0,
            span: path.span,
        }
    }

    pub fn is_void(&self) -> bool {
        self.dims == 0 && self.base == TypeBase::Primitive(PrimitiveType::Void)
    }

    /// The same type with `extra` more array dimensions.
    pub fn with_extra_dims(self, extra: u8) -> Self {
        Self {
            dims: self.dims + extra,
            ..self
        }
    }
}

impl fmt::Display for TypeExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base {
            TypeBase::Primitive(p) => f.write_str(p.keyword())?,
            TypeBase::Named(path) => write!(f, "{path}")?,
            TypeBase::Var => f.write_str("var")?,
        }
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match arg {
                    TypeArg::Type(ty) => write!(f, "{ty}")?,
                    TypeArg::Wildcard { bound: None, .. } => f.write_str("?")?,
                    TypeArg::Wildcard {
                        bound: Some(WildcardBound::Extends(ty)),
                        ..
                    } => write!(f, "? extends {ty}")?,
                    TypeArg::Wildcard {
                        bound: Some(WildcardBound::Super(ty)),
                        ..
                    } => write!(f, "? super {ty}")?,
                }
            }
            f.write_str(">")?;
        }
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// A generic argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeArg<'ast> {
    Type(TypeExpr<'ast>),
    Wildcard {
        bound: Option<WildcardBound<'ast>>,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WildcardBound<'ast> {
    Extends(&'ast TypeExpr<'ast>),
    Super(&'ast TypeExpr<'ast>),
}

/// A declared type parameter: `T extends Comparable<T> & Serializable`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeParam<'ast> {
    pub name: crate::ast::Ident<'ast>,
    pub bounds: &'ast [TypeExpr<'ast>],
    pub span: Span,
}
