//! Declaration nodes: compilation units, types, members and annotations.

use javelin_core::{Flags, Span};

use crate::ast::expr::Expr;
use crate::ast::stmt::Block;
use crate::ast::types::{TypeExpr, TypeParam};
use crate::ast::{Ident, Path};

/// A parsed source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompilationUnit<'ast> {
    pub package: Option<Path<'ast>>,
    pub imports: &'ast [ImportDecl<'ast>],
    pub types: &'ast [&'ast TypeDecl<'ast>],
    pub span: Span,
}

impl<'ast> CompilationUnit<'ast> {
    /// Package name, empty for the unnamed package.
    pub fn package_name(&self) -> String {
        self.package.map(|p| p.dotted()).unwrap_or_default()
    }
}

/// `import a.b.C;`, `import a.b.*;`, `import static a.b.C.m;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportDecl<'ast> {
    pub path: Path<'ast>,
    pub is_static: bool,
    /// Trailing `.*`.
    pub on_demand: bool,
    pub span: Span,
}

/// `@Name`, `@Name(value)`, `@Name(key = value, ...)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation<'ast> {
    pub name: Path<'ast>,
    pub args: &'ast [AnnotationArg<'ast>],
    pub span: Span,
}

impl<'ast> Annotation<'ast> {
    pub fn simple_name(&self) -> &'ast str {
        self.name.last().map(|i| i.name).unwrap_or("")
    }

    /// The element named `name`. The single unnamed argument counts as `value`.
    pub fn element(&self, name: &str) -> Option<&ElementValue<'ast>> {
        self.args.iter().find_map(|arg| match arg.name {
            Some(n) if n.name == name => Some(&arg.value),
            None if name == "value" => Some(&arg.value),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationArg<'ast> {
    /// `None` for the shorthand `@A(x)` form.
    pub name: Option<Ident<'ast>>,
    pub value: ElementValue<'ast>,
    pub span: Span,
}

/// An annotation element value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementValue<'ast> {
    Expr(&'ast Expr<'ast>),
    /// `{a, b}`
    Array(&'ast [ElementValue<'ast>], Span),
    Annotation(&'ast Annotation<'ast>),
}

impl<'ast> ElementValue<'ast> {
    pub fn span(&self) -> Span {
        match self {
            ElementValue::Expr(expr) => expr.span(),
            ElementValue::Array(_, span) => *span,
            ElementValue::Annotation(annotation) => annotation.span,
        }
    }

    /// Flatten a `{..}` array (recursively) into its leaf values; a
    /// non-array is returned as a single element.
    pub fn flatten(&self) -> Vec<&ElementValue<'ast>> {
        match self {
            ElementValue::Array(items, _) => items.iter().flat_map(|v| v.flatten()).collect(),
            other => vec![other],
        }
    }
}

/// Modifier keywords and annotations, in any order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Modifiers<'ast> {
    pub flags: Flags,
    pub annotations: &'ast [Annotation<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    /// `@interface`
    Annotation,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

/// A class, interface, enum or annotation type declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDecl<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub kind: TypeKind,
    pub name: Ident<'ast>,
    pub type_params: &'ast [TypeParam<'ast>],
    /// Superclass of a class.
    pub extends: Option<TypeExpr<'ast>>,
    /// Implemented interfaces, or the super-interfaces of an interface.
    pub implements: &'ast [TypeExpr<'ast>],
    pub enum_constants: &'ast [EnumConstant<'ast>],
    pub members: &'ast [Member<'ast>],
    pub span: Span,
}

impl<'ast> TypeDecl<'ast> {
    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &'ast MethodDecl<'ast>> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(*method),
            _ => None,
        })
    }

    /// Directly nested member types.
    pub fn nested_types(&self) -> impl Iterator<Item = &'ast TypeDecl<'ast>> {
        self.members.iter().filter_map(|m| match m {
            Member::Type(ty) => Some(*ty),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumConstant<'ast> {
    pub annotations: &'ast [Annotation<'ast>],
    pub name: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    /// Constant-specific class body.
    pub body: Option<&'ast [Member<'ast>]>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'ast> {
    Field(&'ast FieldDecl<'ast>),
    Method(&'ast MethodDecl<'ast>),
    Constructor(&'ast ConstructorDecl<'ast>),
    Initializer(&'ast InitializerDecl<'ast>),
    Type(&'ast TypeDecl<'ast>),
}

impl<'ast> Member<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Member::Field(m) => m.span,
            Member::Method(m) => m.span,
            Member::Constructor(m) => m.span,
            Member::Initializer(m) => m.span,
            Member::Type(m) => m.span,
        }
    }
}

/// `int a = 1, b[];` as a member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub ty: TypeExpr<'ast>,
    pub vars: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

/// One declarator of a field or local variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    pub name: Ident<'ast>,
    /// Extra `[]` written after the name.
    pub dims: u8,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub type_params: &'ast [TypeParam<'ast>],
    pub return_type: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub throws: &'ast [TypeExpr<'ast>],
    /// `default` value of an annotation type element.
    pub default_value: Option<ElementValue<'ast>>,
    /// `None` for abstract and native methods.
    pub body: Option<Block<'ast>>,
    pub span: Span,
}

/// A formal parameter. Dims written after the name are folded into `ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub ty: TypeExpr<'ast>,
    /// `T... name`
    pub varargs: bool,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructorDecl<'ast> {
    pub modifiers: Modifiers<'ast>,
    pub type_params: &'ast [TypeParam<'ast>],
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub throws: &'ast [TypeExpr<'ast>],
    pub body: Block<'ast>,
    pub span: Span,
}

/// `{ .. }` or `static { .. }` at member level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitializerDecl<'ast> {
    pub is_static: bool,
    pub body: Block<'ast>,
    pub span: Span,
}
