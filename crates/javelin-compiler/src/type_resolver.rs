//! Type resolution for converting AST type expressions to erased DataTypes.
//!
//! [`TypeExprResolver`] turns a parsed [`TypeExpr`] into a [`DataType`] using
//! the import-aware lookup of a [`CompilationContext`].
//!
//! ## Rules
//!
//! - Primitive keywords map to their fixed hashes
//! - Named types go through [`CompilationContext::resolve_type_name`]
//! - Type variables erase to `java.lang.Object`
//! - Generic arguments are erased; array dimensions are kept
//! - `var` has no type of its own and is left to the caller
//!
//! ## Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin_compiler::{CompilationContext, FileScope, TypeExprResolver};
//! use javelin_core::{DataType, primitives};
//! use javelin_parser::Parser;
//! use javelin_registry::SymbolRegistry;
//!
//! let arena = Bump::new();
//! let registry = SymbolRegistry::new();
//! let file = FileScope::new("app");
//! let ctx = CompilationContext::new(&registry, &file);
//!
//! let ty = Parser::type_expr("int[][]", &arena).unwrap();
//! let resolved = TypeExprResolver::new(&ctx).resolve(&ty).unwrap();
//! assert_eq!(resolved, DataType::array(primitives::INT, 2));
//! ```

use javelin_core::{DataType, RegistrationError, TypeHash, primitives};
use javelin_parser::ast::{TypeBase, TypeExpr};

use crate::context::CompilationContext;

/// Resolves AST type expressions to erased DataTypes.
pub struct TypeExprResolver<'c, 'a> {
    ctx: &'c CompilationContext<'a>,
}

impl<'c, 'a> TypeExprResolver<'c, 'a> {
    pub fn new(ctx: &'c CompilationContext<'a>) -> Self {
        Self { ctx }
    }

    /// Resolve a TypeExpr to a DataType.
    pub fn resolve(&self, type_expr: &TypeExpr<'_>) -> Result<DataType, RegistrationError> {
        let base = self.resolve_base(type_expr)?;
        Ok(DataType::array(base, type_expr.dims))
    }

    /// Resolve, substituting `java.lang.Object` for anything unknown.
    ///
    /// Returns the error alongside so callers can report it.
    pub fn resolve_or_object(&self, type_expr: &TypeExpr<'_>) -> (DataType, Option<RegistrationError>) {
        match self.resolve(type_expr) {
            Ok(ty) => (ty, None),
            Err(err) => (DataType::array(primitives::OBJECT, type_expr.dims), Some(err)),
        }
    }

    /// Resolve just the base type, ignoring dimensions and generic arguments.
    pub fn resolve_base(&self, type_expr: &TypeExpr<'_>) -> Result<TypeHash, RegistrationError> {
        match &type_expr.base {
            TypeBase::Primitive(prim) => primitives::from_keyword(prim.keyword())
                .ok_or_else(|| RegistrationError::TypeNotFound(prim.keyword().to_string())),

            TypeBase::Named(path) => {
                let segments: Vec<&str> = path.segments.iter().map(|s| s.name).collect();
                if let [single] = segments.as_slice()
                    && self.ctx.is_type_var(single)
                {
                    return Ok(primitives::OBJECT);
                }
                self.ctx
                    .resolve_type_name(&segments)
                    .ok_or_else(|| RegistrationError::TypeNotFound(path.dotted()))
            }

            TypeBase::Var => Err(RegistrationError::TypeNotFound("var".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FileScope;
    use bumpalo::Bump;
    use javelin_core::{Flags, QualifiedName};
    use javelin_parser::Parser;
    use javelin_registry::{SymbolRegistry, TypeKind, TypeSymbol};

    fn registry() -> SymbolRegistry {
        let mut registry = SymbolRegistry::new();
        for name in ["java.lang.String", "java.util.Map"] {
            registry
                .register_type(TypeSymbol::new(QualifiedName::parse(name), TypeKind::Class, Flags::PUBLIC))
                .unwrap();
        }
        registry
    }

    fn resolve(source: &str, file: &FileScope, type_vars: &[&str]) -> Result<DataType, RegistrationError> {
        let arena = Bump::new();
        let registry = registry();
        let ctx = CompilationContext::new(&registry, file).with_type_vars(type_vars.iter().copied());
        let ty = Parser::type_expr(source, &arena).unwrap();
        TypeExprResolver::new(&ctx).resolve(&ty)
    }

    #[test]
    fn primitives_and_arrays() {
        let file = FileScope::new("");
        assert_eq!(resolve("boolean", &file, &[]), Ok(DataType::simple(primitives::BOOLEAN)));
        assert_eq!(resolve("String[]", &file, &[]), Ok(DataType::array(primitives::STRING, 1)));
    }

    #[test]
    fn generic_arguments_are_erased() {
        let mut file = FileScope::new("");
        file.add_on_demand("java.util");
        assert_eq!(
            resolve("Map<String, List<?>>", &file, &[]),
            Ok(DataType::simple(TypeHash::from_name("java.util.Map")))
        );
    }

    #[test]
    fn type_variables_erase_to_object() {
        let file = FileScope::new("");
        assert_eq!(resolve("T[]", &file, &["T"]), Ok(DataType::array(primitives::OBJECT, 1)));
    }

    #[test]
    fn unknown_types_report_their_name() {
        let file = FileScope::new("");
        assert_eq!(
            resolve("a.b.Missing", &file, &[]),
            Err(RegistrationError::TypeNotFound("a.b.Missing".to_string()))
        );
    }

    #[test]
    fn fallback_keeps_dimensions() {
        let arena = Bump::new();
        let registry = registry();
        let file = FileScope::new("");
        let ctx = CompilationContext::new(&registry, &file);
        let ty = Parser::type_expr("Missing[]", &arena).unwrap();
        let (resolved, err) = TypeExprResolver::new(&ctx).resolve_or_object(&ty);
        assert_eq!(resolved, DataType::array(primitives::OBJECT, 1));
        assert!(err.is_some());
    }
}
