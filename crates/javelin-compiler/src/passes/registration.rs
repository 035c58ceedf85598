//! Registration Pass - Register all types and member signatures.
//!
//! Registration runs in two phases over every source file at once so types
//! may refer to each other in any order:
//!
//! 1. **Declare**: every top-level and member type gets a [`TypeSymbol`]
//!    with its name, kind, flags, type parameters and enclosing type.
//! 2. **Complete**: supertypes and members are resolved against the full
//!    set of declared types, then written back to the registry.
//!
//! Local and anonymous classes are not registered.
//!
//! ## Implied members
//!
//! - enum constants become `public static final` fields, and every enum gets
//!   `values()` and `valueOf(String)`
//! - interface methods are `public`, and `abstract` unless `default`,
//!   `static` or given a body; interface fields are `public static final`
//! - member types of interfaces are `public static`; member enums,
//!   interfaces and annotation types are `static`
//!
//! Types that do not resolve are reported and erased to `java.lang.Object`,
//! so a signature is never dropped.

use javelin_core::{
    DataType, Flags, QualifiedName, RegistrationError, Span, TypeHash, primitives,
};
use javelin_parser::ast::{
    self, ConstructorDecl, FieldDecl, Member, MethodDecl, Param, TypeDecl, TypeExpr,
};
use javelin_registry::{
    FieldSymbol, MemberSymbol, MethodSymbol, MethodType, SymbolRegistry, SymbolType, TypeKind,
    TypeSymbol,
};

use crate::context::{CompilationContext, SourceFile};
use crate::type_resolver::TypeExprResolver;

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput {
    /// Number of types registered.
    pub types_registered: usize,
    /// Number of members (methods, constructors, fields, initializers) registered.
    pub members_registered: usize,
    /// Errors that make the symbol table unusable: duplicates and cycles.
    pub errors: Vec<RegistrationError>,
    /// Unresolved types in signatures, with where they were written.
    pub warnings: Vec<(usize, Span, RegistrationError)>,
}

impl RegistrationOutput {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A declared type waiting for its supertypes and members.
struct Pending<'ast> {
    decl: &'ast TypeDecl<'ast>,
    hash: TypeHash,
    file: usize,
}

/// Supertypes and members computed for one type.
struct Completed {
    hash: TypeHash,
    superclass: Option<TypeHash>,
    interfaces: Vec<TypeHash>,
    members: Vec<MemberSymbol>,
}

/// Register all types and member signatures of a set of source files.
pub struct RegistrationPass<'r> {
    registry: &'r mut SymbolRegistry,
    types_registered: usize,
    members_registered: usize,
    errors: Vec<RegistrationError>,
    warnings: Vec<(usize, Span, RegistrationError)>,
}

impl<'r> RegistrationPass<'r> {
    pub fn new(registry: &'r mut SymbolRegistry) -> Self {
        Self {
            registry,
            types_registered: 0,
            members_registered: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Run both phases over `files`. Warning locations index into `files`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, files: &[SourceFile<'_>]) -> RegistrationOutput {
        let mut pending = Vec::new();
        for (index, file) in files.iter().enumerate() {
            for &decl in file.unit.types {
                let name = QualifiedName::new(file.scope.package(), decl.name.name);
                self.declare(decl, name, None, index, &mut pending);
            }
        }

        let completed: Vec<Completed> = pending
            .iter()
            .map(|p| self.complete(p, &files[p.file]))
            .collect();

        for done in completed {
            self.members_registered += done.members.len();
            if let Some(symbol) = self.registry.get_mut(done.hash) {
                symbol.superclass = done.superclass;
                symbol.interfaces = done.interfaces;
                symbol.members = done.members;
            }
        }

        if let Err(err) = self.registry.check_inheritance_cycles() {
            self.errors.push(err);
        }

        RegistrationOutput {
            types_registered: self.types_registered,
            members_registered: self.members_registered,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    // ==========================================================================
    // Phase 1: declare
    // ==========================================================================

    fn declare<'ast>(
        &mut self,
        decl: &'ast TypeDecl<'ast>,
        name: QualifiedName,
        outer: Option<(TypeHash, TypeKind)>,
        file: usize,
        pending: &mut Vec<Pending<'ast>>,
    ) {
        let kind = symbol_kind(decl.kind);
        let mut flags = decl.modifiers.flags;
        if let Some((_, outer_kind)) = outer {
            if matches!(outer_kind, TypeKind::Interface | TypeKind::Annotation) {
                flags |= Flags::PUBLIC | Flags::STATIC;
            }
            if kind != TypeKind::Class {
                flags |= Flags::STATIC;
            }
        }

        let mut symbol = TypeSymbol::new(name.clone(), kind, flags);
        symbol.outer = outer.map(|(hash, _)| hash);
        symbol.type_params = decl
            .type_params
            .iter()
            .map(|p| p.name.name.to_string())
            .collect();
        let hash = symbol.type_hash;

        if let Err(err) = self.registry.register_type(symbol) {
            self.errors.push(err);
            return;
        }
        self.types_registered += 1;
        pending.push(Pending { decl, hash, file });

        for nested in decl.nested_types() {
            self.declare(
                nested,
                name.nested(nested.name.name),
                Some((hash, kind)),
                file,
                pending,
            );
        }
    }

    // ==========================================================================
    // Phase 2: complete
    // ==========================================================================

    fn complete(&mut self, pending: &Pending<'_>, file: &SourceFile<'_>) -> Completed {
        let registry: &SymbolRegistry = self.registry;
        let ctx = CompilationContext::new(registry, &file.scope).with_owner(pending.hash);
        let mut builder = MemberBuilder {
            ctx,
            owner: pending.hash,
            kind: symbol_kind(pending.decl.kind),
            file: pending.file,
            warnings: Vec::new(),
        };
        let completed = builder.build(pending.decl);
        self.warnings.append(&mut builder.warnings);
        completed
    }
}

fn symbol_kind(kind: ast::TypeKind) -> TypeKind {
    match kind {
        ast::TypeKind::Class => TypeKind::Class,
        ast::TypeKind::Interface => TypeKind::Interface,
        ast::TypeKind::Enum => TypeKind::Enum,
        ast::TypeKind::Annotation => TypeKind::Annotation,
    }
}

/// Computes supertypes and member symbols of one declaration.
struct MemberBuilder<'a> {
    ctx: CompilationContext<'a>,
    owner: TypeHash,
    kind: TypeKind,
    file: usize,
    warnings: Vec<(usize, Span, RegistrationError)>,
}

impl<'a> MemberBuilder<'a> {
    fn build(&mut self, decl: &TypeDecl<'_>) -> Completed {
        let (superclass, interfaces) = self.supertypes(decl);

        let mut members = Vec::new();
        let self_type = DataType::simple(self.owner);
        let constant_flags = Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
        for constant in decl.enum_constants {
            members.push(MemberSymbol::Field(FieldSymbol::new(
                self.owner,
                constant.name.name,
                constant_flags,
                self_type,
            )));
        }

        for member in decl.members {
            match member {
                Member::Field(field) => self.field(field, &mut members),
                Member::Method(method) => members.push(MemberSymbol::Method(self.method(method))),
                Member::Constructor(ctor) => {
                    members.push(MemberSymbol::Constructor(self.constructor(ctor)))
                }
                Member::Initializer(init) => members.push(MemberSymbol::Initializer {
                    is_static: init.is_static,
                }),
                Member::Type(_) => {}
            }
        }

        if self.kind == TypeKind::Enum {
            let flags = Flags::PUBLIC | Flags::STATIC;
            members.push(MemberSymbol::Method(MethodSymbol::new(
                self.owner,
                "values",
                flags,
                SymbolType::Method(MethodType::new(Vec::new(), self_type.with_dims(1))),
            )));
            members.push(MemberSymbol::Method(MethodSymbol::new(
                self.owner,
                "valueOf",
                flags,
                SymbolType::Method(MethodType::new(
                    vec![DataType::simple(primitives::STRING)],
                    self_type,
                )),
            )));
        }

        Completed {
            hash: self.owner,
            superclass,
            interfaces,
            members,
        }
    }

    fn supertypes(&mut self, decl: &TypeDecl<'_>) -> (Option<TypeHash>, Vec<TypeHash>) {
        let interfaces = decl
            .implements
            .iter()
            .filter_map(|ty| self.resolve_supertype(ty))
            .collect();

        let superclass = match self.kind {
            TypeKind::Interface | TypeKind::Annotation => None,
            _ if self.owner == primitives::OBJECT => None,
            TypeKind::Enum => Some(
                self.ctx
                    .registry()
                    .get_by_name("java.lang.Enum")
                    .map_or(primitives::OBJECT, |symbol| symbol.type_hash),
            ),
            TypeKind::Class => Some(
                decl.extends
                    .as_ref()
                    .and_then(|ty| self.resolve_supertype(ty))
                    .unwrap_or(primitives::OBJECT),
            ),
        };

        (superclass, interfaces)
    }

    fn resolve_supertype(&mut self, ty: &TypeExpr<'_>) -> Option<TypeHash> {
        match TypeExprResolver::new(&self.ctx).resolve_base(ty) {
            Ok(hash) => Some(hash),
            Err(err) => {
                self.warnings.push((self.file, ty.span, err));
                None
            }
        }
    }

    fn resolve(&mut self, ctx: &CompilationContext<'_>, ty: &TypeExpr<'_>) -> DataType {
        let (resolved, err) = TypeExprResolver::new(ctx).resolve_or_object(ty);
        if let Some(err) = err {
            self.warnings.push((self.file, ty.span, err));
        }
        resolved
    }

    fn field(&mut self, field: &FieldDecl<'_>, members: &mut Vec<MemberSymbol>) {
        let mut flags = field.modifiers.flags;
        if self.is_interface_like() {
            flags |= Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
        }
        let ctx = self.ctx.clone();
        let base = self.resolve(&ctx, &field.ty);
        for var in field.vars {
            members.push(MemberSymbol::Field(FieldSymbol::new(
                self.owner,
                var.name.name,
                flags,
                base.with_dims(var.dims),
            )));
        }
    }

    fn method(&mut self, method: &MethodDecl<'_>) -> MethodSymbol {
        let mut flags = method.modifiers.flags;
        if self.is_interface_like() {
            flags |= Flags::PUBLIC;
            if method.body.is_none() && !flags.intersects(Flags::DEFAULT | Flags::STATIC) {
                flags |= Flags::ABSTRACT;
            }
        }

        let type_params: Vec<String> = method
            .type_params
            .iter()
            .map(|p| p.name.name.to_string())
            .collect();
        let ctx = self.ctx.clone().with_type_vars(type_params.iter().cloned());

        let params = self.params(&ctx, method.params);
        let varargs = method.params.last().is_some_and(|p| p.varargs);
        if varargs {
            flags |= Flags::VARARGS;
        }
        let return_type = self.resolve(&ctx, &method.return_type);
        let signature = MethodType::new(params, return_type).with_varargs(varargs);

        let ty = if type_params.is_empty() {
            SymbolType::Method(signature)
        } else {
            SymbolType::ForAll {
                type_params,
                inner: signature,
            }
        };
        MethodSymbol::new(self.owner, method.name.name, flags, ty)
    }

    fn constructor(&mut self, ctor: &ConstructorDecl<'_>) -> MethodSymbol {
        let ctx = self
            .ctx
            .clone()
            .with_type_vars(ctor.type_params.iter().map(|p| p.name.name));
        let params = self.params(&ctx, ctor.params);
        let varargs = ctor.params.last().is_some_and(|p| p.varargs);
        let signature = MethodType::new(params, DataType::void()).with_varargs(varargs);
        MethodSymbol::new(
            self.owner,
            "<init>",
            ctor.modifiers.flags,
            SymbolType::Method(signature),
        )
    }

    fn params(&mut self, ctx: &CompilationContext<'_>, params: &[Param<'_>]) -> Vec<DataType> {
        params.iter().map(|p| self.resolve(ctx, &p.ty)).collect()
    }

    fn is_interface_like(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use javelin_parser::Parser;

    fn register(sources: &[&str]) -> (SymbolRegistry, RegistrationOutput) {
        let arena = Bump::new();
        let files: Vec<SourceFile<'_>> = sources
            .iter()
            .enumerate()
            .map(|(i, src)| SourceFile::new(format!("f{i}.java"), Parser::parse(src, &arena).unwrap()))
            .collect();
        let mut registry = SymbolRegistry::new();
        let output = RegistrationPass::new(&mut registry).run(&files);
        (registry, output)
    }

    const OBJECT: &str = "package java.lang; public class Object { public boolean equals(Object o); } public final class String { public int length(); }";

    #[test]
    fn registers_types_and_members_in_order() {
        let (registry, output) = register(&[
            OBJECT,
            "package app; public class Util { public static int a; public static boolean isBlank(String s) { return true; } Util() { } static { } }",
        ]);
        assert!(output.is_success());
        assert_eq!(output.types_registered, 3);

        let util = registry.get_by_name("app.Util").unwrap();
        let names: Vec<_> = util.members.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["a", "isBlank", "<init>", ""]);
        assert_eq!(util.superclass, Some(primitives::OBJECT));

        let method = util.methods().next().unwrap();
        assert!(method.is_static() && method.is_public());
        assert_eq!(
            method.method_type().unwrap().params,
            vec![DataType::simple(primitives::STRING)]
        );
    }

    #[test]
    fn forward_references_across_files() {
        let (registry, output) = register(&[
            OBJECT,
            "package a; public class First extends b.Second { }",
            "package b; public class Second { }",
        ]);
        assert!(output.warnings.is_empty());
        let first = registry.get_by_name("a.First").unwrap();
        assert_eq!(first.superclass, Some(TypeHash::from_name("b.Second")));
    }

    #[test]
    fn interface_members_are_implicitly_public() {
        let (registry, _) = register(&[
            OBJECT,
            "interface Shape { int SIDES = 0; double area(); default String name() { return null; } static Shape unit() { return null; } }",
        ]);
        let shape = registry.get_by_name("Shape").unwrap();
        assert!(shape.is_interface());
        assert_eq!(shape.superclass, None);

        let field = shape.field("SIDES").unwrap();
        assert!(field.flags.contains(Flags::PUBLIC | Flags::STATIC | Flags::FINAL));

        let flags: Vec<_> = shape.methods().map(|m| m.flags).collect();
        assert!(flags[0].contains(Flags::PUBLIC | Flags::ABSTRACT));
        assert!(!flags[1].contains(Flags::ABSTRACT));
        assert!(flags[2].contains(Flags::PUBLIC | Flags::STATIC));
    }

    #[test]
    fn enums_get_constants_and_synthetic_methods() {
        let (registry, _) = register(&[OBJECT, "enum Color { RED, GREEN; int rgb() { return 0; } }"]);
        let color = registry.get_by_name("Color").unwrap();
        let names: Vec<_> = color.members.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["RED", "GREEN", "rgb", "values", "valueOf"]);
        assert!(color.flags.contains(Flags::ENUM));
    }

    #[test]
    fn generic_methods_are_quantified() {
        let (registry, _) = register(&[
            OBJECT,
            "class Box<T> { T get() { return null; } static <U> U pick(U a, U b) { return a; } }",
        ]);
        let boxed = registry.get_by_name("Box").unwrap();
        let methods: Vec<_> = boxed.methods().collect();

        let get = methods[0].method_type().unwrap();
        assert_eq!(get.return_type, DataType::simple(primitives::OBJECT));

        assert!(methods[1].method_type().is_none());
        assert!(matches!(&methods[1].ty, SymbolType::ForAll { type_params, .. } if type_params == &["U"]));
    }

    #[test]
    fn member_types_are_registered_with_outer() {
        let (registry, _) = register(&[
            OBJECT,
            "package app; class Outer { class Inner { } interface Api { class Impl { } } }",
        ]);
        let inner = registry.get_by_name("app.Outer.Inner").unwrap();
        assert_eq!(inner.outer, Some(TypeHash::from_name("app.Outer")));
        assert!(!inner.flags.contains(Flags::STATIC));

        let api = registry.get_by_name("app.Outer.Api").unwrap();
        assert!(api.flags.contains(Flags::STATIC));

        let imp = registry.get_by_name("app.Outer.Api.Impl").unwrap();
        assert!(imp.flags.contains(Flags::PUBLIC | Flags::STATIC));
        assert!(registry.get_package_type("app", "Inner").is_none());
    }

    #[test]
    fn unresolved_types_warn_and_erase() {
        let (registry, output) = register(&[OBJECT, "class A { Missing f; void m(Gone g) { } }"]);
        assert!(output.is_success());
        assert_eq!(output.warnings.len(), 2);
        assert!(matches!(output.warnings[0].2, RegistrationError::TypeNotFound(ref n) if n == "Missing"));

        let a = registry.get_by_name("A").unwrap();
        assert_eq!(a.field("f").unwrap().ty, DataType::simple(primitives::OBJECT));
    }

    #[test]
    fn duplicate_types_are_errors() {
        let (_, output) = register(&[OBJECT, "class A { }", "class A { }"]);
        assert!(matches!(output.errors[..], [RegistrationError::DuplicateType(ref n)] if n == "A"));
    }

    #[test]
    fn inheritance_cycles_are_errors() {
        let (_, output) = register(&[OBJECT, "class A extends B { } class B extends A { }"]);
        assert!(output
            .errors
            .iter()
            .any(|e| matches!(e, RegistrationError::CyclicInheritance(_))));
    }

    #[test]
    fn varargs_parameters_are_arrays() {
        let (registry, _) = register(&[OBJECT, "class F { static String format(String f, Object... args) { return f; } }"]);
        let format = registry.get_by_name("F").unwrap().methods().next().unwrap();
        let ty = format.method_type().unwrap();
        assert!(ty.varargs);
        assert_eq!(ty.params[1], DataType::array(primitives::OBJECT, 1));
        assert!(format.flags.contains(Flags::VARARGS));
    }
}
