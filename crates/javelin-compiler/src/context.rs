//! CompilationContext - import-aware type name resolution.
//!
//! A [`FileScope`] records what a source file can see by simple name: its
//! package and its imports. A [`CompilationContext`] pairs that with the
//! registry and the type whose code is being looked at, and resolves type
//! names the way Java does:
//!
//! 1. type variables in scope (erased to `java.lang.Object`)
//! 2. member types of the current type, its enclosing types and supertypes
//! 3. single-type imports
//! 4. types in the same package
//! 5. on-demand (`.*`) imports
//! 6. `java.lang`
//!
//! Qualified names resolve their first segment as a type and the rest as
//! member types, falling back to a package-qualified lookup.

use javelin_core::{QualifiedName, TypeHash, primitives};
use javelin_parser::ast::CompilationUnit;
use javelin_registry::SymbolRegistry;
use rustc_hash::FxHashMap;

/// Package that is implicitly imported on demand into every file.
pub const JAVA_LANG: &str = "java.lang";

/// Names visible in one source file.
#[derive(Debug, Clone, Default)]
pub struct FileScope {
    package: String,
    /// `import a.b.C;` keyed by simple name.
    single: FxHashMap<String, QualifiedName>,
    /// `import a.b.*;` package (or type) prefixes, in source order.
    on_demand: Vec<String>,
}

impl FileScope {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Collect the package and type imports of a parsed unit. Static imports
    /// name members, not types, and are not part of the scope.
    pub fn from_unit(unit: &CompilationUnit<'_>) -> Self {
        let mut scope = Self::new(unit.package_name());
        for import in unit.imports.iter().filter(|i| !i.is_static) {
            let dotted = import.path.dotted();
            if import.on_demand {
                scope.add_on_demand(dotted);
            } else {
                scope.add_import(QualifiedName::parse(&dotted));
            }
        }
        scope
    }

    pub fn add_import(&mut self, name: QualifiedName) {
        self.single.insert(name.simple_name().to_string(), name);
    }

    pub fn add_on_demand(&mut self, prefix: impl Into<String>) {
        self.on_demand.push(prefix.into());
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn import(&self, simple: &str) -> Option<&QualifiedName> {
        self.single.get(simple)
    }
}

/// A parsed source file and the names it can see.
#[derive(Debug, Clone)]
pub struct SourceFile<'ast> {
    pub name: String,
    pub unit: CompilationUnit<'ast>,
    pub scope: FileScope,
}

impl<'ast> SourceFile<'ast> {
    pub fn new(name: impl Into<String>, unit: CompilationUnit<'ast>) -> Self {
        Self {
            name: name.into(),
            scope: FileScope::from_unit(&unit),
            unit,
        }
    }
}

/// Resolution context for code inside one type of one file.
#[derive(Debug, Clone)]
pub struct CompilationContext<'a> {
    registry: &'a SymbolRegistry,
    file: &'a FileScope,
    /// The type whose body is being resolved.
    owner: Option<TypeHash>,
    /// Method-level type variables; the owner's own are read from the registry.
    type_vars: Vec<String>,
}

impl<'a> CompilationContext<'a> {
    pub fn new(registry: &'a SymbolRegistry, file: &'a FileScope) -> Self {
        Self {
            registry,
            file,
            owner: None,
            type_vars: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: TypeHash) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_type_vars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_vars.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn registry(&self) -> &'a SymbolRegistry {
        self.registry
    }

    pub fn file(&self) -> &'a FileScope {
        self.file
    }

    pub fn owner(&self) -> Option<TypeHash> {
        self.owner
    }

    /// The owner followed by its enclosing types, innermost first.
    pub fn enclosing_types(&self) -> Vec<TypeHash> {
        let mut chain = Vec::new();
        let mut current = self.owner;
        while let Some(hash) = current {
            if chain.contains(&hash) {
                break;
            }
            chain.push(hash);
            current = self.registry.get(hash).and_then(|symbol| symbol.outer);
        }
        chain
    }

    /// Whether `name` is a type variable visible here.
    pub fn is_type_var(&self, name: &str) -> bool {
        if self.type_vars.iter().any(|v| v == name) {
            return true;
        }
        self.enclosing_types().into_iter().any(|hash| {
            self.registry
                .get(hash)
                .is_some_and(|symbol| symbol.type_params.iter().any(|p| p == name))
        })
    }

    /// Resolve a possibly qualified type name given as segments.
    pub fn resolve_type_name(&self, segments: &[&str]) -> Option<TypeHash> {
        let (first, rest) = segments.split_first()?;

        if let Some(hash) = self.resolve_simple(first)
            && let Some(hash) = self.member_path(hash, rest)
        {
            return Some(hash);
        }

        // Longest package prefix wins: `a.b.C.D` tries package `a.b.C`, then `a.b`.
        for split in (1..segments.len()).rev() {
            let package = segments[..split].join(".");
            if let Some(symbol) = self.registry.get_package_type(&package, segments[split])
                && let Some(hash) = self.member_path(symbol.type_hash, &segments[split + 1..])
            {
                return Some(hash);
            }
        }
        None
    }

    /// Resolve a simple type name.
    pub fn resolve_simple(&self, name: &str) -> Option<TypeHash> {
        if self.is_type_var(name) {
            return Some(primitives::OBJECT);
        }

        for hash in self.enclosing_types() {
            if let Some(symbol) = self.registry.get(hash)
                && symbol.name.simple_name() == name
            {
                return Some(hash);
            }
            if let Some(member) = self.member_type(hash, name) {
                return Some(member);
            }
        }

        if let Some(imported) = self.file.import(name) {
            return self.registry.get_type(imported).map(|symbol| symbol.type_hash);
        }

        if let Some(symbol) = self.registry.get_package_type(self.file.package(), name) {
            return Some(symbol.type_hash);
        }

        for prefix in &self.file.on_demand {
            let candidate = QualifiedName::new(prefix.as_str(), name);
            if let Some(symbol) = self.registry.get_type(&candidate) {
                return Some(symbol.type_hash);
            }
        }

        self.registry
            .get_package_type(JAVA_LANG, name)
            .map(|symbol| symbol.type_hash)
    }

    /// A member type named `name` declared on `owner` or inherited by it.
    pub fn member_type(&self, owner: TypeHash, name: &str) -> Option<TypeHash> {
        self.registry
            .supertypes(owner)
            .into_iter()
            .find_map(|symbol| self.registry.get_type(&symbol.name.nested(name)))
            .map(|symbol| symbol.type_hash)
    }

    fn member_path(&self, mut hash: TypeHash, path: &[&str]) -> Option<TypeHash> {
        for segment in path {
            hash = self.member_type(hash, segment)?;
        }
        Some(hash)
    }

    /// Whether `dotted` names a package (a prefix of some registered type).
    pub fn is_package(&self, dotted: &str) -> bool {
        self.registry.has_package(dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::Flags;
    use javelin_registry::{TypeKind, TypeSymbol};

    fn registry() -> SymbolRegistry {
        let mut registry = SymbolRegistry::new();
        for name in ["java.lang.Object", "java.lang.String", "java.util.List", "app.Main", "util.Strings"] {
            registry
                .register_type(TypeSymbol::new(QualifiedName::parse(name), TypeKind::Class, Flags::PUBLIC))
                .unwrap();
        }
        let mut inner = TypeSymbol::new(QualifiedName::parse("app.Main.Inner"), TypeKind::Class, Flags::STATIC);
        inner.outer = Some(TypeHash::from_name("app.Main"));
        registry.register_type(inner).unwrap();
        registry
            .get_type_mut(&QualifiedName::parse("app.Main"))
            .unwrap()
            .type_params
            .push("T".to_string());
        registry
    }

    #[test]
    fn java_lang_is_implicit() {
        let registry = registry();
        let file = FileScope::new("app");
        let ctx = CompilationContext::new(&registry, &file);
        assert_eq!(ctx.resolve_simple("String"), Some(primitives::STRING));
    }

    #[test]
    fn same_package_and_imports() {
        let registry = registry();
        let mut file = FileScope::new("app");
        file.add_import(QualifiedName::parse("util.Strings"));
        file.add_on_demand("java.util");
        let ctx = CompilationContext::new(&registry, &file);

        assert_eq!(ctx.resolve_simple("Main"), Some(TypeHash::from_name("app.Main")));
        assert_eq!(ctx.resolve_simple("Strings"), Some(TypeHash::from_name("util.Strings")));
        assert_eq!(ctx.resolve_simple("List"), Some(TypeHash::from_name("java.util.List")));
        assert_eq!(ctx.resolve_simple("Missing"), None);
    }

    #[test]
    fn member_types_and_type_vars_of_owner() {
        let registry = registry();
        let file = FileScope::new("app");
        let ctx = CompilationContext::new(&registry, &file).with_owner(TypeHash::from_name("app.Main.Inner"));

        assert_eq!(ctx.resolve_simple("Inner"), Some(TypeHash::from_name("app.Main.Inner")));
        assert!(ctx.is_type_var("T"));
        assert_eq!(ctx.resolve_simple("T"), Some(primitives::OBJECT));
    }

    #[test]
    fn qualified_names() {
        let registry = registry();
        let file = FileScope::new("");
        let ctx = CompilationContext::new(&registry, &file);

        assert_eq!(
            ctx.resolve_type_name(&["java", "lang", "String"]),
            Some(primitives::STRING)
        );
        assert_eq!(
            ctx.resolve_type_name(&["app", "Main", "Inner"]),
            Some(TypeHash::from_name("app.Main.Inner"))
        );
        assert!(ctx.is_package("java.lang"));
        assert_eq!(ctx.resolve_type_name(&["app", "Nope"]), None);
    }

    #[test]
    fn file_scope_from_unit_skips_static_imports() {
        let arena = bumpalo::Bump::new();
        let unit = javelin_parser::Parser::parse(
            "package app; import util.Strings; import static util.Strings.blank; import java.util.*; class A {}",
            &arena,
        )
        .unwrap();
        let scope = FileScope::from_unit(&unit);
        assert_eq!(scope.package(), "app");
        assert!(scope.import("Strings").is_some());
        assert!(scope.import("blank").is_none());
        assert_eq!(scope.on_demand, vec!["java.util".to_string()]);
    }
}
