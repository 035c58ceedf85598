//! SymbolRegistry - the type table shared by every pass.
//!
//! # Storage Model
//!
//! - **Types**: every [`TypeSymbol`] stored by `QualifiedName` (primary key)
//! - **Hash index**: `TypeHash -> QualifiedName`, for lookups from resolved
//!   [`DataType`](javelin_core::DataType)s
//! - **Package index**: package -> (simple name -> `QualifiedName`), used to
//!   resolve simple names against the current package and `import a.b.*`
//!
//! Members live on their owning `TypeSymbol`, in declaration order.
//!
//! # Example
//!
//! ```
//! use javelin_registry::{SymbolRegistry, TypeKind, TypeSymbol};
//! use javelin_core::{Flags, QualifiedName};
//!
//! let mut registry = SymbolRegistry::new();
//! let name = QualifiedName::parse("app.Util");
//! registry
//!     .register_type(TypeSymbol::new(name.clone(), TypeKind::Class, Flags::PUBLIC))
//!     .unwrap();
//!
//! assert!(registry.get(name.to_type_hash()).is_some());
//! assert!(registry.get_package_type("app", "Util").is_some());
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use javelin_core::{QualifiedName, RegistrationError, TypeHash, primitives};

use crate::symbol::{FieldSymbol, MethodSymbol, TypeSymbol};

/// Unified type registry.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    /// Types stored by qualified name (PRIMARY storage).
    types: FxHashMap<QualifiedName, TypeSymbol>,

    /// Reverse index: hash -> name.
    type_hash_to_name: FxHashMap<TypeHash, QualifiedName>,

    /// Top-level types by package: package -> (simple name -> qualified name).
    types_by_package: FxHashMap<String, FxHashMap<String, QualifiedName>>,

    /// Every package prefix seen, so `a.b` is known once `a.b.C` exists.
    packages: FxHashSet<String>,

    /// Registration order, for deterministic iteration.
    order: Vec<QualifiedName>,
}

impl SymbolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a type. Member types must have `outer` set so they stay out of
    /// the package index.
    pub fn register_type(&mut self, symbol: TypeSymbol) -> Result<(), RegistrationError> {
        let name = symbol.name.clone();
        if self.types.contains_key(&name) {
            return Err(RegistrationError::DuplicateType(name.to_string()));
        }

        if symbol.outer.is_none() {
            let package = name.qualifier().to_string();
            self.types_by_package
                .entry(package.clone())
                .or_default()
                .insert(name.simple_name().to_string(), name.clone());
            self.register_package(&package);
        }

        self.type_hash_to_name.insert(symbol.type_hash, name.clone());
        self.order.push(name.clone());
        self.types.insert(name, symbol);
        Ok(())
    }

    fn register_package(&mut self, package: &str) {
        let mut prefix = String::new();
        for segment in package.split('.').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            self.packages.insert(prefix.clone());
        }
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a type by qualified name (primary lookup).
    pub fn get_type(&self, name: &QualifiedName) -> Option<&TypeSymbol> {
        self.types.get(name)
    }

    pub fn get_type_mut(&mut self, name: &QualifiedName) -> Option<&mut TypeSymbol> {
        self.types.get_mut(name)
    }

    /// Get a type by its hash (uses the reverse index).
    pub fn get(&self, hash: TypeHash) -> Option<&TypeSymbol> {
        self.type_hash_to_name
            .get(&hash)
            .and_then(|name| self.types.get(name))
    }

    pub fn get_mut(&mut self, hash: TypeHash) -> Option<&mut TypeSymbol> {
        let name = self.type_hash_to_name.get(&hash)?;
        self.types.get_mut(name)
    }

    /// Get a type by dotted name, e.g. `java.lang.String` or `app.Outer.Inner`.
    pub fn get_by_name(&self, dotted: &str) -> Option<&TypeSymbol> {
        self.get(TypeHash::from_name(dotted))
    }

    pub fn contains_type(&self, name: &QualifiedName) -> bool {
        self.types.contains_key(name)
    }

    /// A top-level type of `package` with the given simple name.
    pub fn get_package_type(&self, package: &str, simple: &str) -> Option<&TypeSymbol> {
        self.types_by_package
            .get(package)
            .and_then(|types| types.get(simple))
            .and_then(|name| self.types.get(name))
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    /// Display name for a type hash: a registered type's dotted name, a
    /// primitive keyword, or the raw hash.
    pub fn type_name(&self, hash: TypeHash) -> String {
        if let Some(name) = self.type_hash_to_name.get(&hash) {
            return name.to_string();
        }
        [
            "void", "boolean", "byte", "short", "char", "int", "long", "float", "double",
        ]
        .into_iter()
        .find(|k| primitives::from_keyword(k) == Some(hash))
        .map(str::to_string)
        .unwrap_or_else(|| hash.to_string())
    }

    /// Types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ==========================================================================
    // Hierarchy
    // ==========================================================================

    /// `hash` followed by all its supertypes, breadth first: superclass chain
    /// and interfaces. Unknown supertypes and cycles are skipped.
    pub fn supertypes(&self, hash: TypeHash) -> Vec<&TypeSymbol> {
        let mut result: Vec<&TypeSymbol> = Vec::new();
        let mut seen = FxHashSet::default();
        let mut queue = std::collections::VecDeque::from([hash]);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(symbol) = self.get(current) else {
                continue;
            };
            result.push(symbol);
            queue.extend(symbol.superclass);
            queue.extend(symbol.interfaces.iter().copied());
        }

        // Interfaces implicitly inherit Object's members.
        if let Some(object) = self.get(primitives::OBJECT)
            && !seen.contains(&primitives::OBJECT)
        {
            result.push(object);
        }
        result
    }

    /// Whether `sub` is `sup` or inherits from it.
    pub fn is_subtype(&self, sub: TypeHash, sup: TypeHash) -> bool {
        sub == sup
            || sup == primitives::OBJECT
            || self.supertypes(sub).iter().any(|s| s.type_hash == sup)
    }

    /// Methods named `name` visible on `hash`, nearest declaration first.
    pub fn find_methods(&self, hash: TypeHash, name: &str) -> Vec<&MethodSymbol> {
        self.supertypes(hash)
            .into_iter()
            .flat_map(|symbol| symbol.methods().filter(move |m| m.name == name))
            .collect()
    }

    /// The field `name` visible on `hash`, searching supertypes.
    pub fn find_field(&self, hash: TypeHash, name: &str) -> Option<&FieldSymbol> {
        self.supertypes(hash)
            .into_iter()
            .find_map(|symbol| symbol.field(name))
    }

    /// Fail if any type's superclass chain loops back on itself.
    pub fn check_inheritance_cycles(&self) -> Result<(), RegistrationError> {
        for symbol in self.types() {
            let mut seen = FxHashSet::default();
            let mut current = Some(symbol.type_hash);
            while let Some(hash) = current {
                if !seen.insert(hash) {
                    return Err(RegistrationError::CyclicInheritance(symbol.name.to_string()));
                }
                current = self.get(hash).and_then(|s| s.superclass);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{MemberSymbol, MethodType, SymbolType, TypeKind};
    use javelin_core::{DataType, Flags};

    fn class(name: &str) -> TypeSymbol {
        TypeSymbol::new(QualifiedName::parse(name), TypeKind::Class, Flags::PUBLIC)
    }

    fn method(owner: &str, name: &str) -> MemberSymbol {
        MemberSymbol::Method(MethodSymbol::new(
            TypeHash::from_name(owner),
            name,
            Flags::PUBLIC,
            SymbolType::Method(MethodType::new(vec![], DataType::void())),
        ))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = SymbolRegistry::new();
        registry.register_type(class("app.model.User")).unwrap();

        let name = QualifiedName::parse("app.model.User");
        assert!(registry.contains_type(&name));
        assert!(registry.get_by_name("app.model.User").is_some());
        assert!(registry.get_package_type("app.model", "User").is_some());
        assert!(registry.has_package("app"));
        assert!(registry.has_package("app.model"));
        assert!(!registry.has_package("app.model.User"));
        assert_eq!(registry.type_name(name.to_type_hash()), "app.model.User");
        assert_eq!(registry.type_name(primitives::INT), "int");
    }

    #[test]
    fn duplicate_type_rejected() {
        let mut registry = SymbolRegistry::new();
        registry.register_type(class("a.A")).unwrap();
        assert_eq!(
            registry.register_type(class("a.A")),
            Err(RegistrationError::DuplicateType("a.A".into()))
        );
    }

    #[test]
    fn member_types_stay_out_of_package_index() {
        let mut registry = SymbolRegistry::new();
        registry.register_type(class("a.Outer")).unwrap();
        let mut inner = class("a.Outer.Inner");
        inner.outer = Some(TypeHash::from_name("a.Outer"));
        registry.register_type(inner).unwrap();

        assert!(registry.get_by_name("a.Outer.Inner").is_some());
        assert!(registry.get_package_type("a.Outer", "Inner").is_none());
        assert!(!registry.has_package("a.Outer"));
    }

    #[test]
    fn methods_found_through_supertypes() {
        let mut registry = SymbolRegistry::new();
        registry
            .register_type(class("java.lang.Object").with_member(method("java.lang.Object", "hashCode")))
            .unwrap();
        registry
            .register_type(
                TypeSymbol::new(QualifiedName::parse("a.I"), TypeKind::Interface, Flags::PUBLIC)
                    .with_member(method("a.I", "run")),
            )
            .unwrap();
        registry
            .register_type(
                class("a.Base")
                    .with_superclass(primitives::OBJECT)
                    .with_member(method("a.Base", "run")),
            )
            .unwrap();
        registry
            .register_type(
                class("a.Child")
                    .with_superclass(TypeHash::from_name("a.Base"))
                    .with_interface(TypeHash::from_name("a.I")),
            )
            .unwrap();

        let child = TypeHash::from_name("a.Child");
        let run = registry.find_methods(child, "run");
        assert_eq!(run.len(), 2);
        assert_eq!(run[0].owner, TypeHash::from_name("a.Base"));
        assert_eq!(registry.find_methods(child, "hashCode").len(), 1);
        assert_eq!(registry.find_methods(TypeHash::from_name("a.I"), "hashCode").len(), 1);
        assert!(registry.is_subtype(child, TypeHash::from_name("a.I")));
        assert!(!registry.is_subtype(TypeHash::from_name("a.Base"), child));
    }

    #[test]
    fn cycles_detected() {
        let mut registry = SymbolRegistry::new();
        registry
            .register_type(class("a.A").with_superclass(TypeHash::from_name("a.B")))
            .unwrap();
        registry
            .register_type(class("a.B").with_superclass(TypeHash::from_name("a.A")))
            .unwrap();
        assert!(matches!(
            registry.check_inheritance_cycles(),
            Err(RegistrationError::CyclicInheritance(_))
        ));
    }

    #[test]
    fn types_iterate_in_registration_order() {
        let mut registry = SymbolRegistry::new();
        for name in ["z.Z", "a.A", "m.M"] {
            registry.register_type(class(name)).unwrap();
        }
        let names: Vec<_> = registry.types().map(|t| t.name.to_string()).collect();
        assert_eq!(names, ["z.Z", "a.A", "m.M"]);
    }
}
