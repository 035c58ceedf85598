//! Extension catalog: validated providers and their eligible methods.
//!
//! Every provider reference gets a [`ProviderOutcome`], so callers can see why
//! a provider contributed nothing. Rejected and unresolved providers are
//! silent: they never produce a diagnostic.

use javelin_core::{ExtensionError, QualifiedName, Span, TypeHash};
use javelin_parser::ast::{self, Annotation, ElementValue, Expr};
use javelin_registry::{MemberSymbol, MethodSymbol, SymbolRegistry, TypeKind, TypeSymbol};
use tracing::debug;

use crate::resolution::{Site, TypeResolver};

/// One accepted provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub provider: TypeHash,
    /// Used to build the qualified callee of a rewritten call.
    pub provider_name: QualifiedName,
    /// Eligible methods in declaration order.
    pub methods: Vec<MethodSymbol>,
}

/// What became of one provider reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Accepted(Extension),
    /// Resolved to an interface or annotation type.
    RejectedKind { name: QualifiedName, kind: TypeKind },
    /// The class literal names no known class or enum.
    UnresolvedType { span: Span },
    /// Not a class literal at all.
    NotClassLiteral { span: Span },
}

/// Provider outcomes in annotation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub outcomes: Vec<ProviderOutcome>,
}

impl Catalog {
    /// Accepted providers in annotation order.
    pub fn extensions(&self) -> impl Iterator<Item = &Extension> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ProviderOutcome::Accepted(extension) => Some(extension),
            _ => None,
        })
    }

    pub fn method_count(&self) -> usize {
        self.extensions().map(|e| e.methods.len()).sum()
    }

    /// True when no accepted provider has an eligible method.
    pub fn is_empty(&self) -> bool {
        self.method_count() == 0
    }
}

/// The transform applies to classes and enums only.
pub fn validate_target(kind: ast::TypeKind) -> Result<(), ExtensionError> {
    match kind {
        ast::TypeKind::Class | ast::TypeKind::Enum => Ok(()),
        ast::TypeKind::Interface | ast::TypeKind::Annotation => Err(ExtensionError::NotClassOrEnum),
    }
}

/// The provider expressions of the annotation's `value` element, with `{..}`
/// arrays flattened.
pub fn provider_refs<'ast>(annotation: &'ast Annotation<'ast>) -> Vec<&'ast ElementValue<'ast>> {
    annotation
        .element("value")
        .map(ElementValue::flatten)
        .unwrap_or_default()
}

/// Build the catalog for one annotation application.
///
/// An empty reference list is a usage error. Otherwise every reference is
/// classified; the caller decides what an empty catalog means.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_catalog<'ast>(
    registry: &SymbolRegistry,
    resolver: &mut dyn TypeResolver<'ast>,
    site: &Site<'ast>,
    refs: &[&'ast ElementValue<'ast>],
) -> Result<Catalog, ExtensionError> {
    if refs.is_empty() {
        return Err(ExtensionError::NoExtensionTypes);
    }

    let outcomes = refs
        .iter()
        .map(|value| classify(registry, resolver, site, value))
        .collect();
    Ok(Catalog { outcomes })
}

fn classify<'ast>(
    registry: &SymbolRegistry,
    resolver: &mut dyn TypeResolver<'ast>,
    site: &Site<'ast>,
    value: &'ast ElementValue<'ast>,
) -> ProviderOutcome {
    let ElementValue::Expr(expr) = value else {
        return ProviderOutcome::NotClassLiteral { span: value.span() };
    };
    let Expr::ClassLit(literal) = expr.unparenthesized() else {
        return ProviderOutcome::NotClassLiteral { span: expr.span() };
    };
    let Some(symbol) = resolver
        .resolve_type(site, &literal.ty)
        .and_then(|hash| registry.get(hash))
    else {
        debug!(span = %literal.span, "extension provider did not resolve");
        return ProviderOutcome::UnresolvedType { span: literal.span };
    };

    match symbol.kind {
        TypeKind::Interface | TypeKind::Annotation => {
            debug!(provider = %symbol.name, kind = ?symbol.kind, "extension provider rejected");
            ProviderOutcome::RejectedKind {
                name: symbol.name.clone(),
                kind: symbol.kind,
            }
        }
        TypeKind::Class | TypeKind::Enum => {
            let methods = eligible_methods(symbol);
            debug!(provider = %symbol.name, methods = methods.len(), "extension provider accepted");
            ProviderOutcome::Accepted(Extension {
                provider: symbol.type_hash,
                provider_name: symbol.name.clone(),
                methods,
            })
        }
    }
}

/// Methods usable as extensions: public, static, at least one parameter.
/// Constructors and fields never qualify.
pub fn eligible_methods(symbol: &TypeSymbol) -> Vec<MethodSymbol> {
    symbol
        .members
        .iter()
        .filter_map(|member| match member {
            MemberSymbol::Method(method)
                if method.is_static() && method.is_public() && !method.signature().params.is_empty() =>
            {
                Some(method.clone())
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::Attribution;
    use crate::extension::test_support::Harness;
    use bumpalo::Bump;

    const PROVIDERS: &str = r#"
        package ext;

        public class StringExt {
            public static boolean isBlank(CharSequence s) { return false; }
            static boolean hidden(String s) { return false; }
            public boolean instance(String s) { return false; }
            public static int noArgs() { return 0; }
            public static <T> T first(java.util.List<T> list) { return null; }
            public StringExt() {}
            public static final String NAME = "ext";
        }

        interface Interface1 {
            static boolean isEmpty(String s) { return true; }
        }

        @interface Marker {}

        enum EnumExt {
            INSTANCE;
            public static String shout(String s) { return s; }
        }

        class Empty {}
    "#;

    fn catalog_for(target: &str) -> Result<Catalog, ExtensionError> {
        let arena = Bump::new();
        let source = format!("package app;\nimport ext.*;\n{target}\nclass T {{}}");
        let harness = Harness::new(&arena, &[PROVIDERS, &source]);
        let decl = harness.decl(1, "T");
        let annotation = &decl.modifiers.annotations[0];
        let site = Site::new(1, harness.owner(1, decl));
        let mut resolver = Attribution::new(&harness.registry, &harness.files);
        build_catalog(&harness.registry, &mut resolver, &site, &provider_refs(annotation))
    }

    #[test]
    fn filter_keeps_public_static_methods_with_parameters() {
        let catalog = catalog_for("@ExtensionMethod(StringExt.class)").unwrap();
        let extension = catalog.extensions().next().unwrap();
        assert_eq!(extension.provider_name.to_string(), "ext.StringExt");

        let names: Vec<&str> = extension.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["isBlank", "first"]);
        assert_eq!(catalog.method_count(), 2);
    }

    #[test]
    fn filter_is_stable_across_calls() {
        let arena = Bump::new();
        let harness = Harness::new(&arena, &[PROVIDERS]);
        let symbol = harness.registry.get_by_name("ext.StringExt").unwrap();
        assert_eq!(eligible_methods(symbol), eligible_methods(symbol));
    }

    #[test]
    fn interfaces_are_dropped_silently() {
        let catalog = catalog_for("@ExtensionMethod({Interface1.class, EnumExt.class})").unwrap();
        assert!(matches!(
            &catalog.outcomes[0],
            ProviderOutcome::RejectedKind { kind: TypeKind::Interface, .. }
        ));
        let accepted: Vec<String> = catalog.extensions().map(|e| e.provider_name.to_string()).collect();
        assert_eq!(accepted, ["ext.EnumExt"]);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn annotation_types_and_unknown_names() {
        let catalog =
            catalog_for("@ExtensionMethod(value = {Marker.class, Missing.class, int.class, \"x\"})").unwrap();
        assert!(matches!(
            &catalog.outcomes[0],
            ProviderOutcome::RejectedKind { kind: TypeKind::Annotation, .. }
        ));
        assert!(matches!(&catalog.outcomes[1], ProviderOutcome::UnresolvedType { .. }));
        assert!(matches!(&catalog.outcomes[2], ProviderOutcome::UnresolvedType { .. }));
        assert!(matches!(&catalog.outcomes[3], ProviderOutcome::NotClassLiteral { .. }));
        assert!(catalog.is_empty());
    }

    #[test]
    fn providers_without_eligible_methods_leave_the_catalog_empty() {
        let catalog = catalog_for("@ExtensionMethod(Empty.class)").unwrap();
        assert_eq!(catalog.extensions().count(), 1);
        assert!(catalog.is_empty());
    }

    #[test]
    fn no_providers_is_a_usage_error() {
        for target in ["@ExtensionMethod", "@ExtensionMethod()", "@ExtensionMethod({})"] {
            assert_eq!(catalog_for(target), Err(ExtensionError::NoExtensionTypes), "{target}");
        }
    }

    #[test]
    fn only_classes_and_enums_are_valid_targets() {
        assert!(validate_target(ast::TypeKind::Class).is_ok());
        assert!(validate_target(ast::TypeKind::Enum).is_ok());
        assert_eq!(validate_target(ast::TypeKind::Interface), Err(ExtensionError::NotClassOrEnum));
        assert_eq!(validate_target(ast::TypeKind::Annotation), Err(ExtensionError::NotClassOrEnum));
    }
}
