//! Matching a call site against the catalog.
//!
//! The engine never touches the tree. For each site it returns a
//! [`RewriteDecision`]; replacements carry freshly built callee and argument
//! nodes that the rewrite pass splices in later.
//!
//! A method matches a site when its name equals the called name, it is not
//! generic, and its first parameter type differs from the receiver's resolved
//! type. Extensions are tried in catalog order and methods in declaration
//! order; the first match wins.

use bumpalo::Bump;
use javelin_core::{DataType, Span};
use javelin_parser::ast::{CallId, Expr, FieldAccessExpr, Ident};
use tracing::trace;

use super::catalog::{Catalog, Extension};
use super::scanner::InvocationSite;
use crate::resolution::TypeResolver;

/// Why a site is left as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeepReason {
    /// `this(..)` or `super(..)`.
    ConstructorCall,
    /// The receiver has no resolvable type.
    UnresolvedReceiver,
    NoMatchingMethod,
}

/// The outcome for one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewriteDecision<'ast> {
    Keep(KeepReason),
    /// Replace the callee and arguments of call `call_id`.
    Replace {
        call_id: CallId,
        callee: &'ast Expr<'ast>,
        args: &'ast [&'ast Expr<'ast>],
    },
}

/// Resolved types of a site's receiver and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSignature {
    pub receiver: Option<DataType>,
    pub args: Vec<Option<DataType>>,
}

pub struct RewriteEngine<'e, 'ast> {
    arena: &'ast Bump,
    catalog: &'e Catalog,
}

impl<'e, 'ast> RewriteEngine<'e, 'ast> {
    pub fn new(arena: &'ast Bump, catalog: &'e Catalog) -> Self {
        Self { arena, catalog }
    }

    pub fn decide(
        &self,
        resolver: &mut dyn TypeResolver<'ast>,
        invocation: &InvocationSite<'ast>,
    ) -> RewriteDecision<'ast> {
        let call = invocation.call;
        let Some(name) = call.method_name() else {
            return RewriteDecision::Keep(KeepReason::NoMatchingMethod);
        };
        if name == "this" || name == "super" {
            return RewriteDecision::Keep(KeepReason::ConstructorCall);
        }

        // An unqualified call gets an explicit `this` receiver.
        let receiver: &'ast Expr<'ast> = match call.qualifier() {
            Some(qualifier) => qualifier,
            None => self.arena.alloc(Expr::This(call.callee.span())),
        };

        let site = &invocation.site;
        let signature = ResolvedSignature {
            receiver: resolver.resolve(site, receiver),
            args: call.args.iter().map(|arg| resolver.resolve(site, arg)).collect(),
        };
        trace!(method = name, call = call.id.0, ?signature, "resolved call site");

        let Some(receiver_ty) = signature.receiver else {
            return RewriteDecision::Keep(KeepReason::UnresolvedReceiver);
        };

        for extension in self.catalog.extensions() {
            for method in &extension.methods {
                if method.name != name {
                    continue;
                }
                let Some(method_type) = method.method_type() else {
                    continue;
                };
                if method_type.params.first() != Some(&receiver_ty) {
                    return RewriteDecision::Replace {
                        call_id: call.id,
                        callee: self.qualified_callee(extension, name, call.callee.span()),
                        args: self.prepend(receiver, call.args),
                    };
                }
            }
        }
        RewriteDecision::Keep(KeepReason::NoMatchingMethod)
    }

    /// `a.b.Provider.name` as a field-access chain.
    fn qualified_callee(&self, extension: &Extension, name: &str, span: Span) -> &'ast Expr<'ast> {
        let mut segments = extension.provider_name.segments();
        let first = segments.next().unwrap_or_default();
        let mut expr: &'ast Expr<'ast> = self.arena.alloc(Expr::Ident(self.ident(first, span)));
        for segment in segments.chain(std::iter::once(name)) {
            expr = self.arena.alloc(Expr::FieldAccess(self.arena.alloc(FieldAccessExpr {
                target: expr,
                name: self.ident(segment, span),
                span,
            })));
        }
        expr
    }

    fn ident(&self, name: &str, span: Span) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), span)
    }

    fn prepend(&self, receiver: &'ast Expr<'ast>, args: &'ast [&'ast Expr<'ast>]) -> &'ast [&'ast Expr<'ast>] {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(receiver);
        all.extend_from_slice(args);
        self.arena.alloc_slice_copy(&all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::Attribution;
    use crate::extension::catalog::{build_catalog, provider_refs};
    use crate::extension::scanner::scan;
    use crate::extension::test_support::Harness;
    use crate::resolution::Site;

    const PROVIDERS: &str = r#"
        package ext;

        public class StringExt {
            public static boolean isBlank(CharSequence s) { return false; }
            public static <T> T first(java.util.List<T> list) { return null; }
            public static String tag(Object o) { return ""; }
        }

        public class OtherExt {
            public static String tag(Object o) { return ""; }
            public static String tag(String s, int n) { return s; }
        }
    "#;

    /// Decisions for every site of the first type in `source`, with the
    /// receiver each site was decided against.
    fn decide_all<'ast>(
        arena: &'ast Bump,
        source: &str,
    ) -> Vec<(InvocationSite<'ast>, RewriteDecision<'ast>)> {
        let harness = Harness::new(arena, &[PROVIDERS, source]);
        let decl = harness.files[1].unit.types[0];
        let site = Site::new(1, harness.owner(1, decl));
        let mut resolver = Attribution::new(&harness.registry, &harness.files);
        let refs = provider_refs(&decl.modifiers.annotations[0]);
        let catalog = build_catalog(&harness.registry, &mut resolver, &site, &refs).unwrap();

        let engine = RewriteEngine::new(arena, &catalog);
        let mut sites = Vec::new();
        scan(decl, 1, site.owner, |found| sites.push(found));
        sites
            .into_iter()
            .map(|found| (found, engine.decide(&mut resolver, &found)))
            .collect()
    }

    fn keep_reasons(decisions: &[(InvocationSite<'_>, RewriteDecision<'_>)]) -> Vec<Option<KeepReason>> {
        decisions
            .iter()
            .map(|(_, decision)| match decision {
                RewriteDecision::Keep(reason) => Some(*reason),
                RewriteDecision::Replace { .. } => None,
            })
            .collect()
    }

    #[test]
    fn replaces_qualified_call_with_static_call() {
        let arena = Bump::new();
        let decisions = decide_all(
            &arena,
            r#"
            package app;
            import ext.StringExt;
            @ExtensionMethod(StringExt.class)
            class T {
                void m(String s) { if (s.isBlank()) {} }
            }
            "#,
        );
        let (site, decision) = &decisions[0];
        let RewriteDecision::Replace { call_id, callee, args } = decision else {
            panic!("expected a rewrite, got {decision:?}");
        };
        assert_eq!(*call_id, site.call.id);
        assert_eq!(callee.dotted_name().as_deref(), Some("ext.StringExt.isBlank"));
        assert_eq!(args.len(), site.call.args.len() + 1);
        assert!(std::ptr::eq(args[0], site.call.qualifier().unwrap()));
    }

    #[test]
    fn keeps_calls_without_a_match() {
        let arena = Bump::new();
        let decisions = decide_all(
            &arena,
            r#"
            package app;
            import ext.StringExt;
            import java.util.List;
            @ExtensionMethod(StringExt.class)
            class T {
                T() { this(1); }
                T(int i) { super(); }
                void m(String s, CharSequence cs, List<String> list) {
                    s.equals("");
                    cs.isBlank();
                    list.first();
                    unknown.isBlank();
                }
            }
            "#,
        );
        assert_eq!(
            keep_reasons(&decisions),
            [
                Some(KeepReason::ConstructorCall),
                Some(KeepReason::ConstructorCall),
                Some(KeepReason::NoMatchingMethod),
                Some(KeepReason::NoMatchingMethod),
                Some(KeepReason::NoMatchingMethod),
                Some(KeepReason::UnresolvedReceiver),
            ]
        );
    }

    #[test]
    fn unqualified_calls_receive_this() {
        let arena = Bump::new();
        let decisions = decide_all(
            &arena,
            r#"
            package app;
            import ext.*;
            @ExtensionMethod(StringExt.class)
            class T {
                void m() { tag(); }
            }
            "#,
        );
        let RewriteDecision::Replace { callee, args, .. } = decisions[0].1 else {
            panic!("expected a rewrite");
        };
        assert_eq!(callee.dotted_name().as_deref(), Some("ext.StringExt.tag"));
        assert!(matches!(args, [Expr::This(_)]));
    }

    #[test]
    fn first_provider_in_catalog_order_wins() {
        let arena = Bump::new();
        let source = |order: &str| {
            format!(
                "package app;\nimport ext.*;\n@ExtensionMethod({{{order}}})\nclass T {{ void m(String s) {{ s.tag(); s.tag(1); }} }}"
            )
        };

        for (order, provider) in [
            ("OtherExt.class, StringExt.class", "ext.OtherExt.tag"),
            ("StringExt.class, OtherExt.class", "ext.StringExt.tag"),
        ] {
            let decisions = decide_all(&arena, &source(order));
            let RewriteDecision::Replace { callee, .. } = decisions[0].1 else {
                panic!("expected a rewrite");
            };
            assert_eq!(callee.dotted_name().as_deref(), Some(provider));

            // Matching ignores arity: the first `tag` wins here too.
            let RewriteDecision::Replace { callee, args, .. } = decisions[1].1 else {
                panic!("expected a rewrite");
            };
            assert_eq!(callee.dotted_name().as_deref(), Some(provider));
            assert_eq!(args.len(), 2);
        }
    }

    #[test]
    fn decisions_are_deterministic() {
        let source = r#"
            package app;
            import ext.*;
            @ExtensionMethod({OtherExt.class, StringExt.class})
            class T { void m(String s) { s.tag(); s.isBlank(); s.trim(); } }
        "#;
        let render = || {
            let arena = Bump::new();
            decide_all(&arena, source)
                .iter()
                .map(|(_, decision)| match decision {
                    RewriteDecision::Keep(reason) => format!("{reason:?}"),
                    RewriteDecision::Replace { callee, .. } => callee.dotted_name().unwrap_or_default(),
                })
                .collect::<Vec<_>>()
        };
        let first = render();
        assert_eq!(first, ["ext.OtherExt.tag", "ext.StringExt.isBlank", "NoMatchingMethod"]);
        for _ in 0..5 {
            assert_eq!(render(), first);
        }
    }
}
