//! The `@ExtensionMethod` annotation handler.
//!
//! One call to [`AnnotationHandler::handle`] processes one annotation
//! application:
//!
//! 1. the annotated type must be a class or enum
//! 2. the provider list must not be empty
//! 3. an empty catalog ends processing quietly
//! 4. every candidate site is decided, then all replacements are applied in
//!    one rebuild
//!
//! Usage errors are reported against the annotation and leave the
//! declaration as written. Otherwise the processed annotation is removed
//! from the returned declaration.

use bumpalo::Bump;
use javelin_core::{DiagnosticSink, ExtensionError, TypeHash};
use javelin_parser::ast::{Annotation, TypeDecl};
use javelin_registry::SymbolRegistry;
use tracing::debug;

use super::catalog::{build_catalog, provider_refs, validate_target};
use super::config::ExtensionConfig;
use super::engine::{KeepReason, RewriteDecision, RewriteEngine};
use super::rewrite::apply_decisions;
use super::scanner::scan;
use crate::resolution::{Site, TypeResolver};

/// Everything a handler may use while processing one annotated type.
pub struct HandlerContext<'h, 'ast> {
    /// Arena for replacement nodes.
    pub arena: &'ast Bump,
    pub registry: &'h SymbolRegistry,
    pub resolver: &'h mut dyn TypeResolver<'ast>,
    pub diagnostics: &'h mut dyn DiagnosticSink,
    /// Index of the file containing the annotated type.
    pub file: usize,
    /// The annotated type.
    pub owner: TypeHash,
}

/// What a handler did with one annotated type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleOutcome<'ast> {
    /// Sites were scanned and decided; `decl` carries the replacements.
    Rewritten {
        decl: &'ast TypeDecl<'ast>,
        report: RewriteReport,
    },
    /// No provider had an eligible method.
    NothingToDo { decl: &'ast TypeDecl<'ast> },
    /// Reported to the diagnostics sink; the declaration is unchanged.
    UsageError(ExtensionError),
}

impl<'ast> HandleOutcome<'ast> {
    /// The declaration to continue with, if the handler produced one.
    pub fn decl(&self) -> Option<&'ast TypeDecl<'ast>> {
        match *self {
            HandleOutcome::Rewritten { decl, .. } | HandleOutcome::NothingToDo { decl } => Some(decl),
            HandleOutcome::UsageError(_) => None,
        }
    }
}

/// Per-application counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub sites: usize,
    pub rewrites: usize,
    pub constructor_calls: usize,
    pub unresolved_receivers: usize,
    pub unmatched: usize,
}

impl RewriteReport {
    fn record(&mut self, decision: &RewriteDecision<'_>) {
        self.sites += 1;
        match decision {
            RewriteDecision::Replace { .. } => self.rewrites += 1,
            RewriteDecision::Keep(reason) => *self.kept_mut(*reason) += 1,
        }
    }

    fn kept_mut(&mut self, reason: KeepReason) -> &mut usize {
        match reason {
            KeepReason::ConstructorCall => &mut self.constructor_calls,
            KeepReason::UnresolvedReceiver => &mut self.unresolved_receivers,
            KeepReason::NoMatchingMethod => &mut self.unmatched,
        }
    }

    /// Sites left as written for `reason`.
    pub fn kept(&self, reason: KeepReason) -> usize {
        match reason {
            KeepReason::ConstructorCall => self.constructor_calls,
            KeepReason::UnresolvedReceiver => self.unresolved_receivers,
            KeepReason::NoMatchingMethod => self.unmatched,
        }
    }
}

/// A compile-time transform triggered by an annotation on a type.
pub trait AnnotationHandler {
    fn annotation_matches(&self, annotation: &Annotation<'_>) -> bool;

    /// Whether the handler needs resolved types, and so must run after
    /// registration.
    fn is_resolution_based(&self) -> bool {
        false
    }

    fn handle<'ast>(
        &self,
        cx: &mut HandlerContext<'_, 'ast>,
        decl: &'ast TypeDecl<'ast>,
        annotation: &'ast Annotation<'ast>,
    ) -> HandleOutcome<'ast>;
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionMethodHandler {
    config: ExtensionConfig,
}

impl ExtensionMethodHandler {
    pub fn new(config: ExtensionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    fn usage_error<'ast>(
        cx: &mut HandlerContext<'_, 'ast>,
        annotation: &Annotation<'_>,
        error: ExtensionError,
    ) -> HandleOutcome<'ast> {
        cx.diagnostics.add_error(annotation.span, error.to_string());
        HandleOutcome::UsageError(error)
    }
}

impl AnnotationHandler for ExtensionMethodHandler {
    fn annotation_matches(&self, annotation: &Annotation<'_>) -> bool {
        self.config.matches(annotation)
    }

    fn is_resolution_based(&self) -> bool {
        true
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn handle<'ast>(
        &self,
        cx: &mut HandlerContext<'_, 'ast>,
        decl: &'ast TypeDecl<'ast>,
        annotation: &'ast Annotation<'ast>,
    ) -> HandleOutcome<'ast> {
        let type_name = decl.name.name;
        if let Err(error) = validate_target(decl.kind) {
            debug!(type_name, kind = decl.kind.keyword(), "extension target rejected");
            return Self::usage_error(cx, annotation, error);
        }

        let site = Site::new(cx.file, cx.owner);
        let refs = provider_refs(annotation);
        let catalog = match build_catalog(cx.registry, &mut *cx.resolver, &site, &refs) {
            Ok(catalog) => catalog,
            Err(error) => return Self::usage_error(cx, annotation, error),
        };
        if catalog.is_empty() {
            debug!(type_name, providers = refs.len(), "no eligible extension methods");
            let (decl, _) = apply_decisions(cx.arena, decl, &[], Some(annotation));
            return HandleOutcome::NothingToDo { decl };
        }

        // Sites are collected before any is decided: deciding may attribute
        // whole members, the scan only reads syntax.
        let mut sites = Vec::new();
        scan(decl, cx.file, cx.owner, |found| sites.push(found));

        let engine = RewriteEngine::new(cx.arena, &catalog);
        let mut report = RewriteReport::default();
        let decisions: Vec<RewriteDecision<'ast>> = sites
            .iter()
            .map(|found| {
                let decision = engine.decide(&mut *cx.resolver, found);
                report.record(&decision);
                decision
            })
            .collect();

        let (decl, applied) = apply_decisions(cx.arena, decl, &decisions, Some(annotation));
        debug!(
            type_name,
            extensions = catalog.extensions().count(),
            sites = report.sites,
            rewrites = applied,
            "extension methods applied"
        );
        HandleOutcome::Rewritten { decl, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::Attribution;
    use crate::extension::test_support::Harness;
    use javelin_core::Diagnostics;
    use javelin_parser::ast::{Expr, Stmt};

    const PROVIDERS: &str = r#"
        package ext;

        public class StringExt {
            public static boolean isBlank(CharSequence s) { return false; }
        }

        public interface Interface1 {
            static boolean isBlank(CharSequence s) { return true; }
        }

        public class Nothing {
            public static void noArgs() {}
        }
    "#;

    fn run<'ast>(arena: &'ast Bump, source: &str) -> (HandleOutcome<'ast>, Diagnostics, &'ast TypeDecl<'ast>) {
        let harness = Harness::new(arena, &[PROVIDERS, source]);
        let decl = harness.files[1].unit.types[0];
        let handler = ExtensionMethodHandler::default();
        let annotation = handler.config().find(&decl.modifiers).unwrap();

        let mut resolver = Attribution::new(&harness.registry, &harness.files);
        let mut diagnostics = Diagnostics::new();
        let mut cx = HandlerContext {
            arena,
            registry: &harness.registry,
            resolver: &mut resolver,
            diagnostics: &mut diagnostics,
            file: 1,
            owner: harness.owner(1, decl),
        };
        let outcome = handler.handle(&mut cx, decl, annotation);
        (outcome, diagnostics, decl)
    }

    fn first_condition<'ast>(decl: &'ast TypeDecl<'ast>) -> &'ast Expr<'ast> {
        let method = decl.methods().next().unwrap();
        match &method.body.as_ref().unwrap().stmts[0] {
            Stmt::If(s) => s.condition,
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn rewrites_is_blank_and_strips_the_annotation() {
        let arena = Bump::new();
        let (outcome, diagnostics, original) = run(
            &arena,
            r#"
            package app;
            import ext.StringExt;
            @ExtensionMethod(StringExt.class)
            class T {
                void m(String s) {
                    if (s.isBlank()) {}
                    s.equals("");
                }
            }
            "#,
        );
        assert!(diagnostics.is_empty());
        let HandleOutcome::Rewritten { decl, report } = outcome else {
            panic!("expected a rewrite, got {outcome:?}");
        };
        assert_eq!(report.sites, 2);
        assert_eq!(report.rewrites, 1);
        assert_eq!(report.kept(KeepReason::NoMatchingMethod), 1);
        assert!(decl.modifiers.annotations.is_empty());

        let call = first_condition(decl).as_call().unwrap();
        assert_eq!(call.callee.dotted_name().as_deref(), Some("ext.StringExt.isBlank"));
        assert_eq!(call.args[0].dotted_name().as_deref(), Some("s"));
        assert_eq!(
            first_condition(original).as_call().unwrap().callee.dotted_name().as_deref(),
            Some("s.isBlank")
        );
    }

    #[test]
    fn interface_target_is_a_usage_error() {
        let arena = Bump::new();
        for kind in ["interface", "@interface"] {
            let source = format!("package app;\nimport ext.*;\n@ExtensionMethod(StringExt.class)\n{kind} T {{}}");
            let (outcome, diagnostics, _) = run(&arena, &source);
            assert_eq!(outcome, HandleOutcome::UsageError(ExtensionError::NotClassOrEnum));
            let errors: Vec<_> = diagnostics.errors().map(|d| d.message.as_str()).collect();
            assert_eq!(errors, ["@ExtensionMethod can be used on classes and enums only"]);
        }
    }

    #[test]
    fn empty_provider_list_is_a_usage_error() {
        let arena = Bump::new();
        let (outcome, diagnostics, _) = run(
            &arena,
            "package app;\n@ExtensionMethod({})\nclass T { void m(String s) { s.isBlank(); } }",
        );
        assert_eq!(outcome, HandleOutcome::UsageError(ExtensionError::NoExtensionTypes));
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(
            diagnostics.errors().next().unwrap().message,
            "@ExtensionMethod has no effect since no extension types were specified."
        );
    }

    #[test]
    fn rejected_providers_are_silent() {
        let arena = Bump::new();
        let (outcome, diagnostics, _) = run(
            &arena,
            r#"
            package app;
            import ext.*;
            @ExtensionMethod({Interface1.class, StringExt.class})
            enum T {
                A;
                boolean m(String s) { return s.isBlank(); }
            }
            "#,
        );
        assert!(diagnostics.is_empty());
        let HandleOutcome::Rewritten { report, .. } = outcome else {
            panic!("expected a rewrite, got {outcome:?}");
        };
        assert_eq!(report.rewrites, 1);
    }

    #[test]
    fn empty_catalog_strips_without_scanning() {
        let arena = Bump::new();
        let (outcome, diagnostics, original) = run(
            &arena,
            "package app;\nimport ext.*;\n@Deprecated @ExtensionMethod({Interface1.class, Nothing.class})\nclass T { void m(String s) { if (s.isBlank()) {} } }",
        );
        assert!(diagnostics.is_empty());
        let HandleOutcome::NothingToDo { decl } = outcome else {
            panic!("expected nothing to do, got {outcome:?}");
        };
        assert_eq!(decl.modifiers.annotations.len(), 1);
        assert!(std::ptr::eq(decl.members, original.members));
    }

    #[test]
    fn handler_is_resolution_based() {
        assert!(ExtensionMethodHandler::default().is_resolution_based());
    }
}
