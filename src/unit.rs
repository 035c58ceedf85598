//! Compilation unit API.
//!
//! Users add source files to a [`Unit`] and build it. Building parses every
//! source, registers the declared types, runs the installed annotation
//! handlers over every annotated type and returns the transformed sources
//! together with the diagnostics the handlers reported.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin::{ApplicationOutcome, Context};
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(Context::new());
//! let mut unit = ctx.create_unit();
//!
//! unit.add_source("Strings.java", r#"
//!     package util;
//!     public class Strings {
//!         public static boolean isBlank(CharSequence s) { return s.length() == 0; }
//!     }
//! "#).unwrap();
//!
//! unit.add_source("Main.java", r#"
//!     import util.Strings;
//!     @ExtensionMethod(Strings.class)
//!     class Main {
//!         boolean check(String s) { return s.isBlank(); }
//!     }
//! "#).unwrap();
//!
//! let arena = Bump::new();
//! let output = unit.build(&arena).unwrap();
//!
//! assert!(output.is_success());
//! assert!(matches!(
//!     output.applications[0].outcome,
//!     ApplicationOutcome::Rewritten(report) if report.rewrites == 1
//! ));
//! ```

use std::ptr;
use std::sync::Arc;

use bumpalo::Bump;
use javelin_compiler::{
    Attribution, HandleOutcome, HandlerContext, PreludeError, RegistrationPass, RewriteReport,
    SourceFile, register_prelude,
};
use javelin_core::{
    DiagnosticSink, Diagnostics, ExtensionError, ParseErrors, QualifiedName, RegistrationError,
};
use javelin_parser::Parser;
use javelin_parser::ast::{CompilationUnit, Member, TypeDecl};
use javelin_registry::SymbolRegistry;
use thiserror::Error;
use tracing::debug;

use crate::context::Context;

/// A set of source files built together.
///
/// 1. Create a unit with `Context::create_unit()` or `Unit::new()`
/// 2. Add source files with `add_source()`
/// 3. Build it into an arena with `build()`
///
/// The transformed trees live in the arena passed to `build`, so they can
/// outlive the unit itself.
#[derive(Debug)]
pub struct Unit {
    context: Arc<Context>,
    /// File name and source text, in the order they were added.
    sources: Vec<(String, String)>,
    is_built: bool,
}

impl Default for Unit {
    fn default() -> Self {
        Self::new()
    }
}

impl Unit {
    /// A unit using a default [`Context`].
    pub fn new() -> Self {
        Self::with_context(Arc::new(Context::new()))
    }

    pub fn with_context(context: Arc<Context>) -> Self {
        Self {
            context,
            sources: Vec::new(),
            is_built: false,
        }
    }

    /// Add a source file.
    ///
    /// # Errors
    ///
    /// Fails if the unit has already been built or a file of the same name
    /// was already added.
    pub fn add_source(
        &mut self,
        filename: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), UnitError> {
        if self.is_built {
            return Err(UnitError::AlreadyBuilt);
        }

        let filename = filename.into();
        if self.sources.iter().any(|(name, _)| *name == filename) {
            return Err(UnitError::DuplicateSource(filename));
        }
        self.sources.push((filename, source.into()));
        Ok(())
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_built(&self) -> bool {
        self.is_built
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Drop all sources so the unit can be reused.
    pub fn clear(&mut self) {
        self.sources.clear();
        self.is_built = false;
    }

    /// Parse, register and transform every source.
    ///
    /// Handlers run on each annotated type in pre-order: an outer type is
    /// handled before the types nested in it. Misuse of an annotation is
    /// reported in [`BuildOutput::diagnostics`] and does not fail the build.
    ///
    /// # Errors
    ///
    /// Fails when there is nothing to build, on parse errors (unless the
    /// context parses leniently) and when the declarations cannot form a
    /// symbol table.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build<'ast>(&mut self, arena: &'ast Bump) -> Result<BuildOutput<'ast>, BuildError> {
        if self.is_built {
            return Err(BuildError::AlreadyBuilt);
        }
        if self.sources.is_empty() {
            return Err(BuildError::NoSources);
        }

        let mut diagnostics = Diagnostics::new();
        let files = self.parse_sources(arena, &mut diagnostics)?;

        let mut registry = SymbolRegistry::new();
        if self.context.needs_resolution() {
            let load_prelude = self.context.config().load_prelude;
            register_sources(arena, &mut registry, &files, load_prelude, &mut diagnostics)?;
        }

        let mut applications = Vec::new();
        let mut transformed = Vec::with_capacity(files.len());
        {
            let mut processor = Processor {
                arena,
                context: &self.context,
                registry: &registry,
                files: &files,
                diagnostics: &mut diagnostics,
                applications: &mut applications,
            };

            for (index, file) in files.iter().enumerate() {
                processor.diagnostics.set_source(Some(file.name.clone()));
                let types: Vec<&'ast TypeDecl<'ast>> = file
                    .unit
                    .types
                    .iter()
                    .map(|&decl| {
                        let name = QualifiedName::new(file.scope.package(), decl.name.name);
                        processor.process(index, decl, name)
                    })
                    .collect();

                let changed = types.iter().zip(file.unit.types).any(|(a, b)| !ptr::eq(*a, *b));
                let unit = if changed {
                    CompilationUnit {
                        types: arena.alloc_slice_copy(&types),
                        ..file.unit
                    }
                } else {
                    file.unit
                };
                transformed.push(SourceFile {
                    name: file.name.clone(),
                    unit,
                    scope: file.scope.clone(),
                });
            }
            processor.diagnostics.set_source(None);
        }

        debug!(
            files = transformed.len(),
            applications = applications.len(),
            errors = diagnostics.error_count(),
            "unit built"
        );

        self.is_built = true;
        Ok(BuildOutput {
            files: transformed,
            diagnostics,
            applications,
            registry,
        })
    }

    fn parse_sources<'ast>(
        &self,
        arena: &'ast Bump,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<SourceFile<'ast>>, BuildError> {
        let lenient = self.context.config().lenient_parsing;
        let mut files = Vec::with_capacity(self.sources.len());
        let mut failed = Vec::new();
        // Call ids stay distinct across files sharing the arena.
        let mut next_call_id = 0;

        for (name, source) in &self.sources {
            let mut parser = Parser::new(source, arena).with_call_ids_from(next_call_id);
            let unit = parser.parse_compilation_unit();
            next_call_id = parser.next_call_id();

            let errors = parser.take_errors();
            if !errors.is_empty() {
                debug!(file = %name, errors = errors.len(), lenient, "parse errors");
                if lenient {
                    diagnostics.set_source(Some(name.clone()));
                    for error in &errors {
                        diagnostics.add_error(error.span, error.message.clone());
                    }
                } else {
                    failed.push((name.clone(), errors));
                }
            }
            files.push(SourceFile::new(name.as_str(), unit));
        }
        diagnostics.set_source(None);

        if !failed.is_empty() {
            return Err(BuildError::ParseErrors(failed));
        }
        Ok(files)
    }
}

/// Enter the prelude and the user declarations into `registry`. Unresolved
/// signature types become warnings.
fn register_sources(
    arena: &Bump,
    registry: &mut SymbolRegistry,
    files: &[SourceFile<'_>],
    load_prelude: bool,
    diagnostics: &mut Diagnostics,
) -> Result<(), BuildError> {
    if load_prelude {
        register_prelude(arena, registry)?;
    }

    let output = RegistrationPass::new(registry).run(files);
    if !output.is_success() {
        return Err(BuildError::Registration(output.errors));
    }
    debug!(
        types = output.types_registered,
        members = output.members_registered,
        warnings = output.warnings.len(),
        "sources registered"
    );

    for (file, span, warning) in output.warnings {
        diagnostics.set_source(files.get(file).map(|f| f.name.clone()));
        diagnostics.add_warning(span, warning.to_string());
    }
    diagnostics.set_source(None);
    Ok(())
}

/// Runs the handlers over one type and the member types nested in it.
struct Processor<'b, 'ast> {
    arena: &'ast Bump,
    context: &'b Context,
    registry: &'b SymbolRegistry,
    files: &'b [SourceFile<'ast>],
    diagnostics: &'b mut Diagnostics,
    applications: &'b mut Vec<Application>,
}

impl<'b, 'ast> Processor<'b, 'ast> {
    fn process(
        &mut self,
        file: usize,
        decl: &'ast TypeDecl<'ast>,
        name: QualifiedName,
    ) -> &'ast TypeDecl<'ast> {
        let owner = name.to_type_hash();
        let context = self.context;
        let mut decl = decl;

        for handler in context.handlers() {
            let Some(annotation) = decl
                .modifiers
                .annotations
                .iter()
                .find(|a| handler.annotation_matches(a))
            else {
                continue;
            };

            // Each application gets its own attribution cache.
            let mut attribution = Attribution::new(self.registry, self.files);
            let outcome = {
                let mut cx = HandlerContext {
                    arena: self.arena,
                    registry: self.registry,
                    resolver: &mut attribution,
                    diagnostics: &mut *self.diagnostics,
                    file,
                    owner,
                };
                handler.handle(&mut cx, decl, annotation)
            };

            self.applications.push(Application {
                file,
                type_name: name.clone(),
                outcome: ApplicationOutcome::from(&outcome),
                attribution_passes: attribution.pass_count(),
            });
            if let Some(rewritten) = outcome.decl() {
                decl = rewritten;
            }
        }

        let mut members: Option<Vec<Member<'ast>>> = None;
        for (index, member) in decl.members.iter().enumerate() {
            let Member::Type(nested) = *member else {
                continue;
            };
            let processed = self.process(file, nested, name.nested(nested.name.name));
            if !ptr::eq(processed, nested) {
                members.get_or_insert_with(|| decl.members.to_vec())[index] = Member::Type(processed);
            }
        }

        match members {
            Some(members) => &*self.arena.alloc(TypeDecl {
                members: self.arena.alloc_slice_copy(&members),
                ..*decl
            }),
            None => decl,
        }
    }
}

/// The result of a successful build.
#[derive(Debug)]
pub struct BuildOutput<'ast> {
    /// The sources after every handler ran, in the order they were added.
    pub files: Vec<SourceFile<'ast>>,
    pub diagnostics: Diagnostics,
    /// One entry per handled annotation, in processing order.
    pub applications: Vec<Application>,
    pub registry: SymbolRegistry,
}

impl<'ast> BuildOutput<'ast> {
    /// Whether no errors were reported.
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn file(&self, name: &str) -> Option<&SourceFile<'ast>> {
        self.files.iter().find(|f| f.name == name)
    }

    /// A transformed type by qualified name, e.g. `app.Outer.Inner`.
    pub fn find_type(&self, dotted: &str) -> Option<&'ast TypeDecl<'ast>> {
        self.files.iter().find_map(|file| {
            file.unit.types.iter().find_map(|&decl| {
                find_in(decl, QualifiedName::new(file.scope.package(), decl.name.name), dotted)
            })
        })
    }

    /// Applications on the type named `dotted`.
    pub fn applications_on<'s>(&'s self, dotted: &'s str) -> impl Iterator<Item = &'s Application> {
        self.applications
            .iter()
            .filter(move |a| a.type_name.to_string() == dotted)
    }
}

fn find_in<'ast>(
    decl: &'ast TypeDecl<'ast>,
    name: QualifiedName,
    dotted: &str,
) -> Option<&'ast TypeDecl<'ast>> {
    if name.to_string() == dotted {
        return Some(decl);
    }
    decl.nested_types()
        .find_map(|nested| find_in(nested, name.nested(nested.name.name), dotted))
}

/// One annotation handled on one type.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub file: usize,
    pub type_name: QualifiedName,
    pub outcome: ApplicationOutcome,
    /// Members attributed while handling this application.
    pub attribution_passes: usize,
}

/// [`HandleOutcome`] without the rebuilt declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationOutcome {
    Rewritten(RewriteReport),
    NothingToDo,
    UsageError(ExtensionError),
}

impl From<&HandleOutcome<'_>> for ApplicationOutcome {
    fn from(outcome: &HandleOutcome<'_>) -> Self {
        match *outcome {
            HandleOutcome::Rewritten { report, .. } => ApplicationOutcome::Rewritten(report),
            HandleOutcome::NothingToDo { .. } => ApplicationOutcome::NothingToDo,
            HandleOutcome::UsageError(error) => ApplicationOutcome::UsageError(error),
        }
    }
}

/// Errors that can occur when adding sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unit has already been built; call clear() to reuse it")]
    AlreadyBuilt,

    #[error("source '{0}' was already added")]
    DuplicateSource(String),
}

/// Errors that stop a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no sources added to unit")]
    NoSources,

    #[error("unit has already been built")]
    AlreadyBuilt,

    #[error("parse errors in {} file(s)", .0.len())]
    ParseErrors(Vec<(String, ParseErrors)>),

    #[error("registration failed: {0:?}")]
    Registration(Vec<RegistrationError>),

    #[error(transparent)]
    Prelude(#[from] PreludeError),
}

impl BuildError {
    /// Every underlying error as `file: message` text.
    pub fn messages(&self) -> Vec<String> {
        match self {
            BuildError::ParseErrors(files) => files
                .iter()
                .flat_map(|(file, errors)| errors.iter().map(move |e| format!("{file}: {e}")))
                .collect(),
            BuildError::Registration(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UnitConfig;
    use javelin_compiler::KeepReason;
    use javelin_parser::ast::{Expr, Stmt};

    const STRINGS: &str = r#"
        package util;
        public class Strings {
            public static boolean isBlank(CharSequence s) { return s.length() == 0; }
        }
    "#;

    fn unit_with(sources: &[(&str, &str)]) -> Unit {
        let mut unit = Unit::new();
        for (name, source) in sources {
            unit.add_source(*name, *source).unwrap();
        }
        unit
    }

    #[test]
    fn create_empty_unit() {
        let unit = Unit::new();
        assert!(!unit.is_built());
        assert_eq!(unit.source_count(), 0);
    }

    #[test]
    fn build_fails_with_no_sources() {
        let arena = Bump::new();
        let mut unit = Unit::new();
        assert!(matches!(unit.build(&arena), Err(BuildError::NoSources)));
    }

    #[test]
    fn cannot_add_after_build() {
        let arena = Bump::new();
        let mut unit = unit_with(&[("A.java", "class A { }")]);
        unit.build(&arena).unwrap();

        assert_eq!(unit.add_source("B.java", "class B { }"), Err(UnitError::AlreadyBuilt));
        assert!(matches!(unit.build(&arena), Err(BuildError::AlreadyBuilt)));
    }

    #[test]
    fn can_rebuild_after_clear() {
        let arena = Bump::new();
        let mut unit = unit_with(&[("A.java", "class A { }")]);
        unit.build(&arena).unwrap();

        unit.clear();
        unit.add_source("B.java", "class B { }").unwrap();
        unit.build(&arena).unwrap();
        assert!(unit.is_built());
    }

    #[test]
    fn duplicate_source_names_are_rejected() {
        let mut unit = unit_with(&[("A.java", "class A { }")]);
        assert_eq!(
            unit.add_source("A.java", "class B { }"),
            Err(UnitError::DuplicateSource("A.java".to_string()))
        );
    }

    #[test]
    fn strict_build_fails_with_parse_errors() {
        let arena = Bump::new();
        let mut unit = unit_with(&[("Bad.java", "class Bad { void f() { int = ; } }")]);
        let err = unit.build(&arena).unwrap_err();
        assert!(matches!(err, BuildError::ParseErrors(ref files) if files[0].0 == "Bad.java"));
        assert!(err.messages()[0].starts_with("Bad.java: "));
    }

    #[test]
    fn lenient_build_reports_parse_errors() {
        let arena = Bump::new();
        let ctx = Arc::new(Context::with_config(UnitConfig::default().with_lenient_parsing(true)));
        let mut unit = ctx.create_unit();
        unit.add_source("Bad.java", "class Bad { void f() { int = ; } }").unwrap();

        let output = unit.build(&arena).unwrap();
        assert!(!output.is_success());
        assert_eq!(output.diagnostics.errors().next().unwrap().source.as_deref(), Some("Bad.java"));
    }

    #[test]
    fn duplicate_types_fail_registration() {
        let arena = Bump::new();
        let mut unit = unit_with(&[("A.java", "class A { }"), ("A2.java", "class A { }")]);
        assert!(matches!(unit.build(&arena), Err(BuildError::Registration(_))));
    }

    #[test]
    fn unannotated_sources_are_returned_unchanged() {
        let arena = Bump::new();
        let mut unit = unit_with(&[("A.java", "class A { void f() { g(); } void g() { } }")]);
        let output = unit.build(&arena).unwrap();

        assert!(output.applications.is_empty());
        assert!(output.is_success());
        assert!(output.find_type("A").is_some());
    }

    #[test]
    fn rewrites_and_strips_annotation() {
        let arena = Bump::new();
        let mut unit = unit_with(&[
            ("Strings.java", STRINGS),
            (
                "Main.java",
                r#"
                package app;
                import util.Strings;
                @ExtensionMethod(Strings.class)
                class Main {
                    boolean check(String s) { return s.isBlank(); }
                }
                "#,
            ),
        ]);
        let output = unit.build(&arena).unwrap();
        assert!(output.is_success(), "{:?}", output.diagnostics);

        let main = output.find_type("app.Main").unwrap();
        assert!(main.modifiers.annotations.is_empty());

        let Member::Method(check) = main.members[0] else {
            panic!("expected method");
        };
        let Stmt::Return(ret) = check.body.unwrap().stmts[0] else {
            panic!("expected return");
        };
        let call = ret.value.unwrap().as_call().unwrap();
        assert_eq!(call.callee.dotted_name().as_deref(), Some("util.Strings.isBlank"));
        assert!(matches!(call.args[0], Expr::Ident(ident) if ident.name == "s"));

        let [application] = output.applications.as_slice() else {
            panic!("expected one application");
        };
        assert_eq!(application.type_name.to_string(), "app.Main");
        assert_eq!(application.attribution_passes, 1);
    }

    #[test]
    fn usage_errors_are_diagnostics() {
        let arena = Bump::new();
        let mut unit = unit_with(&[
            ("Strings.java", STRINGS),
            (
                "Api.java",
                "import util.Strings; @ExtensionMethod(Strings.class) interface Api { }",
            ),
        ]);
        let output = unit.build(&arena).unwrap();

        assert!(!output.is_success());
        let error = output.diagnostics.errors().next().unwrap();
        assert_eq!(error.source.as_deref(), Some("Api.java"));
        assert_eq!(error.message, ExtensionError::NotClassOrEnum.to_string());
        assert_eq!(
            output.applications[0].outcome,
            ApplicationOutcome::UsageError(ExtensionError::NotClassOrEnum)
        );
        // Left as written.
        assert_eq!(output.find_type("Api").unwrap().modifiers.annotations.len(), 1);
    }

    #[test]
    fn nested_types_are_handled_after_their_outer_type() {
        let arena = Bump::new();
        let mut unit = unit_with(&[
            ("Strings.java", STRINGS),
            (
                "Outer.java",
                r#"
                import util.Strings;
                @ExtensionMethod(Strings.class)
                class Outer {
                    boolean a(String s) { return s.isBlank(); }

                    @ExtensionMethod(Strings.class)
                    static class Inner {
                        boolean b(String s) { return s.isBlank(); }
                    }
                }
                "#,
            ),
        ]);
        let output = unit.build(&arena).unwrap();

        let names: Vec<String> = output.applications.iter().map(|a| a.type_name.to_string()).collect();
        assert_eq!(names, ["Outer", "Outer.Inner"]);
        for application in &output.applications {
            assert!(matches!(application.outcome, ApplicationOutcome::Rewritten(r) if r.rewrites == 1));
        }

        let outer = output.find_type("Outer").unwrap();
        let inner = output.find_type("Outer.Inner").unwrap();
        assert!(outer.nested_types().any(|n| ptr::eq(n, inner)));
        assert!(inner.modifiers.annotations.is_empty());
    }

    #[test]
    fn unresolved_receivers_stay_without_prelude() {
        let arena = Bump::new();
        let ctx = Arc::new(Context::with_config(UnitConfig::default().with_prelude(false)));
        let mut unit = ctx.create_unit();
        unit.add_source("Strings.java", STRINGS).unwrap();
        unit.add_source(
            "Main.java",
            "import util.Strings; @ExtensionMethod(Strings.class) class Main { boolean f(String s) { return s.isBlank(); } }",
        )
        .unwrap();

        let output = unit.build(&arena).unwrap();
        assert!(output.diagnostics.warnings().next().is_some());
        let ApplicationOutcome::Rewritten(report) = output.applications[0].outcome else {
            panic!("expected a rewrite pass");
        };
        assert_eq!(report.rewrites, 0);
        assert_eq!(report.kept(KeepReason::UnresolvedReceiver), 1);
    }
}
