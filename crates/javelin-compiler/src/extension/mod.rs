//! The `@ExtensionMethod` transform.
//!
//! A type annotated with `@ExtensionMethod({A.class, B.class})` has the calls
//! in its own code redirected to static methods of the listed providers:
//! `s.isBlank()` becomes `a.b.A.isBlank(s)` when `A` declares a matching
//! `public static` method.
//!
//! - [`config`]: which annotation names trigger the transform
//! - [`catalog`]: provider validation and eligible methods
//! - [`scanner`]: candidate call sites of the annotated type
//! - [`engine`]: per-site matching, producing [`RewriteDecision`]s
//! - [`rewrite`]: applying decisions to a rebuilt declaration
//! - [`handler`]: the [`AnnotationHandler`] tying them together

pub mod catalog;
pub mod config;
pub mod engine;
pub mod handler;
pub mod rewrite;
pub mod scanner;

pub use catalog::{Catalog, Extension, ProviderOutcome, build_catalog, eligible_methods, provider_refs};
pub use config::ExtensionConfig;
pub use engine::{KeepReason, ResolvedSignature, RewriteDecision, RewriteEngine};
pub use handler::{
    AnnotationHandler, ExtensionMethodHandler, HandleOutcome, HandlerContext, RewriteReport,
};
pub use rewrite::{RewriteFolder, apply_decisions};
pub use scanner::{CallSiteScanner, FrameKind, InvocationSite, scan};

#[cfg(test)]
pub(crate) mod test_support {
    use bumpalo::Bump;
    use javelin_core::{QualifiedName, TypeHash};
    use javelin_parser::Parser;
    use javelin_parser::ast::TypeDecl;
    use javelin_registry::SymbolRegistry;

    use crate::context::SourceFile;
    use crate::passes::RegistrationPass;
    use crate::prelude::register_prelude;

    /// Prelude plus `sources`, parsed with distinct call ids and registered.
    pub(crate) struct Harness<'ast> {
        pub registry: SymbolRegistry,
        pub files: Vec<SourceFile<'ast>>,
    }

    impl<'ast> Harness<'ast> {
        pub fn new(arena: &'ast Bump, sources: &[&str]) -> Self {
            let mut registry = SymbolRegistry::new();
            register_prelude(arena, &mut registry).unwrap();

            let mut next_call_id = 0;
            let mut files = Vec::new();
            for (index, source) in sources.iter().enumerate() {
                let mut parser = Parser::new(source, arena).with_call_ids_from(next_call_id);
                let unit = parser.parse_compilation_unit();
                assert!(!parser.has_errors(), "{}", parser.take_errors());
                next_call_id = parser.next_call_id();
                files.push(SourceFile::new(format!("File{index}.java"), unit));
            }

            let output = RegistrationPass::new(&mut registry).run(&files);
            assert!(output.is_success(), "{:?}", output.errors);
            Self { registry, files }
        }

        pub fn decl(&self, file: usize, name: &str) -> &'ast TypeDecl<'ast> {
            self.files[file]
                .unit
                .types
                .iter()
                .copied()
                .find(|decl| decl.name.name == name)
                .unwrap()
        }

        pub fn owner(&self, file: usize, decl: &TypeDecl<'_>) -> TypeHash {
            QualifiedName::new(self.files[file].scope.package(), decl.name.name).to_type_hash()
        }
    }
}
