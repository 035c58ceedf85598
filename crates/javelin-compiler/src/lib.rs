//! Javelin Compiler
//!
//! Semantic passes over parsed Java sources, ending in the `@ExtensionMethod`
//! rewrite.
//!
//! ## Architecture
//!
//! - **Registration**: declare every type, then register supertypes and
//!   member signatures into the [`SymbolRegistry`](javelin_registry::SymbolRegistry)
//! - **Attribution**: lazily type the expressions of a member the first time
//!   one of them is queried
//! - **Extension**: build the provider catalog, scan call sites, decide and
//!   apply rewrites
//!
//! ## Modules
//!
//! - [`context`]: file scopes and import-aware type name resolution
//! - [`type_resolver`]: type expressions to erased [`DataType`](javelin_core::DataType)s
//! - [`scope`]: local variables with block nesting and shadowing
//! - [`passes`]: the registration pass
//! - [`prelude`]: bundled `java.lang`/`java.io`/`java.util` declarations
//! - [`resolution`]: the [`TypeResolver`] capability used by annotation handlers
//! - [`attribution`]: the registry-backed implementation of [`TypeResolver`]
//! - [`extension`]: the `@ExtensionMethod` handler

pub mod attribution;
pub mod context;
pub mod extension;
pub mod passes;
pub mod prelude;
pub mod resolution;
pub mod scope;
pub mod type_resolver;

pub use attribution::Attribution;
pub use context::{CompilationContext, FileScope, SourceFile};
pub use extension::{
    AnnotationHandler, Catalog, Extension, ExtensionConfig, ExtensionMethodHandler, HandleOutcome,
    HandlerContext, KeepReason, ProviderOutcome, RewriteDecision, RewriteReport,
};
pub use passes::{RegistrationOutput, RegistrationPass};
pub use prelude::{PreludeError, register_prelude};
pub use resolution::{Site, TypeResolver};
pub use scope::{LocalScope, LocalVar};
pub use type_resolver::TypeExprResolver;
