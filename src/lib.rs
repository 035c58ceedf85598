//! Javelin: compile-time `@ExtensionMethod` rewriting for Java sources.
//!
//! A type annotated with `@ExtensionMethod({A.class, B.class})` has the
//! method calls in its own code redirected to matching `public static`
//! methods of the listed provider types, so `s.isBlank()` becomes
//! `A.isBlank(s)`.
//!
//! - [`Context`]: shared configuration and the installed annotation handlers
//! - [`Unit`]: a set of sources built together into transformed trees and
//!   diagnostics
//!
//! The stages live in their own crates and are re-exported here:
//! [`core`] (spans, names, errors), [`parser`] (Java subset AST),
//! [`registry`] (symbol table) and [`compiler`] (registration, attribution
//! and the extension transform).

mod context;
mod unit;

pub use context::{Context, UnitConfig};
pub use unit::{Application, ApplicationOutcome, BuildError, BuildOutput, Unit, UnitError};

pub use javelin_compiler as compiler;
pub use javelin_core as core;
pub use javelin_parser as parser;
pub use javelin_registry as registry;

pub use javelin_compiler::{
    AnnotationHandler, ExtensionConfig, ExtensionMethodHandler, HandleOutcome, KeepReason,
    RewriteReport, SourceFile,
};
pub use javelin_core::{Diagnostic, DiagnosticKind, Diagnostics, ExtensionError, Span};
