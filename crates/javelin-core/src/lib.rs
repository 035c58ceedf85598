//! Core types shared by every stage of the javelin front end.
//!
//! - [`Span`]: source locations
//! - [`TypeHash`]: deterministic type identity
//! - [`QualifiedName`]: dotted type names
//! - [`Flags`]: declaration modifiers
//! - [`DataType`]: a resolved type with array dimensions
//! - error types for lexing, parsing, registration and the extension transform
//! - [`Diagnostics`]: the error sink handed to annotation handlers

mod data_type;
mod diagnostics;
mod error;
mod flags;
mod qualified_name;
mod span;
mod type_hash;

pub use data_type::DataType;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics};
pub use error::{ExtensionError, LexError, ParseError, ParseErrorKind, ParseErrors, RegistrationError};
pub use flags::Flags;
pub use qualified_name::QualifiedName;
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants, primitives};
