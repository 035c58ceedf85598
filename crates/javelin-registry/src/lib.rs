//! Symbol table for the javelin front end.
//!
//! [`SymbolRegistry`] holds every type known to a compilation: the bundled
//! library prelude and the user's own declarations. Each [`TypeSymbol`]
//! keeps its members in declaration order, which is the order annotation
//! handlers enumerate them in.

mod registry;
mod symbol;

pub use registry::SymbolRegistry;
pub use symbol::{
    FieldSymbol, MemberSymbol, MethodSymbol, MethodType, SymbolType, TypeKind, TypeSymbol,
};
