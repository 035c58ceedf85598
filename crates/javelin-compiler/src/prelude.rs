//! Bundled library declarations.
//!
//! The prelude is a small slice of `java.lang`, `java.io`, `java.util` and
//! `java.util.function`, written as Java stubs and registered before user
//! sources so ordinary code (string methods, `System.out`, collections)
//! attributes.

use bumpalo::Bump;
use javelin_core::ParseErrors;
use javelin_parser::Parser;
use javelin_registry::SymbolRegistry;
use thiserror::Error;

use crate::context::SourceFile;
use crate::passes::{RegistrationOutput, RegistrationPass};

/// Embedded prelude sources, as (file name, source).
pub const PRELUDE_SOURCES: &[(&str, &str)] = &[
    ("java/lang/prelude.java", include_str!("prelude/java_lang.java")),
    ("java/io/prelude.java", include_str!("prelude/java_io.java")),
    ("java/util/prelude.java", include_str!("prelude/java_util.java")),
    (
        "java/util/function/prelude.java",
        include_str!("prelude/java_util_function.java"),
    ),
];

#[derive(Debug, Error)]
pub enum PreludeError {
    #[error("prelude file {file} failed to parse: {errors}")]
    Parse { file: &'static str, errors: ParseErrors },

    #[error("prelude failed to register: {0:?}")]
    Registration(Vec<javelin_core::RegistrationError>),
}

/// Parse the prelude into `arena` and register it.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn register_prelude(
    arena: &Bump,
    registry: &mut SymbolRegistry,
) -> Result<RegistrationOutput, PreludeError> {
    let mut files = Vec::with_capacity(PRELUDE_SOURCES.len());
    for &(file, source) in PRELUDE_SOURCES {
        let unit = Parser::parse(source, arena).map_err(|errors| PreludeError::Parse { file, errors })?;
        files.push(SourceFile::new(file, unit));
    }

    let output = RegistrationPass::new(registry).run(&files);
    if !output.is_success() {
        return Err(PreludeError::Registration(output.errors));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::{DataType, primitives};

    fn prelude() -> (SymbolRegistry, RegistrationOutput) {
        let arena = Bump::new();
        let mut registry = SymbolRegistry::new();
        let output = register_prelude(&arena, &mut registry).unwrap();
        (registry, output)
    }

    #[test]
    fn prelude_registers_cleanly() {
        let (_, output) = prelude();
        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
        assert!(output.types_registered > 40);
    }

    #[test]
    fn string_is_a_char_sequence() {
        let (registry, _) = prelude();
        let char_sequence = registry.get_by_name("java.lang.CharSequence").unwrap();
        assert!(registry.is_subtype(primitives::STRING, char_sequence.type_hash));

        let length = registry.find_methods(primitives::STRING, "length");
        assert_eq!(length[0].signature().return_type, DataType::simple(primitives::INT));
    }

    #[test]
    fn system_out_is_a_print_stream() {
        let (registry, _) = prelude();
        let out = registry.find_field(registry.get_by_name("java.lang.System").unwrap().type_hash, "out");
        assert_eq!(
            out.unwrap().ty.type_hash,
            registry.get_by_name("java.io.PrintStream").unwrap().type_hash
        );
    }

    #[test]
    fn collections_inherit_interface_methods() {
        let (registry, _) = prelude();
        let array_list = registry.get_by_name("java.util.ArrayList").unwrap();
        assert!(!registry.find_methods(array_list.type_hash, "size").is_empty());
        assert!(!registry.find_methods(array_list.type_hash, "get").is_empty());
    }
}
