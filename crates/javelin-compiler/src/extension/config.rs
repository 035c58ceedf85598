//! Which annotations trigger the extension-method transform.

use javelin_parser::ast::{Annotation, Modifiers};

/// Names under which the processing annotation is recognised.
///
/// An annotation matches when it is written with the configured simple name
/// or with one of the configured qualified names.
///
/// ```
/// use javelin_compiler::ExtensionConfig;
///
/// let config = ExtensionConfig::default().with_qualified_name("com.acme.Extend");
/// assert!(config.matches_name("ExtensionMethod"));
/// assert!(config.matches_name("lombok.experimental.ExtensionMethod"));
/// assert!(config.matches_name("com.acme.Extend"));
/// assert!(!config.matches_name("Extend"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConfig {
    pub simple_name: String,
    pub qualified_names: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            simple_name: "ExtensionMethod".to_string(),
            qualified_names: vec![
                "lombok.ExtensionMethod".to_string(),
                "lombok.experimental.ExtensionMethod".to_string(),
            ],
        }
    }
}

impl ExtensionConfig {
    pub fn with_simple_name(mut self, name: impl Into<String>) -> Self {
        self.simple_name = name.into();
        self
    }

    pub fn with_qualified_name(mut self, name: impl Into<String>) -> Self {
        self.qualified_names.push(name.into());
        self
    }

    /// Whether `name`, as written in source, denotes the annotation.
    pub fn matches_name(&self, name: &str) -> bool {
        name == self.simple_name || self.qualified_names.iter().any(|q| q == name)
    }

    pub fn matches(&self, annotation: &Annotation<'_>) -> bool {
        if annotation.name.is_simple() {
            annotation.simple_name() == self.simple_name
        } else {
            self.matches_name(&annotation.name.dotted())
        }
    }

    /// The first matching annotation among `modifiers`.
    pub fn find<'ast>(&self, modifiers: &Modifiers<'ast>) -> Option<&'ast Annotation<'ast>> {
        modifiers.annotations.iter().find(|a| self.matches(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use javelin_parser::Parser;

    fn annotations_of<'ast>(source: &str, arena: &'ast Bump) -> Modifiers<'ast> {
        Parser::parse(source, arena).unwrap().types[0].modifiers
    }

    #[test]
    fn finds_simple_and_qualified_forms() {
        let arena = Bump::new();
        let config = ExtensionConfig::default();

        let simple = annotations_of("@Deprecated @ExtensionMethod(A.class) class T {}", &arena);
        assert_eq!(config.find(&simple).unwrap().simple_name(), "ExtensionMethod");

        let qualified = annotations_of("@lombok.experimental.ExtensionMethod(A.class) class T {}", &arena);
        assert!(config.find(&qualified).is_some());
    }

    #[test]
    fn unrelated_qualified_name_does_not_match() {
        let arena = Bump::new();
        let config = ExtensionConfig::default();
        let other = annotations_of("@com.acme.ExtensionMethod(A.class) class T {}", &arena);
        assert!(config.find(&other).is_none());
    }

    #[test]
    fn custom_simple_name() {
        let arena = Bump::new();
        let config = ExtensionConfig::default().with_simple_name("Extend");
        let modifiers = annotations_of("@Extend(A.class) class T {}", &arena);
        assert!(config.find(&modifiers).is_some());
    }
}
