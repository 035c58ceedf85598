//! Dotted, fully qualified type names.

use std::fmt;

use crate::TypeHash;

/// A fully qualified name such as `java.lang.String` or `app.Outer.Inner`.
///
/// Stored as the package/outer prefix plus the simple name so both halves can
/// be read without re-splitting.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    qualifier: String,
    simple: String,
}

impl QualifiedName {
    /// Create a name from a qualifier (possibly empty) and a simple name.
    pub fn new(qualifier: impl Into<String>, simple: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            simple: simple.into(),
        }
    }

    /// A name in the unnamed package.
    pub fn simple(simple: impl Into<String>) -> Self {
        Self::new(String::new(), simple)
    }

    /// Parse `a.b.C` into qualifier `a.b` and simple name `C`.
    pub fn parse(dotted: &str) -> Self {
        match dotted.rsplit_once('.') {
            Some((qualifier, simple)) => Self::new(qualifier, simple),
            None => Self::simple(dotted),
        }
    }

    /// The name of a type nested directly inside this one.
    pub fn nested(&self, simple: &str) -> Self {
        Self::new(self.to_string(), simple)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn simple_name(&self) -> &str {
        &self.simple
    }

    /// Dotted segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.qualifier
            .split('.')
            .filter(|s| !s.is_empty())
            .chain(std::iter::once(self.simple.as_str()))
    }

    pub fn to_type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.to_string())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qualifier.is_empty() {
            write!(f, "{}", self.simple)
        } else {
            write!(f, "{}.{}", self.qualifier, self.simple)
        }
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let name = QualifiedName::parse("java.lang.String");
        assert_eq!(name.qualifier(), "java.lang");
        assert_eq!(name.simple_name(), "String");
        assert_eq!(name.to_string(), "java.lang.String");
    }

    #[test]
    fn unqualified() {
        let name = QualifiedName::parse("Main");
        assert_eq!(name.qualifier(), "");
        assert_eq!(name.to_string(), "Main");
        assert_eq!(name.segments().collect::<Vec<_>>(), vec!["Main"]);
    }

    #[test]
    fn nested_names() {
        let outer = QualifiedName::parse("app.Outer");
        let inner = outer.nested("Inner");
        assert_eq!(inner.to_string(), "app.Outer.Inner");
        assert_eq!(
            inner.segments().collect::<Vec<_>>(),
            vec!["app", "Outer", "Inner"]
        );
    }

    #[test]
    fn hash_matches_dotted_form() {
        let name = QualifiedName::new("util", "Strings");
        assert_eq!(name.to_type_hash(), TypeHash::from_name("util.Strings"));
    }
}
