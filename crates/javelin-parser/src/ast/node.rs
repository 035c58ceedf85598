//! Small nodes shared by every part of the tree.

use javelin_core::Span;
use std::fmt;

/// An identifier with its location. The name lives in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

impl fmt::Debug for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:?})", self.name)
    }
}

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A dotted name such as `java.util.List`, as a slice of identifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Path<'ast> {
    pub segments: &'ast [Ident<'ast>],
    pub span: Span,
}

impl<'ast> Path<'ast> {
    /// The last segment.
    pub fn last(&self) -> Option<&Ident<'ast>> {
        self.segments.last()
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// Segments joined with `.`.
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(segment.name);
        }
        out
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Identity of a method-call node, unique within one parsed unit.
///
/// Rewrites are keyed by this id so a decision can be applied to a rebuilt
/// tree without holding on to node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u32);
