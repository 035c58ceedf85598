//! Local scope management for attribution.
//!
//! This module provides `LocalScope` for tracking local variables while a
//! member body is attributed. It handles:
//! - Variable declaration, including variables whose type is unknown
//! - Nested block scopes (if/while/for bodies, lambdas, catch clauses)
//! - Variable shadowing with proper restoration on scope exit

use javelin_core::{DataType, Span};
use rustc_hash::FxHashMap;

/// Information about a local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    /// `None` when the declared type could not be resolved.
    pub data_type: Option<DataType>,
    /// Scope depth where declared
    pub depth: u32,
    pub span: Span,
}

/// Local variables of the member being attributed.
#[derive(Debug, Default)]
pub struct LocalScope {
    /// Variables by name in current scope chain
    variables: FxHashMap<String, LocalVar>,

    /// Current scope depth (0 = parameters)
    scope_depth: u32,

    /// Stack of shadowed variables (shadowing_depth, name, old_var).
    /// The depth is where the shadowing happened, not where the original
    /// variable lives.
    shadowed: Vec<(u32, String, LocalVar)>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Enter a new scope (block, loop, lambda, catch clause).
    pub fn push_scope(&mut self) {
        self.scope_depth += 1;
    }

    /// Exit the current scope, removing variables declared in it.
    pub fn pop_scope(&mut self) {
        if self.scope_depth == 0 {
            return;
        }

        let depth = self.scope_depth;
        self.variables.retain(|_, var| var.depth < depth);

        while self.shadowed.last().is_some_and(|(d, _, _)| *d == depth) {
            if let Some((_, name, var)) = self.shadowed.pop() {
                self.variables.insert(name, var);
            }
        }

        self.scope_depth -= 1;
    }

    pub fn depth(&self) -> u32 {
        self.scope_depth
    }

    // ==========================================================================
    // Variable Declaration
    // ==========================================================================

    /// Declare a variable in the current scope.
    ///
    /// Redeclaring at the same depth replaces the earlier entry; attribution
    /// is not the place to report it.
    pub fn declare(&mut self, name: impl Into<String>, data_type: Option<DataType>, span: Span) {
        let name = name.into();
        if let Some(existing) = self.variables.get(&name)
            && existing.depth < self.scope_depth
        {
            self.shadowed
                .push((self.scope_depth, name.clone(), existing.clone()));
        }

        let var = LocalVar {
            name: name.clone(),
            data_type,
            depth: self.scope_depth,
            span,
        };
        self.variables.insert(name, var);
    }

    // ==========================================================================
    // Variable Lookup
    // ==========================================================================

    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.variables.get(name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// The variable's type, if it is declared and its type is known.
    pub fn type_of(&self, name: &str) -> Option<DataType> {
        self.get(name).and_then(|var| var.data_type)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::primitives;

    fn int() -> Option<DataType> {
        Some(DataType::simple(primitives::INT))
    }

    fn string() -> Option<DataType> {
        Some(DataType::simple(primitives::STRING))
    }

    #[test]
    fn declare_variable() {
        let mut scope = LocalScope::new();
        scope.declare("x", int(), Span::default());
        assert_eq!(scope.type_of("x"), int());
        assert_eq!(scope.get("x").unwrap().depth, 0);
    }

    #[test]
    fn shadowing_restores_outer_variable() {
        let mut scope = LocalScope::new();
        scope.declare("x", int(), Span::default());

        scope.push_scope();
        scope.declare("x", string(), Span::default());
        assert_eq!(scope.type_of("x"), string());

        scope.pop_scope();
        assert_eq!(scope.type_of("x"), int());
    }

    #[test]
    fn scope_pop_removes_vars() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("y", int(), Span::default());
        assert!(scope.is_declared("y"));

        scope.pop_scope();
        assert!(!scope.is_declared("y"));
        assert!(scope.is_empty());
    }

    #[test]
    fn unknown_types_are_still_declared() {
        let mut scope = LocalScope::new();
        scope.declare("w", None, Span::default());
        assert!(scope.is_declared("w"));
        assert_eq!(scope.type_of("w"), None);
    }

    #[test]
    fn redeclaration_at_same_depth_replaces() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("z", int(), Span::default());
        scope.declare("z", string(), Span::default());
        assert_eq!(scope.type_of("z"), string());

        scope.pop_scope();
        assert!(!scope.is_declared("z"));
    }

    #[test]
    fn pop_at_depth_zero_is_a_no_op() {
        let mut scope = LocalScope::new();
        scope.declare("p", int(), Span::default());
        scope.pop_scope();
        assert_eq!(scope.depth(), 0);
        assert!(scope.is_declared("p"));
    }
}
