//! Abstract Syntax Tree (AST) for the Java subset.
//!
//! This module provides:
//! - AST node definitions for compilation units, types, members,
//!   statements and expressions
//! - Parser for transforming tokens into AST
//! - Visitor pattern for AST traversal
//!
//! Every method invocation gets a [`CallId`] unique within its parser, so
//! later passes can key decisions by call.

// Core types
pub mod node;
pub mod ops;

mod parser;
mod type_parser;
pub mod types;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub mod decl;
mod decl_parser;

pub mod visitor;

// Re-export error types from core
pub use javelin_core::{ParseError, ParseErrorKind, ParseErrors};

pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;
pub use types::*;

use bumpalo::Bump;

use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a complete source file, failing if any error was reported.
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<CompilationUnit<'ast>, ParseErrors> {
        let (unit, errors) = Self::parse_lenient(source, arena);
        if errors.is_empty() {
            Ok(unit)
        } else {
            Err(errors)
        }
    }

    /// Parse a complete source file, returning whatever was recovered
    /// alongside all errors.
    pub fn parse_lenient(source: &str, arena: &'ast Bump) -> (CompilationUnit<'ast>, ParseErrors) {
        let mut parser = Parser::new(source, arena);
        let unit = parser.parse_compilation_unit();
        (unit, parser.take_errors())
    }

    /// Parse a standalone expression.
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<&'ast Expr<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let result = parser.parse_expression();
        parser.finish(result)
    }

    /// Parse a standalone statement.
    pub fn statement(source: &str, arena: &'ast Bump) -> Result<Stmt<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let result = parser.parse_statement();
        parser.finish(result)
    }

    /// Parse a standalone type expression.
    pub fn type_expr(source: &str, arena: &'ast Bump) -> Result<TypeExpr<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let result = parser.parse_type();
        parser.finish(result)
    }

    /// Require that `result` succeeded and consumed all input.
    fn finish<T>(&mut self, result: Result<T, ParseError>) -> Result<T, ParseErrors> {
        match result {
            Ok(value) if !self.has_errors() && self.check(TokenKind::Eof) => Ok(value),
            Ok(_) => {
                if !self.check(TokenKind::Eof) {
                    let token = *self.peek();
                    self.error(
                        ParseErrorKind::UnexpectedToken,
                        token.span,
                        format!("unexpected {} after end of input", token.kind.description()),
                    );
                }
                Err(self.take_errors())
            }
            Err(err) => {
                self.record(err);
                Err(self.take_errors())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_class() {
        let arena = Bump::new();
        let unit = Parser::parse("class Foo { void bar() { } }", &arena).unwrap();
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].name.name, "Foo");
    }

    #[test]
    fn parse_with_errors() {
        let arena = Bump::new();
        let result = Parser::parse("class C { void m() { int x = ; } }", &arena);
        assert!(result.is_err());
        assert!(!result.unwrap_err().is_empty());
    }

    #[test]
    fn parse_lenient_recovers() {
        let arena = Bump::new();
        let source = r#"
            class A { void m() { int x = ; int y = 42; } }
            class B { }
        "#;
        let (unit, errors) = Parser::parse_lenient(source, &arena);
        assert!(!errors.is_empty());
        assert_eq!(unit.types.len(), 2);
        let body = unit.types[0].methods().next().unwrap().body.unwrap();
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn parse_lenient_no_errors() {
        let arena = Bump::new();
        let (unit, errors) = Parser::parse_lenient("enum E { A }", &arena);
        assert!(errors.is_empty());
        assert_eq!(unit.types.len(), 1);
    }

    #[test]
    fn lexer_errors_surface_as_parse_errors() {
        let arena = Bump::new();
        let errors = Parser::parse("class C { String s = \"open; }", &arena).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ParseErrorKind::LexicalError));
    }

    #[test]
    fn trailing_input_is_rejected() {
        let arena = Bump::new();
        assert!(Parser::expression("a b", &arena).is_err());
    }

    #[test]
    fn call_ids_are_unique_per_parser() {
        let arena = Bump::new();
        let mut parser = Parser::new("class C { void m() { a(); b(c()); } }", &arena).with_call_ids_from(10);
        let _ = parser.parse_compilation_unit();
        assert_eq!(parser.next_call_id(), 13);
    }
}
