//! Java-subset parser for the javelin front end.
//!
//! This crate provides:
//! - Lexical analysis (tokenization)
//! - Arena-allocated AST definitions
//! - A recovering recursive-descent/Pratt parser
//! - A visitor for AST traversal
//!
//! # Example
//!
//! ```
//! use javelin_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     package app;
//!
//!     class Greeter {
//!         void greet(String name) {
//!             System.out.println("hello " + name);
//!         }
//!     }
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(unit) => println!("parsed {} types", unit.types.len()),
//!     Err(errors) => eprintln!("parse errors: {}", errors),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::Parser;
pub use lexer::{Lexer, Token, TokenKind};
