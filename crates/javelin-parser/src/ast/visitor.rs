//! Visitor pattern for traversing the AST.
//!
//! The `Visitor` trait has one `visit_*` method per node family; each
//! default implementation calls the matching `walk_*` function to continue
//! into children. Nodes are borrowed for `'ast`, so a visitor may keep
//! references to what it sees.
//!
//! # Example
//!
//! ```
//! use javelin_parser::Parser;
//! use javelin_parser::ast::CallExpr;
//! use javelin_parser::ast::visitor::{Visitor, walk_call_expr};
//! use bumpalo::Bump;
//!
//! struct CallNames(Vec<String>);
//!
//! impl<'ast> Visitor<'ast> for CallNames {
//!     fn visit_call_expr(&mut self, call: &'ast CallExpr<'ast>) {
//!         self.0.extend(call.method_name().map(str::to_string));
//!         walk_call_expr(self, call);
//!     }
//! }
//!
//! let arena = Bump::new();
//! let unit = Parser::parse("class C { void m() { a(b()); } }", &arena).unwrap();
//! let mut names = CallNames(Vec::new());
//! names.visit_compilation_unit(&unit);
//! assert_eq!(names.0, ["a", "b"]);
//! ```

use crate::ast::decl::*;
use crate::ast::expr::*;
use crate::ast::stmt::*;
use crate::ast::types::TypeExpr;

/// Visitor trait for traversing AST nodes.
///
/// Override any `visit_*` method to customize behavior for specific node
/// types; call the `walk_*` function from the override to keep descending.
pub trait Visitor<'ast>: Sized {
    // === Declarations ===

    fn visit_compilation_unit(&mut self, unit: &CompilationUnit<'ast>) {
        walk_compilation_unit(self, unit);
    }

    /// Visit a class, interface, enum or annotation type, wherever declared.
    fn visit_type_decl(&mut self, decl: &'ast TypeDecl<'ast>) {
        walk_type_decl(self, decl);
    }

    fn visit_annotation(&mut self, annotation: &'ast Annotation<'ast>) {
        walk_annotation(self, annotation);
    }

    /// Visit an enum constant; a constant with a body opens a class body.
    fn visit_enum_constant(&mut self, constant: &'ast EnumConstant<'ast>) {
        walk_enum_constant(self, constant);
    }

    /// Visit the members of a class body (named, anonymous or enum constant).
    fn visit_class_body(&mut self, members: &'ast [Member<'ast>]) {
        walk_class_body(self, members);
    }

    fn visit_member(&mut self, member: &'ast Member<'ast>) {
        walk_member(self, member);
    }

    fn visit_field_decl(&mut self, field: &'ast FieldDecl<'ast>) {
        walk_field_decl(self, field);
    }

    fn visit_method_decl(&mut self, method: &'ast MethodDecl<'ast>) {
        walk_method_decl(self, method);
    }

    fn visit_constructor_decl(&mut self, ctor: &'ast ConstructorDecl<'ast>) {
        walk_constructor_decl(self, ctor);
    }

    fn visit_initializer_decl(&mut self, init: &'ast InitializerDecl<'ast>) {
        walk_block(self, &init.body);
    }

    /// Visit a type expression. Leaf by default.
    fn visit_type_expr(&mut self, _ty: &'ast TypeExpr<'ast>) {}

    // === Statements ===

    fn visit_block(&mut self, block: &'ast Block<'ast>) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    // === Expressions ===

    fn visit_expr(&mut self, expr: &'ast Expr<'ast>) {
        walk_expr(self, expr);
    }

    fn visit_call_expr(&mut self, call: &'ast CallExpr<'ast>) {
        walk_call_expr(self, call);
    }

    /// Visit `new T(..)`, including any anonymous class body.
    fn visit_new_expr(&mut self, new: &'ast NewExpr<'ast>) {
        walk_new_expr(self, new);
    }

    fn visit_lambda_expr(&mut self, lambda: &'ast LambdaExpr<'ast>) {
        walk_lambda_expr(self, lambda);
    }
}

// === Walk Functions ===
// These provide default traversal logic for each node type.

pub fn walk_compilation_unit<'ast, V: Visitor<'ast>>(visitor: &mut V, unit: &CompilationUnit<'ast>) {
    for decl in unit.types {
        visitor.visit_type_decl(decl);
    }
}

/// Walk a type declaration: annotations, supertypes, enum constants, members.
pub fn walk_type_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast TypeDecl<'ast>) {
    for annotation in decl.modifiers.annotations {
        visitor.visit_annotation(annotation);
    }
    if let Some(extends) = &decl.extends {
        visitor.visit_type_expr(extends);
    }
    for ty in decl.implements {
        visitor.visit_type_expr(ty);
    }
    for constant in decl.enum_constants {
        visitor.visit_enum_constant(constant);
    }
    visitor.visit_class_body(decl.members);
}

pub fn walk_annotation<'ast, V: Visitor<'ast>>(visitor: &mut V, annotation: &'ast Annotation<'ast>) {
    for arg in annotation.args {
        walk_element_value(visitor, &arg.value);
    }
}

fn walk_element_value<'ast, V: Visitor<'ast>>(visitor: &mut V, value: &'ast ElementValue<'ast>) {
    match value {
        ElementValue::Expr(expr) => visitor.visit_expr(expr),
        ElementValue::Array(items, _) => {
            for item in *items {
                walk_element_value(visitor, item);
            }
        }
        ElementValue::Annotation(annotation) => visitor.visit_annotation(annotation),
    }
}

pub fn walk_enum_constant<'ast, V: Visitor<'ast>>(visitor: &mut V, constant: &'ast EnumConstant<'ast>) {
    for arg in constant.args {
        visitor.visit_expr(arg);
    }
    if let Some(body) = constant.body {
        visitor.visit_class_body(body);
    }
}

pub fn walk_class_body<'ast, V: Visitor<'ast>>(visitor: &mut V, members: &'ast [Member<'ast>]) {
    for member in members {
        visitor.visit_member(member);
    }
}

pub fn walk_member<'ast, V: Visitor<'ast>>(visitor: &mut V, member: &'ast Member<'ast>) {
    match member {
        Member::Field(field) => visitor.visit_field_decl(field),
        Member::Method(method) => visitor.visit_method_decl(method),
        Member::Constructor(ctor) => visitor.visit_constructor_decl(ctor),
        Member::Initializer(init) => visitor.visit_initializer_decl(init),
        Member::Type(decl) => visitor.visit_type_decl(decl),
    }
}

pub fn walk_field_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, field: &'ast FieldDecl<'ast>) {
    visitor.visit_type_expr(&field.ty);
    for var in field.vars {
        if let Some(init) = var.init {
            visitor.visit_expr(init);
        }
    }
}

pub fn walk_method_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, method: &'ast MethodDecl<'ast>) {
    visitor.visit_type_expr(&method.return_type);
    for param in method.params {
        visitor.visit_type_expr(&param.ty);
    }
    if let Some(body) = &method.body {
        visitor.visit_block(body);
    }
}

pub fn walk_constructor_decl<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    ctor: &'ast ConstructorDecl<'ast>,
) {
    for param in ctor.params {
        visitor.visit_type_expr(&param.ty);
    }
    visitor.visit_block(&ctor.body);
}

// === Statements ===

pub fn walk_block<'ast, V: Visitor<'ast>>(visitor: &mut V, block: &'ast Block<'ast>) {
    for stmt in block.stmts {
        visitor.visit_stmt(stmt);
    }
}

/// Walk a statement's children in source order.
pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Stmt<'ast>) {
    match stmt {
        Stmt::Block(block) => visitor.visit_block(block),
        Stmt::LocalVar(decl) => {
            visitor.visit_type_expr(&decl.ty);
            for var in decl.vars {
                if let Some(init) = var.init {
                    visitor.visit_expr(init);
                }
            }
        }
        Stmt::LocalClass(decl) => visitor.visit_type_decl(decl),
        Stmt::Expr(s) => visitor.visit_expr(s.expr),
        Stmt::If(s) => {
            visitor.visit_expr(s.condition);
            visitor.visit_stmt(&s.then_stmt);
            if let Some(else_stmt) = &s.else_stmt {
                visitor.visit_stmt(else_stmt);
            }
        }
        Stmt::While(s) => {
            visitor.visit_expr(s.condition);
            visitor.visit_stmt(&s.body);
        }
        Stmt::DoWhile(s) => {
            visitor.visit_stmt(&s.body);
            visitor.visit_expr(s.condition);
        }
        Stmt::For(s) => {
            for init in s.init {
                visitor.visit_stmt(init);
            }
            if let Some(condition) = s.condition {
                visitor.visit_expr(condition);
            }
            for update in s.update {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(&s.body);
        }
        Stmt::ForEach(s) => {
            visitor.visit_type_expr(&s.ty);
            visitor.visit_expr(s.iterable);
            visitor.visit_stmt(&s.body);
        }
        Stmt::Return(s) => {
            if let Some(value) = s.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
        Stmt::Throw(s) => visitor.visit_expr(s.expr),
        Stmt::Try(s) => {
            for resource in s.resources {
                visitor.visit_stmt(resource);
            }
            visitor.visit_block(&s.body);
            for catch in s.catches {
                for ty in catch.types {
                    visitor.visit_type_expr(ty);
                }
                visitor.visit_block(&catch.body);
            }
            if let Some(finally) = &s.finally {
                visitor.visit_block(finally);
            }
        }
        Stmt::Switch(s) => {
            visitor.visit_expr(s.selector);
            for case in s.cases {
                for label in case.labels {
                    visitor.visit_expr(label);
                }
                for stmt in case.body {
                    visitor.visit_stmt(stmt);
                }
            }
        }
        Stmt::Synchronized(s) => {
            visitor.visit_expr(s.lock);
            visitor.visit_block(&s.body);
        }
        Stmt::Labeled(s) => visitor.visit_stmt(&s.body),
        Stmt::Assert(s) => {
            visitor.visit_expr(s.condition);
            if let Some(message) = s.message {
                visitor.visit_expr(message);
            }
        }
    }
}

// === Expressions ===

/// Walk an expression's children left to right.
pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expr<'ast>) {
    match expr {
        Expr::Literal(_) | Expr::Ident(_) | Expr::This(_) | Expr::Super(_) => {}
        Expr::FieldAccess(e) => visitor.visit_expr(e.target),
        Expr::Call(call) => visitor.visit_call_expr(call),
        Expr::New(new) => visitor.visit_new_expr(new),
        Expr::NewArray(e) => {
            visitor.visit_type_expr(&e.ty);
            for dim in e.dim_exprs {
                visitor.visit_expr(dim);
            }
            if let Some(init) = e.init {
                for element in init.elements {
                    visitor.visit_expr(element);
                }
            }
        }
        Expr::ArrayInit(e) => {
            for element in e.elements {
                visitor.visit_expr(element);
            }
        }
        Expr::Index(e) => {
            visitor.visit_expr(e.target);
            visitor.visit_expr(e.index);
        }
        Expr::Unary(e) => visitor.visit_expr(e.operand),
        Expr::Binary(e) => {
            visitor.visit_expr(e.left);
            visitor.visit_expr(e.right);
        }
        Expr::InstanceOf(e) => {
            visitor.visit_expr(e.expr);
            visitor.visit_type_expr(&e.ty);
        }
        Expr::Assign(e) => {
            visitor.visit_expr(e.target);
            visitor.visit_expr(e.value);
        }
        Expr::Ternary(e) => {
            visitor.visit_expr(e.condition);
            visitor.visit_expr(e.then_expr);
            visitor.visit_expr(e.else_expr);
        }
        Expr::Cast(e) => {
            visitor.visit_type_expr(&e.ty);
            visitor.visit_expr(e.expr);
        }
        Expr::Postfix(e) => visitor.visit_expr(e.operand),
        Expr::Paren(e) => visitor.visit_expr(e.expr),
        Expr::ClassLit(e) => visitor.visit_type_expr(&e.ty),
        Expr::Lambda(lambda) => visitor.visit_lambda_expr(lambda),
        Expr::MethodRef(e) => visitor.visit_expr(e.target),
    }
}

/// Walk the callee, then the arguments.
pub fn walk_call_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, call: &'ast CallExpr<'ast>) {
    visitor.visit_expr(call.callee);
    for arg in call.args {
        visitor.visit_expr(arg);
    }
}

pub fn walk_new_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, new: &'ast NewExpr<'ast>) {
    visitor.visit_type_expr(&new.ty);
    for arg in new.args {
        visitor.visit_expr(arg);
    }
    if let Some(body) = new.body {
        visitor.visit_class_body(body);
    }
}

pub fn walk_lambda_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, lambda: &'ast LambdaExpr<'ast>) {
    match &lambda.body {
        LambdaBody::Expr(expr) => visitor.visit_expr(expr),
        LambdaBody::Block(block) => visitor.visit_block(block),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use bumpalo::Bump;

    struct MethodCounter {
        count: usize,
    }

    impl<'ast> Visitor<'ast> for MethodCounter {
        fn visit_method_decl(&mut self, method: &'ast MethodDecl<'ast>) {
            self.count += 1;
            walk_method_decl(self, method);
        }
    }

    struct CallCollector<'ast> {
        calls: Vec<&'ast CallExpr<'ast>>,
    }

    impl<'ast> Visitor<'ast> for CallCollector<'ast> {
        fn visit_call_expr(&mut self, call: &'ast CallExpr<'ast>) {
            self.calls.push(call);
            walk_call_expr(self, call);
        }
    }

    #[test]
    fn counts_methods_in_nested_and_anonymous_classes() {
        let arena = Bump::new();
        let unit = Parser::parse(
            "class A { void a() { Runnable r = new Runnable() { public void run() {} }; } class B { void b() {} } }",
            &arena,
        )
        .unwrap();
        let mut counter = MethodCounter { count: 0 };
        counter.visit_compilation_unit(&unit);
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn collects_calls_in_source_order() {
        let arena = Bump::new();
        let unit = Parser::parse(
            "class A { int f = init(); void m() { if (x.ok()) { run(y -> go(y)); } } }",
            &arena,
        )
        .unwrap();
        let mut collector = CallCollector { calls: Vec::new() };
        collector.visit_compilation_unit(&unit);
        let names: Vec<_> = collector.calls.iter().filter_map(|c| c.method_name()).collect();
        assert_eq!(names, ["init", "ok", "run", "go"]);
    }

    #[test]
    fn override_can_stop_descent() {
        struct Shallow {
            types: usize,
        }
        impl<'ast> Visitor<'ast> for Shallow {
            fn visit_type_decl(&mut self, _decl: &'ast TypeDecl<'ast>) {
                self.types += 1;
            }
        }

        let arena = Bump::new();
        let unit = Parser::parse("class A { class B { class C {} } }", &arena).unwrap();
        let mut visitor = Shallow { types: 0 };
        visitor.visit_compilation_unit(&unit);
        assert_eq!(visitor.types, 1);
    }
}
