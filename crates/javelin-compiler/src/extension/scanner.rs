//! Call-site scanner.
//!
//! Walks an annotated type in source order and reports the method calls that
//! are candidates for rewriting. A candidate is a call that forms the whole
//! expression of a statement slot (an expression statement, a local variable
//! initializer, a loop or `if` condition, a `return` value, and so on), found
//! in code that belongs to the annotated type itself.
//!
//! Type boundaries are tracked as a stack of [`FrameKind`]s. Member types,
//! local classes, anonymous class bodies and enum constant bodies each push a
//! frame; sites are only reported while the annotated type's own frame is
//! the only one on the stack.

use javelin_core::TypeHash;
use javelin_parser::ast::visitor::{Visitor, walk_member, walk_stmt, walk_type_decl};
use javelin_parser::ast::{CallExpr, EnumConstant, Expr, FieldDecl, Member, NewExpr, Stmt, TypeDecl};

use crate::resolution::Site;

/// A candidate call and where it was found.
#[derive(Debug, Clone, Copy)]
pub struct InvocationSite<'ast> {
    pub call: &'ast CallExpr<'ast>,
    pub site: Site<'ast>,
}

/// Enclosing declaration kinds between the annotated type and the code
/// being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    AnnotatedType,
    NestedType,
    LocalType,
    AnonymousClass,
    EnumConstantBody,
}

/// Visitor reporting candidate calls to `on_site`.
pub struct CallSiteScanner<'ast, F> {
    frames: Vec<FrameKind>,
    file: usize,
    owner: TypeHash,
    member: Option<&'ast Member<'ast>>,
    on_site: F,
    found: usize,
}

impl<'ast, F> CallSiteScanner<'ast, F>
where
    F: FnMut(InvocationSite<'ast>),
{
    pub fn new(file: usize, owner: TypeHash, on_site: F) -> Self {
        Self {
            frames: Vec::new(),
            file,
            owner,
            member: None,
            on_site,
            found: 0,
        }
    }

    /// Number of sites reported so far.
    pub fn found(&self) -> usize {
        self.found
    }

    /// Scan `decl` as the annotated type.
    pub fn scan(&mut self, decl: &'ast TypeDecl<'ast>) {
        self.frames.push(FrameKind::AnnotatedType);
        walk_type_decl(self, decl);
        self.frames.pop();
    }

    fn in_annotated_type(&self) -> bool {
        self.frames.len() == 1
    }

    fn with_frame(&mut self, kind: FrameKind, f: impl FnOnce(&mut Self)) {
        self.frames.push(kind);
        f(self);
        self.frames.pop();
    }

    /// Report `root` if it is, parentheses aside, a call.
    fn slot(&mut self, root: &'ast Expr<'ast>) {
        if let Some(call) = root.unparenthesized().as_call() {
            self.found += 1;
            let site = Site {
                file: self.file,
                owner: self.owner,
                member: self.member,
            };
            (self.on_site)(InvocationSite { call, site });
        }
    }

    fn statement_slots(&mut self, stmt: &'ast Stmt<'ast>) {
        match stmt {
            Stmt::Expr(s) => self.slot(s.expr),
            Stmt::LocalVar(decl) => {
                for var in decl.vars {
                    if let Some(init) = var.init {
                        self.slot(init);
                    }
                }
            }
            Stmt::If(s) => self.slot(s.condition),
            Stmt::While(s) => self.slot(s.condition),
            Stmt::DoWhile(s) => self.slot(s.condition),
            Stmt::ForEach(s) => self.slot(s.iterable),
            Stmt::Return(s) => {
                if let Some(value) = s.value {
                    self.slot(value);
                }
            }
            Stmt::Throw(s) => self.slot(s.expr),
            Stmt::Switch(s) => self.slot(s.selector),
            Stmt::Synchronized(s) => self.slot(s.lock),
            Stmt::Assert(s) => {
                self.slot(s.condition);
                if let Some(message) = s.message {
                    self.slot(message);
                }
            }
            // For loops are handled in `visit_stmt` so init statements come first.
            Stmt::For(_)
            | Stmt::Block(_)
            | Stmt::LocalClass(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Try(_)
            | Stmt::Labeled(_)
            | Stmt::Empty(_) => {}
        }
    }
}

impl<'ast, F> Visitor<'ast> for CallSiteScanner<'ast, F>
where
    F: FnMut(InvocationSite<'ast>),
{
    /// Reached for member types only; the annotated type enters via `scan`.
    fn visit_type_decl(&mut self, decl: &'ast TypeDecl<'ast>) {
        self.with_frame(FrameKind::NestedType, |s| walk_type_decl(s, decl));
    }

    fn visit_enum_constant(&mut self, constant: &'ast EnumConstant<'ast>) {
        for arg in constant.args {
            self.visit_expr(arg);
        }
        if let Some(body) = constant.body {
            self.with_frame(FrameKind::EnumConstantBody, |s| s.visit_class_body(body));
        }
    }

    fn visit_member(&mut self, member: &'ast Member<'ast>) {
        if !self.in_annotated_type() {
            walk_member(self, member);
            return;
        }
        let outer = self.member.replace(member);
        walk_member(self, member);
        self.member = outer;
    }

    fn visit_field_decl(&mut self, field: &'ast FieldDecl<'ast>) {
        for var in field.vars {
            if let Some(init) = var.init {
                if self.in_annotated_type() {
                    self.slot(init);
                }
                self.visit_expr(init);
            }
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        if let Stmt::LocalClass(decl) = stmt {
            self.with_frame(FrameKind::LocalType, |s| walk_type_decl(s, decl));
            return;
        }
        if let Stmt::For(s) = stmt {
            for init in s.init {
                self.visit_stmt(init);
            }
            if self.in_annotated_type() {
                if let Some(condition) = s.condition {
                    self.slot(condition);
                }
                for update in s.update {
                    self.slot(update);
                }
            }
            if let Some(condition) = s.condition {
                self.visit_expr(condition);
            }
            for update in s.update {
                self.visit_expr(update);
            }
            self.visit_stmt(&s.body);
            return;
        }
        if self.in_annotated_type() {
            self.statement_slots(stmt);
        }
        walk_stmt(self, stmt);
    }

    fn visit_new_expr(&mut self, new: &'ast NewExpr<'ast>) {
        self.visit_type_expr(&new.ty);
        for arg in new.args {
            self.visit_expr(arg);
        }
        if let Some(body) = new.body {
            self.with_frame(FrameKind::AnonymousClass, |s| s.visit_class_body(body));
        }
    }
}

/// Report every candidate call in `decl` to `on_site`, in source order.
/// Returns the number of sites reported.
pub fn scan<'ast, F>(decl: &'ast TypeDecl<'ast>, file: usize, owner: TypeHash, on_site: F) -> usize
where
    F: FnMut(InvocationSite<'ast>),
{
    let mut scanner = CallSiteScanner::new(file, owner, on_site);
    scanner.scan(decl);
    scanner.found()
}
