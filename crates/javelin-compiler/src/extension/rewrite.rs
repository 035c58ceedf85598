//! Applying rewrite decisions.
//!
//! [`RewriteFolder`] rebuilds an annotated type with every replacement
//! spliced in, in one pass after all sites have been decided. The input tree
//! is never modified. Subtrees without a replacement are shared with the
//! input: a fold returns the original reference whenever nothing below it
//! changed.
//!
//! Like the scanner, the folder stays out of member types, local classes,
//! anonymous class bodies and enum constant bodies.

use std::ptr;

use bumpalo::Bump;
use javelin_parser::ast::{
    Annotation, ArrayInitExpr, AssertStmt, AssignExpr, BinaryExpr, Block, CallExpr, CallId,
    CastExpr, CatchClause, ConstructorDecl, DoWhileStmt, Expr, ExprStmt, FieldAccessExpr,
    FieldDecl, ForEachStmt, ForStmt, IfStmt, IndexExpr, InitializerDecl, InstanceOfExpr,
    LabeledStmt, LambdaBody, LambdaExpr, LocalVarStmt, Member, MethodDecl, MethodRefExpr,
    Modifiers, NewArrayExpr, NewExpr, ParenExpr, PostfixExpr, ReturnStmt, Stmt, SwitchCase,
    SwitchStmt, SynchronizedStmt, TernaryExpr, ThrowStmt, TryStmt, TypeDecl, UnaryExpr,
    VarDeclarator, WhileStmt,
};
use rustc_hash::FxHashMap;

use super::engine::RewriteDecision;

type Replacement<'ast> = (&'ast Expr<'ast>, &'ast [&'ast Expr<'ast>]);

pub struct RewriteFolder<'ast> {
    arena: &'ast Bump,
    replacements: FxHashMap<CallId, Replacement<'ast>>,
    applied: usize,
}

impl<'ast> RewriteFolder<'ast> {
    /// A folder for the `Replace` entries of `decisions`.
    pub fn new(arena: &'ast Bump, decisions: &[RewriteDecision<'ast>]) -> Self {
        let replacements = decisions
            .iter()
            .filter_map(|decision| match *decision {
                RewriteDecision::Replace { call_id, callee, args } => Some((call_id, (callee, args))),
                RewriteDecision::Keep(_) => None,
            })
            .collect();
        Self {
            arena,
            replacements,
            applied: 0,
        }
    }

    /// Replacements applied so far.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Rebuild `decl`, dropping `strip` (compared by address) from its
    /// annotations.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn fold_type_decl(
        &mut self,
        decl: &'ast TypeDecl<'ast>,
        strip: Option<&'ast Annotation<'ast>>,
    ) -> &'ast TypeDecl<'ast> {
        let before = self.applied;
        let members = self.fold_members(decl.members);
        let modifiers = match strip {
            Some(annotation) => self.strip_annotation(decl.modifiers, annotation),
            None => decl.modifiers,
        };
        if self.applied == before && modifiers == decl.modifiers {
            return decl;
        }
        self.arena.alloc(TypeDecl {
            modifiers,
            members,
            ..*decl
        })
    }

    fn strip_annotation(&self, modifiers: Modifiers<'ast>, strip: &'ast Annotation<'ast>) -> Modifiers<'ast> {
        if !modifiers.annotations.iter().any(|a| ptr::eq(a, strip)) {
            return modifiers;
        }
        let kept: Vec<Annotation<'ast>> = modifiers
            .annotations
            .iter()
            .filter(|a| !ptr::eq(*a, strip))
            .copied()
            .collect();
        Modifiers {
            annotations: self.arena.alloc_slice_copy(&kept),
            ..modifiers
        }
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    fn fold_members(&mut self, members: &'ast [Member<'ast>]) -> &'ast [Member<'ast>] {
        let before = self.applied;
        let folded: Vec<Member<'ast>> = members.iter().map(|m| self.fold_member(m)).collect();
        if self.applied == before {
            members
        } else {
            self.arena.alloc_slice_copy(&folded)
        }
    }

    fn fold_member(&mut self, member: &'ast Member<'ast>) -> Member<'ast> {
        let before = self.applied;
        match *member {
            Member::Field(field) => {
                let vars = self.fold_vars(field.vars);
                if self.applied == before {
                    return *member;
                }
                Member::Field(self.arena.alloc(FieldDecl { vars, ..*field }))
            }
            Member::Method(method) => {
                let Some(body) = &method.body else {
                    return *member;
                };
                let body = self.fold_block(body);
                if self.applied == before {
                    return *member;
                }
                Member::Method(self.arena.alloc(MethodDecl {
                    body: Some(body),
                    ..*method
                }))
            }
            Member::Constructor(ctor) => {
                let body = self.fold_block(&ctor.body);
                if self.applied == before {
                    return *member;
                }
                Member::Constructor(self.arena.alloc(ConstructorDecl { body, ..*ctor }))
            }
            Member::Initializer(init) => {
                let body = self.fold_block(&init.body);
                if self.applied == before {
                    return *member;
                }
                Member::Initializer(self.arena.alloc(InitializerDecl { body, ..*init }))
            }
            Member::Type(_) => *member,
        }
    }

    fn fold_vars(&mut self, vars: &'ast [VarDeclarator<'ast>]) -> &'ast [VarDeclarator<'ast>] {
        let before = self.applied;
        let folded: Vec<VarDeclarator<'ast>> = vars
            .iter()
            .map(|var| VarDeclarator {
                init: var.init.map(|init| self.fold_expr(init)),
                ..*var
            })
            .collect();
        if self.applied == before {
            vars
        } else {
            self.arena.alloc_slice_copy(&folded)
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn fold_block(&mut self, block: &'ast Block<'ast>) -> Block<'ast> {
        Block {
            stmts: self.fold_stmts(block.stmts),
            ..*block
        }
    }

    fn fold_stmts(&mut self, stmts: &'ast [Stmt<'ast>]) -> &'ast [Stmt<'ast>] {
        let before = self.applied;
        let folded: Vec<Stmt<'ast>> = stmts.iter().map(|s| self.fold_stmt(s)).collect();
        if self.applied == before {
            stmts
        } else {
            self.arena.alloc_slice_copy(&folded)
        }
    }

    fn fold_opt(&mut self, expr: Option<&'ast Expr<'ast>>) -> Option<&'ast Expr<'ast>> {
        expr.map(|e| self.fold_expr(e))
    }

    fn fold_stmt(&mut self, stmt: &'ast Stmt<'ast>) -> Stmt<'ast> {
        let before = self.applied;
        let folded = match stmt {
            Stmt::Block(block) => Stmt::Block(self.fold_block(block)),
            Stmt::LocalVar(decl) => {
                let vars = self.fold_vars(decl.vars);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::LocalVar(self.arena.alloc(LocalVarStmt { vars, ..**decl }))
            }
            Stmt::Expr(s) => Stmt::Expr(ExprStmt {
                expr: self.fold_expr(s.expr),
                ..*s
            }),
            Stmt::If(s) => {
                let condition = self.fold_expr(s.condition);
                let then_stmt = self.fold_stmt(&s.then_stmt);
                let else_stmt = s.else_stmt.as_ref().map(|e| self.fold_stmt(e));
                if self.applied == before {
                    return *stmt;
                }
                Stmt::If(self.arena.alloc(IfStmt {
                    condition,
                    then_stmt,
                    else_stmt,
                    ..**s
                }))
            }
            Stmt::While(s) => {
                let condition = self.fold_expr(s.condition);
                let body = self.fold_stmt(&s.body);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::While(self.arena.alloc(WhileStmt {
                    condition,
                    body,
                    ..**s
                }))
            }
            Stmt::DoWhile(s) => {
                let body = self.fold_stmt(&s.body);
                let condition = self.fold_expr(s.condition);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
                    body,
                    condition,
                    ..**s
                }))
            }
            Stmt::For(s) => {
                let init = self.fold_stmts(s.init);
                let condition = self.fold_opt(s.condition);
                let update = self.fold_exprs(s.update);
                let body = self.fold_stmt(&s.body);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::For(self.arena.alloc(ForStmt {
                    init,
                    condition,
                    update,
                    body,
                    ..**s
                }))
            }
            Stmt::ForEach(s) => {
                let iterable = self.fold_expr(s.iterable);
                let body = self.fold_stmt(&s.body);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::ForEach(self.arena.alloc(ForEachStmt {
                    iterable,
                    body,
                    ..**s
                }))
            }
            Stmt::Return(s) => Stmt::Return(ReturnStmt {
                value: self.fold_opt(s.value),
                ..*s
            }),
            Stmt::Throw(s) => Stmt::Throw(ThrowStmt {
                expr: self.fold_expr(s.expr),
                ..*s
            }),
            Stmt::Try(s) => {
                let resources = self.fold_stmts(s.resources);
                let body = self.fold_block(&s.body);
                let catches = self.fold_catches(s.catches);
                let finally = s.finally.as_ref().map(|f| self.fold_block(f));
                if self.applied == before {
                    return *stmt;
                }
                Stmt::Try(self.arena.alloc(TryStmt {
                    resources,
                    body,
                    catches,
                    finally,
                    ..**s
                }))
            }
            Stmt::Switch(s) => {
                let selector = self.fold_expr(s.selector);
                let cases = self.fold_cases(s.cases);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::Switch(self.arena.alloc(SwitchStmt {
                    selector,
                    cases,
                    ..**s
                }))
            }
            Stmt::Synchronized(s) => {
                let lock = self.fold_expr(s.lock);
                let body = self.fold_block(&s.body);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::Synchronized(self.arena.alloc(SynchronizedStmt { lock, body, ..**s }))
            }
            Stmt::Labeled(s) => {
                let body = self.fold_stmt(&s.body);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::Labeled(self.arena.alloc(LabeledStmt { body, ..**s }))
            }
            Stmt::Assert(s) => {
                let condition = self.fold_expr(s.condition);
                let message = self.fold_opt(s.message);
                if self.applied == before {
                    return *stmt;
                }
                Stmt::Assert(self.arena.alloc(AssertStmt {
                    condition,
                    message,
                    ..**s
                }))
            }
            Stmt::LocalClass(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => return *stmt,
        };
        if self.applied == before { *stmt } else { folded }
    }

    fn fold_catches(&mut self, catches: &'ast [CatchClause<'ast>]) -> &'ast [CatchClause<'ast>] {
        let before = self.applied;
        let folded: Vec<CatchClause<'ast>> = catches
            .iter()
            .map(|c| CatchClause {
                body: self.fold_block(&c.body),
                ..*c
            })
            .collect();
        if self.applied == before {
            catches
        } else {
            self.arena.alloc_slice_copy(&folded)
        }
    }

    fn fold_cases(&mut self, cases: &'ast [SwitchCase<'ast>]) -> &'ast [SwitchCase<'ast>] {
        let before = self.applied;
        let folded: Vec<SwitchCase<'ast>> = cases
            .iter()
            .map(|c| SwitchCase {
                labels: self.fold_exprs(c.labels),
                body: self.fold_stmts(c.body),
                ..*c
            })
            .collect();
        if self.applied == before {
            cases
        } else {
            self.arena.alloc_slice_copy(&folded)
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn fold_exprs(&mut self, exprs: &'ast [&'ast Expr<'ast>]) -> &'ast [&'ast Expr<'ast>] {
        let before = self.applied;
        let folded: Vec<&'ast Expr<'ast>> = exprs.iter().map(|e| self.fold_expr(e)).collect();
        if self.applied == before {
            exprs
        } else {
            self.arena.alloc_slice_copy(&folded)
        }
    }

    fn fold_expr(&mut self, expr: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let before = self.applied;
        let folded = match *expr {
            Expr::Literal(_) | Expr::Ident(_) | Expr::This(_) | Expr::Super(_) | Expr::ClassLit(_) => {
                return expr;
            }
            Expr::Call(call) => return self.fold_call(expr, call),
            Expr::FieldAccess(e) => {
                let target = self.fold_expr(e.target);
                if self.applied == before {
                    return expr;
                }
                Expr::FieldAccess(self.arena.alloc(FieldAccessExpr { target, ..*e }))
            }
            Expr::New(e) => {
                let args = self.fold_exprs(e.args);
                if self.applied == before {
                    return expr;
                }
                Expr::New(self.arena.alloc(NewExpr { args, ..*e }))
            }
            Expr::NewArray(e) => {
                let dim_exprs = self.fold_exprs(e.dim_exprs);
                let init = e.init.map(|init| self.fold_array_init(init));
                if self.applied == before {
                    return expr;
                }
                Expr::NewArray(self.arena.alloc(NewArrayExpr {
                    dim_exprs,
                    init,
                    ..*e
                }))
            }
            Expr::ArrayInit(e) => Expr::ArrayInit(self.fold_array_init(e)),
            Expr::Index(e) => {
                let target = self.fold_expr(e.target);
                let index = self.fold_expr(e.index);
                if self.applied == before {
                    return expr;
                }
                Expr::Index(self.arena.alloc(IndexExpr { target, index, ..*e }))
            }
            Expr::Unary(e) => {
                let operand = self.fold_expr(e.operand);
                if self.applied == before {
                    return expr;
                }
                Expr::Unary(self.arena.alloc(UnaryExpr { operand, ..*e }))
            }
            Expr::Binary(e) => {
                let left = self.fold_expr(e.left);
                let right = self.fold_expr(e.right);
                if self.applied == before {
                    return expr;
                }
                Expr::Binary(self.arena.alloc(BinaryExpr { left, right, ..*e }))
            }
            Expr::InstanceOf(e) => {
                let inner = self.fold_expr(e.expr);
                if self.applied == before {
                    return expr;
                }
                Expr::InstanceOf(self.arena.alloc(InstanceOfExpr { expr: inner, ..*e }))
            }
            Expr::Assign(e) => {
                let target = self.fold_expr(e.target);
                let value = self.fold_expr(e.value);
                if self.applied == before {
                    return expr;
                }
                Expr::Assign(self.arena.alloc(AssignExpr { target, value, ..*e }))
            }
            Expr::Ternary(e) => {
                let condition = self.fold_expr(e.condition);
                let then_expr = self.fold_expr(e.then_expr);
                let else_expr = self.fold_expr(e.else_expr);
                if self.applied == before {
                    return expr;
                }
                Expr::Ternary(self.arena.alloc(TernaryExpr {
                    condition,
                    then_expr,
                    else_expr,
                    ..*e
                }))
            }
            Expr::Cast(e) => {
                let inner = self.fold_expr(e.expr);
                if self.applied == before {
                    return expr;
                }
                Expr::Cast(self.arena.alloc(CastExpr { expr: inner, ..*e }))
            }
            Expr::Postfix(e) => {
                let operand = self.fold_expr(e.operand);
                if self.applied == before {
                    return expr;
                }
                Expr::Postfix(self.arena.alloc(PostfixExpr { operand, ..*e }))
            }
            Expr::Paren(e) => {
                let inner = self.fold_expr(e.expr);
                if self.applied == before {
                    return expr;
                }
                Expr::Paren(self.arena.alloc(ParenExpr { expr: inner, ..*e }))
            }
            Expr::Lambda(e) => {
                let body = match &e.body {
                    LambdaBody::Expr(body) => LambdaBody::Expr(self.fold_expr(body)),
                    LambdaBody::Block(block) => LambdaBody::Block(self.fold_block(block)),
                };
                if self.applied == before {
                    return expr;
                }
                Expr::Lambda(self.arena.alloc(LambdaExpr { body, ..*e }))
            }
            Expr::MethodRef(e) => {
                let target = self.fold_expr(e.target);
                if self.applied == before {
                    return expr;
                }
                Expr::MethodRef(self.arena.alloc(MethodRefExpr { target, ..*e }))
            }
        };
        if self.applied == before {
            expr
        } else {
            self.arena.alloc(folded)
        }
    }

    fn fold_array_init(&mut self, init: &'ast ArrayInitExpr<'ast>) -> &'ast ArrayInitExpr<'ast> {
        let before = self.applied;
        let elements = self.fold_exprs(init.elements);
        if self.applied == before {
            init
        } else {
            self.arena.alloc(ArrayInitExpr { elements, ..*init })
        }
    }

    fn fold_call(&mut self, expr: &'ast Expr<'ast>, call: &'ast CallExpr<'ast>) -> &'ast Expr<'ast> {
        if let Some(&(callee, args)) = self.replacements.get(&call.id) {
            self.applied += 1;
            // A rewritten call may still contain sites inside its receiver or
            // arguments, e.g. in a lambda body.
            let args = self.fold_exprs(args);
            return self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr { callee, args, ..*call })));
        }

        let before = self.applied;
        let callee = self.fold_expr(call.callee);
        let args = self.fold_exprs(call.args);
        if self.applied == before {
            return expr;
        }
        self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr { callee, args, ..*call })))
    }
}

/// Rebuild `decl` with `decisions` applied and `strip` removed. Returns the
/// new declaration and the number of calls replaced.
pub fn apply_decisions<'ast>(
    arena: &'ast Bump,
    decl: &'ast TypeDecl<'ast>,
    decisions: &[RewriteDecision<'ast>],
    strip: Option<&'ast Annotation<'ast>>,
) -> (&'ast TypeDecl<'ast>, usize) {
    let mut folder = RewriteFolder::new(arena, decisions);
    let rebuilt = folder.fold_type_decl(decl, strip);
    (rebuilt, folder.applied())
}
