//! Statement parsing.

use bumpalo::collections::Vec as BVec;
use javelin_core::Span;

use super::parser::Parser;
use crate::ast::decl::{Modifiers, VarDeclarator};
use crate::ast::stmt::*;
use crate::ast::types::TypeExpr;
use crate::ast::{Ident, ParseError};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse `{ stmts }`, recovering from errors inside the block.
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut stmts = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.record(err);
                    self.synchronize();
                }
            }
        }

        let close = self.expect(TokenKind::RightBrace)?;
        Ok(Block {
            stmts: stmts.into_bump_slice(),
            span: open.span.merge(close.span),
        })
    }

    /// Parse a single statement.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(token.span))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return(ReturnStmt {
                    value,
                    span: self.span_from(token.span),
                }))
            }
            TokenKind::Break | TokenKind::Continue => {
                self.advance();
                let label = self
                    .eat(TokenKind::Identifier)
                    .map(|t| Ident::new(t.lexeme, t.span));
                self.expect(TokenKind::Semicolon)?;
                let jump = JumpStmt {
                    label,
                    span: self.span_from(token.span),
                };
                Ok(if token.kind == TokenKind::Break {
                    Stmt::Break(jump)
                } else {
                    Stmt::Continue(jump)
                })
            }
            TokenKind::Throw => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Throw(ThrowStmt {
                    expr,
                    span: self.span_from(token.span),
                }))
            }
            TokenKind::Try => self.parse_try(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Synchronized if self.check_nth(1, TokenKind::LeftParen) => {
                self.advance();
                self.expect(TokenKind::LeftParen)?;
                let lock = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                let body = self.parse_block()?;
                Ok(Stmt::Synchronized(self.arena.alloc(SynchronizedStmt {
                    lock,
                    body,
                    span: self.span_from(token.span),
                })))
            }
            TokenKind::Assert => {
                self.advance();
                let condition = self.parse_expression()?;
                let message = if self.eat(TokenKind::Colon).is_some() {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Assert(self.arena.alloc(AssertStmt {
                    condition,
                    message,
                    span: self.span_from(token.span),
                })))
            }
            TokenKind::Identifier if self.check_nth(1, TokenKind::Colon) => {
                self.advance();
                self.advance();
                let body = self.parse_statement()?;
                Ok(Stmt::Labeled(self.arena.alloc(LabeledStmt {
                    label: Ident::new(token.lexeme, token.span),
                    body,
                    span: self.span_from(token.span),
                })))
            }
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Final
            | TokenKind::Abstract
            | TokenKind::Static
            | TokenKind::Strictfp
            | TokenKind::At => {
                let modifiers = self.parse_modifiers()?;
                if matches!(
                    self.peek().kind,
                    TokenKind::Class | TokenKind::Interface | TokenKind::Enum | TokenKind::At
                ) {
                    let decl = self.parse_type_decl(modifiers)?;
                    return Ok(Stmt::LocalClass(decl));
                }
                self.parse_local_var_decl(modifiers, token.span)
            }
            _ if self.is_var_decl() => self.parse_local_var_decl(Modifiers::default(), token.span),
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(ExprStmt {
                    expr,
                    span: self.span_from(token.span),
                }))
            }
        }
    }

    /// `Type a = x, b;` including the trailing semicolon.
    fn parse_local_var_decl(
        &mut self,
        modifiers: Modifiers<'ast>,
        start: Span,
    ) -> Result<Stmt<'ast>, ParseError> {
        let stmt = self.parse_local_var_rest(modifiers, start)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::LocalVar(self.arena.alloc(LocalVarStmt {
            span: self.span_from(start),
            ..stmt
        })))
    }

    /// `Type a = x, b` without a terminator.
    fn parse_local_var_rest(
        &mut self,
        modifiers: Modifiers<'ast>,
        start: Span,
    ) -> Result<LocalVarStmt<'ast>, ParseError> {
        let ty = self.parse_type()?;
        let vars = self.parse_var_declarators()?;
        Ok(LocalVarStmt {
            modifiers,
            ty,
            vars,
            span: self.span_from(start),
        })
    }

    /// `a = 1, b[] = {..}, c`
    pub fn parse_var_declarators(&mut self) -> Result<&'ast [VarDeclarator<'ast>], ParseError> {
        let mut vars = BVec::new_in(self.arena);
        loop {
            let name = self.expect(TokenKind::Identifier)?;
            let dims = self.parse_dims();
            let init = if self.eat(TokenKind::Equal).is_some() {
                Some(self.parse_var_init()?)
            } else {
                None
            };
            vars.push(VarDeclarator {
                name: Ident::new(name.lexeme, name.span),
                dims,
                init,
                span: self.span_from(name.span),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(vars.into_bump_slice())
    }

    /// A variable initializer: an expression or a bare `{..}` array initializer.
    fn parse_var_init(&mut self) -> Result<&'ast crate::ast::Expr<'ast>, ParseError> {
        if self.check(TokenKind::LeftBrace) {
            self.parse_array_init()
        } else {
            self.parse_expression()
        }
    }

    fn parse_paren_condition(&mut self) -> Result<&'ast crate::ast::Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_paren_condition()?;
        let then_stmt = self.parse_statement()?;
        let else_stmt = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: self.span_from(start),
        })))
    }

    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::While)?.span;
        let condition = self.parse_paren_condition()?;
        let body = self.parse_statement()?;
        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_do_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Do)?.span;
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        let condition = self.parse_paren_condition()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            condition,
            span: self.span_from(start),
        })))
    }

    /// Classic `for (;;)` or enhanced `for (T x : xs)`.
    fn parse_for(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::For)?.span;
        self.expect(TokenKind::LeftParen)?;

        let init_start = self.peek().span;
        let modifiers = self.parse_modifiers()?;
        let has_decl = !modifiers.flags.is_empty()
            || !modifiers.annotations.is_empty()
            || self.is_var_decl();

        if has_decl
            && let Some(after) = self.skip_type(self.position)
            && self.buffer.get(after + 1).is_some_and(|t| t.kind == TokenKind::Colon)
        {
            let ty = self.parse_type()?;
            let name = self.expect(TokenKind::Identifier)?;
            self.expect(TokenKind::Colon)?;
            let iterable = self.parse_expression()?;
            self.expect(TokenKind::RightParen)?;
            let body = self.parse_statement()?;
            return Ok(Stmt::ForEach(self.arena.alloc(ForEachStmt {
                modifiers,
                ty,
                name: Ident::new(name.lexeme, name.span),
                iterable,
                body,
                span: self.span_from(start),
            })));
        }

        let mut init = BVec::new_in(self.arena);
        if has_decl {
            let decl = self.parse_local_var_rest(modifiers, init_start)?;
            init.push(Stmt::LocalVar(self.arena.alloc(decl)));
        } else if !self.check(TokenKind::Semicolon) {
            loop {
                let expr = self.parse_expression()?;
                init.push(Stmt::Expr(ExprStmt {
                    expr,
                    span: expr.span(),
                }));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::Semicolon)?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let mut update = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                update.push(self.parse_expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_statement()?;

        Ok(Stmt::For(self.arena.alloc(ForStmt {
            init: init.into_bump_slice(),
            condition,
            update: update.into_bump_slice(),
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_try(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Try)?.span;

        let mut resources = BVec::new_in(self.arena);
        if self.eat(TokenKind::LeftParen).is_some() {
            while !self.check(TokenKind::RightParen) && !self.is_eof() {
                let res_start = self.peek().span;
                let modifiers = self.parse_modifiers()?;
                if !modifiers.flags.is_empty() || self.is_var_decl() {
                    let decl = self.parse_local_var_rest(modifiers, res_start)?;
                    resources.push(Stmt::LocalVar(self.arena.alloc(decl)));
                } else {
                    let expr = self.parse_expression()?;
                    resources.push(Stmt::Expr(ExprStmt {
                        expr,
                        span: expr.span(),
                    }));
                }
                if self.eat(TokenKind::Semicolon).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParen)?;
        }

        let body = self.parse_block()?;

        let mut catches = BVec::new_in(self.arena);
        while self.check(TokenKind::Catch) {
            let catch_start = self.advance().span;
            self.expect(TokenKind::LeftParen)?;
            let modifiers = self.parse_modifiers()?;
            let mut types: BVec<'ast, TypeExpr<'ast>> = BVec::new_in(self.arena);
            loop {
                types.push(self.parse_type()?);
                if self.eat(TokenKind::Pipe).is_none() {
                    break;
                }
            }
            let name = self.expect(TokenKind::Identifier)?;
            self.expect(TokenKind::RightParen)?;
            let catch_body = self.parse_block()?;
            catches.push(CatchClause {
                modifiers,
                types: types.into_bump_slice(),
                name: Ident::new(name.lexeme, name.span),
                body: catch_body,
                span: self.span_from(catch_start),
            });
        }

        let finally = if self.eat(TokenKind::Finally).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };

        if catches.is_empty() && finally.is_none() && resources.is_empty() {
            return Err(ParseError::expected_token(
                self.peek().span,
                "'catch' or 'finally'",
                self.peek().kind.description(),
            ));
        }

        Ok(Stmt::Try(self.arena.alloc(TryStmt {
            resources: resources.into_bump_slice(),
            body,
            catches: catches.into_bump_slice(),
            finally,
            span: self.span_from(start),
        })))
    }

    /// `switch (x) { case a, b: ..; case c -> ..; default: .. }`
    fn parse_switch(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Switch)?.span;
        let selector = self.parse_paren_condition()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut cases = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            let case_start = self.peek().span;
            let mut labels = BVec::new_in(self.arena);
            if self.eat(TokenKind::Default).is_none() {
                self.expect(TokenKind::Case)?;
                loop {
                    labels.push(self.parse_case_label()?);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }

            let mut body = BVec::new_in(self.arena);
            if self.eat(TokenKind::Arrow).is_some() {
                body.push(self.parse_statement()?);
            } else {
                self.expect(TokenKind::Colon)?;
                while !matches!(
                    self.peek().kind,
                    TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
                ) {
                    match self.parse_statement() {
                        Ok(stmt) => body.push(stmt),
                        Err(err) => {
                            self.record(err);
                            self.synchronize();
                        }
                    }
                }
            }

            cases.push(SwitchCase {
                labels: labels.into_bump_slice(),
                body: body.into_bump_slice(),
                span: self.span_from(case_start),
            });
        }
        self.expect(TokenKind::RightBrace)?;

        Ok(Stmt::Switch(self.arena.alloc(SwitchStmt {
            selector,
            cases: cases.into_bump_slice(),
            span: self.span_from(start),
        })))
    }

    /// A `case` label. A bare name before `->` is a constant, not a lambda.
    fn parse_case_label(&mut self) -> Result<&'ast crate::ast::Expr<'ast>, ParseError> {
        if self.check(TokenKind::Identifier)
            && matches!(
                self.peek_nth(1).kind,
                TokenKind::Arrow | TokenKind::Comma | TokenKind::Colon
            )
        {
            let token = self.advance();
            return Ok(self
                .arena
                .alloc(crate::ast::Expr::Ident(Ident::new(token.lexeme, token.span))));
        }
        self.parse_expr(crate::ast::TERNARY_BP + 1)
    }
}
