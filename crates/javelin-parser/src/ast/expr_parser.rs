//! Expression parsing using Pratt parsing (precedence climbing).

use bumpalo::collections::Vec as BVec;
use javelin_core::Span;

use super::parser::Parser;
use super::type_parser::primitive_from_token;
use crate::ast::expr::*;
use crate::ast::types::{TypeBase, TypeExpr};
use crate::ast::{
    AssignOp, BinaryOp, INSTANCEOF_BP, Ident, ParseError, ParseErrorKind, Path, PostfixOp,
    TERNARY_BP, UnaryOp,
};
use crate::lexer::TokenKind;

/// Binding power of postfix forms: call, member access, index.
const POSTFIX_BP: u8 = 27;

impl<'ast> Parser<'ast> {
    /// Parse a full expression, including assignments.
    pub fn parse_expression(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        self.parse_expr(0)
    }

    /// Parse an expression with a minimum binding power.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind;

            if let Some(op) = PostfixOp::from_token(kind) {
                if PostfixOp::binding_power() < min_bp {
                    break;
                }
                let token = self.advance();
                let span = lhs.span().merge(token.span);
                lhs = self.arena.alloc(Expr::Postfix(self.arena.alloc(PostfixExpr {
                    operand: lhs,
                    op,
                    span,
                })));
                continue;
            }

            if matches!(
                kind,
                TokenKind::Dot | TokenKind::LeftBracket | TokenKind::ColonColon
            ) {
                if POSTFIX_BP < min_bp {
                    break;
                }
                lhs = match kind {
                    TokenKind::Dot => self.parse_member_access(lhs)?,
                    TokenKind::LeftBracket => self.parse_index(lhs)?,
                    _ => self.parse_method_ref(lhs)?,
                };
                continue;
            }

            if kind == TokenKind::Question {
                if TERNARY_BP < min_bp {
                    break;
                }
                lhs = self.parse_ternary(lhs)?;
                continue;
            }

            if kind == TokenKind::Instanceof {
                if INSTANCEOF_BP.0 < min_bp {
                    break;
                }
                lhs = self.parse_instanceof(lhs)?;
                continue;
            }

            if let Some(op) = AssignOp::from_token(kind) {
                let (l_bp, r_bp) = AssignOp::binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let value = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(value.span());
                lhs = self.arena.alloc(Expr::Assign(self.arena.alloc(AssignExpr {
                    target: lhs,
                    op,
                    value,
                    span,
                })));
                continue;
            }

            if let Some(op) = BinaryOp::from_token(kind) {
                let (l_bp, r_bp) = op.binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let right = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(right.span());
                lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                    left: lhs,
                    op,
                    right,
                    span,
                })));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Parse the start of an expression.
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::IntLiteral
            | TokenKind::LongLiteral
            | TokenKind::FloatLiteral
            | TokenKind::DoubleLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                self.advance();
                let kind = self.literal_kind(token.kind, token.lexeme, token.span)?;
                Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
                    kind,
                    span: token.span,
                })))
            }

            TokenKind::Identifier => {
                if self.check_nth(1, TokenKind::Arrow) {
                    return self.parse_lambda();
                }
                self.advance();
                let ident = Ident::new(token.lexeme, token.span);
                let name = self.arena.alloc(Expr::Ident(ident));
                if self.check(TokenKind::LeftParen) {
                    return self.finish_call(name, token.span);
                }
                Ok(name)
            }

            TokenKind::This | TokenKind::Super => {
                self.advance();
                let expr = self.arena.alloc(if token.kind == TokenKind::This {
                    Expr::This(token.span)
                } else {
                    Expr::Super(token.span)
                });
                if self.check(TokenKind::LeftParen) {
                    return self.finish_call(expr, token.span);
                }
                Ok(expr)
            }

            TokenKind::New => self.parse_new(),

            TokenKind::LeftParen => {
                if self.is_lambda_params() {
                    return self.parse_lambda();
                }
                if self.is_cast() {
                    return self.parse_cast();
                }
                self.advance();
                let expr = self.parse_expression()?;
                let close = self.expect(TokenKind::RightParen)?;
                Ok(self.arena.alloc(Expr::Paren(self.arena.alloc(ParenExpr {
                    expr,
                    span: token.span.merge(close.span),
                }))))
            }

            TokenKind::LeftBrace => self.parse_array_init(),

            kind if primitive_from_token(kind).is_some() => {
                // `int.class`, `int[].class`
                let ty = self.parse_type()?;
                self.expect(TokenKind::Dot)?;
                self.expect(TokenKind::Class)?;
                Ok(self.arena.alloc(Expr::ClassLit(self.arena.alloc(ClassLitExpr {
                    ty,
                    span: self.span_from(token.span),
                }))))
            }

            kind => {
                if let Some(op) = UnaryOp::from_token(kind) {
                    self.advance();
                    let operand = self.parse_expr(UnaryOp::binding_power())?;
                    let span = token.span.merge(operand.span());
                    return Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr {
                        op,
                        operand,
                        span,
                    }))));
                }
                if kind == TokenKind::Eof {
                    return Err(ParseError::unexpected_eof(token.span));
                }
                Err(ParseError::expected_expression(token.span, kind.description()))
            }
        }
    }

    /// Parse `(args)` after `callee` and build the call node.
    fn finish_call(
        &mut self,
        callee: &'ast Expr<'ast>,
        start: Span,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        let args = self.parse_arguments()?;
        let id = self.fresh_call_id();
        Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            id,
            callee,
            args,
            span: self.span_from(start),
        }))))
    }

    /// Parse a parenthesized argument list.
    pub fn parse_arguments(&mut self) -> Result<&'ast [&'ast Expr<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args.into_bump_slice())
    }

    /// Parse what follows `.`: a field, a call, `.class`, `.this` or `.<T>call`.
    fn parse_member_access(
        &mut self,
        target: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        let dot = self.expect(TokenKind::Dot)?;
        let start = target.span();

        match self.peek().kind {
            TokenKind::Class => {
                self.advance();
                let Some(ty) = self.expr_to_type(target, 0) else {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidExpression,
                        dot.span,
                        "'.class' must follow a type name",
                    ));
                };
                return Ok(self.arena.alloc(Expr::ClassLit(self.arena.alloc(ClassLitExpr {
                    ty,
                    span: self.span_from(start),
                }))));
            }
            TokenKind::This => {
                // `Outer.this`
                self.advance();
                return Ok(self.arena.alloc(Expr::This(self.span_from(start))));
            }
            TokenKind::Less => {
                // Explicit method type arguments are parsed and dropped.
                self.parse_type_args()?;
            }
            _ => {}
        }

        let name = self.expect(TokenKind::Identifier)?;
        let access = self.arena.alloc(Expr::FieldAccess(self.arena.alloc(FieldAccessExpr {
            target,
            name: Ident::new(name.lexeme, name.span),
            span: start.merge(name.span),
        })));

        if self.check(TokenKind::LeftParen) {
            return self.finish_call(access, start);
        }
        Ok(access)
    }

    /// Parse `[index]`, or `[]...` followed by `.class`.
    fn parse_index(&mut self, target: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        if self.check_nth(1, TokenKind::RightBracket) {
            let dims = self.parse_dims();
            self.expect(TokenKind::Dot)?;
            let class = self.expect(TokenKind::Class)?;
            let Some(ty) = self.expr_to_type(target, dims) else {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidExpression,
                    class.span,
                    "'.class' must follow a type name",
                ));
            };
            return Ok(self.arena.alloc(Expr::ClassLit(self.arena.alloc(ClassLitExpr {
                ty,
                span: self.span_from(target.span()),
            }))));
        }

        self.expect(TokenKind::LeftBracket)?;
        let index = self.parse_expression()?;
        let close = self.expect(TokenKind::RightBracket)?;
        Ok(self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
            target,
            index,
            span: target.span().merge(close.span),
        }))))
    }

    fn parse_method_ref(
        &mut self,
        target: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::ColonColon)?;
        let token = *self.peek();
        if !matches!(token.kind, TokenKind::Identifier | TokenKind::New) {
            return Err(ParseError::expected_identifier(token.span, token.kind.description()));
        }
        self.advance();
        Ok(self.arena.alloc(Expr::MethodRef(self.arena.alloc(MethodRefExpr {
            target,
            name: Ident::new(token.lexeme, token.span),
            span: target.span().merge(token.span),
        }))))
    }

    fn parse_ternary(&mut self, condition: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::Question)?;
        let then_expr = self.parse_expr(TERNARY_BP + 1)?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_expr(TERNARY_BP)?;
        let span = condition.span().merge(else_expr.span());
        Ok(self.arena.alloc(Expr::Ternary(self.arena.alloc(TernaryExpr {
            condition,
            then_expr,
            else_expr,
            span,
        }))))
    }

    fn parse_instanceof(&mut self, expr: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::Instanceof)?;
        self.eat(TokenKind::Final);
        let ty = self.parse_type()?;
        let binding = self
            .eat(TokenKind::Identifier)
            .map(|t| Ident::new(t.lexeme, t.span));
        Ok(self.arena.alloc(Expr::InstanceOf(self.arena.alloc(InstanceOfExpr {
            expr,
            ty,
            binding,
            span: self.span_from(expr.span()),
        }))))
    }

    /// Parse `new T(args) {body}`, `new T[n]` or `new T[] {..}`.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::New)?.span;
        if self.check(TokenKind::Less) {
            self.parse_type_args()?;
        }
        let mut ty = self.parse_type_no_dims()?;

        if self.check(TokenKind::LeftBracket) {
            let mut dim_exprs = BVec::new_in(self.arena);
            let mut dims = 0u8;
            while self.check(TokenKind::LeftBracket) {
                if self.check_nth(1, TokenKind::RightBracket) {
                    self.advance();
                    self.advance();
                } else if dims as usize == dim_exprs.len() {
                    self.advance();
                    dim_exprs.push(self.parse_expression()?);
                    self.expect(TokenKind::RightBracket)?;
                } else {
                    break;
                }
                dims += 1;
            }
            ty.dims = dims;
            let init = if self.check(TokenKind::LeftBrace) {
                match self.parse_array_init()? {
                    Expr::ArrayInit(init) => Some(*init),
                    _ => None,
                }
            } else {
                None
            };
            return Ok(self.arena.alloc(Expr::NewArray(self.arena.alloc(NewArrayExpr {
                ty,
                dim_exprs: dim_exprs.into_bump_slice(),
                init,
                span: self.span_from(start),
            }))));
        }

        let args = self.parse_arguments()?;
        let body = if self.check(TokenKind::LeftBrace) {
            Some(self.parse_class_body("")?)
        } else {
            None
        };
        Ok(self.arena.alloc(Expr::New(self.arena.alloc(NewExpr {
            ty,
            args,
            body,
            span: self.span_from(start),
        }))))
    }

    /// Parse `{a, {b, c}, d}`.
    pub fn parse_array_init(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut elements = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            elements.push(self.parse_expression()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(self.arena.alloc(Expr::ArrayInit(self.arena.alloc(ArrayInitExpr {
            elements: elements.into_bump_slice(),
            span: open.span.merge(close.span),
        }))))
    }

    /// Whether the upcoming `(` starts a lambda parameter list.
    fn is_lambda_params(&self) -> bool {
        self.matching_paren(self.position)
            .is_some_and(|close| self.buffer.get(close + 1).is_some_and(|t| t.kind == TokenKind::Arrow))
    }

    /// Whether the upcoming `(` starts a cast.
    fn is_cast(&self) -> bool {
        let inner = self.position + 1;
        let Some(first) = self.buffer.get(inner) else {
            return false;
        };
        let Some(after) = self.skip_type(inner) else {
            return false;
        };
        if self.buffer.get(after).map(|t| t.kind) != Some(TokenKind::RightParen) {
            return false;
        }
        if first.kind.is_primitive_type() {
            return true;
        }
        let Some(next) = self.buffer.get(after + 1) else {
            return false;
        };
        matches!(
            next.kind,
            TokenKind::Identifier
                | TokenKind::LeftParen
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::New
                | TokenKind::Bang
                | TokenKind::Tilde
        ) || next.kind.is_literal()
            || next.kind.is_primitive_type()
    }

    fn parse_cast(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftParen)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::RightParen)?;
        let expr = self.parse_expr(UnaryOp::binding_power())?;
        Ok(self.arena.alloc(Expr::Cast(self.arena.alloc(CastExpr {
            ty,
            expr,
            span: open.span.merge(expr.span()),
        }))))
    }

    /// Index of the `)` matching the `(` at `open`.
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.buffer.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                TokenKind::Eof | TokenKind::LeftBrace | TokenKind::Semicolon => return None,
                _ => {}
            }
        }
        None
    }

    /// Parse `x -> ..`, `(x, y) -> ..` or `(int x) -> ..`.
    fn parse_lambda(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.peek().span;
        let mut params = BVec::new_in(self.arena);

        if let Some(name) = self.eat(TokenKind::Identifier) {
            params.push(LambdaParam {
                ty: None,
                name: Ident::new(name.lexeme, name.span),
            });
        } else {
            self.expect(TokenKind::LeftParen)?;
            while !self.check(TokenKind::RightParen) && !self.is_eof() {
                self.eat(TokenKind::Final);
                let inferred = self.check(TokenKind::Identifier)
                    && matches!(self.peek_nth(1).kind, TokenKind::Comma | TokenKind::RightParen);
                let ty = if inferred { None } else { Some(self.parse_type()?) };
                let name = self.expect(TokenKind::Identifier)?;
                params.push(LambdaParam {
                    ty,
                    name: Ident::new(name.lexeme, name.span),
                });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParen)?;
        }

        self.expect(TokenKind::Arrow)?;
        let body = if self.check(TokenKind::LeftBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            LambdaBody::Expr(self.parse_expression()?)
        };

        Ok(self.arena.alloc(Expr::Lambda(self.arena.alloc(LambdaExpr {
            params: params.into_bump_slice(),
            body,
            span: self.span_from(start),
        }))))
    }

    /// Reinterpret a name chain (`a.b.C`) as a type with `dims` dimensions.
    fn expr_to_type(&self, expr: &'ast Expr<'ast>, dims: u8) -> Option<TypeExpr<'ast>> {
        let mut segments = Vec::new();
        let mut current = expr;
        loop {
            match current {
                Expr::Ident(ident) => {
                    segments.push(*ident);
                    break;
                }
                Expr::FieldAccess(access) => {
                    segments.push(access.name);
                    current = access.target;
                }
                _ => return None,
            }
        }
        segments.reverse();
        let path = Path {
            segments: self.arena.alloc_slice_copy(&segments),
            span: expr.span(),
        };
        Some(TypeExpr {
            base: TypeBase::Named(path),
            type_args: &[],
            dims,
            span: expr.span(),
        })
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn literal_kind(
        &self,
        kind: TokenKind,
        lexeme: &'ast str,
        span: Span,
    ) -> Result<LiteralKind<'ast>, ParseError> {
        let invalid = |detail: &str| {
            ParseError::new(
                ParseErrorKind::InvalidLiteral,
                span,
                format!("{detail}: {lexeme}"),
            )
        };

        Ok(match kind {
            TokenKind::True => LiteralKind::Bool(true),
            TokenKind::False => LiteralKind::Bool(false),
            TokenKind::Null => LiteralKind::Null,
            TokenKind::IntLiteral => {
                let value = parse_integer(lexeme).ok_or_else(|| invalid("invalid integer"))?;
                // 2147483648 is only legal as the operand of unary minus; it wraps here.
                if value > 1 << 31 && !has_radix_prefix(lexeme) {
                    return Err(invalid("integer literal out of range"));
                }
                if value > u32::MAX as u64 {
                    return Err(invalid("integer literal out of range"));
                }
                LiteralKind::Int(value as u32 as i32)
            }
            TokenKind::LongLiteral => {
                let digits = &lexeme[..lexeme.len() - 1];
                let value = parse_integer(digits).ok_or_else(|| invalid("invalid long"))?;
                LiteralKind::Long(value as i64)
            }
            TokenKind::FloatLiteral => {
                let digits: String = lexeme[..lexeme.len() - 1].chars().filter(|c| *c != '_').collect();
                LiteralKind::Float(digits.parse().map_err(|_| invalid("invalid float"))?)
            }
            TokenKind::DoubleLiteral => {
                let trimmed = lexeme.trim_end_matches(['d', 'D']);
                let digits: String = trimmed.chars().filter(|c| *c != '_').collect();
                LiteralKind::Double(digits.parse().map_err(|_| invalid("invalid double"))?)
            }
            TokenKind::CharLiteral => {
                let text = unescape(&lexeme[1..lexeme.len() - 1]).ok_or_else(|| invalid("invalid escape"))?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => LiteralKind::Char(c),
                    _ => return Err(invalid("character literal must hold one character")),
                }
            }
            TokenKind::StringLiteral => {
                let body = if lexeme.starts_with("\"\"\"") {
                    text_block_body(lexeme)
                } else {
                    lexeme[1..lexeme.len() - 1].to_string()
                };
                let text = unescape(&body).ok_or_else(|| invalid("invalid escape"))?;
                LiteralKind::String(self.arena.alloc_str(&text))
            }
            _ => return Err(invalid("not a literal")),
        })
    }
}

fn has_radix_prefix(lexeme: &str) -> bool {
    let lower = lexeme.to_ascii_lowercase();
    lower.starts_with("0x") || lower.starts_with("0b") || (lower.len() > 1 && lower.starts_with('0'))
}

/// Parse an integer literal body (no suffix) in any Java radix.
fn parse_integer(lexeme: &str) -> Option<u64> {
    let clean: String = lexeme.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// Content of a `"""` text block with incidental indentation removed.
fn text_block_body(lexeme: &str) -> String {
    let inner = &lexeme[3..lexeme.len() - 3];
    let inner = inner.split_once('\n').map(|(_, rest)| rest).unwrap_or(inner);
    let indent = inner
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    inner
        .lines()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Process Java escape sequences. Returns `None` on a malformed escape.
fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            's' => out.push(' '),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '\n' => {}
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                let max_len = if d <= '3' { 2 } else { 1 };
                for _ in 0..max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            _ => return None,
        }
    }
    Some(out)
}
