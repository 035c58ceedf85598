//! Type expression parsing.

use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::types::*;
use crate::ast::{Ident, ParseError, Path};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a complete type: base, generic arguments and trailing `[]`.
    pub fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        // Type annotations are accepted and dropped.
        while self.check(TokenKind::At) && !self.check_nth(1, TokenKind::Interface) {
            self.parse_annotation()?;
        }

        let mut ty = self.parse_type_no_dims()?;
        let dims = self.parse_dims();
        ty.dims += dims;
        if dims > 0 {
            ty.span = self.span_from(ty.span);
        }
        Ok(ty)
    }

    /// Parse a type without consuming trailing array brackets.
    pub fn parse_type_no_dims(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let token = *self.peek();
        if let Some(primitive) = primitive_from_token(token.kind) {
            self.advance();
            return Ok(TypeExpr::primitive(primitive, token.span));
        }

        if token.kind != TokenKind::Identifier {
            return Err(ParseError::expected_type(token.span, token.kind.description()));
        }

        if token.lexeme == "var"
            && self.check_nth(1, TokenKind::Identifier)
        {
            self.advance();
            return Ok(TypeExpr {
                base: TypeBase::Var,
                type_args: &[],
                dims: 0,
                span: token.span,
            });
        }

        let mut segments = BVec::new_in(self.arena);
        let mut type_args: &'ast [TypeArg<'ast>] = &[];
        loop {
            let ident = self.expect(TokenKind::Identifier)?;
            segments.push(Ident::new(ident.lexeme, ident.span));
            type_args = if self.check(TokenKind::Less) {
                self.parse_type_args()?
            } else {
                &[]
            };
            if self.check(TokenKind::Dot) && self.check_nth(1, TokenKind::Identifier) {
                self.advance();
                continue;
            }
            break;
        }

        let span = self.span_from(token.span);
        Ok(TypeExpr {
            base: TypeBase::Named(Path {
                segments: segments.into_bump_slice(),
                span,
            }),
            type_args,
            dims: 0,
            span,
        })
    }

    /// Parse `<A, ? extends B, ?>`. The diamond `<>` yields an empty slice.
    pub fn parse_type_args(&mut self) -> Result<&'ast [TypeArg<'ast>], ParseError> {
        self.expect(TokenKind::Less)?;
        let mut args = BVec::new_in(self.arena);

        if !self.check(TokenKind::Greater) {
            loop {
                args.push(self.parse_type_arg()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect_closing_angle()?;
        Ok(args.into_bump_slice())
    }

    fn parse_type_arg(&mut self) -> Result<TypeArg<'ast>, ParseError> {
        if let Some(question) = self.eat(TokenKind::Question) {
            let bound = if self.eat(TokenKind::Extends).is_some() {
                Some(WildcardBound::Extends(self.arena.alloc(self.parse_type()?)))
            } else if self.eat(TokenKind::Super).is_some() {
                Some(WildcardBound::Super(self.arena.alloc(self.parse_type()?)))
            } else {
                None
            };
            return Ok(TypeArg::Wildcard {
                bound,
                span: self.span_from(question.span),
            });
        }
        Ok(TypeArg::Type(self.parse_type()?))
    }

    /// Parse `<T, U extends Comparable<U> & Serializable>`.
    pub fn parse_type_params(&mut self) -> Result<&'ast [TypeParam<'ast>], ParseError> {
        if !self.check(TokenKind::Less) {
            return Ok(&[]);
        }
        self.advance();

        let mut params = BVec::new_in(self.arena);
        loop {
            let name = self.expect(TokenKind::Identifier)?;
            let mut bounds = BVec::new_in(self.arena);
            if self.eat(TokenKind::Extends).is_some() {
                bounds.push(self.parse_type()?);
                while self.eat(TokenKind::Amp).is_some() {
                    bounds.push(self.parse_type()?);
                }
            }
            params.push(TypeParam {
                name: Ident::new(name.lexeme, name.span),
                bounds: bounds.into_bump_slice(),
                span: self.span_from(name.span),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok(params.into_bump_slice())
    }

    /// Consume `[]` pairs, returning how many.
    pub fn parse_dims(&mut self) -> u8 {
        let mut dims = 0u8;
        while self.check(TokenKind::LeftBracket) && self.check_nth(1, TokenKind::RightBracket) {
            self.advance();
            self.advance();
            dims = dims.saturating_add(1);
        }
        dims
    }

    /// Parse a dotted name `a.b.c`.
    pub fn parse_path(&mut self) -> Result<Path<'ast>, ParseError> {
        let first = self.expect(TokenKind::Identifier)?;
        let mut segments = BVec::new_in(self.arena);
        segments.push(Ident::new(first.lexeme, first.span));
        while self.check(TokenKind::Dot) && self.check_nth(1, TokenKind::Identifier) {
            self.advance();
            let ident = self.advance();
            segments.push(Ident::new(ident.lexeme, ident.span));
        }
        Ok(Path {
            segments: segments.into_bump_slice(),
            span: self.span_from(first.span),
        })
    }

    /// Parse a comma-separated list of types (`implements A, B`).
    pub fn parse_type_list(&mut self) -> Result<&'ast [TypeExpr<'ast>], ParseError> {
        let mut types = BVec::new_in(self.arena);
        loop {
            types.push(self.parse_type()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(types.into_bump_slice())
    }
}

pub(super) fn primitive_from_token(kind: TokenKind) -> Option<PrimitiveType> {
    Some(match kind {
        TokenKind::Void => PrimitiveType::Void,
        TokenKind::Boolean => PrimitiveType::Boolean,
        TokenKind::Byte => PrimitiveType::Byte,
        TokenKind::Short => PrimitiveType::Short,
        TokenKind::Char => PrimitiveType::Char,
        TokenKind::Int => PrimitiveType::Int,
        TokenKind::Long => PrimitiveType::Long,
        TokenKind::Float => PrimitiveType::Float,
        TokenKind::Double => PrimitiveType::Double,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use crate::ast::types::*;
    use crate::Parser;
    use bumpalo::Bump;

    #[test]
    fn parse_primitive_array() {
        let arena = Bump::new();
        let ty = Parser::type_expr("int[][]", &arena).unwrap();
        assert_eq!(ty.base, TypeBase::Primitive(PrimitiveType::Int));
        assert_eq!(ty.dims, 2);
    }

    #[test]
    fn parse_qualified_generic() {
        let arena = Bump::new();
        let ty = Parser::type_expr("java.util.Map<String, List<Integer>>", &arena).unwrap();
        let TypeBase::Named(path) = ty.base else {
            panic!("expected named type");
        };
        assert_eq!(path.dotted(), "java.util.Map");
        assert_eq!(ty.type_args.len(), 2);
        assert_eq!(ty.to_string(), "java.util.Map<String, List<Integer>>");
    }

    #[test]
    fn parse_wildcards() {
        let arena = Bump::new();
        let ty = Parser::type_expr("List<? extends Number>", &arena).unwrap();
        assert!(matches!(
            ty.type_args[0],
            TypeArg::Wildcard {
                bound: Some(WildcardBound::Extends(_)),
                ..
            }
        ));
    }

    #[test]
    fn parse_triple_close() {
        let arena = Bump::new();
        let ty = Parser::type_expr("A<B<C<D>>>", &arena).unwrap();
        assert_eq!(ty.to_string(), "A<B<C<D>>>");
    }

    #[test]
    fn reject_non_type() {
        let arena = Bump::new();
        assert!(Parser::type_expr("+", &arena).is_err());
    }
}
