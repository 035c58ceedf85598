//! Declaration parsing: compilation units, types, members and annotations.

use bumpalo::collections::Vec as BVec;
use javelin_core::{Flags, Span};

use super::parser::Parser;
use crate::ast::decl::*;
use crate::ast::types::TypeExpr;
use crate::ast::{Ident, ParseError, ParseErrorKind, Path, TERNARY_BP};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a whole source file, recovering at type boundaries.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_compilation_unit(&mut self) -> CompilationUnit<'ast> {
        let start = self.peek().span;

        let package = if self.check(TokenKind::Package) {
            match self.parse_package() {
                Ok(path) => Some(path),
                Err(err) => {
                    self.record(err);
                    self.synchronize();
                    None
                }
            }
        } else {
            None
        };

        let mut imports = BVec::new_in(self.arena);
        while self.check(TokenKind::Import) {
            match self.parse_import() {
                Ok(import) => imports.push(import),
                Err(err) => {
                    self.record(err);
                    self.synchronize();
                }
            }
        }

        let mut types = BVec::new_in(self.arena);
        while !self.is_eof() {
            if self.eat(TokenKind::Semicolon).is_some() {
                continue;
            }
            let result = self
                .parse_modifiers()
                .and_then(|modifiers| self.parse_type_decl(modifiers));
            match result {
                Ok(decl) => types.push(decl),
                Err(err) => {
                    self.record(err);
                    self.synchronize();
                }
            }
        }

        CompilationUnit {
            package,
            imports: imports.into_bump_slice(),
            types: types.into_bump_slice(),
            span: self.span_from(start),
        }
    }

    fn parse_package(&mut self) -> Result<Path<'ast>, ParseError> {
        self.expect(TokenKind::Package)?;
        let path = self.parse_path()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(path)
    }

    /// `import [static] a.b.C[.*];`
    fn parse_import(&mut self) -> Result<ImportDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Import)?.span;
        let is_static = self.eat(TokenKind::Static).is_some();

        let first = self.expect(TokenKind::Identifier)?;
        let mut segments = BVec::new_in(self.arena);
        segments.push(Ident::new(first.lexeme, first.span));
        let mut on_demand = false;
        while self.eat(TokenKind::Dot).is_some() {
            if self.eat(TokenKind::Star).is_some() {
                on_demand = true;
                break;
            }
            let segment = self.expect(TokenKind::Identifier)?;
            segments.push(Ident::new(segment.lexeme, segment.span));
        }
        let path = Path {
            segments: segments.into_bump_slice(),
            span: self.span_from(first.span),
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(ImportDecl {
            path,
            is_static,
            on_demand,
            span: self.span_from(start),
        })
    }

    // ========================================================================
    // Modifiers and annotations
    // ========================================================================

    /// Parse modifier keywords and annotations in any order.
    pub fn parse_modifiers(&mut self) -> Result<Modifiers<'ast>, ParseError> {
        let start = self.peek().span;
        let mut flags = Flags::empty();
        let mut annotations = BVec::new_in(self.arena);

        loop {
            let token = *self.peek();
            if token.kind == TokenKind::At {
                if self.check_nth(1, TokenKind::Interface) {
                    break;
                }
                annotations.push(*self.parse_annotation()?);
                continue;
            }

            let is_modifier = match token.kind {
                // `default:` in a switch and `synchronized (x)` are not modifiers.
                TokenKind::Default => {
                    !matches!(self.peek_nth(1).kind, TokenKind::Colon | TokenKind::Arrow)
                }
                TokenKind::Synchronized => !self.check_nth(1, TokenKind::LeftParen),
                kind => kind.is_modifier(),
            };
            if !is_modifier {
                break;
            }
            let Some(flag) = Flags::from_keyword(token.lexeme) else {
                break;
            };
            self.advance();
            if flags.contains(flag) {
                self.record(ParseError::new(
                    ParseErrorKind::DuplicateModifier,
                    token.span,
                    format!("duplicate modifier '{}'", token.lexeme),
                ));
                self.panic_mode = false;
            }
            flags |= flag;
        }

        let span = if self.position > 0 && self.previous().span.offset >= start.offset {
            self.span_from(start)
        } else {
            Span::point(start.offset, start.line, start.col)
        };
        Ok(Modifiers {
            flags,
            annotations: annotations.into_bump_slice(),
            span,
        })
    }

    /// Parse `@Name`, `@Name(value)` or `@Name(a = x, b = {y, z})`.
    pub fn parse_annotation(&mut self) -> Result<&'ast Annotation<'ast>, ParseError> {
        let start = self.expect(TokenKind::At)?.span;
        let name = self.parse_path()?;

        let mut args = BVec::new_in(self.arena);
        if self.eat(TokenKind::LeftParen).is_some() {
            if self.check(TokenKind::Identifier) && self.check_nth(1, TokenKind::Equal) {
                loop {
                    let key = self.expect(TokenKind::Identifier)?;
                    self.expect(TokenKind::Equal)?;
                    let value = self.parse_element_value()?;
                    args.push(AnnotationArg {
                        name: Some(Ident::new(key.lexeme, key.span)),
                        value,
                        span: self.span_from(key.span),
                    });
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            } else if !self.check(TokenKind::RightParen) {
                let value = self.parse_element_value()?;
                args.push(AnnotationArg {
                    name: None,
                    value,
                    span: value.span(),
                });
            }
            self.expect(TokenKind::RightParen)?;
        }

        Ok(self.arena.alloc(Annotation {
            name,
            args: args.into_bump_slice(),
            span: self.span_from(start),
        }))
    }

    /// An element value: conditional expression, nested annotation or `{..}`.
    fn parse_element_value(&mut self) -> Result<ElementValue<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::At => Ok(ElementValue::Annotation(self.parse_annotation()?)),
            TokenKind::LeftBrace => {
                let open = self.advance();
                let mut items = BVec::new_in(self.arena);
                while !self.check(TokenKind::RightBrace) && !self.is_eof() {
                    items.push(self.parse_element_value()?);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                let close = self.expect(TokenKind::RightBrace)?;
                Ok(ElementValue::Array(
                    items.into_bump_slice(),
                    open.span.merge(close.span),
                ))
            }
            _ => Ok(ElementValue::Expr(self.parse_expr(TERNARY_BP)?)),
        }
    }

    // ========================================================================
    // Type declarations
    // ========================================================================

    /// Parse a class, interface, enum or `@interface` after its modifiers.
    pub fn parse_type_decl(
        &mut self,
        modifiers: Modifiers<'ast>,
    ) -> Result<&'ast TypeDecl<'ast>, ParseError> {
        let start = if modifiers.span.is_empty() {
            self.peek().span
        } else {
            modifiers.span
        };

        let token = *self.peek();
        let kind = match token.kind {
            TokenKind::Class => TypeKind::Class,
            TokenKind::Interface => TypeKind::Interface,
            TokenKind::Enum => TypeKind::Enum,
            TokenKind::At if self.check_nth(1, TokenKind::Interface) => {
                self.advance();
                TypeKind::Annotation
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedDeclaration,
                    token.span,
                    format!(
                        "expected class, interface or enum declaration, found {}",
                        token.kind.description()
                    ),
                ));
            }
        };
        self.advance();

        let name_token = self.expect(TokenKind::Identifier)?;
        let name = Ident::new(name_token.lexeme, name_token.span);

        let type_params = if self.check(TokenKind::Less) {
            self.parse_type_params()?
        } else {
            &[]
        };

        let mut extends = None;
        let mut implements: &'ast [TypeExpr<'ast>] = &[];
        match kind {
            TypeKind::Class => {
                if self.eat(TokenKind::Extends).is_some() {
                    extends = Some(self.parse_type()?);
                }
                if self.eat(TokenKind::Implements).is_some() {
                    implements = self.parse_type_list()?;
                }
            }
            TypeKind::Interface => {
                if self.eat(TokenKind::Extends).is_some() {
                    implements = self.parse_type_list()?;
                }
            }
            TypeKind::Enum => {
                if self.eat(TokenKind::Implements).is_some() {
                    implements = self.parse_type_list()?;
                }
            }
            TypeKind::Annotation => {}
        }

        let (enum_constants, members) = if kind == TypeKind::Enum {
            self.parse_enum_body(name.name)?
        } else {
            (&[][..], self.parse_class_body(name.name)?)
        };

        Ok(self.arena.alloc(TypeDecl {
            modifiers,
            kind,
            name,
            type_params,
            extends,
            implements,
            enum_constants,
            members,
            span: self.span_from(start),
        }))
    }

    /// `{ A, B(1), C { .. }; members }`
    fn parse_enum_body(
        &mut self,
        type_name: &str,
    ) -> Result<(&'ast [EnumConstant<'ast>], &'ast [Member<'ast>]), ParseError> {
        self.expect(TokenKind::LeftBrace)?;

        let mut constants = BVec::new_in(self.arena);
        while !matches!(
            self.peek().kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) {
            let start = self.peek().span;
            let mut annotations = BVec::new_in(self.arena);
            while self.check(TokenKind::At) {
                annotations.push(*self.parse_annotation()?);
            }
            let name = self.expect(TokenKind::Identifier)?;
            let args = if self.check(TokenKind::LeftParen) {
                self.parse_arguments()?
            } else {
                &[]
            };
            let body = if self.check(TokenKind::LeftBrace) {
                Some(self.parse_class_body("")?)
            } else {
                None
            };
            constants.push(EnumConstant {
                annotations: annotations.into_bump_slice(),
                name: Ident::new(name.lexeme, name.span),
                args,
                body,
                span: self.span_from(start),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let members = if self.eat(TokenKind::Semicolon).is_some() {
            self.parse_members_until_close(type_name)
        } else {
            &[]
        };
        self.expect(TokenKind::RightBrace)?;

        Ok((constants.into_bump_slice(), members))
    }

    /// `{ members }`. `type_name` identifies constructors; pass `""` for
    /// anonymous bodies.
    pub fn parse_class_body(&mut self, type_name: &str) -> Result<&'ast [Member<'ast>], ParseError> {
        self.expect(TokenKind::LeftBrace)?;
        let members = self.parse_members_until_close(type_name);
        self.expect(TokenKind::RightBrace)?;
        Ok(members)
    }

    fn parse_members_until_close(&mut self, type_name: &str) -> &'ast [Member<'ast>] {
        let mut members = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            match self.parse_member(type_name) {
                Ok(Some(member)) => members.push(member),
                Ok(None) => {}
                Err(err) => {
                    self.record(err);
                    self.synchronize();
                }
            }
        }
        members.into_bump_slice()
    }

    /// Parse one member. Returns `None` for a stray `;`.
    fn parse_member(&mut self, type_name: &str) -> Result<Option<Member<'ast>>, ParseError> {
        let start = self.peek().span;

        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(None);
        }
        if self.check(TokenKind::LeftBrace)
            || (self.check(TokenKind::Static) && self.check_nth(1, TokenKind::LeftBrace))
        {
            let is_static = self.eat(TokenKind::Static).is_some();
            let body = self.parse_block()?;
            return Ok(Some(Member::Initializer(self.arena.alloc(InitializerDecl {
                is_static,
                body,
                span: self.span_from(start),
            }))));
        }

        let modifiers = self.parse_modifiers()?;

        if matches!(
            self.peek().kind,
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum | TokenKind::At
        ) {
            return Ok(Some(Member::Type(self.parse_type_decl(modifiers)?)));
        }

        let type_params = if self.check(TokenKind::Less) {
            self.parse_type_params()?
        } else {
            &[]
        };

        let token = *self.peek();
        if token.kind == TokenKind::Identifier
            && !type_name.is_empty()
            && token.lexeme == type_name
            && self.check_nth(1, TokenKind::LeftParen)
        {
            self.advance();
            let params = self.parse_params()?;
            let throws = self.parse_throws()?;
            let body = self.parse_block()?;
            return Ok(Some(Member::Constructor(self.arena.alloc(ConstructorDecl {
                modifiers,
                type_params,
                name: Ident::new(token.lexeme, token.span),
                params,
                throws,
                body,
                span: self.span_from(start),
            }))));
        }

        let ty = self.parse_type()?;

        if self.check(TokenKind::Identifier) && self.check_nth(1, TokenKind::LeftParen) {
            let name = self.advance();
            let params = self.parse_params()?;
            let mut return_type = ty;
            // Legacy `int m()[]` form.
            return_type.dims += self.parse_dims();
            let throws = self.parse_throws()?;
            let default_value = if self.eat(TokenKind::Default).is_some() {
                Some(self.parse_element_value()?)
            } else {
                None
            };
            let body = if self.eat(TokenKind::Semicolon).is_some() {
                None
            } else {
                Some(self.parse_block()?)
            };
            return Ok(Some(Member::Method(self.arena.alloc(MethodDecl {
                modifiers,
                type_params,
                return_type,
                name: Ident::new(name.lexeme, name.span),
                params,
                throws,
                default_value,
                body,
                span: self.span_from(start),
            }))));
        }

        let vars = self.parse_var_declarators()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Some(Member::Field(self.arena.alloc(FieldDecl {
            modifiers,
            ty,
            vars,
            span: self.span_from(start),
        }))))
    }

    /// `(final int a, String... rest)`
    fn parse_params(&mut self) -> Result<&'ast [Param<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                let start = self.peek().span;
                let modifiers = self.parse_modifiers()?;
                let mut ty = self.parse_type()?;
                let varargs = self.eat(TokenKind::Ellipsis).is_some();
                let name = self.expect(TokenKind::Identifier)?;
                ty.dims += self.parse_dims();
                if varargs {
                    ty.dims += 1;
                }
                params.push(Param {
                    modifiers,
                    ty,
                    varargs,
                    name: Ident::new(name.lexeme, name.span),
                    span: self.span_from(start),
                });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(params.into_bump_slice())
    }

    fn parse_throws(&mut self) -> Result<&'ast [TypeExpr<'ast>], ParseError> {
        if self.eat(TokenKind::Throws).is_some() {
            self.parse_type_list()
        } else {
            Ok(&[])
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::decl::*;
    use crate::Parser;
    use bumpalo::Bump;
    use javelin_core::Flags;

    #[test]
    fn package_and_imports() {
        let arena = Bump::new();
        let unit = Parser::parse(
            "package a.b; import java.util.*; import static java.lang.Math.max; import x.Y; class C {}",
            &arena,
        )
        .unwrap();
        assert_eq!(unit.package_name(), "a.b");
        assert_eq!(unit.imports.len(), 3);
        assert!(unit.imports[0].on_demand);
        assert!(unit.imports[1].is_static);
        assert_eq!(unit.imports[2].path.dotted(), "x.Y");
    }

    #[test]
    fn annotation_forms() {
        let arena = Bump::new();
        let unit = Parser::parse(
            "@ExtensionMethod({Foo.class, Bar.class}) @Deprecated @A(value = X.class, other = 3) class C {}",
            &arena,
        )
        .unwrap();
        let annotations = unit.types[0].modifiers.annotations;
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[0].simple_name(), "ExtensionMethod");
        let value = annotations[0].element("value").unwrap();
        assert_eq!(value.flatten().len(), 2);
        assert!(annotations[1].args.is_empty());
        assert!(annotations[2].element("other").is_some());
        assert!(annotations[2].element("value").is_some());
    }

    #[test]
    fn class_members() {
        let arena = Bump::new();
        let unit = Parser::parse(
            r#"
            public class Box<T> extends Base implements Comparable<Box<T>>, Cloneable {
                private static final int LIMIT = 10, OTHER;
                static { init(); }
                { x = 1; }
                public Box(T value) { this.value = value; }
                public <R> R map(java.util.function.Function<T, R> f) throws Exception { return f.apply(value); }
                abstract void hook(String... args);
                class Inner {}
            }
            "#,
            &arena,
        )
        .unwrap();
        let decl = unit.types[0];
        assert_eq!(decl.kind, TypeKind::Class);
        assert_eq!(decl.type_params.len(), 1);
        assert!(decl.extends.is_some());
        assert_eq!(decl.implements.len(), 2);
        assert_eq!(decl.members.len(), 7);
        assert!(matches!(decl.members[0], Member::Field(f) if f.vars.len() == 2));
        assert!(matches!(decl.members[1], Member::Initializer(i) if i.is_static));
        assert!(matches!(decl.members[3], Member::Constructor(_)));
        let methods: Vec<_> = decl.methods().collect();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].type_params.len(), 1);
        assert_eq!(methods[0].throws.len(), 1);
        assert!(methods[1].params[0].varargs);
        assert_eq!(methods[1].params[0].ty.dims, 1);
        assert!(methods[1].body.is_none());
        assert_eq!(decl.nested_types().count(), 1);
    }

    #[test]
    fn enum_with_constants_and_members() {
        let arena = Bump::new();
        let unit = Parser::parse(
            "enum Color implements Named { RED, GREEN(2), BLUE { int x() { return 1; } }; int code; Color() {} Color(int c) {} }",
            &arena,
        )
        .unwrap();
        let decl = unit.types[0];
        assert_eq!(decl.kind, TypeKind::Enum);
        assert_eq!(decl.enum_constants.len(), 3);
        assert_eq!(decl.enum_constants[1].args.len(), 1);
        assert!(decl.enum_constants[2].body.is_some());
        assert_eq!(decl.members.len(), 3);
    }

    #[test]
    fn interface_and_annotation_types() {
        let arena = Bump::new();
        let unit = Parser::parse(
            "interface I extends A, B { void m(); default int n() { return 0; } } @interface Ann { String value() default \"\"; }",
            &arena,
        )
        .unwrap();
        assert_eq!(unit.types[0].kind, TypeKind::Interface);
        assert_eq!(unit.types[0].implements.len(), 2);
        let methods: Vec<_> = unit.types[0].methods().collect();
        assert!(methods[1].modifiers.flags.contains(Flags::DEFAULT));
        assert_eq!(unit.types[1].kind, TypeKind::Annotation);
        assert!(unit.types[1].methods().next().unwrap().default_value.is_some());
    }

    #[test]
    fn duplicate_modifier_is_reported() {
        let arena = Bump::new();
        let errors = Parser::parse("public public class C {}", &arena).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn recovers_after_bad_member() {
        let arena = Bump::new();
        let (unit, errors) = Parser::parse_lenient("class C { int = ; void ok() {} }", &arena);
        assert!(!errors.is_empty());
        assert_eq!(unit.types[0].methods().count(), 1);
    }
}
