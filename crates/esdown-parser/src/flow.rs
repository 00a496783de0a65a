//! Flow type parsing.
//!
//! All Flow parsing as `impl<'a> Parser<'a>` methods (same pattern as jsx.rs).
//! Types are parsed inside a context frame with `in_type` set, so the lexer
//! never merges `>` into `>>` or `>=` while generic argument lists close.
//! Annotations are kept in the AST and dropped by the code generator.

use crate::ast::*;
use crate::parser::{PResult, Parser, Speculation};
use crate::span::Span;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    // =========================================================================
    // Annotations
    // =========================================================================

    /// `: Type` if the current token is a colon and Flow is enabled.
    pub(crate) fn parse_type_annotation_opt(&mut self) -> PResult<Option<Box<FlowType>>> {
        if !self.options.flow || !self.check(&TokenKind::Colon) {
            return Ok(None);
        }
        let ty = self.with_context(
            |c| c.in_type = true,
            |p| {
                p.advance(); // :
                p.parse_flow_union()
            },
        )?;
        Ok(Some(Box::new(ty)))
    }

    /// Parse a complete type.
    pub(crate) fn parse_flow_type(&mut self) -> PResult<FlowType> {
        self.nested(Self::parse_flow_type_inner)
    }

    fn parse_flow_type_inner(&mut self) -> PResult<FlowType> {
        self.with_context(|c| c.in_type = true, Self::parse_flow_union)
    }

    // =========================================================================
    // Type Parsing
    // =========================================================================

    /// `A | B | C`, with an optional leading `|`.
    fn parse_flow_union(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        self.eat(&TokenKind::Pipe);
        let first = self.parse_flow_intersection()?;
        if !self.check(&TokenKind::Pipe) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(&TokenKind::Pipe) {
            types.push(self.parse_flow_intersection()?);
        }
        Ok(FlowType::new(FlowTypeKind::Union(types), self.span_from(start)))
    }

    /// `A & B & C`, with an optional leading `&`.
    fn parse_flow_intersection(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        self.eat(&TokenKind::Amp);
        let first = self.parse_flow_prefix()?;
        if !self.check(&TokenKind::Amp) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(&TokenKind::Amp) {
            types.push(self.parse_flow_prefix()?);
        }
        Ok(FlowType::new(FlowTypeKind::Intersection(types), self.span_from(start)))
    }

    /// `?T`
    fn parse_flow_prefix(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        if self.eat(&TokenKind::Question) {
            let inner = self.parse_flow_prefix()?;
            return Ok(FlowType::new(FlowTypeKind::Nullable(Box::new(inner)), self.span_from(start)));
        }
        self.parse_flow_postfix()
    }

    /// `T[]`, `T[][]`
    fn parse_flow_postfix(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        let mut ty = self.parse_flow_primary()?;
        // `[` on a new line starts the next member, not an array type.
        while self.check(&TokenKind::LBracket) && !self.current.newline_before {
            self.advance();
            self.expect(&TokenKind::RBracket)?;
            ty = FlowType::new(FlowTypeKind::Array(Box::new(ty)), self.span_from(start));
        }
        Ok(ty)
    }

    fn parse_flow_primary(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;

        let kind = match self.peek().clone() {
            TokenKind::Identifier(name) => {
                let builtin = match name.as_str() {
                    "any" => Some(FlowTypeKind::Any),
                    "mixed" => Some(FlowTypeKind::Mixed),
                    "empty" => Some(FlowTypeKind::Empty),
                    "number" => Some(FlowTypeKind::Number),
                    "string" => Some(FlowTypeKind::String),
                    "boolean" | "bool" => Some(FlowTypeKind::Boolean),
                    "symbol" => Some(FlowTypeKind::Symbol),
                    "bigint" => Some(FlowTypeKind::BigInt),
                    _ => None,
                };
                match builtin {
                    Some(kind) => {
                        self.advance();
                        kind
                    }
                    None => return self.parse_flow_named(),
                }
            }
            TokenKind::Type | TokenKind::Interface => return self.parse_flow_named(),
            TokenKind::Void => {
                self.advance();
                FlowTypeKind::Void
            }
            TokenKind::Null => {
                self.advance();
                FlowTypeKind::Null
            }
            TokenKind::Star => {
                self.advance();
                FlowTypeKind::Existential
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(&TokenKind::True);
                self.advance();
                FlowTypeKind::BooleanLiteral(value)
            }
            TokenKind::String(value) => {
                self.advance();
                FlowTypeKind::StringLiteral(value)
            }
            TokenKind::Number(value) => {
                self.advance();
                FlowTypeKind::NumberLiteral(value)
            }
            TokenKind::Minus => {
                self.advance();
                match self.peek().clone() {
                    TokenKind::Number(value) => {
                        self.advance();
                        FlowTypeKind::NumberLiteral(-value)
                    }
                    _ => return Err(self.unexpected()),
                }
            }
            TokenKind::Typeof => {
                self.advance();
                FlowTypeKind::Typeof(self.parse_flow_dotted_name()?)
            }
            TokenKind::LBrace => return self.parse_flow_object(),
            TokenKind::LBracket => return self.parse_flow_tuple(),
            TokenKind::LParen => return self.parse_flow_paren_or_function(),
            TokenKind::Lt => {
                let type_params = self.parse_flow_type_params_opt()?;
                let func = self.parse_flow_function_rest(type_params)?;
                FlowTypeKind::Function(Box::new(func))
            }
            _ => return Err(self.unexpected()),
        };

        Ok(FlowType::new(kind, self.span_from(start)))
    }

    /// `A.B.C` followed by optional `<args>`.
    fn parse_flow_named(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        let name = self.parse_flow_dotted_name()?;
        let args = if self.check(&TokenKind::Lt) { self.parse_flow_type_args()? } else { Vec::new() };
        Ok(FlowType::new(FlowTypeKind::Named { name, args }, self.span_from(start)))
    }

    fn parse_flow_dotted_name(&mut self) -> PResult<Vec<String>> {
        let mut parts = vec![self.parse_binding_ident()?.name];
        while self.eat(&TokenKind::Dot) {
            parts.push(self.parse_word()?.0);
        }
        Ok(parts)
    }

    /// `[A, B]`
    fn parse_flow_tuple(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBracket)?;
        let mut types = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_eof() {
            types.push(self.parse_flow_union()?);
            if !self.check(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(FlowType::new(FlowTypeKind::Tuple(types), self.span_from(start)))
    }

    /// `(A | B)` or `(x: A, ...rest: B) => R`
    fn parse_flow_paren_or_function(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        let function = self.try_parse(Speculation::FlowFunctionType, |p| p.parse_flow_function_rest(Vec::new()));
        if let Some(func) = function {
            return Ok(FlowType::new(FlowTypeKind::Function(Box::new(func)), self.span_from(start)));
        }

        self.expect(&TokenKind::LParen)?;
        let inner = self.parse_flow_union()?;
        self.expect(&TokenKind::RParen)?;
        Ok(inner)
    }

    /// `(params) => Return`, after any type parameters.
    fn parse_flow_function_rest(&mut self, type_params: Vec<FlowTypeParam>) -> PResult<FlowFunctionType> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            if self.eat(&TokenKind::Spread) {
                rest = Some(self.parse_flow_function_param()?);
                break;
            }
            params.push(self.parse_flow_function_param()?);
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Arrow)?;
        let ret = self.parse_flow_union()?;
        Ok(FlowFunctionType { type_params, params, rest, ret })
    }

    /// `name: T`, `name?: T`, or an unnamed `T`.
    fn parse_flow_function_param(&mut self) -> PResult<FlowFunctionParam> {
        let named = self.peek().as_word().is_some()
            && matches!(self.lexer.peek().kind, TokenKind::Colon | TokenKind::Question);
        if named {
            let (name, _) = self.parse_word()?;
            let optional = self.eat(&TokenKind::Question);
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_flow_union()?;
            return Ok(FlowFunctionParam { name: Some(name), ty, optional });
        }
        let ty = self.parse_flow_union()?;
        Ok(FlowFunctionParam { name: None, ty, optional: false })
    }

    /// `{ a: T, b?: U, [k: K]: V, ...S }` or exact `{| ... |}`
    fn parse_flow_object(&mut self) -> PResult<FlowType> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;

        // `{||}` lexes as `{`, `||`, `}`
        if self.eat(&TokenKind::PipePipe) {
            self.expect(&TokenKind::RBrace)?;
            let kind = FlowTypeKind::Object { members: Vec::new(), exact: true };
            return Ok(FlowType::new(kind, self.span_from(start)));
        }

        let exact = self.eat(&TokenKind::Pipe);
        let members = self.parse_flow_object_members(if exact { &TokenKind::Pipe } else { &TokenKind::RBrace })?;
        if exact {
            self.expect(&TokenKind::Pipe)?;
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(FlowType::new(FlowTypeKind::Object { members, exact }, self.span_from(start)))
    }

    /// Members up to (not including) `close`.
    fn parse_flow_object_members(&mut self, close: &TokenKind) -> PResult<Vec<FlowObjectMember>> {
        let mut members = Vec::new();
        while !self.check(close) && !self.is_eof() {
            members.push(self.parse_flow_object_member()?);
            if !self.eat(&TokenKind::Comma) && !self.eat(&TokenKind::Semicolon) {
                if self.check(close) || self.current.newline_before {
                    continue;
                }
                return Err(self.unexpected());
            }
        }
        Ok(members)
    }

    fn parse_flow_object_member(&mut self) -> PResult<FlowObjectMember> {
        let start = self.current.span.start;

        if self.eat(&TokenKind::Spread) {
            return Ok(FlowObjectMember::Spread(self.parse_flow_union()?));
        }

        // `[name: K]: V` / `[K]: V`
        if self.eat(&TokenKind::LBracket) {
            let name = if self.peek().as_word().is_some() && matches!(self.lexer.peek().kind, TokenKind::Colon) {
                let (name, _) = self.parse_word()?;
                self.advance(); // :
                Some(name)
            } else {
                None
            };
            let key = self.parse_flow_union()?;
            self.expect(&TokenKind::RBracket)?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_flow_union()?;
            return Ok(FlowObjectMember::Indexer { name, key, value, span: self.span_from(start) });
        }

        let key = match self.peek().clone() {
            TokenKind::String(value) => {
                self.advance();
                value
            }
            _ => self.parse_word()?.0,
        };

        // Method shorthand: `m(x: T): R`
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let method_start = self.current.span.start;
            let type_params = self.parse_flow_type_params_opt()?;
            let func = self.parse_flow_method_signature(type_params)?;
            let value = FlowType::new(FlowTypeKind::Function(Box::new(func)), self.span_from(method_start));
            return Ok(FlowObjectMember::Property { key, value, optional: false, span: self.span_from(start) });
        }

        let optional = self.eat(&TokenKind::Question);
        self.expect(&TokenKind::Colon)?;
        let value = self.parse_flow_union()?;
        Ok(FlowObjectMember::Property { key, value, optional, span: self.span_from(start) })
    }

    /// `(params): Return` as written in object and interface bodies.
    fn parse_flow_method_signature(&mut self, type_params: Vec<FlowTypeParam>) -> PResult<FlowFunctionType> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            if self.eat(&TokenKind::Spread) {
                rest = Some(self.parse_flow_function_param()?);
                break;
            }
            params.push(self.parse_flow_function_param()?);
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let ret = self.parse_flow_union()?;
        Ok(FlowFunctionType { type_params, params, rest, ret })
    }

    // =========================================================================
    // Generics
    // =========================================================================

    /// `<T, +U: Bound = Default>` if present.
    pub(crate) fn parse_flow_type_params_opt(&mut self) -> PResult<Vec<FlowTypeParam>> {
        if !self.options.flow || !self.check(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        self.with_context(
            |c| c.in_type = true,
            |p| {
                p.expect(&TokenKind::Lt)?;
                let mut params = Vec::new();
                while !p.check(&TokenKind::Gt) && !p.is_eof() {
                    let start = p.current.span.start;
                    // Variance markers carry no runtime meaning.
                    if !p.eat(&TokenKind::Plus) {
                        p.eat(&TokenKind::Minus);
                    }
                    let name = p.parse_binding_ident()?.name;
                    let bound = if p.eat(&TokenKind::Colon) { Some(p.parse_flow_union()?) } else { None };
                    let default = if p.eat(&TokenKind::Eq) { Some(p.parse_flow_union()?) } else { None };
                    params.push(FlowTypeParam { name, bound, default, span: p.span_from(start) });
                    if !p.check(&TokenKind::Gt) {
                        p.expect(&TokenKind::Comma)?;
                    }
                }
                p.expect(&TokenKind::Gt)?;
                Ok(params)
            },
        )
    }

    /// `<A, B>`; the current token is `<`.
    pub(crate) fn parse_flow_type_args(&mut self) -> PResult<Vec<FlowType>> {
        self.with_context(
            |c| c.in_type = true,
            |p| {
                p.expect(&TokenKind::Lt)?;
                let mut args = Vec::new();
                while !p.check(&TokenKind::Gt) && !p.is_eof() {
                    args.push(p.parse_flow_union()?);
                    if !p.check(&TokenKind::Gt) {
                        p.expect(&TokenKind::Comma)?;
                    }
                }
                p.expect(&TokenKind::Gt)?;
                Ok(args)
            },
        )
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `type T<P> = ...;` or `opaque type T: Super = ...;`. The current token
    /// is `type`.
    pub(crate) fn parse_type_alias(&mut self, start: u32, opaque: bool) -> PResult<Stmt> {
        let alias = self.with_context(
            |c| c.in_type = true,
            |p| {
                p.advance(); // type
                let name = p.parse_binding_ident()?.name;
                let type_params = p.parse_flow_type_params_opt()?;
                let supertype = if opaque && p.eat(&TokenKind::Colon) { Some(p.parse_flow_union()?) } else { None };
                p.expect(&TokenKind::Eq)?;
                let ty = p.parse_flow_union()?;
                Ok(TypeAlias { name, type_params, ty, opaque, supertype, span: Span::new(start, p.prev_end) })
            },
        )?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::TypeAlias(Box::new(alias)), self.span_from(start)))
    }

    /// `interface I<T> extends A, B { ... }`. The current token is `interface`.
    pub(crate) fn parse_interface(&mut self, start: u32) -> PResult<Stmt> {
        let decl = self.with_context(
            |c| c.in_type = true,
            |p| {
                p.advance(); // interface
                let name = p.parse_binding_ident()?.name;
                let type_params = p.parse_flow_type_params_opt()?;
                let mut extends = Vec::new();
                if p.eat(&TokenKind::Extends) {
                    loop {
                        extends.push(p.parse_flow_named()?);
                        if !p.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                p.expect(&TokenKind::LBrace)?;
                let body = p.parse_flow_object_members(&TokenKind::RBrace)?;
                Ok(InterfaceDecl { name, type_params, extends, body, span: Span::new(start, p.current.span.end) })
            },
        )?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::new(StmtKind::Interface(Box::new(decl)), self.span_from(start)))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::{Parser, ParserOptions};

    fn parse_flow(source: &str) -> Module {
        let options = ParserOptions { jsx: false, flow: true };
        match Parser::new(source, options).parse("test.js") {
            Ok(module) => module,
            Err(errors) => panic!("parse failed for {source:?}: {errors}"),
        }
    }

    fn alias_type(source: &str) -> FlowTypeKind {
        let module = parse_flow(source);
        match module.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::TypeAlias(alias)) => alias.ty.kind,
            other => panic!("expected a type alias, got {other:?}"),
        }
    }

    #[test]
    fn test_type_alias_simple() {
        assert_eq!(alias_type("type A = number;"), FlowTypeKind::Number);
        let FlowTypeKind::Nullable(inner) = alias_type("type B = ?string;") else { panic!("expected nullable") };
        assert_eq!(inner.kind, FlowTypeKind::String);
        assert_eq!((inner.span.start, inner.span.end), (10, 16));
    }

    #[test]
    fn test_union_and_array() {
        let FlowTypeKind::Union(types) = alias_type("type U = 'a' | 'b' | number[];") else { panic!("expected union") };
        assert_eq!(types.len(), 3);
        assert!(matches!(types[2].kind, FlowTypeKind::Array(_)));
    }

    #[test]
    fn test_nested_generics_close_cleanly() {
        let FlowTypeKind::Named { name, args } = alias_type("type M = Map<string, Array<number>>;") else { panic!("expected named") };
        assert_eq!(name, vec!["Map".to_string()]);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_exact_object_type() {
        let FlowTypeKind::Object { members, exact } = alias_type("type O = {| a: number, b?: string |};") else { panic!("expected object") };
        assert!(exact);
        assert_eq!(members.len(), 2);
        assert!(matches!(&members[1], FlowObjectMember::Property { optional: true, .. }));
    }

    #[test]
    fn test_function_type_vs_parenthesized() {
        assert!(matches!(alias_type("type F = (x: number, ...rest: Array<string>) => void;"), FlowTypeKind::Function(_)));
        assert!(matches!(alias_type("type P = (number | string);"), FlowTypeKind::Union(_)));
    }

    #[test]
    fn test_annotated_function() {
        let module = parse_flow("function add(a: number, b?: number = 1): number { return a + (b: any); }");
        let StmtKind::Function(func) = &module.body[0].kind else { panic!("expected function") };
        assert!(func.return_type.is_some());
        assert!(func.params[0].pattern.type_ann.is_some());
        assert!(func.params[1].pattern.optional);
    }

    #[test]
    fn test_generic_class_and_arrow_return_type() {
        let module = parse_flow("class Box<T> extends Base<T> implements Wrapper { value: T; }\nconst f = (x: number): string => String(x);");
        let StmtKind::Class(class) = &module.body[0].kind else { panic!("expected class") };
        assert_eq!(class.type_params.len(), 1);
        assert_eq!(class.super_type_args.len(), 1);
        assert_eq!(class.implements.len(), 1);
    }

    #[test]
    fn test_interface_and_opaque() {
        let module = parse_flow("interface Shape extends Base { area(): number; name: string }\nopaque type Id: string = string;");
        assert!(matches!(&module.body[0].kind, StmtKind::Interface(decl) if decl.body.len() == 2));
        assert!(matches!(&module.body[1].kind, StmtKind::TypeAlias(alias) if alias.opaque && alias.supertype.is_some()));
    }

    #[test]
    fn test_type_is_still_an_identifier() {
        let module = parse_flow("const type = 1;\ntype + 1;\nfoo({ type });");
        assert_eq!(module.body.len(), 3);
    }

    #[test]
    fn test_type_declaration_inside_function_is_rejected() {
        let options = ParserOptions { jsx: false, flow: true };
        let errors = Parser::new("function f() { type T = number; }", options).parse("test.js").unwrap_err();
        assert!(errors.first().map_or(false, |e| e.message.contains("top level")));
    }
}
