//! JSX parsing.
//!
//! JSX parsing methods, integrated into the Parser as extension methods.
//! The lexer has three modes for JSX: ordinary tokens (inside `{...}`),
//! tag tokens (names may contain `-`, strings have no escapes) and child
//! tokens (raw text runs). Each method below documents which mode the
//! current token was scanned in, and which mode it leaves behind.

use crate::ast::*;
use crate::parser::{PResult, Parser};
use crate::span::Span;
use crate::token::TokenKind;

/// How to scan the token that follows a finished element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsxExit {
    /// The element was an expression operand.
    Expression,
    /// The element was a child of another element.
    Child,
    /// The element was an attribute value.
    Attribute,
}

/// Lowercase names and names containing `-` are host elements.
pub fn is_intrinsic_element(name: &str) -> bool {
    name.contains('-') || name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

impl<'a> Parser<'a> {
    /// Parse a JSX element or fragment starting at `<` in expression position.
    pub(crate) fn parse_jsx_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let current = self.current.clone();
        self.current = self.lexer.rescan_jsx_open(&current);

        if self.check(&TokenKind::JsxFragmentOpen) {
            let fragment = self.parse_jsx_fragment(JsxExit::Expression)?;
            return Ok(Expr::new(ExprKind::JsxFragment(Box::new(fragment)), self.span_from(start)));
        }
        let element = self.parse_jsx_element(JsxExit::Expression)?;
        Ok(Expr::new(ExprKind::JsxElement(Box::new(element)), self.span_from(start)))
    }

    /// Step past the final `>` of an element or fragment.
    fn finish_jsx(&mut self, exit: JsxExit) {
        match exit {
            JsxExit::Expression => self.advance(),
            JsxExit::Child => self.advance_jsx_child(),
            JsxExit::Attribute => self.advance_jsx_tag(),
        };
    }

    /// `<>children</>`; the current token is the fragment opener.
    fn parse_jsx_fragment(&mut self, exit: JsxExit) -> PResult<JsxFragment> {
        let start = self.current.span.start;
        self.advance_jsx_child();
        let children = self.parse_jsx_children()?;
        if !self.check(&TokenKind::JsxFragmentClose) {
            return Err(self.error("Expected corresponding JSX closing tag for <>", self.current.span));
        }
        let close_end = self.current.span.end;
        self.finish_jsx(exit);
        Ok(JsxFragment { children, span: Span::new(start, close_end) })
    }

    /// `<Tag attrs>children</Tag>` or `<Tag attrs />`; the current token is `<`.
    fn parse_jsx_element(&mut self, exit: JsxExit) -> PResult<JsxElement> {
        let start = self.current.span.start;
        self.advance_jsx_tag(); // <
        let name = self.parse_jsx_element_name()?;
        let attributes = self.parse_jsx_attributes()?;

        if self.check(&TokenKind::JsxSelfClose) {
            let end = self.current.span.end;
            self.finish_jsx(exit);
            return Ok(JsxElement { name, attributes, children: Vec::new(), self_closing: true, span: Span::new(start, end) });
        }

        if !self.check(&TokenKind::Gt) {
            return Err(self.unexpected());
        }
        self.advance_jsx_child(); // >
        let children = self.parse_jsx_children()?;

        if !self.check(&TokenKind::JsxCloseTag) {
            return Err(self.unexpected());
        }
        let close_start = self.current.span.start;
        self.advance_jsx_tag(); // </
        let close_name = self.parse_jsx_element_name()?;
        if close_name_text(&close_name) != close_name_text(&name) {
            return Err(self.error(
                format!("Expected corresponding JSX closing tag for <{}>", close_name_text(&name)),
                self.span_from(close_start),
            ));
        }
        if !self.check(&TokenKind::Gt) {
            return Err(self.unexpected());
        }
        let end = self.current.span.end;
        self.finish_jsx(exit);

        Ok(JsxElement { name, attributes, children, self_closing: false, span: Span::new(start, end) })
    }

    /// Tag name in tag mode: `div`, `Foo`, `Foo.Bar`, `svg:rect`.
    fn parse_jsx_element_name(&mut self) -> PResult<JsxElementName> {
        let (first, span) = self.expect_jsx_name()?;

        if self.check(&TokenKind::Colon) {
            self.advance_jsx_tag();
            let (name, _) = self.expect_jsx_name()?;
            return Ok(JsxElementName::Namespaced { namespace: first, name });
        }

        if self.check(&TokenKind::Dot) {
            let mut path = Vec::new();
            while self.check(&TokenKind::Dot) {
                self.advance_jsx_tag();
                path.push(self.expect_jsx_name()?.0);
            }
            return Ok(JsxElementName::Member { object: Ident::new(first, span), path });
        }

        if is_intrinsic_element(&first) {
            Ok(JsxElementName::Intrinsic(first))
        } else {
            Ok(JsxElementName::Component(Ident::new(first, span)))
        }
    }

    fn expect_jsx_name(&mut self) -> PResult<(String, Span)> {
        match self.peek().as_word().map(str::to_string) {
            Some(name) => {
                let token = self.advance_jsx_tag();
                Ok((name, token.span))
            }
            None => Err(self.unexpected()),
        }
    }

    /// Attributes up to `>` or `/>`.
    fn parse_jsx_attributes(&mut self) -> PResult<Vec<JsxAttribute>> {
        let mut attributes = Vec::new();

        loop {
            let start = self.current.span.start;
            match self.peek() {
                TokenKind::Gt | TokenKind::JsxSelfClose => break,

                // `{...expr}`
                TokenKind::LBrace => {
                    self.advance();
                    self.expect(&TokenKind::Spread)?;
                    let argument = self.with_context(|c| c.allow_in = true, Self::parse_assign_expr)?;
                    if !self.check(&TokenKind::RBrace) {
                        return Err(self.unexpected());
                    }
                    let span = Span::new(start, self.current.span.end);
                    self.advance_jsx_tag();
                    attributes.push(JsxAttribute::Spread { argument, span });
                }

                // `name`, `name="value"`, `name={expr}`, `ns:name=<El />`
                _ => {
                    let (mut name, _) = self.expect_jsx_name()?;
                    if self.check(&TokenKind::Colon) {
                        self.advance_jsx_tag();
                        let (local, _) = self.expect_jsx_name()?;
                        name = format!("{name}:{local}");
                    }
                    let value = if self.check(&TokenKind::Eq) {
                        self.advance_jsx_tag();
                        Some(self.parse_jsx_attr_value()?)
                    } else {
                        None
                    };
                    attributes.push(JsxAttribute::Attribute { name, value, span: self.span_from(start) });
                }
            }
        }

        Ok(attributes)
    }

    /// Attribute value in tag mode; leaves the next tag token current.
    fn parse_jsx_attr_value(&mut self) -> PResult<JsxAttrValue> {
        match self.peek().clone() {
            TokenKind::String(value) => {
                self.advance_jsx_tag();
                Ok(JsxAttrValue::String(value))
            }
            TokenKind::LBrace => {
                self.advance();
                let expr = self.with_context(|c| c.allow_in = true, Self::parse_assign_expr)?;
                if !self.check(&TokenKind::RBrace) {
                    return Err(self.unexpected());
                }
                self.advance_jsx_tag();
                Ok(JsxAttrValue::Expr(expr))
            }
            TokenKind::Lt => {
                let current = self.current.clone();
                self.current = self.lexer.rescan_jsx_open(&current);
                if self.check(&TokenKind::JsxFragmentOpen) {
                    Ok(JsxAttrValue::Fragment(Box::new(self.parse_jsx_fragment(JsxExit::Attribute)?)))
                } else {
                    Ok(JsxAttrValue::Element(Box::new(self.parse_jsx_element(JsxExit::Attribute)?)))
                }
            }
            _ => Err(self.error("JSX attribute value must be a string, an expression or an element", self.current.span)),
        }
    }

    /// Children in child mode, up to `</` or `</>` (left current).
    fn parse_jsx_children(&mut self) -> PResult<Vec<JsxChild>> {
        let mut children = Vec::new();

        loop {
            match self.peek().clone() {
                TokenKind::JsxCloseTag | TokenKind::JsxFragmentClose => break,
                TokenKind::Eof => return Err(self.error("Unterminated JSX contents", self.current.span)),
                TokenKind::JsxText(text) => {
                    self.advance_jsx_child();
                    children.push(JsxChild::Text(text));
                }
                TokenKind::Lt => {
                    let element = self.parse_jsx_element(JsxExit::Child)?;
                    children.push(JsxChild::Element(Box::new(element)));
                }
                TokenKind::JsxFragmentOpen => {
                    let fragment = self.parse_jsx_fragment(JsxExit::Child)?;
                    children.push(JsxChild::Fragment(Box::new(fragment)));
                }
                TokenKind::LBrace => {
                    self.advance();
                    // `{}` and `{/* comment */}` are empty expressions.
                    if self.check(&TokenKind::RBrace) {
                        self.advance_jsx_child();
                        continue;
                    }
                    let is_spread = self.eat(&TokenKind::Spread);
                    let expr = self.with_context(|c| c.allow_in = true, Self::parse_expr)?;
                    if !self.check(&TokenKind::RBrace) {
                        return Err(self.unexpected());
                    }
                    self.advance_jsx_child();
                    children.push(if is_spread { JsxChild::Spread(expr) } else { JsxChild::Expr(expr) });
                }
                _ => return Err(self.unexpected()),
            }
        }

        Ok(children)
    }
}

/// Printable tag name, used to match opening and closing tags.
fn close_name_text(name: &JsxElementName) -> String {
    match name {
        JsxElementName::Intrinsic(name) => name.clone(),
        JsxElementName::Component(ident) => ident.name.clone(),
        JsxElementName::Member { object, path } => {
            let mut text = object.name.clone();
            for part in path {
                text.push('.');
                text.push_str(part);
            }
            text
        }
        JsxElementName::Namespaced { namespace, name } => format!("{namespace}:{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserOptions;

    fn parse_jsx(source: &str) -> Expr {
        let options = ParserOptions { jsx: true, flow: false };
        let module = match Parser::new(source, options).parse("test.jsx") {
            Ok(module) => module,
            Err(errors) => panic!("parse failed for {source:?}: {errors}"),
        };
        match module.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            Some(StmtKind::Var(decl)) => decl.decls.into_iter().next().and_then(|d| d.init).expect("initializer"),
            other => panic!("expected an expression, got {other:?}"),
        }
    }

    #[test]
    fn test_intrinsic_detection() {
        assert!(is_intrinsic_element("div"));
        assert!(is_intrinsic_element("my-element"));
        assert!(!is_intrinsic_element("Button"));
    }

    #[test]
    fn test_self_closing_element() {
        let ExprKind::JsxElement(element) = parse_jsx("<input disabled value={x} />;").kind else { panic!("expected element") };
        assert!(element.self_closing);
        assert_eq!(element.name, JsxElementName::Intrinsic("input".into()));
        assert_eq!(element.attributes.len(), 2);
    }

    #[test]
    fn test_children_and_nesting() {
        let ExprKind::JsxElement(element) = parse_jsx("<ul className=\"list\">\n  <li>{item.name}</li>\n  text\n</ul>;").kind else {
            panic!("expected element")
        };
        let kinds: Vec<&str> = element
            .children
            .iter()
            .map(|child| match child {
                JsxChild::Text(_) => "text",
                JsxChild::Element(_) => "element",
                JsxChild::Expr(_) => "expr",
                JsxChild::Fragment(_) => "fragment",
                JsxChild::Spread(_) => "spread",
            })
            .collect();
        assert_eq!(kinds, vec!["text", "element", "text"]);
    }

    #[test]
    fn test_fragment_and_components() {
        let ExprKind::JsxFragment(fragment) = parse_jsx("<><Foo.Bar data-id='1' {...props} /><App /></>;").kind else {
            panic!("expected fragment")
        };
        assert_eq!(fragment.children.len(), 2);
        let JsxChild::Element(first) = &fragment.children[0] else { panic!("expected element") };
        assert!(matches!(&first.name, JsxElementName::Member { object, path } if object.name == "Foo" && path == &vec!["Bar".to_string()]));
        assert!(matches!(&first.attributes[0], JsxAttribute::Attribute { name, .. } if name == "data-id"));
        assert!(matches!(first.attributes[1], JsxAttribute::Spread { .. }));
    }

    #[test]
    fn test_arrow_returning_jsx_in_attribute() {
        let expr = parse_jsx("const el = <button onClick={() => setCount(count + 1)}>+</button>;");
        assert!(matches!(expr.kind, ExprKind::JsxElement(_)));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let options = ParserOptions { jsx: true, flow: false };
        let errors = Parser::new("<div></span>;", options).parse("test.jsx").unwrap_err();
        assert!(errors.first().map_or(false, |e| e.message.contains("closing tag for <div>")));
    }

    #[test]
    fn test_less_than_is_still_comparison() {
        let expr = parse_jsx("a < b;");
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Lt, .. }));
    }
}
