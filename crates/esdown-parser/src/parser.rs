//! JavaScript parser with Flow and JSX extensions.
//!
//! A recursive descent parser with precedence climbing for binary
//! operators. The parser holds exactly one token of lookahead and drives
//! the lexer on demand. Ambiguous prefixes (arrow parameters versus a
//! parenthesized expression, a destructuring target versus an array or
//! object literal) are resolved by speculation: take a [`Snapshot`], try
//! the more specific production, and restore on failure. Errors from an
//! abandoned attempt are discarded with the snapshot.
//!
//! Contextual rules (inside a function, loop, switch, class; whether `in`,
//! `await`, `yield` are active) live on a stack of [`Context`] frames pushed
//! with [`Parser::with_context`], which pops on every exit path.

use rustc_hash::FxHashSet;

use crate::ast::*;
use crate::error::{ErrorList, ParseError};
use crate::lexer::{LexContext, Lexer};
use crate::span::{LineIndex, Span};
use crate::token::{Token, TokenKind};

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Nesting levels of statements, expressions, patterns and types before
/// parsing gives up instead of exhausting the stack.
pub const MAX_NESTING_DEPTH: u32 = 256;

/// Parser configuration options.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Parse JSX elements in expression position.
    pub jsx: bool,
    /// Parse Flow type annotations and declarations.
    pub flow: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { jsx: cfg!(feature = "jsx"), flow: cfg!(feature = "flow") }
    }
}

/// Grammar context flags. One frame per nested construct.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context {
    pub in_function: bool,
    pub in_iteration: bool,
    pub in_switch: bool,
    pub in_class: bool,
    /// `in` is a binary operator (false only in a `for` init segment).
    pub allow_in: bool,
    pub allow_await: bool,
    pub allow_yield: bool,
    pub in_type: bool,
    /// Directly in the module body: imports, exports and Flow declarations.
    pub at_module_root: bool,
    /// Labels below this index belong to an enclosing function.
    pub label_base: usize,
    /// `(x): T =>` is not an arrow head here (conditional consequent retry).
    pub no_arrow_return_type: bool,
}

impl Context {
    fn module() -> Self {
        Self {
            in_function: false,
            in_iteration: false,
            in_switch: false,
            in_class: false,
            allow_in: true,
            allow_await: false,
            allow_yield: false,
            in_type: false,
            at_module_root: true,
            label_base: 0,
            no_arrow_return_type: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Label {
    name: String,
    is_loop: bool,
}

/// Which ambiguity a speculative parse is resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Speculation {
    ArrowParams,
    AssignPattern,
    ForHead,
    FlowFunctionType,
}

/// Everything needed to rewind the parser to an earlier token.
struct Snapshot<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_end: u32,
    errors: usize,
    contexts: usize,
    labels: usize,
}

/// What kind of function is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionFlavor {
    Declaration,
    Expression,
}

/// The parser.
pub struct Parser<'a> {
    pub(crate) lexer: Lexer<'a>,
    /// Current token.
    pub(crate) current: Token,
    /// End offset of the last consumed token.
    pub(crate) prev_end: u32,
    pub(crate) options: ParserOptions,
    lines: LineIndex,
    /// Soft errors: parsing continues, but no AST is returned.
    errors: Vec<ParseError>,
    contexts: Vec<Context>,
    labels: Vec<Label>,
    /// Positions where a speculative parse already failed.
    failed_speculations: FxHashSet<(u32, Speculation)>,
    depth: u32,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(source: &'a str, options: ParserOptions) -> Self {
        let mut lexer = Lexer::new(source);
        let contexts = vec![Context::module()];
        lexer.set_context(LexContext { flow_declarations: options.flow, ..LexContext::default() });
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            prev_end: 0,
            options,
            lines: LineIndex::new(source),
            errors: Vec::new(),
            contexts,
            labels: Vec::new(),
            failed_speculations: FxHashSet::default(),
            depth: 0,
        }
    }

    /// Parse the entire source into a [`Module`].
    pub fn parse(mut self, filename: &str) -> Result<Module, ErrorList> {
        let result = self.parse_program();
        let mut errors = std::mem::take(&mut self.errors);
        match result {
            Ok(body) if errors.is_empty() => {
                let mut module = Module::new(filename, body);
                module.lines = self.lines;
                Ok(module)
            }
            Ok(_) => Err(ErrorList::new(filename, errors)),
            Err(error) => {
                errors.push(error);
                Err(ErrorList::new(filename, errors))
            }
        }
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    /// Get the current token kind.
    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Advance to the next token and return the previous.
    pub(crate) fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        self.prev_end = self.current.span.end;
        std::mem::replace(&mut self.current, next)
    }

    /// Advance, scanning the next token inside a JSX tag.
    pub(crate) fn advance_jsx_tag(&mut self) -> Token {
        let next = self.lexer.next_jsx_tag_token();
        self.prev_end = self.current.span.end;
        std::mem::replace(&mut self.current, next)
    }

    /// Advance, scanning the next token as JSX child content.
    pub(crate) fn advance_jsx_child(&mut self) -> Token {
        let next = self.lexer.next_jsx_child_token();
        self.prev_end = self.current.span.end;
        std::mem::replace(&mut self.current, next)
    }

    /// Check if the current token matches the given kind (payloads ignored).
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    /// Check if at end of file.
    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    /// Consume a token if it matches, otherwise return an error.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_expecting(&kind.to_string()))
        }
    }

    /// Consume a token if it matches, returning true if consumed.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Whether the current token is the identifier `word`.
    pub(crate) fn is_contextual(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Identifier(name) if name == word)
    }

    pub(crate) fn eat_contextual(&mut self, word: &str) -> bool {
        if self.is_contextual(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a semicolon, or accept an automatic one.
    pub(crate) fn expect_semicolon(&mut self) -> PResult<()> {
        if self.eat(&TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(&TokenKind::RBrace) || self.is_eof() || self.current.asi {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub(crate) fn error(&self, message: impl Into<String>, span: Span) -> ParseError {
        ParseError::new(message, span, &self.lines)
    }

    /// Record an error without aborting the parse.
    pub(crate) fn report(&mut self, message: impl Into<String>, span: Span) {
        let error = self.error(message, span);
        self.errors.push(error);
    }

    /// Error for the current token. Illegal tokens report their own message.
    pub(crate) fn unexpected(&self) -> ParseError {
        let span = self.current.span;
        match &self.current.kind {
            TokenKind::Illegal(message) => self.error(message.clone(), span),
            TokenKind::Eof => self.error("Unexpected end of input", span),
            TokenKind::Identifier(name) => self.error(format!("Unexpected identifier '{name}'"), span),
            kind => self.error(format!("Unexpected token '{kind}'"), span),
        }
    }

    fn unexpected_expecting(&self, expected: &str) -> ParseError {
        match &self.current.kind {
            TokenKind::Illegal(_) => self.unexpected(),
            TokenKind::Eof => self.error(format!("Unexpected end of input, expected '{expected}'"), self.current.span),
            kind => self.error(format!("Unexpected token '{kind}', expected '{expected}'"), self.current.span),
        }
    }

    // =========================================================================
    // Context stack and speculation
    // =========================================================================

    pub(crate) fn ctx(&self) -> Context {
        self.contexts.last().copied().unwrap_or_else(Context::module)
    }

    /// Run `body` with an updated context frame, popping it afterwards
    /// whether `body` succeeded or not.
    pub(crate) fn with_context<T>(
        &mut self,
        update: impl FnOnce(&mut Context),
        body: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let mut context = self.ctx();
        update(&mut context);
        self.contexts.push(context);
        self.sync_lexer_context();
        let result = body(self);
        self.contexts.pop();
        self.sync_lexer_context();
        result
    }

    /// Context for a function body (also used for arrows and methods).
    fn function_context(&self, is_async: bool, is_generator: bool) -> impl FnOnce(&mut Context) {
        let label_base = self.labels.len();
        move |c: &mut Context| {
            c.in_function = true;
            c.in_iteration = false;
            c.in_switch = false;
            c.allow_in = true;
            c.allow_await = is_async;
            c.allow_yield = is_generator;
            c.in_type = false;
            c.at_module_root = false;
            c.label_base = label_base;
            c.no_arrow_return_type = false;
        }
    }

    /// Push the flags the lexer cares about, rescanning the current token
    /// if its classification may have changed.
    fn sync_lexer_context(&mut self) {
        let ctx = self.ctx();
        let wanted = LexContext {
            await_keyword: ctx.allow_await,
            yield_keyword: ctx.allow_yield,
            flow_declarations: self.options.flow && ctx.at_module_root,
            in_type: ctx.in_type,
        };
        if wanted == self.lexer.context() {
            return;
        }
        self.lexer.set_context(wanted);
        let rescan = matches!(
            self.current.kind,
            TokenKind::Identifier(_)
                | TokenKind::Await
                | TokenKind::Yield
                | TokenKind::Type
                | TokenKind::Interface
                | TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::GtGt
                | TokenKind::GtGtEq
                | TokenKind::GtGtGt
                | TokenKind::GtGtGtEq
        );
        if rescan {
            let current = self.current.clone();
            self.current = self.lexer.rescan(&current);
        }
    }

    fn snapshot(&self) -> Snapshot<'a> {
        Snapshot {
            lexer: self.lexer.clone(),
            current: self.current.clone(),
            prev_end: self.prev_end,
            errors: self.errors.len(),
            contexts: self.contexts.len(),
            labels: self.labels.len(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot<'a>) {
        self.lexer = snapshot.lexer;
        self.current = snapshot.current;
        self.prev_end = snapshot.prev_end;
        self.errors.truncate(snapshot.errors);
        self.contexts.truncate(snapshot.contexts);
        self.labels.truncate(snapshot.labels);
    }

    /// Run `parse` one nesting level deeper.
    pub(crate) fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Expression nested too deeply", self.current.span));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Attempt `attempt`; on failure rewind to the current token and
    /// return `None`. Failures are remembered per position.
    pub(crate) fn try_parse<T>(
        &mut self,
        kind: Speculation,
        attempt: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> Option<T> {
        let key = (self.current.span.start, kind);
        if self.failed_speculations.contains(&key) {
            return None;
        }
        let snapshot = self.snapshot();
        match attempt(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.restore(snapshot);
                self.failed_speculations.insert(key);
                None
            }
        }
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// The current token's name if it can be used as a binding identifier.
    pub(crate) fn binding_name(&self) -> Option<String> {
        match self.peek() {
            TokenKind::Identifier(name) => Some(name.clone()),
            TokenKind::Type => Some("type".into()),
            TokenKind::Interface => Some("interface".into()),
            _ => None,
        }
    }

    pub(crate) fn at_identifier(&self) -> bool {
        self.binding_name().is_some()
    }

    pub(crate) fn parse_binding_ident(&mut self) -> PResult<Ident> {
        match self.binding_name() {
            Some(name) => {
                let token = self.advance();
                Ok(Ident::new(name, token.span))
            }
            None => Err(self.unexpected_expecting("identifier")),
        }
    }

    /// Any identifier or keyword (property names, import/export names).
    pub(crate) fn parse_word(&mut self) -> PResult<(String, Span)> {
        match self.peek().as_word().map(str::to_string) {
            Some(word) => {
                let token = self.advance();
                Ok((word, token.span))
            }
            None => Err(self.unexpected_expecting("identifier")),
        }
    }

    fn expect_string(&mut self) -> PResult<String> {
        match self.peek().clone() {
            TokenKind::String(value) => {
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected_expecting("string")),
        }
    }

    // =========================================================================
    // Program Parsing
    // =========================================================================

    fn parse_program(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.is_eof() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse a statement.
    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;

        match self.peek() {
            // Declarations
            TokenKind::Var | TokenKind::Let | TokenKind::Const => self.parse_var_stmt(),
            TokenKind::Function => self.parse_function_decl(start, false),
            TokenKind::Class => self.parse_class_decl(start),

            // Control flow
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::Break => self.parse_break_stmt(),
            TokenKind::Continue => self.parse_continue_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Throw => self.parse_throw_stmt(),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::With => self.parse_with_stmt(),
            TokenKind::Debugger => {
                self.advance();
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::Debugger, self.span_from(start)))
            }

            TokenKind::LBrace => self.parse_block_stmt(),

            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::new(StmtKind::Empty, self.span_from(start)))
            }

            // Module declarations (dynamic `import(...)` and `import.meta` are expressions)
            TokenKind::Import if !matches!(self.lexer.peek().kind, TokenKind::LParen | TokenKind::Dot) => {
                if !self.ctx().at_module_root {
                    return Err(self.error("'import' declarations may only appear at the top level", self.current.span));
                }
                self.parse_import_decl()
            }
            TokenKind::Export => {
                if !self.ctx().at_module_root {
                    return Err(self.error("'export' declarations may only appear at the top level", self.current.span));
                }
                self.parse_export_decl()
            }

            // Flow declarations (promoted only at module root)
            TokenKind::Type if self.next_is_identifier() => self.parse_type_alias(start, false),
            TokenKind::Interface if self.next_is_identifier() => self.parse_interface(start),

            TokenKind::Identifier(_) => self.parse_identifier_stmt(start),

            _ => self.parse_expr_stmt(),
        }
    }

    /// Statements introduced by a contextual word: `async function`,
    /// `opaque type`, labels; otherwise an expression statement.
    fn parse_identifier_stmt(&mut self, start: u32) -> PResult<Stmt> {
        let TokenKind::Identifier(name) = self.peek().clone() else {
            return self.parse_expr_stmt();
        };
        match name.as_str() {
            "async" if self.next_is_function_on_same_line() => {
                self.advance();
                self.parse_function_decl(start, true)
            }
            "opaque" if self.options.flow && matches!(self.lexer.peek().kind, TokenKind::Type) => {
                self.advance();
                self.parse_type_alias(start, true)
            }
            "type" | "interface" if self.options.flow && self.next_is_identifier() => Err(self.error(
                "Type declarations are only allowed at the top level of a module",
                self.current.span,
            )),
            _ if matches!(self.lexer.peek().kind, TokenKind::Colon) => self.parse_labeled_stmt(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn next_is_identifier(&self) -> bool {
        let next = self.lexer.peek();
        matches!(next.kind, TokenKind::Identifier(_)) && !next.newline_before
    }

    fn next_is_function_on_same_line(&self) -> bool {
        let next = self.lexer.peek();
        matches!(next.kind, TokenKind::Function) && !next.newline_before
    }

    /// A statement nested in another statement (never at module root).
    fn parse_nested_stmt(&mut self) -> PResult<Stmt> {
        self.with_context(|c| c.at_module_root = false, Self::parse_stmt)
    }

    /// Parse a block statement.
    fn parse_block_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        let body = self.parse_block_body()?;
        Ok(Stmt::new(StmtKind::Block(body), self.span_from(start)))
    }

    /// `{ stmts }`, returning the statements.
    pub(crate) fn parse_block_body(&mut self) -> PResult<Vec<Stmt>> {
        self.with_context(
            |c| c.at_module_root = false,
            |p| {
                p.expect(&TokenKind::LBrace)?;
                let mut stmts = Vec::new();
                while !p.check(&TokenKind::RBrace) && !p.is_eof() {
                    stmts.push(p.parse_stmt()?);
                }
                p.expect(&TokenKind::RBrace)?;
                Ok(stmts)
            },
        )
    }

    fn parse_labeled_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        let (label, label_span) = self.parse_word()?;
        self.expect(&TokenKind::Colon)?;

        let base = self.ctx().label_base;
        if self.labels[base..].iter().any(|l| l.name == label) {
            self.report(format!("Label '{label}' has already been declared"), label_span);
        }
        let is_loop = matches!(self.peek(), TokenKind::For | TokenKind::While | TokenKind::Do);
        self.labels.push(Label { name: label.clone(), is_loop });
        let body = self.parse_nested_stmt();
        self.labels.pop();
        let body = body?;

        Ok(Stmt::new(StmtKind::Labeled { label, body: Box::new(body) }, self.span_from(start)))
    }

    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        let expr = self.parse_expr()?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Expr(expr), self.span_from(start)))
    }

    // === Variable declarations ===

    fn parse_var_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        let decl = self.parse_var_decl()?;
        self.check_declarator_inits(&decl)?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Var(decl), self.span_from(start)))
    }

    /// `var|let|const` followed by declarators. Initializers are optional
    /// here; callers validate them once they know the context.
    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let kind = match self.peek() {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            _ => return Err(self.unexpected()),
        };
        self.advance();

        let mut decls = Vec::new();
        loop {
            let start = self.current.span.start;
            let pattern = self.parse_binding_pattern()?;
            let init = if self.eat(&TokenKind::Eq) { Some(self.parse_assign_expr()?) } else { None };
            decls.push(VarDeclarator { pattern, init, span: self.span_from(start) });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(VarDecl { kind, decls })
    }

    fn check_declarator_inits(&self, decl: &VarDecl) -> PResult<()> {
        for declarator in &decl.decls {
            if declarator.init.is_some() {
                continue;
            }
            if decl.kind == VarKind::Const {
                return Err(self.error("Missing initializer in const declaration", declarator.span));
            }
            if declarator.pattern.is_destructuring() {
                return Err(self.error("Missing initializer in destructuring declaration", declarator.span));
            }
        }
        Ok(())
    }

    // === Patterns ===

    /// A binding target with an optional Flow `?` marker and annotation.
    pub(crate) fn parse_binding_pattern(&mut self) -> PResult<Pattern> {
        let mut pattern = self.parse_binding_target()?;
        if self.options.flow && self.check(&TokenKind::Question) {
            self.advance();
            pattern.optional = true;
        }
        if let Some(ty) = self.parse_type_annotation_opt()? {
            pattern.span = pattern.span.merge(ty.span);
            pattern.type_ann = Some(ty);
        }
        Ok(pattern)
    }

    /// Identifier, array pattern, or object pattern.
    pub(crate) fn parse_binding_target(&mut self) -> PResult<Pattern> {
        self.nested(Self::parse_binding_target_inner)
    }

    fn parse_binding_target_inner(&mut self) -> PResult<Pattern> {
        match self.peek() {
            TokenKind::LBracket => self.parse_array_pattern(false),
            TokenKind::LBrace => self.parse_object_pattern(false),
            _ => Ok(Pattern::ident(self.parse_binding_ident()?)),
        }
    }

    /// A pattern leaf in assignment context: nested pattern or an
    /// identifier/member-expression target.
    fn parse_assign_target(&mut self) -> PResult<Pattern> {
        self.nested(Self::parse_assign_target_inner)
    }

    fn parse_assign_target_inner(&mut self) -> PResult<Pattern> {
        match self.peek() {
            TokenKind::LBracket => self.parse_array_pattern(true),
            TokenKind::LBrace => self.parse_object_pattern(true),
            _ => {
                let expr = self.parse_left_hand_side_expr()?;
                self.expr_to_simple_target(expr, "Invalid destructuring assignment target")
            }
        }
    }

    fn parse_pattern_element(&mut self, assign: bool) -> PResult<Pattern> {
        if assign {
            self.parse_assign_target()
        } else {
            self.parse_binding_target()
        }
    }

    fn parse_pattern_default(&mut self) -> PResult<Option<Expr>> {
        if self.eat(&TokenKind::Eq) {
            Ok(Some(self.with_context(|c| c.allow_in = true, Self::parse_assign_expr)?))
        } else {
            Ok(None)
        }
    }

    fn parse_array_pattern(&mut self, assign: bool) -> PResult<Pattern> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RBracket) && !self.is_eof() {
            if self.check(&TokenKind::Comma) {
                self.advance();
                elements.push(None);
                continue;
            }
            if self.eat(&TokenKind::Spread) {
                rest = Some(Box::new(self.parse_pattern_element(assign)?));
                if self.check(&TokenKind::Comma) {
                    return Err(self.error("Rest element must be last element", self.current.span));
                }
                break;
            }
            let pattern = self.parse_pattern_element(assign)?;
            let default = self.parse_pattern_default()?;
            elements.push(Some(ArrayPatternElement { pattern, default }));
            if !self.check(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBracket)?;

        Ok(Pattern::new(PatternKind::Array { elements, rest }, self.span_from(start)))
    }

    fn parse_object_pattern(&mut self, assign: bool) -> PResult<Pattern> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;

        let mut properties = Vec::new();
        let mut bound_keys = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let prop_start = self.current.span.start;
            if self.eat(&TokenKind::Spread) {
                let target = if assign {
                    self.parse_assign_target()?
                } else {
                    Pattern::ident(self.parse_binding_ident()?)
                };
                rest = Some(Box::new(target));
                if self.check(&TokenKind::Comma) {
                    return Err(self.error("Rest element must be last element", self.current.span));
                }
                break;
            }

            let shorthand_name = self.binding_name();
            let key_span = self.current.span;
            let key = self.parse_property_key()?;
            if let Some(name) = key.static_name() {
                bound_keys.push(name);
            }

            let (value, shorthand) = if self.eat(&TokenKind::Colon) {
                (self.parse_pattern_element(assign)?, false)
            } else {
                let Some(name) = shorthand_name else {
                    return Err(self.unexpected_expecting(":"));
                };
                (Pattern::ident(Ident::new(name, key_span)), true)
            };
            let default = self.parse_pattern_default()?;
            properties.push(ObjectPatternProperty { key, value, default, shorthand, span: self.span_from(prop_start) });

            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Pattern::new(PatternKind::Object { properties, rest, bound_keys }, self.span_from(start)))
    }

    /// Identifier or non-optional member expression as an assignment target.
    fn expr_to_simple_target(&self, expr: Expr, message: &str) -> PResult<Pattern> {
        match expr.kind {
            ExprKind::Ident(ident) => Ok(Pattern::ident(ident)),
            ExprKind::Member { optional: false, .. } if !contains_optional_chain(&expr) => {
                let span = expr.span;
                Ok(Pattern::new(PatternKind::Expr(Box::new(expr)), span))
            }
            _ => Err(self.error(message, expr.span)),
        }
    }

    /// Object literal key.
    pub(crate) fn parse_property_key(&mut self) -> PResult<PropertyKey> {
        match self.peek().clone() {
            TokenKind::String(value) => {
                self.advance();
                Ok(PropertyKey::String(value))
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(PropertyKey::Number(value))
            }
            TokenKind::BigInt(digits) => {
                self.advance();
                Ok(PropertyKey::String(digits))
            }
            TokenKind::PrivateName(name) if self.ctx().in_class => {
                self.advance();
                Ok(PropertyKey::Private(name))
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = self.with_context(|c| c.allow_in = true, Self::parse_assign_expr)?;
                self.expect(&TokenKind::RBracket)?;
                Ok(PropertyKey::Computed(Box::new(expr)))
            }
            _ => {
                let (word, _) = self.parse_word()?;
                Ok(PropertyKey::Ident(word))
            }
        }
    }

    // === Functions ===

    fn parse_function_decl(&mut self, start: u32, is_async: bool) -> PResult<Stmt> {
        let func = self.parse_function(start, is_async, FunctionFlavor::Declaration)?;
        Ok(Stmt::new(StmtKind::Function(Box::new(func)), self.span_from(start)))
    }

    /// `function [*] [name] [<T>] (params) [: R] { body }`, current at `function`.
    fn parse_function(&mut self, start: u32, is_async: bool, flavor: FunctionFlavor) -> PResult<Function> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star);

        let name = if self.at_identifier() {
            Some(self.parse_binding_ident()?)
        } else if flavor == FunctionFlavor::Declaration {
            return Err(self.unexpected_expecting("function name"));
        } else {
            None
        };

        let type_params = self.parse_flow_type_params_opt()?;
        let (params, return_type, body) = self.parse_function_rest(is_async, is_generator)?;

        Ok(Function {
            name,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
            type_params,
            return_type,
        })
    }

    /// Parameters, optional return type and body of any function-like node.
    pub(crate) fn parse_function_rest(
        &mut self,
        is_async: bool,
        is_generator: bool,
    ) -> PResult<(Vec<Param>, Option<Box<FlowType>>, Vec<Stmt>)> {
        let update = self.function_context(is_async, is_generator);
        self.with_context(update, |p| {
            let params = p.parse_params()?;
            let return_type = p.parse_type_annotation_opt()?;
            let body = p.parse_function_body()?;
            Ok((params, return_type, body))
        })
    }

    fn parse_function_body(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// `( param, ... )`
    pub(crate) fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            let start = self.current.span.start;
            if self.eat(&TokenKind::Spread) {
                let pattern = self.parse_binding_pattern()?;
                params.push(Param { pattern, default: None, rest: true, span: self.span_from(start) });
                if !self.check(&TokenKind::RParen) {
                    return Err(self.error("Rest parameter must be last formal parameter", self.current.span));
                }
                break;
            }
            let pattern = self.parse_binding_pattern()?;
            let default = self.parse_pattern_default()?;
            params.push(Param { pattern, default, rest: false, span: self.span_from(start) });
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// Shared by object literal methods and class methods.
    pub(crate) fn parse_method(&mut self, start: u32, is_async: bool, is_generator: bool) -> PResult<Function> {
        let type_params = self.parse_flow_type_params_opt()?;
        let (params, return_type, body) = self.parse_function_rest(is_async, is_generator)?;
        Ok(Function {
            name: None,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
            type_params,
            return_type,
        })
    }

    // === Classes ===

    fn parse_class_decl(&mut self, start: u32) -> PResult<Stmt> {
        let class = self.parse_class(start, true)?;
        Ok(Stmt::new(StmtKind::Class(Box::new(class)), self.span_from(start)))
    }

    fn parse_class(&mut self, start: u32, require_name: bool) -> PResult<Class> {
        self.expect(&TokenKind::Class)?;

        let name = if self.at_identifier() && !self.is_contextual("implements") {
            Some(self.parse_binding_ident()?)
        } else if require_name {
            return Err(self.unexpected_expecting("class name"));
        } else {
            None
        };
        let type_params = self.parse_flow_type_params_opt()?;

        let mut super_class = None;
        let mut super_type_args = Vec::new();
        if self.eat(&TokenKind::Extends) {
            super_class = Some(Box::new(self.parse_left_hand_side_expr()?));
            if self.options.flow && self.check(&TokenKind::Lt) {
                super_type_args = self.parse_flow_type_args()?;
            }
        }

        let mut implements = Vec::new();
        if self.options.flow && self.eat_contextual("implements") {
            loop {
                implements.push(self.parse_flow_type()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let body = self.with_context(
            |c| {
                c.in_class = true;
                c.at_module_root = false;
            },
            |p| {
                p.expect(&TokenKind::LBrace)?;
                let mut members = Vec::new();
                while !p.check(&TokenKind::RBrace) && !p.is_eof() {
                    members.push(p.parse_class_member()?);
                }
                p.expect(&TokenKind::RBrace)?;
                Ok(members)
            },
        )?;

        Ok(Class {
            name,
            super_class,
            body,
            span: self.span_from(start),
            type_params,
            super_type_args,
            implements,
        })
    }

    /// Whether the current word is a modifier (`static`, `get`, `async`)
    /// rather than the member's own name.
    fn word_is_modifier(&self) -> bool {
        let next = self.lexer.peek();
        !matches!(
            next.kind,
            TokenKind::LParen
                | TokenKind::Eq
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Lt
                | TokenKind::Eof
        ) && !next.newline_before
    }

    fn parse_class_member(&mut self) -> PResult<ClassMember> {
        let start = self.current.span.start;
        if self.eat(&TokenKind::Semicolon) {
            return Ok(ClassMember { kind: ClassMemberKind::Empty, span: self.span_from(start) });
        }

        let mut is_static = false;
        if self.is_contextual("static") && self.word_is_modifier() {
            self.advance();
            is_static = true;
        }

        let mut is_async = false;
        let mut is_generator = false;
        let mut accessor = None;
        if self.is_contextual("async") && self.word_is_modifier() {
            self.advance();
            is_async = true;
        }
        if self.eat(&TokenKind::Star) {
            is_generator = true;
        }
        if !is_async && !is_generator && (self.is_contextual("get") || self.is_contextual("set")) && self.word_is_modifier() {
            accessor = Some(if self.is_contextual("get") { MethodKind::Get } else { MethodKind::Set });
            self.advance();
        }

        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let kind = match accessor {
                Some(kind) => kind,
                None if !is_static && matches!(&key, PropertyKey::Ident(name) if name == "constructor") => {
                    MethodKind::Constructor
                }
                None => MethodKind::Method,
            };
            let value = self.parse_method(start, is_async, is_generator)?;
            return Ok(ClassMember {
                kind: ClassMemberKind::Method { key, value, kind, is_static },
                span: self.span_from(start),
            });
        }

        if is_async || is_generator || accessor.is_some() {
            return Err(self.unexpected_expecting("("));
        }

        let type_ann = self.parse_type_annotation_opt()?;
        let value = if self.eat(&TokenKind::Eq) {
            let update = self.function_context(false, false);
            Some(self.with_context(update, Self::parse_assign_expr)?)
        } else {
            None
        };
        self.expect_semicolon()?;

        Ok(ClassMember {
            kind: ClassMemberKind::Property { key, value, is_static, type_ann },
            span: self.span_from(start),
        })
    }

    // === Control flow ===

    /// Parenthesized head expression of `if`, `while`, `switch`, `with`.
    fn parse_paren_head(&mut self) -> PResult<Expr> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.with_context(|c| c.allow_in = true, Self::parse_expr)?;
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::If)?;
        let test = self.parse_paren_head()?;
        let consequent = Box::new(self.parse_nested_stmt()?);
        let alternate = if self.eat(&TokenKind::Else) { Some(Box::new(self.parse_nested_stmt()?)) } else { None };
        Ok(Stmt::new(StmtKind::If { test, consequent, alternate }, self.span_from(start)))
    }

    fn parse_switch_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Switch)?;
        let discriminant = self.parse_paren_head()?;

        let cases = self.with_context(
            |c| {
                c.in_switch = true;
                c.at_module_root = false;
            },
            |p| {
                p.expect(&TokenKind::LBrace)?;
                let mut cases = Vec::new();
                let mut seen_default = false;
                while !p.check(&TokenKind::RBrace) && !p.is_eof() {
                    let case_start = p.current.span.start;
                    let test = if p.eat(&TokenKind::Default) {
                        if seen_default {
                            p.report("More than one default clause in switch statement", p.span_from(case_start));
                        }
                        seen_default = true;
                        None
                    } else {
                        p.expect(&TokenKind::Case)?;
                        Some(p.parse_expr()?)
                    };
                    p.expect(&TokenKind::Colon)?;

                    let mut consequent = Vec::new();
                    while !matches!(p.peek(), TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof) {
                        consequent.push(p.parse_stmt()?);
                    }
                    cases.push(SwitchCase { test, consequent, span: p.span_from(case_start) });
                }
                p.expect(&TokenKind::RBrace)?;
                Ok(cases)
            },
        )?;

        Ok(Stmt::new(StmtKind::Switch { discriminant, cases }, self.span_from(start)))
    }

    fn parse_loop_body(&mut self) -> PResult<Stmt> {
        self.with_context(
            |c| {
                c.in_iteration = true;
                c.at_module_root = false;
            },
            Self::parse_stmt,
        )
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::For)?;
        let is_await = self.eat(&TokenKind::Await);
        self.expect(&TokenKind::LParen)?;

        // `for (;` : classic loop without an initializer
        if self.check(&TokenKind::Semicolon) {
            return self.finish_classic_for(start, None);
        }

        // `for (var|let|const ...`
        if matches!(self.peek(), TokenKind::Var | TokenKind::Let | TokenKind::Const) {
            let decl = self.with_context(|c| c.allow_in = false, Self::parse_var_decl)?;
            let is_of = self.is_contextual("of");
            if is_of || self.check(&TokenKind::In) {
                if decl.decls.len() != 1 || decl.decls[0].init.is_some() {
                    let span = decl.decls.first().map_or(self.current.span, |d| d.span);
                    return Err(self.error("Invalid left-hand side in for-loop: must have a single binding", span));
                }
                let kind = decl.kind;
                let pattern = decl.decls.into_iter().next().map(|d| d.pattern);
                let pattern = pattern.ok_or_else(|| self.unexpected())?;
                return self.finish_for_in_of(start, ForHead::Var { kind, pattern }, is_of, is_await);
            }
            self.check_declarator_inits(&decl)?;
            return self.finish_classic_for(start, Some(ForInit::Var(decl)));
        }

        // `for ([a, b] of ...)` / `for ({a} in ...)`
        if matches!(self.peek(), TokenKind::LBracket | TokenKind::LBrace) {
            let head = self.try_parse(Speculation::ForHead, |p| {
                let pattern = p.parse_assign_target()?;
                if p.is_contextual("of") || p.check(&TokenKind::In) {
                    Ok(pattern)
                } else {
                    Err(p.unexpected())
                }
            });
            if let Some(pattern) = head {
                let is_of = self.is_contextual("of");
                return self.finish_for_in_of(start, ForHead::Pattern(pattern), is_of, is_await);
            }
        }

        let init = self.with_context(|c| c.allow_in = false, Self::parse_expr)?;
        let is_of = self.is_contextual("of");
        if is_of || self.check(&TokenKind::In) {
            let target = self.expr_to_simple_target(init, "Invalid left-hand side in for-loop")?;
            return self.finish_for_in_of(start, ForHead::Pattern(target), is_of, is_await);
        }
        self.finish_classic_for(start, Some(ForInit::Expr(init)))
    }

    /// After the init segment of `for (init; test; update) body`.
    fn finish_classic_for(&mut self, start: u32, init: Option<ForInit>) -> PResult<Stmt> {
        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body()?);
        Ok(Stmt::new(StmtKind::For { init, test, update, body }, self.span_from(start)))
    }

    /// Current token is `in` or `of`.
    fn finish_for_in_of(&mut self, start: u32, left: ForHead, is_of: bool, is_await: bool) -> PResult<Stmt> {
        self.advance(); // in / of
        let right = if is_of { self.parse_assign_expr()? } else { self.parse_expr()? };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body()?);
        let kind = if is_of {
            StmtKind::ForOf { left, right, body, is_await }
        } else {
            if is_await {
                return Err(self.error("'for await' requires 'of'", self.span_from(start)));
            }
            StmtKind::ForIn { left, right, body }
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::While)?;
        let test = self.parse_paren_head()?;
        let body = Box::new(self.parse_loop_body()?);
        Ok(Stmt::new(StmtKind::While { test, body }, self.span_from(start)))
    }

    fn parse_do_while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Do)?;
        let body = Box::new(self.parse_loop_body()?);
        self.expect(&TokenKind::While)?;
        let test = self.parse_paren_head()?;
        // A semicolon is always optional after do-while.
        self.eat(&TokenKind::Semicolon);
        Ok(Stmt::new(StmtKind::DoWhile { body, test }, self.span_from(start)))
    }

    /// Optional label after `break`/`continue` (same line only).
    fn parse_jump_label(&mut self) -> Option<(String, Span)> {
        if self.current.newline_before {
            return None;
        }
        let name = self.binding_name()?;
        let token = self.advance();
        Some((name, token.span))
    }

    fn parse_break_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Break)?;
        let label = self.parse_jump_label();
        let ctx = self.ctx();

        match &label {
            Some((name, span)) => {
                if !self.labels[ctx.label_base..].iter().any(|l| &l.name == name) {
                    self.report(format!("Undefined label '{name}'"), *span);
                }
            }
            None if !ctx.in_iteration && !ctx.in_switch => {
                self.report("Illegal break statement", self.span_from(start));
            }
            None => {}
        }

        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Break { label: label.map(|(name, _)| name) }, self.span_from(start)))
    }

    fn parse_continue_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Continue)?;
        let label = self.parse_jump_label();
        let ctx = self.ctx();

        if !ctx.in_iteration {
            self.report("Illegal continue statement: no surrounding iteration statement", self.span_from(start));
        } else if let Some((name, span)) = &label {
            match self.labels[ctx.label_base..].iter().rev().find(|l| &l.name == name) {
                None => self.report(format!("Undefined label '{name}'"), *span),
                Some(found) if !found.is_loop => self.report(
                    format!("Illegal continue statement: '{name}' does not denote an iteration statement"),
                    *span,
                ),
                Some(_) => {}
            }
        }

        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Continue { label: label.map(|(name, _)| name) }, self.span_from(start)))
    }

    fn parse_return_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        let keyword = self.expect(&TokenKind::Return)?;
        if !self.ctx().in_function {
            self.report("Illegal return statement", keyword.span);
        }
        let arg = if self.current.newline_before
            || matches!(self.peek(), TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Return { arg }, self.span_from(start)))
    }

    fn parse_throw_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Throw)?;
        if self.current.newline_before {
            return Err(self.error("Illegal newline after throw", self.current.span));
        }
        let arg = self.parse_expr()?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Throw { arg }, self.span_from(start)))
    }

    fn parse_try_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Try)?;
        let block = self.parse_block_body()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current.span.start;
            self.advance();
            let param = if self.eat(&TokenKind::LParen) {
                let pattern = self.parse_binding_pattern()?;
                self.expect(&TokenKind::RParen)?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block_body()?;
            Some(CatchClause { param, body, span: self.span_from(catch_start) })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) { Some(self.parse_block_body()?) } else { None };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Missing catch or finally after try", self.span_from(start)));
        }

        Ok(Stmt::new(StmtKind::Try { block, handler, finalizer }, self.span_from(start)))
    }

    fn parse_with_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::With)?;
        let object = self.parse_paren_head()?;
        let body = Box::new(self.parse_nested_stmt()?);
        Ok(Stmt::new(StmtKind::With { object, body }, self.span_from(start)))
    }

    // === Modules ===

    fn parse_import_decl(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Import)?;

        // import "mod";
        if let TokenKind::String(source) = self.peek().clone() {
            self.advance();
            self.expect_semicolon()?;
            let decl = ImportDecl { specifiers: Vec::new(), source, type_only: false, span: self.span_from(start) };
            return Ok(Stmt::new(StmtKind::Import(Box::new(decl)), self.span_from(start)));
        }

        // import type { T } from "mod" / import typeof X from "mod"
        let mut type_only = false;
        if self.options.flow && (self.check(&TokenKind::Type) || self.check(&TokenKind::Typeof)) {
            let next = self.lexer.peek();
            let introduces_specifiers = match &next.kind {
                TokenKind::LBrace | TokenKind::Star => true,
                TokenKind::Identifier(name) => name != "from",
                _ => false,
            };
            if introduces_specifiers {
                self.advance();
                type_only = true;
            }
        }

        let mut specifiers = Vec::new();
        if self.at_identifier() {
            let local = self.parse_binding_ident()?;
            specifiers.push(ImportSpecifier::Default { local });
            if !self.eat(&TokenKind::Comma) {
                return self.finish_import(start, specifiers, type_only);
            }
        }

        if self.eat(&TokenKind::Star) {
            if !self.eat_contextual("as") {
                return Err(self.unexpected_expecting("as"));
            }
            let local = self.parse_binding_ident()?;
            specifiers.push(ImportSpecifier::Namespace { local });
        } else if self.eat(&TokenKind::LBrace) {
            while !self.check(&TokenKind::RBrace) && !self.is_eof() {
                let imported_token = self.current.clone();
                let imported = match &imported_token.kind {
                    TokenKind::String(value) => {
                        self.advance();
                        value.clone()
                    }
                    _ => self.parse_word()?.0,
                };
                let local = if self.eat_contextual("as") {
                    self.parse_binding_ident()?
                } else {
                    let reserved = match &imported_token.kind {
                        TokenKind::String(_) => true,
                        TokenKind::Type | TokenKind::Interface => false,
                        kind => kind.is_keyword(),
                    };
                    if reserved {
                        return Err(self.error(format!("Unexpected reserved word '{imported}'"), imported_token.span));
                    }
                    Ident::new(imported.clone(), imported_token.span)
                };
                specifiers.push(ImportSpecifier::Named { imported, local });
                if !self.check(&TokenKind::RBrace) {
                    self.expect(&TokenKind::Comma)?;
                }
            }
            self.expect(&TokenKind::RBrace)?;
        } else {
            return Err(self.unexpected());
        }

        self.finish_import(start, specifiers, type_only)
    }

    fn finish_import(&mut self, start: u32, specifiers: Vec<ImportSpecifier>, type_only: bool) -> PResult<Stmt> {
        if !self.eat_contextual("from") {
            return Err(self.unexpected_expecting("from"));
        }
        let source = self.expect_string()?;
        self.expect_semicolon()?;
        let decl = ImportDecl { specifiers, source, type_only, span: self.span_from(start) };
        Ok(Stmt::new(StmtKind::Import(Box::new(decl)), self.span_from(start)))
    }

    fn parse_export_decl(&mut self) -> PResult<Stmt> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Export)?;

        let decl = match self.peek() {
            // export * from "mod" / export * as ns from "mod"
            TokenKind::Star => {
                self.advance();
                let exported = if self.eat_contextual("as") { Some(self.parse_word()?.0) } else { None };
                if !self.eat_contextual("from") {
                    return Err(self.unexpected_expecting("from"));
                }
                let source = self.expect_string()?;
                self.expect_semicolon()?;
                ExportDecl::All { exported, source }
            }

            // export default ...
            TokenKind::Default => {
                self.advance();
                self.parse_export_default()?
            }

            // export { a, b as c } [from "mod"]
            TokenKind::LBrace => self.parse_export_named(false)?,

            // export type { T } / export type T = ... / export interface I {}
            TokenKind::Type | TokenKind::Interface if self.options.flow => {
                if self.check(&TokenKind::Type) && matches!(self.lexer.peek().kind, TokenKind::LBrace) {
                    self.advance();
                    self.parse_export_named(true)?
                } else {
                    let decl_start = self.current.span.start;
                    let stmt = if self.check(&TokenKind::Type) {
                        self.parse_type_alias(decl_start, false)?
                    } else {
                        self.parse_interface(decl_start)?
                    };
                    ExportDecl::Decl { decl: stmt }
                }
            }

            // export var/let/const/function/class/async function
            _ => {
                let decl_start = self.current.span.start;
                let stmt = match self.peek() {
                    TokenKind::Var | TokenKind::Let | TokenKind::Const => self.parse_var_stmt()?,
                    TokenKind::Function => self.parse_function_decl(decl_start, false)?,
                    TokenKind::Class => self.parse_class_decl(decl_start)?,
                    _ if self.is_contextual("async") && self.next_is_function_on_same_line() => {
                        self.advance();
                        self.parse_function_decl(decl_start, true)?
                    }
                    _ if self.is_contextual("opaque") && self.options.flow => {
                        self.advance();
                        self.parse_type_alias(decl_start, true)?
                    }
                    _ => return Err(self.unexpected()),
                };
                ExportDecl::Decl { decl: stmt }
            }
        };

        Ok(Stmt::new(StmtKind::Export(Box::new(decl)), self.span_from(start)))
    }

    fn parse_export_default(&mut self) -> PResult<ExportDecl> {
        let start = self.current.span.start;
        let is_async_fn = self.is_contextual("async") && self.next_is_function_on_same_line();
        if self.check(&TokenKind::Function) || is_async_fn {
            if is_async_fn {
                self.advance();
            }
            let func = self.parse_function(start, is_async_fn, FunctionFlavor::Expression)?;
            let span = self.span_from(start);
            if func.name.is_some() {
                return Ok(ExportDecl::DefaultDecl { decl: Stmt::new(StmtKind::Function(Box::new(func)), span) });
            }
            return Ok(ExportDecl::Default { expr: Expr::new(ExprKind::Function(Box::new(func)), span) });
        }
        if self.check(&TokenKind::Class) {
            let class = self.parse_class(start, false)?;
            let span = self.span_from(start);
            if class.name.is_some() {
                return Ok(ExportDecl::DefaultDecl { decl: Stmt::new(StmtKind::Class(Box::new(class)), span) });
            }
            return Ok(ExportDecl::Default { expr: Expr::new(ExprKind::Class(Box::new(class)), span) });
        }
        let expr = self.parse_assign_expr()?;
        self.expect_semicolon()?;
        Ok(ExportDecl::Default { expr })
    }

    fn parse_export_named(&mut self, type_only: bool) -> PResult<ExportDecl> {
        self.expect(&TokenKind::LBrace)?;
        let mut specifiers = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let spec_start = self.current.span.start;
            let (local_name, local_span) = match self.peek().clone() {
                TokenKind::String(value) => (value, self.advance().span),
                _ => self.parse_word()?,
            };
            let exported = if self.eat_contextual("as") {
                match self.peek().clone() {
                    TokenKind::String(value) => {
                        self.advance();
                        value
                    }
                    _ => self.parse_word()?.0,
                }
            } else {
                local_name.clone()
            };
            specifiers.push(ExportSpecifier {
                local: Ident::new(local_name, local_span),
                exported,
                span: self.span_from(spec_start),
            });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        let source = if self.eat_contextual("from") { Some(self.expect_string()?) } else { None };
        self.expect_semicolon()?;
        Ok(ExportDecl::Named { specifiers, source, type_only })
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    /// Parse an expression, including the comma operator.
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let first = self.parse_assign_expr()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_assign_expr()?);
        }
        Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(start)))
    }

    /// Assignment level: arrows, `yield`, destructuring and plain assignment.
    pub(crate) fn parse_assign_expr(&mut self) -> PResult<Expr> {
        self.nested(Self::parse_assign_expr_inner)
    }

    fn parse_assign_expr_inner(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;

        if self.check(&TokenKind::Yield) {
            return self.parse_yield_expr();
        }

        if let Some(arrow) = self.try_arrow_function()? {
            return Ok(arrow);
        }

        // `[a, b] = ...` / `({a} = ...)`
        if matches!(self.peek(), TokenKind::LBracket | TokenKind::LBrace) {
            let pattern = self.try_parse(Speculation::AssignPattern, |p| {
                let pattern = p.parse_assign_target()?;
                if p.check(&TokenKind::Eq) {
                    Ok(pattern)
                } else {
                    Err(p.unexpected())
                }
            });
            if let Some(pattern) = pattern {
                self.expect(&TokenKind::Eq)?;
                let right = self.parse_assign_expr()?;
                return Ok(Expr::new(
                    ExprKind::Assign { op: AssignOp::Assign, left: Box::new(pattern), right: Box::new(right) },
                    self.span_from(start),
                ));
            }
        }

        let left = self.parse_conditional_expr()?;

        if let Some(op) = self.assign_op() {
            let target = self.expr_to_simple_target(left, "Invalid left-hand side in assignment")?;
            self.advance();
            let right = self.parse_assign_expr()?;
            return Ok(Expr::new(
                ExprKind::Assign { op, left: Box::new(target), right: Box::new(right) },
                self.span_from(start),
            ));
        }

        Ok(left)
    }

    fn parse_yield_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Yield)?;
        let delegate = !self.current.newline_before && self.eat(&TokenKind::Star);
        let has_arg = delegate
            || (!self.current.newline_before
                && !matches!(
                    self.peek(),
                    TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::RBrace
                        | TokenKind::Comma
                        | TokenKind::Semicolon
                        | TokenKind::Colon
                        | TokenKind::Eof
                        | TokenKind::In
                ));
        let arg = if has_arg { Some(Box::new(self.parse_assign_expr()?)) } else { None };
        Ok(Expr::new(ExprKind::Yield { arg, delegate }, self.span_from(start)))
    }

    /// Recognize and parse an arrow function at the current position.
    fn try_arrow_function(&mut self) -> PResult<Option<Expr>> {
        let start = self.current.span.start;

        // x => ...
        if self.at_identifier() {
            let next = self.lexer.peek();
            if matches!(next.kind, TokenKind::Arrow) && !next.newline_before {
                let param = self.parse_binding_ident()?;
                self.expect(&TokenKind::Arrow)?;
                return self.parse_arrow_body(vec![Param::simple(param)], false, start, None).map(Some);
            }
        }

        // async x => ..., async (x) => ...
        if self.is_contextual("async") {
            let next = self.lexer.peek();
            if !next.newline_before {
                if matches!(next.kind, TokenKind::Identifier(_)) {
                    let mut probe = self.lexer.clone();
                    probe.next_token();
                    let after = probe.next_token();
                    if matches!(after.kind, TokenKind::Arrow) && !after.newline_before {
                        self.advance(); // async
                        let param = self.parse_binding_ident()?;
                        self.expect(&TokenKind::Arrow)?;
                        return self.parse_arrow_body(vec![Param::simple(param)], true, start, None).map(Some);
                    }
                } else if matches!(next.kind, TokenKind::LParen) {
                    let head = self.try_parse(Speculation::ArrowParams, |p| {
                        p.advance(); // async
                        p.parse_arrow_head()
                    });
                    if let Some((params, return_type)) = head {
                        return self.parse_arrow_body(params, true, start, return_type).map(Some);
                    }
                }
            }
            return Ok(None);
        }

        // (a, b) => ...
        if self.check(&TokenKind::LParen) {
            if let Some((params, return_type)) = self.try_parse(Speculation::ArrowParams, Self::parse_arrow_head) {
                return self.parse_arrow_body(params, false, start, return_type).map(Some);
            }
        }

        Ok(None)
    }

    /// `(params) [: ReturnType] =>`. Fails if no arrow follows.
    fn parse_arrow_head(&mut self) -> PResult<(Vec<Param>, Option<Box<FlowType>>)> {
        let params = self.parse_params()?;
        let return_type = if self.ctx().no_arrow_return_type { None } else { self.parse_type_annotation_opt()? };
        if !self.check(&TokenKind::Arrow) || self.current.newline_before {
            return Err(self.unexpected_expecting("=>"));
        }
        self.advance();
        Ok((params, return_type))
    }

    /// Body after `=>`.
    fn parse_arrow_body(
        &mut self,
        params: Vec<Param>,
        is_async: bool,
        start: u32,
        return_type: Option<Box<FlowType>>,
    ) -> PResult<Expr> {
        let allow_in = self.ctx().allow_in;
        let update = self.function_context(is_async, false);
        let body = self.with_context(update, |p| {
            if p.check(&TokenKind::LBrace) {
                Ok(ArrowBody::Block(p.parse_function_body()?))
            } else {
                let expr = p.with_context(|c| c.allow_in = allow_in, Self::parse_assign_expr)?;
                Ok(ArrowBody::Expr(Box::new(expr)))
            }
        })?;
        let span = self.span_from(start);
        let arrow = ArrowFunction { params, body, is_async, span, return_type };
        Ok(Expr::new(ExprKind::Arrow(Box::new(arrow)), span))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        let op = match self.peek() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            TokenKind::PercentEq => AssignOp::ModAssign,
            TokenKind::StarStarEq => AssignOp::PowAssign,
            TokenKind::LtLtEq => AssignOp::ShlAssign,
            TokenKind::GtGtEq => AssignOp::ShrAssign,
            TokenKind::GtGtGtEq => AssignOp::UShrAssign,
            TokenKind::PipeEq => AssignOp::BitOrAssign,
            TokenKind::CaretEq => AssignOp::BitXorAssign,
            TokenKind::AmpEq => AssignOp::BitAndAssign,
            TokenKind::AmpAmpEq => AssignOp::AndAssign,
            TokenKind::PipePipeEq => AssignOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignOp::NullishAssign,
            _ => return None,
        };
        Some(op)
    }

    fn parse_conditional_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let test = self.parse_binary_expr(0)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(test);
        }
        // `in` is always allowed in the middle operand.
        let snapshot = self.snapshot();
        let mut consequent = self.with_context(|c| c.allow_in = true, Self::parse_assign_expr);
        // `a ? (b) : c => d` read `: c` as an arrow return type.
        if self.options.flow && !(consequent.is_ok() && self.check(&TokenKind::Colon)) {
            self.restore(snapshot);
            let update = |c: &mut Context| {
                c.allow_in = true;
                c.no_arrow_return_type = true;
            };
            consequent = self.with_context(update, Self::parse_assign_expr);
        }
        let consequent = consequent?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assign_expr()?;
        Ok(Expr::conditional(test, consequent, alternate, self.span_from(start)))
    }

    /// Precedence climbing over binary operators.
    fn parse_binary_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        self.parse_binary_operand_chain(min_prec).map(|(expr, _)| expr)
    }

    /// Returns the expression and the operator that produced its root, if
    /// the root was built here rather than coming from parentheses.
    fn parse_binary_operand_chain(&mut self, min_prec: u8) -> PResult<(Expr, Option<BinaryOp>)> {
        let starts_with_unary = self.at_unary_operator();
        let mut left = self.parse_unary_expr()?;
        let mut left_op: Option<BinaryOp> = None;

        loop {
            let Some(op) = self.binary_op() else { break };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            if op == BinaryOp::Pow && left_op.is_none() && starts_with_unary {
                return Err(self.error(
                    "Unary operator used immediately before exponentiation expression; parentheses required",
                    left.span,
                ));
            }

            let op_token = self.advance();
            let next_min = if op == BinaryOp::Pow { prec } else { prec + 1 };
            let (right, right_op) = self.parse_binary_operand_chain(next_min)?;

            if is_nullish_mix(op, left_op) || is_nullish_mix(op, right_op) {
                return Err(self.error("Cannot mix ?? with || or && without parentheses", op_token.span));
            }

            let span = Span::new(left.span.start, right.span.end);
            left = Expr::binary(op, left, right, span);
            left_op = Some(op);
        }

        Ok((left, left_op))
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.peek() {
            TokenKind::QuestionQuestion => BinaryOp::NullishCoalesce,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::BangEqEq => BinaryOp::StrictNotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::In if self.ctx().allow_in => BinaryOp::In,
            TokenKind::Instanceof => BinaryOp::Instanceof,
            TokenKind::LtLt => BinaryOp::Shl,
            TokenKind::GtGt => BinaryOp::Shr,
            TokenKind::GtGtGt => BinaryOp::UShr,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            _ => return None,
        };
        Some(op)
    }

    fn at_unary_operator(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Bang
                | TokenKind::Tilde
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::Delete
                | TokenKind::Await
        )
    }

    pub(crate) fn parse_unary_expr(&mut self) -> PResult<Expr> {
        self.nested(Self::parse_unary_expr_inner)
    }

    fn parse_unary_expr_inner(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let arg = self.parse_unary_expr()?;
            return Ok(Expr::new(ExprKind::Unary { op, arg: Box::new(arg) }, self.span_from(start)));
        }

        match self.peek() {
            TokenKind::Await => {
                self.advance();
                let arg = self.parse_unary_expr()?;
                Ok(Expr::new(ExprKind::Await(Box::new(arg)), self.span_from(start)))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) { UpdateOp::Increment } else { UpdateOp::Decrement };
                self.advance();
                let arg = self.parse_unary_expr()?;
                self.check_update_target(&arg)?;
                Ok(Expr::new(ExprKind::Update { op, prefix: true, arg: Box::new(arg) }, self.span_from(start)))
            }
            _ => self.parse_postfix_expr(),
        }
    }

    fn check_update_target(&self, arg: &Expr) -> PResult<()> {
        match &arg.kind {
            ExprKind::Ident(_) => Ok(()),
            ExprKind::Member { .. } if !contains_optional_chain(arg) => Ok(()),
            _ => Err(self.error("Invalid left-hand side in update expression", arg.span)),
        }
    }

    fn parse_postfix_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let expr = self.parse_left_hand_side_expr()?;
        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus) && !self.current.newline_before {
            self.check_update_target(&expr)?;
            let op = if self.check(&TokenKind::PlusPlus) { UpdateOp::Increment } else { UpdateOp::Decrement };
            self.advance();
            return Ok(Expr::new(ExprKind::Update { op, prefix: false, arg: Box::new(expr) }, self.span_from(start)));
        }
        Ok(expr)
    }

    /// Member access, calls, optional chains and tagged templates.
    pub(crate) fn parse_left_hand_side_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let mut expr = if self.check(&TokenKind::New) { self.parse_new_expr()? } else { self.parse_primary_expr()? };
        let mut in_optional_chain = false;

        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    expr = Expr::new(
                        ExprKind::Member { object: Box::new(expr), property, optional: false },
                        self.span_from(start),
                    );
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    in_optional_chain = true;
                    expr = match self.peek() {
                        TokenKind::LParen => {
                            let args = self.parse_arguments()?;
                            Expr::new(ExprKind::Call { callee: Box::new(expr), args, optional: true }, self.span_from(start))
                        }
                        TokenKind::LBracket => {
                            let property = self.parse_computed_member()?;
                            Expr::new(ExprKind::Member { object: Box::new(expr), property, optional: true }, self.span_from(start))
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            Expr::new(ExprKind::Member { object: Box::new(expr), property, optional: true }, self.span_from(start))
                        }
                    };
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_member()?;
                    expr = Expr::new(
                        ExprKind::Member { object: Box::new(expr), property, optional: false },
                        self.span_from(start),
                    );
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::new(ExprKind::Call { callee: Box::new(expr), args, optional: false }, self.span_from(start));
                }
                TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                    if in_optional_chain {
                        return Err(self.error("Tagged template cannot be used in optional chain", self.current.span));
                    }
                    let quasi = self.parse_template()?;
                    expr = Expr::new(ExprKind::TaggedTemplate { tag: Box::new(expr), quasi: Box::new(quasi) }, self.span_from(start));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Property name after `.` or `?.`.
    fn parse_member_name(&mut self) -> PResult<MemberProp> {
        if let TokenKind::PrivateName(name) = self.peek().clone() {
            self.advance();
            return Ok(MemberProp::Private(name));
        }
        self.lexer.mark_statement_end();
        let (word, _) = self.parse_word()?;
        Ok(MemberProp::Ident(word))
    }

    fn parse_computed_member(&mut self) -> PResult<MemberProp> {
        self.expect(&TokenKind::LBracket)?;
        let expr = self.with_context(|c| c.allow_in = true, Self::parse_expr)?;
        self.expect(&TokenKind::RBracket)?;
        Ok(MemberProp::Computed(Box::new(expr)))
    }

    /// `new Callee(args)`, `new Callee`, `new.target`
    fn parse_new_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::New)?;

        if self.eat(&TokenKind::Dot) {
            let (property, span) = self.parse_word()?;
            if property != "target" {
                return Err(self.error(format!("Unexpected meta property 'new.{property}'"), span));
            }
            return Ok(Expr::new(
                ExprKind::MetaProperty { meta: "new".into(), property },
                self.span_from(start),
            ));
        }

        let mut callee = if self.check(&TokenKind::New) { self.parse_new_expr()? } else { self.parse_primary_expr()? };
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    callee = Expr::new(
                        ExprKind::Member { object: Box::new(callee), property, optional: false },
                        self.span_from(start),
                    );
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_member()?;
                    callee = Expr::new(
                        ExprKind::Member { object: Box::new(callee), property, optional: false },
                        self.span_from(start),
                    );
                }
                TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                    let quasi = self.parse_template()?;
                    callee = Expr::new(
                        ExprKind::TaggedTemplate { tag: Box::new(callee), quasi: Box::new(quasi) },
                        self.span_from(start),
                    );
                }
                TokenKind::QuestionDot => {
                    return Err(self.error("Invalid optional chain from new expression", self.current.span));
                }
                _ => break,
            }
        }

        let args = if self.check(&TokenKind::LParen) { self.parse_arguments()? } else { Vec::new() };
        Ok(Expr::new(ExprKind::New { callee: Box::new(callee), args }, self.span_from(start)))
    }

    /// `( arg, ...spread )`
    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let args = self.with_context(
            |c| c.allow_in = true,
            |p| {
                let mut args = Vec::new();
                while !p.check(&TokenKind::RParen) && !p.is_eof() {
                    args.push(p.parse_spread_or_assign()?);
                    if !p.check(&TokenKind::RParen) {
                        p.expect(&TokenKind::Comma)?;
                    }
                }
                Ok(args)
            },
        )?;
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_spread_or_assign(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        if self.eat(&TokenKind::Spread) {
            let arg = self.parse_assign_expr()?;
            return Ok(Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(start)));
        }
        self.parse_assign_expr()
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        let span = self.current.span;

        let kind = match self.peek().clone() {
            TokenKind::Identifier(name) => {
                if name == "async" && self.next_is_function_on_same_line() {
                    self.advance();
                    let func = self.parse_function(start, true, FunctionFlavor::Expression)?;
                    return Ok(Expr::new(ExprKind::Function(Box::new(func)), self.span_from(start)));
                }
                self.advance();
                ExprKind::Ident(Ident::new(name, span))
            }
            TokenKind::Type | TokenKind::Interface => {
                let name = self.binding_name().unwrap_or_default();
                self.advance();
                ExprKind::Ident(Ident::new(name, span))
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Super => {
                self.advance();
                if !matches!(self.peek(), TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen) {
                    return Err(self.error("'super' keyword unexpected here", span));
                }
                ExprKind::Super
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Number(value) => {
                self.advance();
                ExprKind::Number(value)
            }
            TokenKind::BigInt(digits) => {
                self.advance();
                ExprKind::BigInt(digits)
            }
            TokenKind::String(value) => {
                self.advance();
                ExprKind::String(value)
            }
            TokenKind::Slash | TokenKind::SlashEq => {
                let current = self.current.clone();
                self.current = self.lexer.rescan_regex(&current);
                match self.peek().clone() {
                    TokenKind::Regex { pattern, flags } => {
                        self.advance();
                        ExprKind::Regex { pattern, flags }
                    }
                    _ => return Err(self.unexpected()),
                }
            }
            TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                let template = self.parse_template()?;
                ExprKind::Template(Box::new(template))
            }
            TokenKind::LParen => return self.parse_paren_expr(),
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::LBrace => return self.parse_object_literal(),
            TokenKind::Function => {
                let func = self.parse_function(start, false, FunctionFlavor::Expression)?;
                ExprKind::Function(Box::new(func))
            }
            TokenKind::Class => {
                let class = self.parse_class(start, false)?;
                ExprKind::Class(Box::new(class))
            }
            TokenKind::Import => {
                self.advance();
                if self.eat(&TokenKind::Dot) {
                    let (property, prop_span) = self.parse_word()?;
                    if property != "meta" {
                        return Err(self.error(format!("Unexpected meta property 'import.{property}'"), prop_span));
                    }
                    ExprKind::MetaProperty { meta: "import".into(), property }
                } else {
                    self.expect(&TokenKind::LParen)?;
                    let arg = self.with_context(|c| c.allow_in = true, Self::parse_assign_expr)?;
                    self.expect(&TokenKind::RParen)?;
                    ExprKind::Import(Box::new(arg))
                }
            }
            TokenKind::Lt if self.options.jsx => return self.parse_jsx_expr(),
            _ => return Err(self.unexpected()),
        };

        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// `(expr)`, or a Flow type cast `(expr: Type)` whose type is dropped.
    fn parse_paren_expr(&mut self) -> PResult<Expr> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.with_context(|c| c.allow_in = true, Self::parse_expr)?;
        self.parse_type_annotation_opt()?;
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_array_literal(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBracket)?;
        let elements = self.with_context(
            |c| c.allow_in = true,
            |p| {
                let mut elements = Vec::new();
                while !p.check(&TokenKind::RBracket) && !p.is_eof() {
                    if p.eat(&TokenKind::Comma) {
                        elements.push(None);
                        continue;
                    }
                    elements.push(Some(p.parse_spread_or_assign()?));
                    if !p.check(&TokenKind::RBracket) {
                        p.expect(&TokenKind::Comma)?;
                    }
                }
                Ok(elements)
            },
        )?;
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)))
    }

    fn parse_object_literal(&mut self) -> PResult<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        let members = self.with_context(
            |c| c.allow_in = true,
            |p| {
                let mut members = Vec::new();
                while !p.check(&TokenKind::RBrace) && !p.is_eof() {
                    members.push(p.parse_object_member()?);
                    if !p.check(&TokenKind::RBrace) {
                        p.expect(&TokenKind::Comma)?;
                    }
                }
                Ok(members)
            },
        )?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Object(members), self.span_from(start)))
    }

    fn parse_object_member(&mut self) -> PResult<ObjectMember> {
        let start = self.current.span.start;
        if self.eat(&TokenKind::Spread) {
            return Ok(ObjectMember::Spread(self.parse_assign_expr()?));
        }

        let mut is_async = false;
        let mut accessor = None;
        if self.is_contextual("async") && self.word_is_modifier() {
            self.advance();
            is_async = true;
        }
        let is_generator = self.eat(&TokenKind::Star);
        if !is_async && !is_generator && (self.is_contextual("get") || self.is_contextual("set")) && self.word_is_modifier() {
            accessor = Some(if self.is_contextual("get") { PropertyKind::Get } else { PropertyKind::Set });
            self.advance();
        }

        let shorthand_name = self.binding_name();
        let key_span = self.current.span;
        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let func = self.parse_method(start, is_async, is_generator)?;
            let span = self.span_from(start);
            return Ok(ObjectMember::Property(Property {
                key,
                value: Expr::new(ExprKind::Function(Box::new(func)), span),
                kind: accessor.unwrap_or(PropertyKind::Method),
                shorthand: false,
                span,
            }));
        }
        if is_async || is_generator || accessor.is_some() {
            return Err(self.unexpected_expecting("("));
        }

        if self.eat(&TokenKind::Colon) {
            let value = self.parse_assign_expr()?;
            return Ok(ObjectMember::Property(Property {
                key,
                value,
                kind: PropertyKind::Init,
                shorthand: false,
                span: self.span_from(start),
            }));
        }

        let Some(name) = shorthand_name else {
            return Err(self.unexpected_expecting(":"));
        };
        if self.check(&TokenKind::Eq) {
            return Err(self.error("Invalid shorthand property initializer", self.current.span));
        }
        Ok(ObjectMember::Property(Property {
            key,
            value: Expr::ident(Ident::new(name, key_span)),
            kind: PropertyKind::Init,
            shorthand: true,
            span: self.span_from(start),
        }))
    }

    /// Template literal; the current token is its head.
    fn parse_template(&mut self) -> PResult<Template> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();

        match self.peek().clone() {
            TokenKind::TemplateNoSub(chunk) => {
                self.advance();
                quasis.push(chunk);
                return Ok(Template { quasis, exprs });
            }
            TokenKind::TemplateHead(chunk) => {
                self.advance();
                quasis.push(chunk);
            }
            _ => return Err(self.unexpected()),
        }

        loop {
            exprs.push(self.with_context(|c| c.allow_in = true, Self::parse_expr)?);
            if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected_expecting("}"));
            }
            let close = self.current.clone();
            self.current = self.lexer.continue_template(&close);
            match self.peek().clone() {
                TokenKind::TemplateMiddle(chunk) => {
                    self.advance();
                    quasis.push(chunk);
                }
                TokenKind::TemplateTail(chunk) => {
                    self.advance();
                    quasis.push(chunk);
                    return Ok(Template { quasis, exprs });
                }
                _ => return Err(self.unexpected()),
            }
        }
    }
}

/// `a ?? b || c` without parentheses.
fn is_nullish_mix(op: BinaryOp, operand_op: Option<BinaryOp>) -> bool {
    match (op, operand_op) {
        (BinaryOp::NullishCoalesce, Some(BinaryOp::And | BinaryOp::Or)) => true,
        (BinaryOp::And | BinaryOp::Or, Some(BinaryOp::NullishCoalesce)) => true,
        _ => false,
    }
}

/// Whether a member/call chain contains `?.` anywhere along its object path.
fn contains_optional_chain(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Member { object, optional, .. } => *optional || contains_optional_chain(object),
        ExprKind::Call { callee, optional, .. } => *optional || contains_optional_chain(callee),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Module, ErrorList> {
        Parser::new(source, ParserOptions::default()).parse("test.js")
    }

    fn parse_ok(source: &str) -> Module {
        match parse(source) {
            Ok(module) => module,
            Err(errors) => panic!("parse failed for {source:?}: {errors}"),
        }
    }

    fn first_error(source: &str) -> ParseError {
        match parse(source) {
            Ok(_) => panic!("expected an error for {source:?}"),
            Err(errors) => errors.first().cloned().expect("error list is never empty"),
        }
    }

    fn single_expr(source: &str) -> Expr {
        let module = parse_ok(source);
        assert_eq!(module.body.len(), 1);
        match module.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_declaration() {
        let module = parse_ok("const x = 1;");
        assert_eq!(module.body.len(), 1);
        assert!(matches!(&module.body[0].kind, StmtKind::Var(decl) if decl.kind == VarKind::Const));
    }

    #[test]
    fn test_function_declaration() {
        let module = parse_ok("function foo(a, b = 1, ...rest) { return a + b; }");
        let StmtKind::Function(func) = &module.body[0].kind else { panic!("expected function") };
        assert_eq!(func.name.as_ref().map(|n| n.name.as_str()), Some("foo"));
        assert_eq!(func.params.len(), 3);
        assert!(func.params[2].rest);
        assert!(func.params[1].default.is_some());
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let expr = single_expr("1 + 2 * 3;");
        let ExprKind::Binary { op: BinaryOp::Add, right, .. } = expr.kind else { panic!("expected addition at root") };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let expr = single_expr("2 ** 3 ** 2;");
        let ExprKind::Binary { op: BinaryOp::Pow, left, right } = expr.kind else { panic!("expected ** at root") };
        assert!(matches!(left.kind, ExprKind::Number(n) if n == 2.0));
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn test_unary_before_exponent_is_rejected() {
        let error = first_error("-2 ** 2;");
        assert!(error.message.contains("exponentiation"));
        assert!(parse("(-2) ** 2;").is_ok());
    }

    #[test]
    fn test_nullish_mixing_requires_parens() {
        assert!(first_error("a ?? b || c;").message.contains("Cannot mix"));
        assert!(first_error("a || b ?? c;").message.contains("Cannot mix"));
        assert!(parse("(a || b) ?? c;").is_ok());
        assert!(parse("a ?? (b && c);").is_ok());
    }

    #[test]
    fn test_arrow_function() {
        let expr = single_expr("(a, b) => a + b;");
        let ExprKind::Arrow(arrow) = expr.kind else { panic!("expected arrow") };
        assert_eq!(arrow.params.len(), 2);
        assert!(matches!(arrow.body, ArrowBody::Expr(_)));
    }

    #[test]
    fn test_single_param_and_async_arrows() {
        assert!(matches!(single_expr("x => x;").kind, ExprKind::Arrow(_)));
        let ExprKind::Arrow(arrow) = single_expr("async (x) => await x;").kind else { panic!("expected arrow") };
        assert!(arrow.is_async);
        assert!(matches!(&arrow.body, ArrowBody::Expr(body) if matches!(body.kind, ExprKind::Await(_))));
        assert!(matches!(single_expr("async(1);").kind, ExprKind::Call { .. }));
    }

    #[test]
    fn test_paren_assignment_does_not_leak_arrow_errors() {
        let expr = single_expr("(a = 1);");
        let ExprKind::Assign { op: AssignOp::Assign, left, .. } = expr.kind else { panic!("expected assignment") };
        assert!(matches!(&left.kind, PatternKind::Ident(ident) if ident.name == "a"));
    }

    #[test]
    fn test_destructuring_assignment() {
        let expr = single_expr("[a, b.c, ...d] = arr;");
        let ExprKind::Assign { left, .. } = expr.kind else { panic!("expected assignment") };
        let PatternKind::Array { elements, rest } = &left.kind else { panic!("expected array pattern") };
        assert_eq!(elements.len(), 2);
        assert!(matches!(elements[1].as_ref().map(|e| &e.pattern.kind), Some(PatternKind::Expr(_))));
        assert!(rest.is_some());

        assert!(matches!(single_expr("[a, b];").kind, ExprKind::Array(_)));
        assert!(matches!(single_expr("({a, b: [c]} = obj);").kind, ExprKind::Assign { .. }));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let error = first_error("1 = 2;");
        assert_eq!(error.message, "Invalid left-hand side in assignment");
        assert_eq!(first_error("a + b = c;").message, "Invalid left-hand side in assignment");
        assert_eq!(first_error("a?.b = c;").message, "Invalid left-hand side in assignment");
        assert_eq!(first_error("f()++;").message, "Invalid left-hand side in update expression");
    }

    #[test]
    fn test_object_pattern_records_bound_keys() {
        let module = parse_ok("const {a, b: c, ...rest} = obj;");
        let StmtKind::Var(decl) = &module.body[0].kind else { panic!("expected var") };
        let PatternKind::Object { bound_keys, rest, .. } = &decl.decls[0].pattern.kind else { panic!("expected object pattern") };
        assert_eq!(bound_keys, &vec!["a".to_string(), "b".to_string()]);
        assert!(rest.is_some());
    }

    #[test]
    fn test_rest_must_be_last() {
        assert!(first_error("const [...a, b] = c;").message.contains("Rest element"));
        assert!(first_error("function f(...a, b) {}").message.contains("Rest parameter"));
    }

    #[test]
    fn test_for_variants() {
        let module = parse_ok("for (let i = 0; i < n; i++) {} for (const k in o) {} for (const [a, b] of m) {} for (x.y of z) {}");
        assert!(matches!(module.body[0].kind, StmtKind::For { .. }));
        assert!(matches!(module.body[1].kind, StmtKind::ForIn { .. }));
        assert!(matches!(module.body[2].kind, StmtKind::ForOf { .. }));
        assert!(matches!(&module.body[3].kind, StmtKind::ForOf { left: ForHead::Pattern(_), .. }));
    }

    #[test]
    fn test_in_allowed_inside_for_test_clause() {
        let module = parse_ok("for (var i = 0; x in [1, 2, 3]; i++) {}");
        let StmtKind::For { test: Some(test), .. } = &module.body[0].kind else { panic!("expected classic for") };
        assert!(matches!(test.kind, ExprKind::Binary { op: BinaryOp::In, .. }));
    }

    #[test]
    fn test_in_inside_parens_of_for_init() {
        let module = parse_ok("for (var a = (b in c); ;) {}");
        assert!(matches!(module.body[0].kind, StmtKind::For { .. }));
    }

    #[test]
    fn test_asi() {
        let module = parse_ok("let a = 1\nlet b = 2\na\n++b");
        assert_eq!(module.body.len(), 4);
        assert!(matches!(&module.body[3].kind, StmtKind::Expr(e) if matches!(e.kind, ExprKind::Update { prefix: true, .. })));
        assert!(parse("let a = 1 let b = 2").is_err());
    }

    #[test]
    fn test_return_with_newline_has_no_argument() {
        let module = parse_ok("function f() { return\n42 }");
        let StmtKind::Function(func) = &module.body[0].kind else { panic!("expected function") };
        assert!(matches!(func.body[0].kind, StmtKind::Return { arg: None }));
        assert_eq!(func.body.len(), 2);
    }

    #[test]
    fn test_statement_context_errors() {
        assert_eq!(first_error("return 1;").message, "Illegal return statement");
        assert_eq!(first_error("break;").message, "Illegal break statement");
        assert!(first_error("while (x) { continue foo; }").message.contains("Undefined label 'foo'"));
        assert!(first_error("switch (x) { default: break; default: }").message.contains("More than one default"));
        assert_eq!(first_error("try {}").message, "Missing catch or finally after try");
        assert_eq!(first_error("throw\nerr;").message, "Illegal newline after throw");
        assert!(parse("outer: for (;;) { inner: for (;;) { continue outer; } }").is_ok());
    }

    #[test]
    fn test_labels_do_not_cross_functions() {
        assert!(first_error("foo: while (x) { (function () { break foo; }); }").message.contains("Undefined label"));
    }

    #[test]
    fn test_lexical_error_surfaces_with_position() {
        let error = first_error("0x");
        assert_eq!(error.message, "Illegal hexadecimal number");
        assert_eq!(error.span.start, 0);
        assert_eq!(error.position.line, 1);
        assert_eq!(error.position.column, 1);
    }

    #[test]
    fn test_regex_vs_division() {
        let expr = single_expr("a / b / c;");
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Div, .. }));
        let expr = single_expr("x = /ab+c/gi;");
        let ExprKind::Assign { right, .. } = expr.kind else { panic!("expected assignment") };
        assert!(matches!(right.kind, ExprKind::Regex { ref pattern, ref flags } if pattern == "ab+c" && flags == "gi"));
    }

    #[test]
    fn test_template_literal() {
        let expr = single_expr("`a${b}c${d + 1}e`;");
        let ExprKind::Template(template) = expr.kind else { panic!("expected template") };
        assert_eq!(template.quasis.len(), 3);
        assert_eq!(template.exprs.len(), 2);
        assert_eq!(template.quasis[2].cooked, "e");
    }

    #[test]
    fn test_class_declaration() {
        let module = parse_ok("class A extends B { constructor() { super(); } static create() {} get x() { return 1; } #secret = 2; }");
        let StmtKind::Class(class) = &module.body[0].kind else { panic!("expected class") };
        assert!(class.super_class.is_some());
        assert_eq!(class.body.len(), 4);
        assert!(matches!(class.body[0].kind, ClassMemberKind::Method { kind: MethodKind::Constructor, .. }));
        assert!(matches!(class.body[1].kind, ClassMemberKind::Method { is_static: true, .. }));
        assert!(matches!(class.body[2].kind, ClassMemberKind::Method { kind: MethodKind::Get, .. }));
        assert!(matches!(class.body[3].kind, ClassMemberKind::Property { key: PropertyKey::Private(_), .. }));
    }

    #[test]
    fn test_generators_and_async_functions() {
        let module = parse_ok("function* g() { yield 1; yield* other(); } async function f() { await g(); }");
        let StmtKind::Function(generator) = &module.body[0].kind else { panic!("expected function") };
        assert!(generator.is_generator);
        let StmtKind::Function(func) = &module.body[1].kind else { panic!("expected function") };
        assert!(func.is_async);
        // Outside generators and async functions these are plain identifiers.
        assert!(parse("var yield = 1, await = 2;").is_ok());
    }

    #[test]
    fn test_imports_and_exports() {
        let module = parse_ok(
            "import def, { a, b as c } from 'mod';\nimport * as ns from 'ns';\nexport const x = 1;\nexport { x as y };\nexport default function named() {}\nexport * from 'all';",
        );
        assert_eq!(module.body.len(), 6);
        let StmtKind::Import(import) = &module.body[0].kind else { panic!("expected import") };
        assert_eq!(import.specifiers.len(), 3);
        assert!(matches!(&module.body[4].kind, StmtKind::Export(decl) if matches!(**decl, ExportDecl::DefaultDecl { .. })));
    }

    #[test]
    fn test_imports_only_at_top_level() {
        assert!(first_error("{ import x from 'y'; }").message.contains("top level"));
        assert!(parse("function f() { return import('x'); }").is_ok());
    }

    #[test]
    fn test_optional_chaining() {
        let expr = single_expr("a?.b.c?.(1)?.[2];");
        assert!(matches!(expr.kind, ExprKind::Member { optional: true, .. }));
    }

    #[test]
    fn test_spans_enclose_children() {
        let module = parse_ok("let total = price * (1 + rate);");
        let StmtKind::Var(decl) = &module.body[0].kind else { panic!("expected var") };
        let init = decl.decls[0].init.as_ref().expect("initializer");
        assert!(module.body[0].span.encloses(decl.decls[0].span));
        assert!(decl.decls[0].span.encloses(init.span));
        if let ExprKind::Binary { left, right, .. } = &init.kind {
            assert!(init.span.encloses(left.span));
            assert!(init.span.encloses(right.span));
        }
    }

    #[test]
    fn test_const_requires_initializer() {
        assert_eq!(first_error("const a;").message, "Missing initializer in const declaration");
        assert!(parse("for (const a of b) {}").is_ok());
    }

    #[test]
    fn test_keywords_as_property_names() {
        assert!(parse("a.default = { if: 1, class: 2, new: 3 }.new;").is_ok());
    }

    #[test]
    fn test_conditional_is_not_a_typed_arrow() {
        let expr = single_expr("a ? (b) : c => d;");
        let ExprKind::Conditional { consequent, alternate, .. } = expr.kind else { panic!("expected conditional") };
        assert!(matches!(consequent.kind, ExprKind::Ident(_)), "{consequent:?}");
        assert!(matches!(alternate.kind, ExprKind::Arrow(_)));

        let expr = single_expr("a ? (x): number => x : y;");
        let ExprKind::Conditional { consequent, .. } = expr.kind else { panic!("expected conditional") };
        let ExprKind::Arrow(arrow) = consequent.kind else { panic!("expected typed arrow") };
        assert!(arrow.return_type.is_some());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        // Reaching the limit takes more stack than a default test thread has.
        let worker = std::thread::Builder::new().stack_size(256 * 1024 * 1024).spawn(|| {
            let parens = first_error(&format!("{}x{}", "(".repeat(1000), ")".repeat(1000)));
            let arrays = first_error(&format!("{}{}", "[".repeat(1000), "]".repeat(1000)));
            let blocks = first_error(&format!("{}{}", "{".repeat(1000), "}".repeat(1000)));
            let shallow = parse(&format!("{}x{}", "(".repeat(64), ")".repeat(64))).is_ok();
            (parens, arrays, blocks, shallow)
        });
        let (parens, arrays, blocks, shallow) = worker.expect("spawn").join().expect("no stack overflow");
        for error in [parens, arrays, blocks] {
            assert_eq!(error.message, "Expression nested too deeply");
        }
        assert!(shallow);
    }

    #[test]
    fn test_asi_after_keyword_property_name() {
        let module = parse_ok("x = a.default\nb()\ny = c?.new\nd()");
        assert_eq!(module.body.len(), 4);
        assert!(matches!(&module.body[1].kind, StmtKind::Expr(e) if matches!(e.kind, ExprKind::Call { .. })));
    }

    #[test]
    fn test_object_literal_members() {
        let expr = single_expr("({ a, b: 1, [c]: 2, d() {}, get e() { return 1; }, async *f() {}, ...g });");
        let ExprKind::Object(members) = expr.kind else { panic!("expected object") };
        assert_eq!(members.len(), 7);
        assert!(matches!(&members[0], ObjectMember::Property(p) if p.shorthand));
        assert!(matches!(&members[6], ObjectMember::Spread(_)));
    }
}
