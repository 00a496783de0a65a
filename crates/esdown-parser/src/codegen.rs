//! JavaScript code generator.
//!
//! Prints a [`Module`] back to source. Identifiers are printed under their
//! output name (the mangled name when one was assigned), Flow annotations
//! and type declarations are dropped, and JSX is kept as JSX. Parentheses
//! are inserted from operator precedence alone, so printing the result of
//! parsing printed output yields the same text.

use crate::ast::*;

/// Code generation options.
#[derive(Debug, Clone, Default)]
pub struct CodegenOptions {
    /// Drop optional whitespace and newlines.
    pub minify: bool,
    /// Indent string (default: two spaces).
    pub indent: Option<String>,
    /// Leave out definitions of the runtime helpers lowered code calls.
    pub omit_helpers: bool,
}

/// Precedence levels used for parenthesization. Binary operators sit
/// between `CONDITIONAL` and `PREFIX` (see [`binary_level`]).
mod level {
    pub const LOWEST: u8 = 0;
    pub const COMMA: u8 = 1;
    pub const ASSIGN: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const PREFIX: u8 = 16;
    pub const POSTFIX: u8 = 17;
    pub const CALL: u8 = 19;
}

fn binary_level(op: BinaryOp) -> u8 {
    level::CONDITIONAL + op.precedence()
}

/// The code generator.
pub struct Codegen<'a> {
    module: &'a Module,
    options: CodegenOptions,
    output: String,
    indent_level: usize,
    indent_str: String,
    /// A statement ended; its `;` is written before the next token.
    needs_semicolon: bool,
    /// Inside a `for (init; ...)` head, where a bare `in` would be misread.
    forbid_in: bool,
}

impl<'a> Codegen<'a> {
    /// Create a new code generator.
    pub fn new(module: &'a Module, options: CodegenOptions) -> Self {
        let indent_str = options.indent.clone().unwrap_or_else(|| "  ".to_string());
        Self {
            module,
            options,
            output: String::new(),
            indent_level: 0,
            indent_str,
            needs_semicolon: false,
            forbid_in: false,
        }
    }

    /// Generate JavaScript source code.
    pub fn generate(mut self) -> String {
        let module = self.module;
        if !self.options.omit_helpers {
            for helper in &module.helpers {
                self.emit(helper_source(*helper));
                self.emit_semicolon();
                self.emit_newline();
            }
        }
        for stmt in module.body.iter().filter(|stmt| !is_type_only(stmt)) {
            self.emit_stmt(stmt);
            self.emit_newline();
        }
        self.output
    }

    // =========================================================================
    // Output Helpers
    // =========================================================================

    fn emit(&mut self, s: &str) {
        let Some(first) = s.chars().next() else {
            return;
        };
        if self.needs_semicolon {
            if first != '}' {
                self.output.push(';');
            }
            self.needs_semicolon = false;
        }
        if let Some(last) = self.output.chars().next_back() {
            if needs_separator(last, first) {
                self.output.push(' ');
            }
        }
        self.output.push_str(s);
    }

    fn emit_space(&mut self) {
        if !self.options.minify {
            self.output.push(' ');
        }
    }

    fn emit_newline(&mut self) {
        if !self.options.minify {
            self.output.push('\n');
            for _ in 0..self.indent_level {
                self.output.push_str(&self.indent_str);
            }
        }
    }

    fn emit_semicolon(&mut self) {
        if self.options.minify {
            self.needs_semicolon = true;
        } else {
            self.output.push(';');
        }
    }

    fn emit_comma(&mut self) {
        self.emit(",");
        self.emit_space();
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn emit_ident(&mut self, ident: &Ident) {
        let module = self.module;
        self.emit(module.refs.output_name(ident));
    }

    fn emit_string(&mut self, value: &str) {
        let quoted = format!("\"{}\"", escape_string(value));
        self.emit(&quoted);
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var(decl) => {
                self.emit_var_decl(decl);
                self.emit_semicolon();
            }
            StmtKind::Function(func) => self.emit_function(func),
            StmtKind::Class(class) => self.emit_class(class),
            StmtKind::Block(stmts) => self.emit_block(stmts),
            StmtKind::If { test, consequent, alternate } => {
                self.emit("if");
                self.emit_space();
                self.emit_paren_expr(test);
                self.emit_space();
                // A dangling `else` would attach to an inner braceless `if`.
                let wrap = alternate.is_some() && ends_with_open_if(consequent);
                if wrap {
                    self.emit_block(std::slice::from_ref(consequent.as_ref()));
                } else {
                    self.emit_stmt(consequent);
                }
                if let Some(alternate) = alternate {
                    self.emit_space();
                    self.emit("else");
                    self.emit_space();
                    self.emit_stmt(alternate);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.emit("switch");
                self.emit_space();
                self.emit_paren_expr(discriminant);
                self.emit_space();
                self.emit("{");
                self.indent();
                for case in cases {
                    self.emit_newline();
                    if let Some(test) = &case.test {
                        self.emit("case");
                        self.emit_space();
                        self.emit_expr(test);
                        self.emit(":");
                    } else {
                        self.emit("default:");
                    }
                    self.indent();
                    for stmt in case.consequent.iter().filter(|stmt| !is_type_only(stmt)) {
                        self.emit_newline();
                        self.emit_stmt(stmt);
                    }
                    self.dedent();
                }
                self.dedent();
                self.emit_newline();
                self.emit("}");
            }
            StmtKind::For { init, test, update, body } => {
                self.emit("for");
                self.emit_space();
                self.emit("(");
                if let Some(init) = init {
                    self.forbid_in = true;
                    match init {
                        ForInit::Var(decl) => self.emit_var_decl(decl),
                        ForInit::Expr(expr) => self.emit_expr(expr),
                    }
                    self.forbid_in = false;
                }
                self.emit(";");
                if let Some(test) = test {
                    self.emit_space();
                    self.emit_expr(test);
                }
                self.emit(";");
                if let Some(update) = update {
                    self.emit_space();
                    self.emit_expr(update);
                }
                self.emit(")");
                self.emit_loop_body(body);
            }
            StmtKind::ForIn { left, right, body } => {
                self.emit("for");
                self.emit_space();
                self.emit("(");
                self.emit_for_head(left);
                self.emit(" in ");
                self.emit_expr(right);
                self.emit(")");
                self.emit_loop_body(body);
            }
            StmtKind::ForOf { left, right, body, is_await } => {
                self.emit("for");
                if *is_await {
                    self.emit(" await");
                }
                self.emit_space();
                self.emit("(");
                self.emit_for_head(left);
                self.emit(" of ");
                self.emit_expr_prec(right, level::ASSIGN);
                self.emit(")");
                self.emit_loop_body(body);
            }
            StmtKind::While { test, body } => {
                self.emit("while");
                self.emit_space();
                self.emit_paren_expr(test);
                self.emit_loop_body(body);
            }
            StmtKind::DoWhile { body, test } => {
                self.emit("do");
                self.emit_space();
                self.emit_stmt(body);
                self.emit_space();
                self.emit("while");
                self.emit_space();
                self.emit_paren_expr(test);
                self.emit_semicolon();
            }
            StmtKind::Break { label } => {
                self.emit("break");
                if let Some(label) = label {
                    self.emit(" ");
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Continue { label } => {
                self.emit("continue");
                if let Some(label) = label {
                    self.emit(" ");
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Return { arg } => {
                self.emit("return");
                if let Some(arg) = arg {
                    self.emit_space();
                    self.emit_expr(arg);
                }
                self.emit_semicolon();
            }
            StmtKind::Throw { arg } => {
                self.emit("throw");
                self.emit_space();
                self.emit_expr(arg);
                self.emit_semicolon();
            }
            StmtKind::Try { block, handler, finalizer } => {
                self.emit("try");
                self.emit_space();
                self.emit_block(block);
                if let Some(catch) = handler {
                    self.emit_space();
                    self.emit("catch");
                    if let Some(param) = &catch.param {
                        self.emit_space();
                        self.emit("(");
                        self.emit_pattern(param);
                        self.emit(")");
                    }
                    self.emit_space();
                    self.emit_block(&catch.body);
                }
                if let Some(finally) = finalizer {
                    self.emit_space();
                    self.emit("finally");
                    self.emit_space();
                    self.emit_block(finally);
                }
            }
            StmtKind::Labeled { label, body } => {
                self.emit(label);
                self.emit(":");
                self.emit_space();
                self.emit_stmt(body);
            }
            StmtKind::Expr(expr) => {
                if needs_statement_parens(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr(expr);
                }
                self.emit_semicolon();
            }
            StmtKind::Empty => self.emit(";"),
            StmtKind::Debugger => {
                self.emit("debugger");
                self.emit_semicolon();
            }
            StmtKind::With { object, body } => {
                self.emit("with");
                self.emit_space();
                self.emit_paren_expr(object);
                self.emit_space();
                self.emit_stmt(body);
            }
            StmtKind::Import(decl) => self.emit_import(decl),
            StmtKind::Export(decl) => self.emit_export(decl),
            StmtKind::TypeAlias(_) | StmtKind::Interface(_) => {}
        }
    }

    fn emit_paren_expr(&mut self, expr: &Expr) {
        self.emit("(");
        self.emit_expr(expr);
        self.emit(")");
    }

    fn emit_loop_body(&mut self, body: &Stmt) {
        if !matches!(body.kind, StmtKind::Empty) {
            self.emit_space();
        }
        self.emit_stmt(body);
    }

    fn emit_block(&mut self, stmts: &[Stmt]) {
        self.emit("{");
        let mut printed = stmts.iter().filter(|stmt| !is_type_only(stmt)).peekable();
        if printed.peek().is_some() {
            self.indent();
            for stmt in printed {
                self.emit_newline();
                self.emit_stmt(stmt);
            }
            self.dedent();
            self.emit_newline();
        }
        self.emit("}");
    }

    fn emit_var_decl(&mut self, decl: &VarDecl) {
        self.emit(decl.kind.as_str());
        self.emit(" ");
        for (i, declarator) in decl.decls.iter().enumerate() {
            if i > 0 {
                self.emit_comma();
            }
            self.emit_pattern(&declarator.pattern);
            if let Some(init) = &declarator.init {
                self.emit_space();
                self.emit("=");
                self.emit_space();
                self.emit_expr_prec(init, level::ASSIGN);
            }
        }
    }

    fn emit_for_head(&mut self, head: &ForHead) {
        match head {
            ForHead::Var { kind, pattern } => {
                self.emit(kind.as_str());
                self.emit(" ");
                self.emit_pattern(pattern);
            }
            ForHead::Pattern(pattern) => self.emit_pattern(pattern),
        }
    }

    /// Binding and assignment patterns, without Flow annotations.
    fn emit_pattern(&mut self, pattern: &Pattern) {
        match &pattern.kind {
            PatternKind::Ident(ident) => self.emit_ident(ident),
            PatternKind::Array { elements, rest } => {
                self.emit("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    if let Some(element) = element {
                        self.emit_pattern(&element.pattern);
                        self.emit_default(element.default.as_ref());
                    }
                }
                if let Some(rest) = rest {
                    if !elements.is_empty() {
                        self.emit_comma();
                    }
                    self.emit("...");
                    self.emit_pattern(rest);
                } else if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            PatternKind::Object { properties, rest, .. } => {
                self.emit("{");
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    let keeps_shorthand = match (&prop.key, prop.value.as_ident()) {
                        (PropertyKey::Ident(key), Some(ident)) if prop.shorthand => {
                            self.module.refs.output_name(ident) == key.as_str()
                        }
                        _ => false,
                    };
                    if !keeps_shorthand {
                        self.emit_property_key(&prop.key);
                        self.emit(":");
                        self.emit_space();
                    }
                    self.emit_pattern(&prop.value);
                    self.emit_default(prop.default.as_ref());
                }
                if let Some(rest) = rest {
                    if !properties.is_empty() {
                        self.emit_comma();
                    }
                    self.emit("...");
                    self.emit_pattern(rest);
                }
                self.emit("}");
            }
            PatternKind::Expr(expr) => self.emit_expr_prec(expr, level::CALL),
        }
    }

    fn emit_default(&mut self, default: Option<&Expr>) {
        if let Some(default) = default {
            self.emit_space();
            self.emit("=");
            self.emit_space();
            self.emit_expr_prec(default, level::ASSIGN);
        }
    }

    fn emit_function(&mut self, func: &Function) {
        if func.is_async {
            self.emit("async");
            self.emit(" ");
        }
        self.emit("function");
        if func.is_generator {
            self.emit("*");
        }
        if let Some(name) = &func.name {
            self.emit(" ");
            self.emit_ident(name);
        }
        self.emit_function_rest(func);
    }

    /// Parameters and body.
    fn emit_function_rest(&mut self, func: &Function) {
        self.emit_params(&func.params);
        self.emit_space();
        let forbid_in = std::mem::replace(&mut self.forbid_in, false);
        self.emit_block(&func.body);
        self.forbid_in = forbid_in;
    }

    fn emit_arrow(&mut self, arrow: &ArrowFunction) {
        if arrow.is_async {
            self.emit("async");
            self.emit(" ");
        }

        let single = match arrow.params.as_slice() {
            [param] if !param.rest && param.default.is_none() && !arrow.is_async => param.pattern.as_ident(),
            _ => None,
        };
        match single {
            Some(ident) => self.emit_ident(ident),
            None => self.emit_params(&arrow.params),
        }

        self.emit_space();
        self.emit("=>");
        self.emit_space();

        let forbid_in = std::mem::replace(&mut self.forbid_in, false);
        match &arrow.body {
            ArrowBody::Expr(expr) => {
                if matches!(leftmost(expr).kind, ExprKind::Object(_)) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr_prec(expr, level::ASSIGN);
                }
            }
            ArrowBody::Block(stmts) => self.emit_block(stmts),
        }
        self.forbid_in = forbid_in;
    }

    fn emit_params(&mut self, params: &[Param]) {
        self.emit("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.emit_comma();
            }
            if param.rest {
                self.emit("...");
            }
            self.emit_pattern(&param.pattern);
            self.emit_default(param.default.as_ref());
        }
        self.emit(")");
    }

    fn emit_class(&mut self, class: &Class) {
        self.emit("class");
        if let Some(name) = &class.name {
            self.emit(" ");
            self.emit_ident(name);
        }
        if let Some(super_class) = &class.super_class {
            self.emit(" extends ");
            self.emit_expr_prec(super_class, level::CALL);
        }
        self.emit_space();
        self.emit("{");
        self.indent();
        let members: Vec<&ClassMember> =
            class.body.iter().filter(|member| !matches!(member.kind, ClassMemberKind::Empty)).collect();
        for member in &members {
            self.emit_newline();
            self.emit_class_member(member);
        }
        self.dedent();
        if !members.is_empty() {
            self.emit_newline();
        }
        self.emit("}");
    }

    fn emit_class_member(&mut self, member: &ClassMember) {
        match &member.kind {
            ClassMemberKind::Method { key, value, kind, is_static } => {
                if *is_static {
                    self.emit("static ");
                }
                match kind {
                    MethodKind::Get => self.emit("get "),
                    MethodKind::Set => self.emit("set "),
                    MethodKind::Method | MethodKind::Constructor => {}
                }
                self.emit_method(key, value);
            }
            ClassMemberKind::Property { key, value, is_static, .. } => {
                if *is_static {
                    self.emit("static ");
                }
                self.emit_property_key(key);
                if let Some(value) = value {
                    self.emit_space();
                    self.emit("=");
                    self.emit_space();
                    self.emit_expr_prec(value, level::ASSIGN);
                }
                self.emit_semicolon();
            }
            ClassMemberKind::Empty => {}
        }
    }

    /// `async *key(params) { body }`
    fn emit_method(&mut self, key: &PropertyKey, func: &Function) {
        if func.is_async {
            self.emit("async ");
        }
        if func.is_generator {
            self.emit("*");
        }
        self.emit_property_key(key);
        self.emit_function_rest(func);
    }

    fn emit_import(&mut self, decl: &ImportDecl) {
        if decl.type_only {
            return;
        }
        self.emit("import");
        self.emit(" ");

        let mut named = Vec::new();
        let mut wrote_clause = false;
        for specifier in &decl.specifiers {
            match specifier {
                ImportSpecifier::Default { local } => {
                    self.emit_ident(local);
                    wrote_clause = true;
                }
                ImportSpecifier::Namespace { local } => {
                    if wrote_clause {
                        self.emit_comma();
                    }
                    self.emit("* as ");
                    self.emit_ident(local);
                    wrote_clause = true;
                }
                ImportSpecifier::Named { imported, local } => named.push((imported, local)),
            }
        }

        if !named.is_empty() {
            if wrote_clause {
                self.emit_comma();
            }
            self.emit("{");
            for (i, (imported, local)) in named.iter().enumerate() {
                if i > 0 {
                    self.emit_comma();
                }
                let module = self.module;
                let local_name = module.refs.output_name(local);
                if local_name != imported.as_str() {
                    self.emit(imported);
                    self.emit(" as ");
                }
                self.emit(local_name);
            }
            self.emit("}");
            wrote_clause = true;
        }

        if wrote_clause {
            self.emit(" from ");
        }
        self.emit_string(&decl.source);
        self.emit_semicolon();
    }

    fn emit_export(&mut self, decl: &ExportDecl) {
        match decl {
            ExportDecl::Named { type_only: true, .. } => {}
            ExportDecl::Named { specifiers, source, .. } => {
                self.emit("export");
                self.emit_space();
                self.emit("{");
                for (i, specifier) in specifiers.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    let module = self.module;
                    let local = module.refs.output_name(&specifier.local);
                    self.emit(local);
                    if local != specifier.exported {
                        self.emit(" as ");
                        self.emit(&specifier.exported);
                    }
                }
                self.emit("}");
                if let Some(source) = source {
                    self.emit(" from ");
                    self.emit_string(source);
                }
                self.emit_semicolon();
            }
            ExportDecl::Default { expr } => {
                self.emit("export default ");
                if needs_statement_parens(expr) {
                    self.emit_paren_expr(expr);
                } else {
                    self.emit_expr_prec(expr, level::ASSIGN);
                }
                self.emit_semicolon();
            }
            ExportDecl::DefaultDecl { decl } => {
                self.emit("export default ");
                self.emit_stmt(decl);
            }
            ExportDecl::Decl { decl } => {
                if !is_type_only(decl) {
                    self.emit("export ");
                    self.emit_stmt(decl);
                }
            }
            ExportDecl::All { exported, source } => {
                self.emit("export *");
                if let Some(exported) = exported {
                    self.emit(" as ");
                    self.emit(exported);
                }
                self.emit(" from ");
                self.emit_string(source);
                self.emit_semicolon();
            }
        }
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) {
        self.emit_expr_prec(expr, level::LOWEST);
    }

    /// Print `expr` in a position that binds at least as tightly as
    /// `min_level`, wrapping it in parentheses otherwise.
    fn emit_expr_prec(&mut self, expr: &Expr, min_level: u8) {
        match &expr.kind {
            ExprKind::Null => self.emit("null"),
            ExprKind::Bool(b) => self.emit(if *b { "true" } else { "false" }),
            ExprKind::Number(n) => {
                if n.is_nan() {
                    self.emit("NaN");
                } else if n.is_infinite() {
                    self.emit(if n.is_sign_positive() { "Infinity" } else { "-Infinity" });
                } else {
                    self.emit(&format_number(*n));
                }
            }
            ExprKind::BigInt(digits) => self.emit(&format!("{digits}n")),
            ExprKind::String(s) => self.emit_string(s),
            ExprKind::Regex { pattern, flags } => {
                let literal = format!("/{pattern}/{flags}");
                self.emit(&literal);
            }
            ExprKind::Template(template) => self.emit_template(template),
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.emit_expr_prec(tag, level::CALL);
                self.emit_template(quasi);
            }
            ExprKind::Ident(ident) => self.emit_ident(ident),
            ExprKind::This => self.emit("this"),
            ExprKind::Super => self.emit("super"),
            ExprKind::Array(elements) => {
                let forbid_in = std::mem::replace(&mut self.forbid_in, false);
                self.emit("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    if let Some(element) = element {
                        self.emit_expr_prec(element, level::ASSIGN);
                    }
                }
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
                self.forbid_in = forbid_in;
            }
            ExprKind::Object(members) => {
                let forbid_in = std::mem::replace(&mut self.forbid_in, false);
                self.emit("{");
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    match member {
                        ObjectMember::Property(prop) => self.emit_object_property(prop),
                        ObjectMember::Spread(arg) => {
                            self.emit("...");
                            self.emit_expr_prec(arg, level::ASSIGN);
                        }
                    }
                }
                self.emit("}");
                self.forbid_in = forbid_in;
            }
            ExprKind::Function(func) => self.emit_function(func),
            ExprKind::Arrow(arrow) => {
                let wrap = min_level > level::ASSIGN;
                if wrap {
                    self.emit("(");
                }
                self.emit_arrow(arrow);
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Class(class) => self.emit_class(class),
            ExprKind::Unary { op, arg } => {
                let wrap = min_level > level::PREFIX;
                if wrap {
                    self.emit("(");
                }
                self.emit(op.as_str());
                if matches!(op, UnaryOp::Typeof | UnaryOp::Void | UnaryOp::Delete) {
                    self.emit_space();
                }
                self.emit_expr_prec(arg, level::PREFIX);
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Binary { op, left, right } => {
                let own = binary_level(*op);
                let wrap = own < min_level || (*op == BinaryOp::In && self.forbid_in);
                if wrap {
                    self.emit("(");
                }
                let inner = self.forbid_in && !wrap;
                let forbid_in = std::mem::replace(&mut self.forbid_in, inner);
                // `**` is right-associative and rejects a unary left operand.
                let (left_level, right_level) = if *op == BinaryOp::Pow {
                    (level::POSTFIX, own)
                } else {
                    (own, own + 1)
                };
                self.emit_operand(left, left_level, *op);
                self.emit_space();
                self.emit(op.as_str());
                self.emit_space();
                self.emit_operand(right, right_level, *op);
                self.forbid_in = forbid_in;
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Assign { op, left, right } => {
                let wrap = min_level > level::ASSIGN;
                if wrap {
                    self.emit("(");
                }
                self.emit_pattern(left);
                self.emit_space();
                self.emit(op.as_str());
                self.emit_space();
                self.emit_expr_prec(right, level::ASSIGN);
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Update { op, prefix, arg } => {
                let own = if *prefix { level::PREFIX } else { level::POSTFIX };
                let wrap = min_level > own;
                if wrap {
                    self.emit("(");
                }
                if *prefix {
                    self.emit(op.as_str());
                    self.emit_expr_prec(arg, level::PREFIX);
                } else {
                    self.emit_expr_prec(arg, level::CALL);
                    self.emit(op.as_str());
                }
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                let wrap = min_level > level::CONDITIONAL;
                if wrap {
                    self.emit("(");
                }
                self.emit_expr_prec(test, level::CONDITIONAL + 1);
                self.emit_space();
                self.emit("?");
                self.emit_space();
                let forbid_in = std::mem::replace(&mut self.forbid_in, false);
                self.emit_expr_prec(consequent, level::ASSIGN);
                self.forbid_in = forbid_in;
                self.emit_space();
                self.emit(":");
                self.emit_space();
                self.emit_expr_prec(alternate, level::ASSIGN);
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Sequence(exprs) => {
                let wrap = min_level > level::COMMA;
                if wrap {
                    self.emit("(");
                }
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    self.emit_expr_prec(expr, level::ASSIGN);
                }
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Member { object, property, optional } => {
                if matches!(object.kind, ExprKind::Number(_)) {
                    self.emit_paren_expr(object);
                } else {
                    self.emit_expr_prec(object, level::CALL);
                }
                if *optional {
                    self.emit("?.");
                }
                match property {
                    MemberProp::Ident(name) => {
                        if !*optional {
                            self.emit(".");
                        }
                        self.emit(name);
                    }
                    MemberProp::Private(name) => {
                        if !*optional {
                            self.emit(".");
                        }
                        self.emit("#");
                        self.emit(name);
                    }
                    MemberProp::Computed(index) => {
                        let forbid_in = std::mem::replace(&mut self.forbid_in, false);
                        self.emit("[");
                        self.emit_expr(index);
                        self.emit("]");
                        self.forbid_in = forbid_in;
                    }
                }
            }
            ExprKind::Call { callee, args, optional } => {
                self.emit_expr_prec(callee, level::CALL);
                if *optional {
                    self.emit("?.");
                }
                self.emit_args(args);
            }
            ExprKind::New { callee, args } => {
                self.emit("new");
                self.emit_space();
                if has_call_head(callee) {
                    self.emit_paren_expr(callee);
                } else {
                    self.emit_expr_prec(callee, level::CALL);
                }
                self.emit_args(args);
            }
            ExprKind::Spread(arg) => {
                self.emit("...");
                self.emit_expr_prec(arg, level::ASSIGN);
            }
            ExprKind::Yield { arg, delegate } => {
                let wrap = min_level > level::ASSIGN;
                if wrap {
                    self.emit("(");
                }
                self.emit("yield");
                if *delegate {
                    self.emit("*");
                }
                if let Some(arg) = arg {
                    self.emit_space();
                    self.emit_expr_prec(arg, level::ASSIGN);
                }
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Await(arg) => {
                let wrap = min_level > level::PREFIX;
                if wrap {
                    self.emit("(");
                }
                self.emit("await");
                self.emit_space();
                self.emit_expr_prec(arg, level::PREFIX);
                if wrap {
                    self.emit(")");
                }
            }
            ExprKind::Import(arg) => {
                self.emit("import(");
                self.emit_expr_prec(arg, level::ASSIGN);
                self.emit(")");
            }
            ExprKind::MetaProperty { meta, property } => {
                self.emit(meta);
                self.emit(".");
                self.emit(property);
            }
            ExprKind::JsxElement(element) => self.emit_jsx_element(element),
            ExprKind::JsxFragment(fragment) => self.emit_jsx_fragment(fragment),
            ExprKind::Helper(helper) => self.emit(helper.name()),
        }
    }

    /// Operand of a binary operator. `??` never shares an unparenthesized
    /// chain with `||` or `&&`.
    fn emit_operand(&mut self, operand: &Expr, min_level: u8, parent: BinaryOp) {
        let mixes = match &operand.kind {
            ExprKind::Binary { op, .. } => {
                let logical = |op: BinaryOp| matches!(op, BinaryOp::And | BinaryOp::Or);
                (parent == BinaryOp::NullishCoalesce && logical(*op))
                    || (logical(parent) && *op == BinaryOp::NullishCoalesce)
            }
            _ => false,
        };
        if mixes {
            self.emit_paren_expr(operand);
        } else {
            self.emit_expr_prec(operand, min_level);
        }
    }

    fn emit_args(&mut self, args: &[Expr]) {
        let forbid_in = std::mem::replace(&mut self.forbid_in, false);
        self.emit("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.emit_comma();
            }
            self.emit_expr_prec(arg, level::ASSIGN);
        }
        self.emit(")");
        self.forbid_in = forbid_in;
    }

    fn emit_template(&mut self, template: &Template) {
        self.emit("`");
        for (i, quasi) in template.quasis.iter().enumerate() {
            self.output.push_str(&quasi.raw);
            if let Some(expr) = template.exprs.get(i) {
                self.output.push_str("${");
                self.emit_expr(expr);
                self.output.push('}');
            }
        }
        self.output.push('`');
    }

    fn emit_object_property(&mut self, prop: &Property) {
        if prop.shorthand {
            if let (PropertyKey::Ident(key), ExprKind::Ident(ident)) = (&prop.key, &prop.value.kind) {
                if self.module.refs.output_name(ident) == key.as_str() {
                    self.emit(key);
                    return;
                }
            }
        }

        match (prop.kind, &prop.value.kind) {
            (PropertyKind::Get | PropertyKind::Set, ExprKind::Function(func)) => {
                self.emit(if prop.kind == PropertyKind::Get { "get " } else { "set " });
                self.emit_property_key(&prop.key);
                self.emit_function_rest(func);
            }
            (PropertyKind::Method, ExprKind::Function(func)) => self.emit_method(&prop.key, func),
            _ => {
                self.emit_property_key(&prop.key);
                self.emit(":");
                self.emit_space();
                self.emit_expr_prec(&prop.value, level::ASSIGN);
            }
        }
    }

    fn emit_property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Ident(name) => self.emit(name),
            PropertyKey::String(s) => self.emit_string(s),
            PropertyKey::Number(n) => self.emit(&format_number(*n)),
            PropertyKey::Private(name) => {
                self.emit("#");
                self.emit(name);
            }
            PropertyKey::Computed(expr) => {
                self.emit("[");
                self.emit_expr_prec(expr, level::ASSIGN);
                self.emit("]");
            }
        }
    }

    // =========================================================================
    // JSX
    // =========================================================================

    fn emit_jsx_element(&mut self, element: &JsxElement) {
        self.emit("<");
        self.emit_jsx_name(&element.name);
        for attribute in &element.attributes {
            self.output.push(' ');
            match attribute {
                JsxAttribute::Attribute { name, value, .. } => {
                    self.output.push_str(name);
                    if let Some(value) = value {
                        self.output.push('=');
                        self.emit_jsx_attr_value(value);
                    }
                }
                JsxAttribute::Spread { argument, .. } => {
                    self.output.push_str("{...");
                    self.emit_expr_prec(argument, level::ASSIGN);
                    self.output.push('}');
                }
            }
        }
        if element.self_closing {
            self.output.push_str(" />");
            return;
        }
        self.output.push('>');
        self.emit_jsx_children(&element.children);
        self.output.push_str("</");
        self.emit_jsx_name(&element.name);
        self.output.push('>');
    }

    fn emit_jsx_fragment(&mut self, fragment: &JsxFragment) {
        self.emit("<>");
        self.emit_jsx_children(&fragment.children);
        self.output.push_str("</>");
    }

    fn emit_jsx_name(&mut self, name: &JsxElementName) {
        let module = self.module;
        match name {
            JsxElementName::Intrinsic(tag) => self.output.push_str(tag),
            JsxElementName::Component(ident) => self.output.push_str(module.refs.output_name(ident)),
            JsxElementName::Member { object, path } => {
                self.output.push_str(module.refs.output_name(object));
                for part in path {
                    self.output.push('.');
                    self.output.push_str(part);
                }
            }
            JsxElementName::Namespaced { namespace, name } => {
                self.output.push_str(namespace);
                self.output.push(':');
                self.output.push_str(name);
            }
        }
    }

    fn emit_jsx_attr_value(&mut self, value: &JsxAttrValue) {
        match value {
            JsxAttrValue::String(s) => {
                let quote = if s.contains('"') { '\'' } else { '"' };
                self.output.push(quote);
                self.output.push_str(s);
                self.output.push(quote);
            }
            JsxAttrValue::Expr(expr) => {
                self.output.push('{');
                self.emit_expr_prec(expr, level::ASSIGN);
                self.output.push('}');
            }
            JsxAttrValue::Element(element) => self.emit_jsx_element(element),
            JsxAttrValue::Fragment(fragment) => self.emit_jsx_fragment(fragment),
        }
    }

    fn emit_jsx_children(&mut self, children: &[JsxChild]) {
        for child in children {
            match child {
                JsxChild::Text(text) => self.output.push_str(text),
                JsxChild::Element(element) => self.emit_jsx_element(element),
                JsxChild::Fragment(fragment) => self.emit_jsx_fragment(fragment),
                JsxChild::Expr(expr) => {
                    self.output.push('{');
                    self.emit_expr(expr);
                    self.output.push('}');
                }
                JsxChild::Spread(expr) => {
                    self.output.push_str("{...");
                    self.emit_expr(expr);
                    self.output.push('}');
                }
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Shortest decimal spelling of a number literal.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        let plain = format!("{}", n);
        let exp = format!("{:e}", n);
        if exp.len() < plain.len() {
            exp
        } else {
            plain
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            // `\0` followed by a digit would read as a legacy octal escape.
            '\0' if chars.peek().is_some_and(char::is_ascii_digit) => result.push_str("\\x00"),
            '\0' => result.push_str("\\0"),
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || !c.is_ascii()
}

/// Whether two adjacent tokens would fuse without a space.
fn needs_separator(last: char, first: char) -> bool {
    (is_word_char(last) && is_word_char(first))
        || (last == first && matches!(last, '+' | '-' | '/'))
        || (last == '/' && first == '*')
}

/// Flow-only statements, which print as nothing.
fn is_type_only(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::TypeAlias(_) | StmtKind::Interface(_) => true,
        StmtKind::Import(decl) => decl.type_only,
        StmtKind::Export(decl) => match decl.as_ref() {
            ExportDecl::Named { type_only, .. } => *type_only,
            ExportDecl::Decl { decl } => is_type_only(decl),
            _ => false,
        },
        _ => false,
    }
}

/// The expression whose first token starts `expr`'s printed form.
fn leftmost(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Member { object, .. } => leftmost(object),
        ExprKind::Call { callee, .. } => leftmost(callee),
        ExprKind::TaggedTemplate { tag, .. } => leftmost(tag),
        ExprKind::Binary { left, .. } => leftmost(left),
        ExprKind::Conditional { test, .. } => leftmost(test),
        ExprKind::Sequence(exprs) => exprs.first().map_or(expr, leftmost),
        ExprKind::Update { prefix: false, arg, .. } => leftmost(arg),
        ExprKind::Assign { left, .. } => match &left.kind {
            PatternKind::Expr(target) => leftmost(target),
            _ => expr,
        },
        _ => expr,
    }
}

/// An expression statement that would be read as a declaration or block.
fn needs_statement_parens(expr: &Expr) -> bool {
    match &leftmost(expr).kind {
        ExprKind::Function(_) | ExprKind::Class(_) | ExprKind::Object(_) => true,
        ExprKind::Assign { left, .. } => matches!(left.kind, PatternKind::Object { .. }),
        _ => false,
    }
}

/// `new` would claim the arguments of a call in its callee.
fn has_call_head(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { .. } => true,
        ExprKind::Member { object, .. } => has_call_head(object),
        ExprKind::TaggedTemplate { tag, .. } => has_call_head(tag),
        _ => false,
    }
}

/// `if (a) if (b) c; else d` would bind the `else` to the inner `if`.
fn ends_with_open_if(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::If { alternate: None, .. } => true,
        StmtKind::If { alternate: Some(alternate), .. } => ends_with_open_if(alternate),
        StmtKind::Labeled { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::For { body, .. }
        | StmtKind::ForIn { body, .. }
        | StmtKind::ForOf { body, .. }
        | StmtKind::With { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

fn helper_source(helper: Helper) -> &'static str {
    match helper {
        Helper::ObjectRest => {
            "var __objectRest = function(source, exclude) { var omit = Object.create(null), target = {}; \
             for (var i = 0; i < exclude.length; i++) omit[exclude[i]] = true; \
             for (var key in source) if (Object.prototype.hasOwnProperty.call(source, key) \
             && !(key in omit)) target[key] = source[key]; return target; }"
        }
        Helper::SlicedArrayRest => {
            "var __slicedArrayRest = function(source, index) { \
             return Array.prototype.slice.call(source, index); }"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;

    fn roundtrip(source: &str) -> String {
        let module = parse_module("test.js", source).expect("parse");
        Codegen::new(&module, CodegenOptions::default()).generate()
    }

    #[test]
    fn test_variable_declaration() {
        assert_eq!(roundtrip("let x = 1;"), "let x = 1;\n");
    }

    #[test]
    fn test_function_declaration() {
        let output = roundtrip("function foo(a, b) { return a + b; }");
        assert_eq!(output, "function foo(a, b) {\n  return a + b;\n}\n");
    }

    #[test]
    fn test_precedence_parens() {
        assert_eq!(roundtrip("(a + b) * c;"), "(a + b) * c;\n");
        assert_eq!(roundtrip("a + b * c;"), "a + b * c;\n");
        assert_eq!(roundtrip("a - (b - c);"), "a - (b - c);\n");
        assert_eq!(roundtrip("(a, b);"), "a, b;\n");
        assert_eq!(roundtrip("f((a, b));"), "f((a, b));\n");
        assert_eq!(roundtrip("(-a) ** b;"), "(-a) ** b;\n");
        assert_eq!(roundtrip("a ** b ** c;"), "a ** b ** c;\n");
        assert_eq!(roundtrip("(a ** b) ** c;"), "(a ** b) ** c;\n");
        assert_eq!(roundtrip("a ?? (b || c);"), "a ?? (b || c);\n");
        assert_eq!(roundtrip("new (f())();"), "new (f())();\n");
    }

    #[test]
    fn test_statement_start_parens() {
        assert_eq!(roundtrip("(function () {})();"), "(function() {}());\n");
        assert_eq!(roundtrip("({}).toString();"), "({}.toString());\n");
        assert_eq!(roundtrip("({a} = b);"), "({a} = b);\n");
    }

    #[test]
    fn test_arrow_object_body() {
        assert_eq!(roundtrip("f = () => ({});"), "f = () => ({});\n");
        assert_eq!(roundtrip("f = x => x * 2;"), "f = x => x * 2;\n");
    }

    #[test]
    fn test_number_member() {
        assert_eq!(roundtrip("1..toString();"), "(1).toString();\n");
    }

    #[test]
    fn test_for_in_init_parens() {
        assert_eq!(roundtrip("for (var i = (a in b); i;) {}"), "for (var i = (a in b); i;) {}\n");
    }

    #[test]
    fn test_dangling_else() {
        let output = roundtrip("if (a) { if (b) c(); } else d();");
        assert!(output.contains("if (a) {"), "{output}");
        assert!(output.contains("} else d();"), "{output}");
    }

    #[test]
    fn test_flow_is_stripped() {
        let source = "type T = number;\nfunction f(x: T, y?: string): T { return (x: any); }\nexport type U = T;";
        assert_eq!(roundtrip(source), "function f(x, y) {\n  return x;\n}\n");
    }

    #[test]
    fn test_jsx_is_kept() {
        let output = roundtrip("let el = <div className=\"a\" {...rest}>hi {name}<br /></div>;");
        assert_eq!(output, "let el = <div className=\"a\" {...rest}>hi {name}<br /></div>;\n");
    }

    #[test]
    fn test_template_raw_is_kept() {
        assert_eq!(roundtrip("tag`a\\n${b}c`;"), "tag`a\\n${b}c`;\n");
    }

    #[test]
    fn test_minify() {
        let module = parse_module("test.js", "let x = 1;\nif (x) { y(); z(); }").expect("parse");
        let output = Codegen::new(&module, CodegenOptions { minify: true, ..Default::default() }).generate();
        assert_eq!(output, "let x=1;if(x){y();z()}");
    }

    #[test]
    fn test_minify_separates_operators() {
        let module = parse_module("test.js", "a - -b; c + +d; return_ = typeof e;").expect("parse");
        let output = Codegen::new(&module, CodegenOptions { minify: true, ..Default::default() }).generate();
        assert_eq!(output, "a- -b;c+ +d;return_=typeof e");
    }

    #[test]
    fn test_bigint_suffix_stays_attached() {
        assert_eq!(roundtrip("x = 10n;"), "x = 10n;\n");
        let module = parse_module("test.js", "y = 1n + 2n;").expect("parse");
        let output = Codegen::new(&module, CodegenOptions { minify: true, ..Default::default() }).generate();
        assert_eq!(output, "y=1n+2n");
    }

    #[test]
    fn test_nul_before_digit_is_not_octal() {
        assert_eq!(roundtrip("s = \"\\u00000\";"), "s = \"\\x000\";\n");
        assert_eq!(roundtrip("s = \"\\0a\";"), "s = \"\\0a\";\n");
        assert_eq!(escape_string("\u{0}9\u{0}"), "\\x009\\0");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1e21), "1e21");
    }

    #[test]
    fn test_idempotent() {
        let source = "import a, {b as c} from 'm';\nclass K extends a { static x = 1; get y() { return this.#z; } #z = 2; }\n\
                      const {p, q: [r, , ...s] = [], ...t} = o;\nfor (const k of list) label: while (k) break label;\n\
                      export default async function* g() { yield* c?.d?.(1); await x; }";
        let first = roundtrip(source);
        let second = roundtrip(&first);
        assert_eq!(first, second);
    }
}
