//! Generic AST traversal.
//!
//! The `walk_*` functions visit every node of a [`Module`] in evaluation
//! order and report to a [`Visitor`]. Every hook has a no-op default, so a
//! pass only implements the events it cares about. The exit hooks for
//! statements and expressions may return a node, which replaces the visited
//! one in place once its children have been walked.
//!
//! Ordering:
//! - a declarator's initializer and a pattern element's default are walked
//!   before the binder they belong to;
//! - a function declaration's name is declared in the enclosing scope, a
//!   function expression's name inside the function's own scope;
//! - `for` heads, `catch` parameters and `switch` bodies open a block scope;
//! - `exit_function`/`exit_arrow` run while the function scope is still open.

use crate::ast::*;
use crate::scope::ScopeKind;

/// How a binding occurrence introduces its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
    CatchParam,
    Import,
}

impl From<VarKind> for DeclKind {
    fn from(kind: VarKind) -> Self {
        match kind {
            VarKind::Var => DeclKind::Var,
            VarKind::Let => DeclKind::Let,
            VarKind::Const => DeclKind::Const,
        }
    }
}

/// Callbacks driven by the `walk_*` functions.
#[allow(unused_variables)]
pub trait Visitor {
    fn enter_scope(&mut self, kind: ScopeKind) {}
    fn exit_scope(&mut self, kind: ScopeKind) {}

    fn enter_function(&mut self, func: &mut Function) {}
    fn exit_function(&mut self, func: &mut Function) {}

    fn enter_arrow(&mut self, arrow: &mut ArrowFunction) {}
    fn exit_arrow(&mut self, arrow: &mut ArrowFunction) {}

    /// A class field initializer, which sees the instance as `this`.
    fn enter_field_init(&mut self, value: &mut Expr) {}
    fn exit_field_init(&mut self, value: &mut Expr) {}

    /// A binding occurrence.
    fn declare(&mut self, ident: &mut Ident, kind: DeclKind) {}
    /// A use of a name.
    fn reference(&mut self, ident: &mut Ident) {}
    /// A use of a name as a JSX tag, whose spelling decides between a
    /// host element and a component.
    fn jsx_reference(&mut self, ident: &mut Ident) {
        self.reference(ident);
    }

    fn enter_stmt(&mut self, stmt: &mut Stmt) {}
    /// Return `Some` to replace `stmt`.
    fn exit_stmt(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
        None
    }

    fn enter_expr(&mut self, expr: &mut Expr) {}
    /// Return `Some` to replace `expr`.
    fn exit_expr(&mut self, expr: &mut Expr) -> Option<Expr> {
        None
    }
}

pub fn walk_module<V: Visitor + ?Sized>(v: &mut V, module: &mut Module) {
    v.enter_scope(ScopeKind::Module);
    walk_stmts(v, &mut module.body);
    v.exit_scope(ScopeKind::Module);
}

pub fn walk_stmts<V: Visitor + ?Sized>(v: &mut V, stmts: &mut [Stmt]) {
    for stmt in stmts {
        walk_stmt(v, stmt);
    }
}

fn walk_block<V: Visitor + ?Sized>(v: &mut V, stmts: &mut [Stmt]) {
    v.enter_scope(ScopeKind::Block);
    walk_stmts(v, stmts);
    v.exit_scope(ScopeKind::Block);
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    v.enter_stmt(stmt);
    match &mut stmt.kind {
        StmtKind::Var(decl) => walk_var_decl(v, decl),
        StmtKind::Function(func) => {
            if let Some(name) = &mut func.name {
                v.declare(name, DeclKind::Function);
            }
            walk_function(v, func, false);
        }
        StmtKind::Class(class) => {
            if let Some(name) = &mut class.name {
                v.declare(name, DeclKind::Class);
            }
            walk_class(v, class, false);
        }
        StmtKind::Block(body) => walk_block(v, body),
        StmtKind::If { test, consequent, alternate } => {
            walk_expr(v, test);
            walk_stmt(v, consequent);
            if let Some(alternate) = alternate {
                walk_stmt(v, alternate);
            }
        }
        StmtKind::Switch { discriminant, cases } => {
            walk_expr(v, discriminant);
            v.enter_scope(ScopeKind::Block);
            for case in cases {
                if let Some(test) = &mut case.test {
                    walk_expr(v, test);
                }
                walk_stmts(v, &mut case.consequent);
            }
            v.exit_scope(ScopeKind::Block);
        }
        StmtKind::For { init, test, update, body } => {
            v.enter_scope(ScopeKind::Block);
            match init {
                Some(ForInit::Var(decl)) => walk_var_decl(v, decl),
                Some(ForInit::Expr(expr)) => walk_expr(v, expr),
                None => {}
            }
            if let Some(test) = test {
                walk_expr(v, test);
            }
            if let Some(update) = update {
                walk_expr(v, update);
            }
            walk_stmt(v, body);
            v.exit_scope(ScopeKind::Block);
        }
        StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body, .. } => {
            v.enter_scope(ScopeKind::Block);
            walk_expr(v, right);
            match left {
                ForHead::Var { kind, pattern } => walk_pattern(v, pattern, Some(DeclKind::from(*kind))),
                ForHead::Pattern(pattern) => walk_pattern(v, pattern, None),
            }
            walk_stmt(v, body);
            v.exit_scope(ScopeKind::Block);
        }
        StmtKind::While { test, body } => {
            walk_expr(v, test);
            walk_stmt(v, body);
        }
        StmtKind::DoWhile { body, test } => {
            walk_stmt(v, body);
            walk_expr(v, test);
        }
        StmtKind::Return { arg } => {
            if let Some(arg) = arg {
                walk_expr(v, arg);
            }
        }
        StmtKind::Throw { arg } | StmtKind::Expr(arg) => walk_expr(v, arg),
        StmtKind::Try { block, handler, finalizer } => {
            walk_block(v, block);
            if let Some(handler) = handler {
                v.enter_scope(ScopeKind::Block);
                if let Some(param) = &mut handler.param {
                    walk_pattern(v, param, Some(DeclKind::CatchParam));
                }
                walk_stmts(v, &mut handler.body);
                v.exit_scope(ScopeKind::Block);
            }
            if let Some(finalizer) = finalizer {
                walk_block(v, finalizer);
            }
        }
        StmtKind::Labeled { body, .. } => walk_stmt(v, body),
        StmtKind::With { object, body } => {
            walk_expr(v, object);
            walk_stmt(v, body);
        }
        StmtKind::Import(decl) => {
            if !decl.type_only {
                for specifier in &mut decl.specifiers {
                    v.declare(specifier.local_mut(), DeclKind::Import);
                }
            }
        }
        StmtKind::Export(decl) => match decl.as_mut() {
            ExportDecl::Named { specifiers, source: None, type_only: false } => {
                for specifier in specifiers {
                    v.reference(&mut specifier.local);
                }
            }
            ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
            ExportDecl::Default { expr } => walk_expr(v, expr),
            ExportDecl::DefaultDecl { decl } | ExportDecl::Decl { decl } => walk_stmt(v, decl),
        },
        StmtKind::Break { .. }
        | StmtKind::Continue { .. }
        | StmtKind::Empty
        | StmtKind::Debugger
        | StmtKind::TypeAlias(_)
        | StmtKind::Interface(_) => {}
    }
    if let Some(replacement) = v.exit_stmt(stmt) {
        *stmt = replacement;
    }
}

fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, decl: &mut VarDecl) {
    let kind = DeclKind::from(decl.kind);
    for declarator in &mut decl.decls {
        if let Some(init) = &mut declarator.init {
            walk_expr(v, init);
        }
        walk_pattern(v, &mut declarator.pattern, Some(kind));
    }
}

/// Walk a binding pattern (`decl` is `Some`) or an assignment target.
pub fn walk_pattern<V: Visitor + ?Sized>(v: &mut V, pattern: &mut Pattern, decl: Option<DeclKind>) {
    match &mut pattern.kind {
        PatternKind::Ident(ident) => match decl {
            Some(kind) => v.declare(ident, kind),
            None => v.reference(ident),
        },
        PatternKind::Array { elements, rest } => {
            for element in elements.iter_mut().flatten() {
                if let Some(default) = &mut element.default {
                    walk_expr(v, default);
                }
                walk_pattern(v, &mut element.pattern, decl);
            }
            if let Some(rest) = rest {
                walk_pattern(v, rest, decl);
            }
        }
        PatternKind::Object { properties, rest, .. } => {
            for prop in properties {
                if let PropertyKey::Computed(key) = &mut prop.key {
                    walk_expr(v, key);
                }
                if let Some(default) = &mut prop.default {
                    walk_expr(v, default);
                }
                walk_pattern(v, &mut prop.value, decl);
            }
            if let Some(rest) = rest {
                walk_pattern(v, rest, decl);
            }
        }
        PatternKind::Expr(expr) => walk_expr(v, expr),
    }
}

fn walk_params<V: Visitor + ?Sized>(v: &mut V, params: &mut [Param]) {
    for param in params {
        if let Some(default) = &mut param.default {
            walk_expr(v, default);
        }
        walk_pattern(v, &mut param.pattern, Some(DeclKind::Param));
    }
}

/// Walk a function. With `name_inside`, the name is bound in the
/// function's own scope (function expressions).
pub fn walk_function<V: Visitor + ?Sized>(v: &mut V, func: &mut Function, name_inside: bool) {
    v.enter_function(func);
    v.enter_scope(ScopeKind::Function);
    if name_inside {
        if let Some(name) = &mut func.name {
            v.declare(name, DeclKind::Function);
        }
    }
    walk_params(v, &mut func.params);
    walk_stmts(v, &mut func.body);
    v.exit_function(func);
    v.exit_scope(ScopeKind::Function);
}

pub fn walk_arrow<V: Visitor + ?Sized>(v: &mut V, arrow: &mut ArrowFunction) {
    v.enter_arrow(arrow);
    v.enter_scope(ScopeKind::Function);
    walk_params(v, &mut arrow.params);
    match &mut arrow.body {
        ArrowBody::Expr(body) => walk_expr(v, body),
        ArrowBody::Block(body) => walk_stmts(v, body),
    }
    v.exit_arrow(arrow);
    v.exit_scope(ScopeKind::Function);
}

/// Walk a class. The body gets a block scope; with `name_inside` the
/// class name is bound there (class expressions).
pub fn walk_class<V: Visitor + ?Sized>(v: &mut V, class: &mut Class, name_inside: bool) {
    if let Some(super_class) = &mut class.super_class {
        walk_expr(v, super_class);
    }
    v.enter_scope(ScopeKind::Block);
    if name_inside {
        if let Some(name) = &mut class.name {
            v.declare(name, DeclKind::Class);
        }
    }
    for member in &mut class.body {
        match &mut member.kind {
            ClassMemberKind::Method { key, value, .. } => {
                if let PropertyKey::Computed(key) = key {
                    walk_expr(v, key);
                }
                walk_function(v, value, false);
            }
            ClassMemberKind::Property { key, value, .. } => {
                if let PropertyKey::Computed(key) = key {
                    walk_expr(v, key);
                }
                if let Some(value) = value {
                    v.enter_field_init(value);
                    walk_expr(v, value);
                    v.exit_field_init(value);
                }
            }
            ClassMemberKind::Empty => {}
        }
    }
    v.exit_scope(ScopeKind::Block);
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &mut Expr) {
    v.enter_expr(expr);
    match &mut expr.kind {
        ExprKind::Null
        | ExprKind::Bool(_)
        | ExprKind::Number(_)
        | ExprKind::BigInt(_)
        | ExprKind::String(_)
        | ExprKind::Regex { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::MetaProperty { .. }
        | ExprKind::Helper(_) => {}
        ExprKind::Template(template) => walk_exprs(v, &mut template.exprs),
        ExprKind::TaggedTemplate { tag, quasi } => {
            walk_expr(v, tag);
            walk_exprs(v, &mut quasi.exprs);
        }
        ExprKind::Ident(ident) => v.reference(ident),
        ExprKind::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                walk_expr(v, element);
            }
        }
        ExprKind::Object(members) => {
            for member in members {
                match member {
                    ObjectMember::Property(prop) => {
                        if let PropertyKey::Computed(key) = &mut prop.key {
                            walk_expr(v, key);
                        }
                        walk_expr(v, &mut prop.value);
                    }
                    ObjectMember::Spread(arg) => walk_expr(v, arg),
                }
            }
        }
        ExprKind::Function(func) => walk_function(v, func, true),
        ExprKind::Arrow(arrow) => walk_arrow(v, arrow),
        ExprKind::Class(class) => walk_class(v, class, true),
        ExprKind::Unary { arg, .. }
        | ExprKind::Update { arg, .. }
        | ExprKind::Await(arg)
        | ExprKind::Spread(arg)
        | ExprKind::Import(arg) => walk_expr(v, arg),
        ExprKind::Binary { left, right, .. } => {
            walk_expr(v, left);
            walk_expr(v, right);
        }
        ExprKind::Assign { left, right, .. } => {
            walk_pattern(v, left, None);
            walk_expr(v, right);
        }
        ExprKind::Conditional { test, consequent, alternate } => {
            walk_expr(v, test);
            walk_expr(v, consequent);
            walk_expr(v, alternate);
        }
        ExprKind::Sequence(exprs) => walk_exprs(v, exprs),
        ExprKind::Member { object, property, .. } => {
            walk_expr(v, object);
            if let MemberProp::Computed(property) = property {
                walk_expr(v, property);
            }
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            walk_expr(v, callee);
            walk_exprs(v, args);
        }
        ExprKind::Yield { arg, .. } => {
            if let Some(arg) = arg {
                walk_expr(v, arg);
            }
        }
        ExprKind::JsxElement(element) => walk_jsx_element(v, element),
        ExprKind::JsxFragment(fragment) => walk_jsx_children(v, &mut fragment.children),
    }
    if let Some(replacement) = v.exit_expr(expr) {
        *expr = replacement;
    }
}

fn walk_exprs<V: Visitor + ?Sized>(v: &mut V, exprs: &mut [Expr]) {
    for expr in exprs {
        walk_expr(v, expr);
    }
}

fn walk_jsx_element<V: Visitor + ?Sized>(v: &mut V, element: &mut JsxElement) {
    match &mut element.name {
        JsxElementName::Component(ident) | JsxElementName::Member { object: ident, .. } => v.jsx_reference(ident),
        JsxElementName::Intrinsic(_) | JsxElementName::Namespaced { .. } => {}
    }
    for attribute in &mut element.attributes {
        match attribute {
            JsxAttribute::Attribute { value: Some(value), .. } => match value {
                JsxAttrValue::String(_) => {}
                JsxAttrValue::Expr(expr) => walk_expr(v, expr),
                JsxAttrValue::Element(element) => walk_jsx_element(v, element),
                JsxAttrValue::Fragment(fragment) => walk_jsx_children(v, &mut fragment.children),
            },
            JsxAttribute::Attribute { value: None, .. } => {}
            JsxAttribute::Spread { argument, .. } => walk_expr(v, argument),
        }
    }
    walk_jsx_children(v, &mut element.children);
}

fn walk_jsx_children<V: Visitor + ?Sized>(v: &mut V, children: &mut [JsxChild]) {
    for child in children {
        match child {
            JsxChild::Text(_) => {}
            JsxChild::Element(element) => walk_jsx_element(v, element),
            JsxChild::Fragment(fragment) => walk_jsx_children(v, &mut fragment.children),
            JsxChild::Expr(expr) | JsxChild::Spread(expr) => walk_expr(v, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Visitor for Recorder {
        fn enter_scope(&mut self, kind: ScopeKind) {
            self.events.push(format!("enter {kind:?}"));
        }

        fn exit_scope(&mut self, kind: ScopeKind) {
            self.events.push(format!("exit {kind:?}"));
        }

        fn declare(&mut self, ident: &mut Ident, kind: DeclKind) {
            self.events.push(format!("declare {} {kind:?}", ident.name));
        }

        fn reference(&mut self, ident: &mut Ident) {
            self.events.push(format!("use {}", ident.name));
        }
    }

    fn record(source: &str) -> Vec<String> {
        let mut module = parse_module("test.js", source).expect("parse");
        let mut recorder = Recorder::default();
        walk_module(&mut recorder, &mut module);
        recorder.events
    }

    #[test]
    fn test_initializer_before_binder() {
        let events = record("const a = a;");
        assert_eq!(events, vec!["enter Module", "use a", "declare a Const", "exit Module"]);
    }

    #[test]
    fn test_default_before_binder() {
        let events = record("let {x = y, [k]: z} = o;");
        assert_eq!(
            events,
            vec!["enter Module", "use o", "use y", "declare x Let", "use k", "declare z Let", "exit Module"]
        );
    }

    #[test]
    fn test_function_name_placement() {
        let declaration = record("function f(a) {}");
        assert_eq!(
            declaration,
            vec!["enter Module", "declare f Function", "enter Function", "declare a Param", "exit Function", "exit Module"]
        );

        let expression = record("(function g() {});");
        assert_eq!(
            expression,
            vec!["enter Module", "enter Function", "declare g Function", "exit Function", "exit Module"]
        );
    }

    #[test]
    fn test_for_head_inside_block_scope() {
        let events = record("for (let i of list) i;");
        assert_eq!(
            events,
            vec!["enter Module", "enter Block", "use list", "declare i Let", "use i", "exit Block", "exit Module"]
        );
    }

    #[test]
    fn test_export_from_is_not_a_reference() {
        assert_eq!(record("export { a } from 'm';"), vec!["enter Module", "exit Module"]);
        assert_eq!(record("export { a };"), vec!["enter Module", "use a", "exit Module"]);
    }

    #[test]
    fn test_jsx_component_is_a_reference() {
        let events = record("<Foo bar={baz}><div /></Foo>;");
        assert_eq!(events, vec!["enter Module", "use Foo", "use baz", "exit Module"]);
    }

    struct NumberDoubler;

    impl Visitor for NumberDoubler {
        fn exit_expr(&mut self, expr: &mut Expr) -> Option<Expr> {
            match expr.kind {
                ExprKind::Number(value) => Some(Expr::number(value * 2.0, expr.span)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_exit_expr_replaces_node() {
        let mut module = parse_module("test.js", "f(1, [2]);").expect("parse");
        walk_module(&mut NumberDoubler, &mut module);
        let StmtKind::Expr(call) = &module.body[0].kind else { panic!("expected expression statement") };
        let ExprKind::Call { args, .. } = &call.kind else { panic!("expected call") };
        assert_eq!(args[0].kind, ExprKind::Number(2.0));
        let ExprKind::Array(elements) = &args[1].kind else { panic!("expected array") };
        assert_eq!(elements[0].as_ref().map(|e| &e.kind), Some(&ExprKind::Number(4.0)));
    }

    struct DropDebugger;

    impl Visitor for DropDebugger {
        fn exit_stmt(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
            matches!(stmt.kind, StmtKind::Debugger).then(|| Stmt::new(StmtKind::Empty, stmt.span))
        }
    }

    #[test]
    fn test_exit_stmt_replaces_node() {
        let mut module = parse_module("test.js", "if (x) { debugger; }").expect("parse");
        walk_module(&mut DropDebugger, &mut module);
        let StmtKind::If { consequent, .. } = &module.body[0].kind else { panic!("expected if") };
        let StmtKind::Block(body) = &consequent.kind else { panic!("expected block") };
        assert_eq!(body[0].kind, StmtKind::Empty);
    }
}
