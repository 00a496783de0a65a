//! Binding resolution and the pass pipeline.
//!
//! [`optimize`] runs over a parsed [`Module`] in four steps:
//!
//! 1. **Resolve**: one walk with a stack of open scopes. Every identifier
//!    gets a [`RefId`]. `var` and function-level function names are
//!    registered as soon as their function scope opens, so earlier uses bind
//!    to them. Any other use without a visible binding gets a provisional
//!    ref which is upgraded in place, merged into an outer binding when its
//!    function closes, or settled as a global when the module closes.
//! 2. **Canonicalize**: merged refs are rewritten to their surviving target,
//!    so no identifier points at an unresolved ref.
//! 3. **Lower** syntax the target does not support ([`crate::lower`]).
//! 4. **Mangle** local names when minifying ([`crate::mangle`]).

use std::mem;

use tracing::{debug, debug_span, trace};

use crate::ast::{
    ArrowBody, ArrowFunction, Expr, ExprKind, ExportDecl, ForHead, ForInit, Function, Ident, Module, Pattern, Stmt,
    StmtKind, VarKind,
};
use crate::config::TargetConfig;
use crate::error::{ErrorList, ParseError};
use crate::lower;
use crate::mangle;
use crate::scope::{RefId, RefKind, RefTable, ScopeId, ScopeKind, ScopeTree};
use crate::span::LineIndex;
use crate::walk::{walk_module, DeclKind, Visitor};

/// Resolve bindings, lower syntax for `config.target`, and mangle names
/// when `config.minify` is set. The module is rewritten in place.
pub fn optimize(module: &mut Module, config: &TargetConfig) -> Result<(), ErrorList> {
    let _span = debug_span!("optimize", file = %module.filename, target = %config.target).entered();

    resolve(module)?;
    lower::lower_module(module, config);
    if config.minify {
        mangle::mangle_module(module, config);
    }
    module.config = *config;
    Ok(())
}

/// Same pass as [`optimize`] with minification forced off.
pub fn transpile(module: &mut Module, config: &TargetConfig) -> Result<(), ErrorList> {
    optimize(module, &config.with_minify(false))
}

/// Fill `module.scopes` and `module.refs` and bind every identifier.
pub fn resolve(module: &mut Module) -> Result<(), ErrorList> {
    let lines = mem::take(&mut module.lines);
    let mut resolver = Resolver::new(&lines);
    resolver.pending = hoisted_names(&module.body);
    walk_module(&mut resolver, module);
    let Resolver { scopes, mut refs, errors, .. } = resolver;
    module.lines = lines;
    if !errors.is_empty() {
        return Err(ErrorList::new(module.filename.clone(), errors));
    }

    propagate_keep_name(&mut refs);
    walk_module(&mut Canonicalize { refs: &refs }, module);
    debug!(scopes = scopes.len(), refs = refs.len(), "resolved bindings");
    module.scopes = scopes;
    module.refs = refs;
    Ok(())
}

/// A merged ref that had to keep its name passes that on to its target.
fn propagate_keep_name(refs: &mut RefTable) {
    let merged: Vec<RefId> = refs
        .iter()
        .filter(|(_, binding)| binding.link.is_some() && binding.keep_name)
        .map(|(id, _)| id)
        .collect();
    for id in merged {
        let target = refs.canonical(id);
        refs.get_mut(target).keep_name = true;
    }
}

fn ref_kind(kind: DeclKind) -> RefKind {
    match kind {
        DeclKind::Var => RefKind::Var,
        DeclKind::Let => RefKind::Let,
        DeclKind::Const => RefKind::Const,
        DeclKind::Function => RefKind::Function,
        DeclKind::Class => RefKind::Class,
        DeclKind::Param => RefKind::Parameter,
        DeclKind::CatchParam => RefKind::CatchParam,
        DeclKind::Import => RefKind::Import,
    }
}

struct Resolver<'l> {
    scopes: ScopeTree,
    refs: RefTable,
    stack: Vec<ScopeId>,
    errors: Vec<ParseError>,
    lines: &'l LineIndex,
    /// Hoisted names of the function body about to open its scope.
    pending: Vec<(String, RefKind)>,
}

impl<'l> Resolver<'l> {
    fn new(lines: &'l LineIndex) -> Self {
        Self {
            scopes: ScopeTree::new(),
            refs: RefTable::new(),
            stack: Vec::new(),
            errors: Vec::new(),
            lines,
            pending: Vec::new(),
        }
    }

    fn current(&self) -> ScopeId {
        *self.stack.last().expect("resolver visited a binding with no open scope")
    }

    /// Nearest visible ref named `name`, starting at `scope`.
    fn lookup(&self, scope: ScopeId, name: &str) -> Option<RefId> {
        self.scopes
            .ancestors(scope)
            .find_map(|ancestor| self.scopes.lookup_local(ancestor, name))
    }

    /// A function binding declared directly in a block is block-scoped.
    fn is_lexical(&self, id: RefId) -> bool {
        let binding = self.refs.get(id);
        binding.kind.is_lexical()
            || (binding.kind == RefKind::Function && self.scopes.get(binding.scope).kind == ScopeKind::Block)
    }

    fn create(&mut self, scope: ScopeId, name: &str, kind: RefKind) -> RefId {
        let id = self.refs.create(name, kind, scope);
        self.scopes.insert(scope, name, id);
        if kind.is_declared() {
            let outer = self.scopes.get(scope).parent.and_then(|parent| self.lookup(parent, name));
            if let Some(outer) = outer {
                self.refs.set_shadow(id, outer);
            }
        }
        id
    }

    fn redeclared(&mut self, ident: &Ident) {
        self.errors.push(ParseError::new(
            format!("Identifier '{}' has already been declared", ident.name),
            ident.span,
            self.lines,
        ));
    }

    /// `var` and function-level function declarations.
    fn declare_hoisted(&mut self, ident: &Ident, kind: RefKind) -> RefId {
        let scope = self.current();
        let boundary = self.scopes.function_boundary(scope);
        let mut found = None;
        for ancestor in self.scopes.ancestors(scope) {
            if let Some(id) = self.scopes.lookup_local(ancestor, &ident.name) {
                found = Some(id);
                break;
            }
            if ancestor == boundary {
                break;
            }
        }

        match found {
            Some(id) if self.refs.get(id).kind == RefKind::Unresolved => {
                self.refs.get_mut(id).kind = kind;
                let outer = self.scopes.get(boundary).parent.and_then(|parent| self.lookup(parent, &ident.name));
                if let Some(outer) = outer {
                    self.refs.set_shadow(id, outer);
                }
                id
            }
            Some(id) if self.refs.get(id).kind == RefKind::CatchParam && kind == RefKind::Var => {
                // The initializer writes the catch parameter, but the name
                // also exists in the function. Both keep their spelling.
                let outer = match self.scopes.lookup_local(boundary, &ident.name) {
                    Some(outer) => outer,
                    None => self.create(boundary, &ident.name, RefKind::Var),
                };
                if self.refs.get(outer).kind == RefKind::Unresolved {
                    self.refs.get_mut(outer).kind = RefKind::Var;
                }
                self.refs.get_mut(outer).keep_name = true;
                self.refs.get_mut(id).keep_name = true;
                id
            }
            Some(id) => {
                if self.is_lexical(id) {
                    self.redeclared(ident);
                } else if kind == RefKind::Function && self.refs.get(id).kind == RefKind::Var {
                    self.refs.get_mut(id).kind = RefKind::Function;
                }
                id
            }
            None => self.create(boundary, &ident.name, kind),
        }
    }

    /// Register the pending hoisted names in a freshly opened function or
    /// module scope, so uses before the declaration bind locally.
    fn predeclare(&mut self, scope: ScopeId) {
        for (name, kind) in mem::take(&mut self.pending) {
            match self.scopes.lookup_local(scope, &name) {
                Some(id) if kind == RefKind::Function && self.refs.get(id).kind == RefKind::Var => {
                    self.refs.get_mut(id).kind = RefKind::Function;
                }
                Some(_) => {}
                None => {
                    self.create(scope, &name, kind);
                }
            }
        }
    }

    /// Block-scoped bindings, parameters and catch parameters.
    fn declare_lexical(&mut self, ident: &Ident, kind: RefKind) -> RefId {
        let scope = self.current();
        match self.scopes.lookup_local(scope, &ident.name) {
            Some(id) if self.refs.get(id).kind == RefKind::Unresolved => {
                self.refs.get_mut(id).kind = kind;
                id
            }
            Some(id) => {
                let existing = self.refs.get(id).kind;
                match kind {
                    RefKind::Parameter | RefKind::CatchParam => {
                        if existing != RefKind::Parameter && existing != RefKind::CatchParam {
                            self.refs.get_mut(id).kind = kind;
                        }
                    }
                    _ => self.redeclared(ident),
                }
                id
            }
            None => self.create(scope, &ident.name, kind),
        }
    }

    /// Merge the still-unresolved names of a closing function scope outward.
    fn close_function(&mut self, scope: ScopeId) {
        let Some(parent) = self.scopes.get(scope).parent else {
            return;
        };
        let pending: Vec<RefId> = self
            .scopes
            .get(scope)
            .order
            .iter()
            .copied()
            .filter(|id| self.refs.get(*id).kind == RefKind::Unresolved)
            .collect();
        for id in pending {
            let name = self.refs.get(id).name.clone();
            self.scopes.remove(scope, &name);
            match self.lookup(parent, &name) {
                Some(target) => {
                    trace!(name = %name, "linked provisional reference");
                    self.refs.link(id, target);
                }
                None => {
                    let boundary = self.scopes.function_boundary(parent);
                    self.scopes.insert(boundary, &name, id);
                    self.refs.get_mut(id).scope = boundary;
                }
            }
        }
    }

    /// Whatever is still unresolved when the module closes is a global.
    fn close_module(&mut self) {
        let pending: Vec<RefId> = self
            .refs
            .iter()
            .filter(|(_, binding)| binding.kind == RefKind::Unresolved && binding.link.is_none())
            .map(|(id, _)| id)
            .collect();
        for id in pending {
            self.refs.get_mut(id).kind = RefKind::Global;
        }
    }

    fn keep_name(&mut self, ident: &Ident) {
        if let Some(id) = ident.ref_id {
            self.refs.get_mut(id).keep_name = true;
        }
    }
}

impl Visitor for Resolver<'_> {
    fn enter_scope(&mut self, kind: ScopeKind) {
        let parent = self.stack.last().copied();
        let id = self.scopes.push(kind, parent);
        self.stack.push(id);
        if kind.is_function_boundary() {
            self.predeclare(id);
        }
    }

    fn enter_function(&mut self, func: &mut Function) {
        self.pending = hoisted_names(&func.body);
    }

    fn enter_arrow(&mut self, arrow: &mut ArrowFunction) {
        self.pending = match &arrow.body {
            ArrowBody::Block(body) => hoisted_names(body),
            ArrowBody::Expr(_) => Vec::new(),
        };
    }

    fn exit_scope(&mut self, kind: ScopeKind) {
        let scope = self.stack.pop().expect("scope stack underflow while resolving");
        match kind {
            ScopeKind::Function => self.close_function(scope),
            ScopeKind::Module => self.close_module(),
            ScopeKind::Block => {}
        }
    }

    fn declare(&mut self, ident: &mut Ident, kind: DeclKind) {
        let hoisted = match kind {
            DeclKind::Var => true,
            DeclKind::Function => self.scopes.get(self.current()).kind.is_function_boundary(),
            _ => false,
        };
        let id = if hoisted {
            self.declare_hoisted(ident, ref_kind(kind))
        } else {
            self.declare_lexical(ident, ref_kind(kind))
        };
        self.refs.get_mut(id).usages += 1;
        ident.ref_id = Some(id);
    }

    fn reference(&mut self, ident: &mut Ident) {
        let scope = self.current();
        let id = match self.lookup(scope, &ident.name) {
            Some(id) => id,
            None => {
                let boundary = self.scopes.function_boundary(scope);
                self.create(boundary, &ident.name, RefKind::Unresolved)
            }
        };
        self.refs.get_mut(id).usages += 1;
        ident.ref_id = Some(id);
    }

    fn jsx_reference(&mut self, ident: &mut Ident) {
        self.reference(ident);
        self.keep_name(ident);
    }

    fn enter_stmt(&mut self, stmt: &mut Stmt) {
        if let StmtKind::With { .. } = stmt.kind {
            let scope = self.current();
            self.scopes.mark_eval(scope);
        }
    }

    fn exit_stmt(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
        let StmtKind::Export(export) = &stmt.kind else {
            return None;
        };
        let mut exported: Vec<&Ident> = Vec::new();
        match export.as_ref() {
            ExportDecl::Named { specifiers, source: None, .. } => {
                exported.extend(specifiers.iter().map(|specifier| &specifier.local));
            }
            ExportDecl::Decl { decl } => declared_names(decl, &mut exported),
            _ => {}
        }
        for ident in exported {
            self.keep_name(ident);
        }
        None
    }

    fn enter_expr(&mut self, expr: &mut Expr) {
        if let ExprKind::Call { callee, .. } = &expr.kind {
            if matches!(&callee.kind, ExprKind::Ident(ident) if ident.name == "eval") {
                let scope = self.current();
                self.scopes.mark_eval(scope);
            }
        }
    }
}

/// Names a function body hoists to its own scope: every `var`, however
/// deeply nested in blocks, and the function declarations at its top level.
fn hoisted_names(body: &[Stmt]) -> Vec<(String, RefKind)> {
    let mut out = Vec::new();
    for stmt in body {
        let stmt = match &stmt.kind {
            StmtKind::Export(export) => match export.as_ref() {
                ExportDecl::Decl { decl } | ExportDecl::DefaultDecl { decl } => decl,
                _ => continue,
            },
            _ => stmt,
        };
        if let StmtKind::Function(func) = &stmt.kind {
            if let Some(name) = &func.name {
                out.push((name.name.clone(), RefKind::Function));
            }
        }
        hoisted_vars(stmt, &mut out);
    }
    out
}

fn bind_vars(pattern: &Pattern, out: &mut Vec<(String, RefKind)>) {
    let mut idents = Vec::new();
    pattern.bound_idents(&mut idents);
    out.extend(idents.into_iter().map(|ident| (ident.name.clone(), RefKind::Var)));
}

fn hoisted_vars(stmt: &Stmt, out: &mut Vec<(String, RefKind)>) {
    match &stmt.kind {
        StmtKind::Var(decl) if decl.kind == VarKind::Var => {
            for declarator in &decl.decls {
                bind_vars(&declarator.pattern, out);
            }
        }
        StmtKind::Block(body) => body.iter().for_each(|stmt| hoisted_vars(stmt, out)),
        StmtKind::If { consequent, alternate, .. } => {
            hoisted_vars(consequent, out);
            if let Some(alternate) = alternate {
                hoisted_vars(alternate, out);
            }
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                case.consequent.iter().for_each(|stmt| hoisted_vars(stmt, out));
            }
        }
        StmtKind::For { init, body, .. } => {
            if let Some(ForInit::Var(decl)) = init {
                if decl.kind == VarKind::Var {
                    for declarator in &decl.decls {
                        bind_vars(&declarator.pattern, out);
                    }
                }
            }
            hoisted_vars(body, out);
        }
        StmtKind::ForIn { left, body, .. } | StmtKind::ForOf { left, body, .. } => {
            if let ForHead::Var { kind: VarKind::Var, pattern } = left {
                bind_vars(pattern, out);
            }
            hoisted_vars(body, out);
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Labeled { body, .. }
        | StmtKind::With { body, .. } => hoisted_vars(body, out),
        StmtKind::Try { block, handler, finalizer } => {
            block.iter().for_each(|stmt| hoisted_vars(stmt, out));
            if let Some(handler) = handler {
                handler.body.iter().for_each(|stmt| hoisted_vars(stmt, out));
            }
            if let Some(finalizer) = finalizer {
                finalizer.iter().for_each(|stmt| hoisted_vars(stmt, out));
            }
        }
        StmtKind::Export(export) => {
            if let ExportDecl::Decl { decl } = export.as_ref() {
                hoisted_vars(decl, out);
            }
        }
        _ => {}
    }
}

/// Names a declaration statement binds in its enclosing scope.
fn declared_names<'s>(stmt: &'s Stmt, out: &mut Vec<&'s Ident>) {
    match &stmt.kind {
        StmtKind::Var(decl) => {
            for declarator in &decl.decls {
                declarator.pattern.bound_idents(out);
            }
        }
        StmtKind::Function(func) => out.extend(func.name.as_ref()),
        StmtKind::Class(class) => out.extend(class.name.as_ref()),
        _ => {}
    }
}

/// Rewrites every identifier to the canonical ref of its binding.
struct Canonicalize<'r> {
    refs: &'r RefTable,
}

impl Canonicalize<'_> {
    fn fix(&self, ident: &mut Ident) {
        if let Some(id) = ident.ref_id {
            ident.ref_id = Some(self.refs.canonical(id));
        }
    }
}

impl Visitor for Canonicalize<'_> {
    fn declare(&mut self, ident: &mut Ident, _kind: DeclKind) {
        self.fix(ident);
    }

    fn reference(&mut self, ident: &mut Ident) {
        self.fix(ident);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;
    use crate::scope::Ref;

    fn resolved(source: &str) -> Module {
        let mut module = parse_module("test.js", source).expect("parse");
        resolve(&mut module).expect("resolve");
        module
    }

    /// Refs of every identifier named `name`, in walk order.
    fn refs_named(module: &mut Module, name: &str) -> Vec<RefId> {
        struct Collect<'n> {
            name: &'n str,
            found: Vec<RefId>,
        }
        impl Visitor for Collect<'_> {
            fn declare(&mut self, ident: &mut Ident, _kind: DeclKind) {
                self.reference(ident);
            }
            fn reference(&mut self, ident: &mut Ident) {
                if ident.name == self.name {
                    self.found.push(ident.ref_id.expect("identifier left unresolved"));
                }
            }
        }
        let mut collect = Collect { name, found: Vec::new() };
        walk_module(&mut collect, module);
        collect.found
    }

    fn binding(module: &Module, id: RefId) -> &Ref {
        module.refs.get(id)
    }

    #[test]
    fn test_var_hoisting_upgrades_earlier_use() {
        let mut module = resolved("x = 1; var x;");
        let ids = refs_named(&mut module, "x");
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
        assert_eq!(binding(&module, ids[0]).kind, RefKind::Var);
        assert_eq!(binding(&module, ids[0]).usages, 2);
    }

    #[test]
    fn test_var_in_block_hoists_to_function() {
        let mut module = resolved("function f() { { var v = 1; } return v; }");
        let ids = refs_named(&mut module, "v");
        assert_eq!(ids[0], ids[1]);
        let scope = binding(&module, ids[0]).scope;
        assert_eq!(module.scopes.get(scope).kind, ScopeKind::Function);
    }

    #[test]
    fn test_use_before_local_var_ignores_outer_binding() {
        let mut module = resolved("var x = 5; function f() { var x = x || 3; return x; }");
        let ids = refs_named(&mut module, "x");
        assert_eq!(ids.len(), 4);
        let (outer, inner) = (ids[0], ids[2]);
        assert_ne!(outer, inner);
        assert_eq!(ids[1], inner, "initializer reads the local x");
        assert_eq!(ids[3], inner);
        assert_eq!(binding(&module, inner).shadows, Some(outer));
    }

    #[test]
    fn test_call_before_local_function_declaration() {
        let mut module = resolved("var g = 1; function f() { var r = g(); function g() { return 2; } return r; }");
        let ids = refs_named(&mut module, "g");
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[1], ids[0]);
        assert_eq!(ids[1], ids[2]);
        assert_eq!(binding(&module, ids[1]).kind, RefKind::Function);
    }

    #[test]
    fn test_var_redeclaring_catch_param_also_binds_function() {
        let mut module = resolved("function f() { try {} catch (e) { var e = 1; } return e; }");
        let ids = refs_named(&mut module, "e");
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[1], ids[0], "initializer assigns the catch parameter");
        assert_eq!(binding(&module, ids[0]).kind, RefKind::CatchParam);

        let trailing = binding(&module, ids[2]);
        assert_ne!(ids[2], ids[0]);
        assert_eq!(trailing.kind, RefKind::Var);
        assert_eq!(module.scopes.get(trailing.scope).kind, ScopeKind::Function);
        assert!(trailing.keep_name && binding(&module, ids[0]).keep_name);
    }

    #[test]
    fn test_block_scoping_and_shadowing() {
        let mut module = resolved("let x = 1; { let x = 2; x; } x;");
        let ids = refs_named(&mut module, "x");
        let (outer, inner) = (ids[0], ids[1]);
        assert_ne!(outer, inner);
        assert_eq!(ids[2], inner);
        assert_eq!(ids[3], outer);
        assert_eq!(binding(&module, inner).shadows, Some(outer));
        assert_eq!(binding(&module, outer).shadowed_by, vec![inner]);
    }

    #[test]
    fn test_forward_reference_from_function() {
        let mut module = resolved("function f() { return y; } var y = 1;");
        let ids = refs_named(&mut module, "y");
        assert_eq!(ids[0], ids[1]);
        assert_eq!(binding(&module, ids[0]).kind, RefKind::Var);
        assert_eq!(binding(&module, ids[0]).scope, module.scopes.root());
    }

    #[test]
    fn test_nested_forward_reference_links_to_outer() {
        let mut module = resolved("var z; function f() { function g() { return z; } }");
        let ids = refs_named(&mut module, "z");
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_initializer_sees_outer_binding() {
        let mut module = resolved("let a = 1; function f() { const a = a; }");
        let ids = refs_named(&mut module, "a");
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[1], ids[0], "initializer resolves to the outer a");
        assert_ne!(ids[2], ids[0]);
    }

    #[test]
    fn test_unbound_names_become_globals() {
        let mut module = resolved("function f() { return console.log(undeclared); }");
        for name in ["console", "undeclared"] {
            let ids = refs_named(&mut module, name);
            assert_eq!(binding(&module, ids[0]).kind, RefKind::Global, "{name}");
        }
    }

    #[test]
    fn test_every_identifier_is_resolved() {
        let mut module = resolved("function f(a) { return function () { return a + b + c; }; } var c;");
        for name in ["a", "b", "c", "f"] {
            for id in refs_named(&mut module, name) {
                assert_ne!(binding(&module, id).kind, RefKind::Unresolved, "{name}");
                assert!(binding(&module, id).link.is_none());
            }
        }
    }

    #[test]
    fn test_lexical_redeclaration_is_an_error() {
        let mut module = parse_module("test.js", "let x = 1;\nconst x = 2;").expect("parse");
        let errors = resolve(&mut module).expect_err("redeclaration");
        assert_eq!(errors.len(), 1);
        let error = errors.first().expect("error");
        assert_eq!(error.message, "Identifier 'x' has already been declared");
        assert_eq!(error.position.line, 2);
    }

    #[test]
    fn test_var_redeclaration_is_allowed() {
        let mut module = resolved("var x; var x; function g(p) { var p; }");
        let ids = refs_named(&mut module, "x");
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_var_over_let_is_an_error() {
        let mut module = parse_module("test.js", "let x; { var x; }").expect("parse");
        assert!(resolve(&mut module).is_err());
    }

    #[test]
    fn test_eval_marks_scope_chain() {
        let module = resolved("function f() { function g() { eval('x'); } } function h() {}");
        let marked = module.scopes.iter().filter(|(_, scope)| scope.has_eval).count();
        assert_eq!(marked, 3, "module, f and g");
    }

    #[test]
    fn test_exports_keep_their_names() {
        let mut module = resolved("const a = 1, b = 2; export { a }; export function c() {}");
        let a = refs_named(&mut module, "a")[0];
        let b = refs_named(&mut module, "b")[0];
        let c = refs_named(&mut module, "c")[0];
        assert!(binding(&module, a).keep_name);
        assert!(!binding(&module, b).keep_name);
        assert!(binding(&module, c).keep_name);
    }

    #[test]
    fn test_transpile_never_mangles() {
        let mut module = parse_module("test.js", "function f(longName) { return longName; }").expect("parse");
        let config = TargetConfig::default().with_minify(true).with_mangle_top_level(true);
        transpile(&mut module, &config).expect("transpile");
        assert!(!module.config.minify);
        assert!(module.refs.iter().all(|(_, binding)| binding.mangled.is_none()));
    }

    #[test]
    fn test_call_to_eval_member_is_not_eval() {
        let module = resolved("obj.eval('x');");
        assert!(module.scopes.iter().all(|(_, scope)| !scope.has_eval));
        let StmtKind::Expr(expr) = &module.body[0].kind else { panic!("expected expression") };
        assert!(matches!(expr.kind, ExprKind::Call { .. }));
    }
}
