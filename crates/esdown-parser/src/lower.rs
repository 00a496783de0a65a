//! Syntax lowering for older targets.
//!
//! Runs after resolution, so every identifier already carries a canonical
//! [`RefId`]. Nodes introduced here are bound on creation: captured `this`
//! and `arguments`, destructuring temporaries and lowered catch parameters
//! become ghost refs registered in the scope that declares them, which keeps
//! the mangler and the generator working off the same tables.
//!
//! What gets rewritten, by the edition that introduced it:
//!
//! | Syntax                              | Below   |
//! |-------------------------------------|---------|
//! | arrows, destructuring declarations, default/rest/destructured params, templates, shorthand members | ES2015 |
//! | `**`, `**=`                         | ES2016  |
//! | object rest in declarations         | ES2018  |
//! | optional catch binding              | ES2019  |
//! | `??`                                | ES2020  |
//!
//! Classes, destructuring assignment expressions, destructuring `for-in`/
//! `for-of` heads and tagged templates are left as written. So are arrows
//! that use `super` or `new.target`, arrows reading `this` inside a class
//! field initializer, and object methods that use `super`. Temporaries of
//! a lowered `let`/`const` are `var`s at the top of the enclosing function.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::ast::*;
use crate::config::{Target, TargetConfig};
use crate::scope::{RefId, RefKind, RefTable, ScopeId, ScopeKind, ScopeTree};
use crate::span::Span;
use crate::walk::{walk_arrow, walk_function, walk_module, Visitor};

/// Rewrite everything in `module` that `config.target` cannot express.
///
/// The module must be resolved.
pub fn lower_module(module: &mut Module, config: &TargetConfig) {
    if !config.lowers(Target::ES2020) {
        return;
    }

    let mut lowerer = Lowerer::new(
        std::mem::take(&mut module.scopes),
        std::mem::take(&mut module.refs),
        std::mem::take(&mut module.helpers),
        *config,
    );
    walk_module(&mut lowerer, module);

    let frame = lowerer.frames.pop().expect("module frame outlives the walk");
    let prologue = lowerer.frame_prologue(&frame, Span::default());
    let at = module
        .body
        .iter()
        .take_while(|stmt| is_directive(stmt) || matches!(stmt.kind, StmtKind::Import(_)))
        .count();
    module.body.splice(at..at, prologue);

    debug!(rewrites = lowerer.rewrites, helpers = lowerer.helpers.len(), "lowered syntax");
    module.scopes = lowerer.scopes;
    module.refs = lowerer.refs;
    module.helpers = lowerer.helpers;
}

/// A function, arrow, class field initializer or the module body, as seen
/// from inside.
struct Frame {
    is_arrow: bool,
    /// A class field initializer: owns `this` but has no body for a prologue.
    is_field: bool,
    /// An arrow that stays an arrow.
    keep: bool,
    scope: ScopeId,
    this_ref: Option<RefId>,
    arguments_ref: Option<RefId>,
    /// Temporaries declared with a bare `var` at the top of the body.
    temps: Vec<RefId>,
}

impl Frame {
    fn new(is_arrow: bool, scope: ScopeId) -> Self {
        Self { is_arrow, is_field: false, keep: false, scope, this_ref: None, arguments_ref: None, temps: Vec::new() }
    }
}

struct Lowerer {
    scopes: ScopeTree,
    refs: RefTable,
    helpers: BTreeSet<Helper>,
    config: TargetConfig,
    /// Scope ids in creation order; the walk opens them in the same order.
    scope_ids: Vec<ScopeId>,
    next_scope: usize,
    scope_stack: Vec<ScopeId>,
    frames: Vec<Frame>,
    /// The arrow walked last stays an arrow.
    last_arrow_kept: bool,
    /// Every name bound anywhere in the module, ghosts included.
    taken: FxHashSet<String>,
    rewrites: usize,
}

impl Lowerer {
    fn new(scopes: ScopeTree, refs: RefTable, helpers: BTreeSet<Helper>, config: TargetConfig) -> Self {
        let scope_ids = scopes.iter().map(|(id, _)| id).collect();
        let taken = refs.iter().map(|(_, binding)| binding.name.clone()).collect();
        Self {
            scopes,
            refs,
            helpers,
            config,
            scope_ids,
            next_scope: 0,
            scope_stack: Vec::new(),
            frames: Vec::new(),
            last_arrow_kept: false,
            taken,
            rewrites: 0,
        }
    }

    fn lowers(&self, edition: Target) -> bool {
        self.config.lowers(edition)
    }

    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().expect("lowering walks inside the module scope")
    }

    /// Inside an arrow that is being rewritten to a `function`.
    fn in_arrow(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.is_arrow && !frame.keep)
    }

    /// Index of the innermost non-arrow frame, which owns `this`.
    fn ordinary_frame(&self) -> usize {
        self.frames.iter().rposition(|frame| !frame.is_arrow).expect("the module frame is never an arrow")
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn fresh_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }

    /// A compiler-introduced binding declared in `scope`.
    fn ghost(&mut self, base: &str, kind: RefKind, scope: ScopeId) -> RefId {
        let name = self.fresh_name(base);
        let id = self.refs.create(&name, kind, scope);
        self.refs.get_mut(id).ghost = true;
        self.scopes.insert(scope, &name, id);
        trace!(name = %name, ?kind, "created ghost binding");
        id
    }

    fn ident_for(&mut self, id: RefId, span: Span) -> Ident {
        let binding = self.refs.get_mut(id);
        binding.usages += 1;
        Ident::resolved(binding.name.clone(), span, id)
    }

    /// A reference to a global such as `Math` or `arguments`.
    fn global_ident(&mut self, name: &str, span: Span) -> Ident {
        let root = self.scopes.root();
        let id = match self.scopes.lookup_local(root, name) {
            Some(id) => id,
            None => {
                let id = self.refs.create(name, RefKind::Global, root);
                self.scopes.insert(root, name, id);
                id
            }
        };
        self.ident_for(id, span)
    }

    /// A `var` temporary hoisted to the enclosing ordinary function. Class
    /// field initializers pass theirs outward.
    fn hoisted_temp(&mut self, base: &str, span: Span) -> Ident {
        let index = self
            .frames
            .iter()
            .rposition(|frame| !frame.is_arrow && !frame.is_field)
            .expect("the module frame is never an arrow");
        let scope = self.frames[index].scope;
        let id = self.ghost(base, RefKind::Var, scope);
        self.frames[index].temps.push(id);
        self.ident_for(id, span)
    }

    fn captured_this(&mut self, span: Span) -> Expr {
        let index = self.ordinary_frame();
        let id = match self.frames[index].this_ref {
            Some(id) => id,
            None => {
                let id = self.ghost("_this", RefKind::Var, self.frames[index].scope);
                self.frames[index].this_ref = Some(id);
                id
            }
        };
        Expr::ident(self.ident_for(id, span))
    }

    /// `var _this = this, _arguments = arguments, _a;` for a closing frame.
    fn frame_prologue(&mut self, frame: &Frame, span: Span) -> Vec<Stmt> {
        let mut decls = Vec::new();
        if let Some(id) = frame.this_ref {
            let ident = self.ident_for(id, span);
            decls.push(declarator(Pattern::ident(ident), Some(Expr::new(ExprKind::This, span)), span));
        }
        if let Some(id) = frame.arguments_ref {
            let ident = self.ident_for(id, span);
            let arguments = Expr::ident(self.global_ident("arguments", span));
            decls.push(declarator(Pattern::ident(ident), Some(arguments), span));
        }
        for &id in &frame.temps {
            let ident = self.ident_for(id, span);
            decls.push(declarator(Pattern::ident(ident), None, span));
        }
        if decls.is_empty() {
            return Vec::new();
        }
        vec![var_stmt(VarKind::Var, decls, span)]
    }

    fn helper_call(&mut self, helper: Helper, args: Vec<Expr>, span: Span) -> Expr {
        self.helpers.insert(helper);
        Expr::call(Expr::new(ExprKind::Helper(helper), span), args, span)
    }

    // =========================================================================
    // Destructuring
    // =========================================================================

    /// Append declarators binding `pattern` to the value of `source`.
    fn lower_pattern(&mut self, pattern: Pattern, source: Expr, kind: VarKind, out: &mut Vec<VarDeclarator>) {
        let span = pattern.span;
        match pattern.kind {
            PatternKind::Array { elements, rest } => {
                let source = self.reusable(source, kind, out);
                let len = elements.len();
                for (index, element) in elements.into_iter().enumerate() {
                    let Some(element) = element else {
                        continue;
                    };
                    let value = Expr::index(source.clone(), Expr::number(index as f64, span), span);
                    let value = self.defaulted(value, element.default, kind, out);
                    self.lower_pattern(element.pattern, value, kind, out);
                }
                if let Some(rest) = rest {
                    let args = vec![source, Expr::number(len as f64, span)];
                    let value = self.helper_call(Helper::SlicedArrayRest, args, span);
                    self.lower_pattern(*rest, value, kind, out);
                }
            }
            PatternKind::Object { properties, rest, bound_keys } => {
                let source = self.reusable(source, kind, out);
                let mut excluded: Vec<Option<Expr>> =
                    bound_keys.into_iter().map(|key| Some(Expr::string(key, span))).collect();
                for prop in properties {
                    let object = source.clone();
                    let value = match prop.key {
                        PropertyKey::Ident(name) => Expr::member(object, name, span),
                        PropertyKey::String(name) => Expr::index(object, Expr::string(name, span), span),
                        PropertyKey::Number(n) => Expr::index(object, Expr::number(n, span), span),
                        // The rest needs the key again, so it is evaluated once.
                        PropertyKey::Computed(key) if rest.is_some() => {
                            let key = self.temp("_key", *key, kind, out);
                            excluded.push(Some(key.clone()));
                            Expr::index(object, key, span)
                        }
                        PropertyKey::Computed(key) => Expr::index(object, *key, span),
                        PropertyKey::Private(name) => Expr::new(
                            ExprKind::Member { object: Box::new(object), property: MemberProp::Private(name), optional: false },
                            span,
                        ),
                    };
                    let value = self.defaulted(value, prop.default, kind, out);
                    self.lower_pattern(prop.value, value, kind, out);
                }
                if let Some(rest) = rest {
                    let args = vec![source, Expr::new(ExprKind::Array(excluded), span)];
                    let value = self.helper_call(Helper::ObjectRest, args, span);
                    self.lower_pattern(*rest, value, kind, out);
                }
            }
            other => out.push(declarator(Pattern::new(other, span), Some(source), span)),
        }
    }

    /// `source` itself when reading it twice is safe, else a fresh temp
    /// initialized to it.
    fn reusable(&mut self, source: Expr, kind: VarKind, out: &mut Vec<VarDeclarator>) -> Expr {
        if let ExprKind::Ident(ident) = &source.kind {
            if ident.ref_id.is_some_and(|id| self.refs.get(id).kind.is_declared()) {
                return source;
            }
        }
        self.temp("_ref", source, kind, out)
    }

    /// A declarator binding a fresh temp to `value`. Below ES2015 the temp
    /// is a `var` whatever the declaration's kind; see [`Self::hoist_temps`].
    fn temp(&mut self, base: &str, value: Expr, kind: VarKind, out: &mut Vec<VarDeclarator>) -> Expr {
        let span = value.span;
        let kind = if self.lowers(Target::ES2015) { VarKind::Var } else { kind };
        let scope = self.frames.last().map_or_else(|| self.scopes.root(), |frame| frame.scope);
        let id = self.ghost(base, ref_kind(kind), scope);
        let temp = self.ident_for(id, span);
        out.push(declarator(Pattern::ident(temp.clone()), Some(value), span));
        Expr::ident(temp)
    }

    /// `value`, or with a default, `_ref === void 0 ? default : _ref` with
    /// `value` read once into `_ref`.
    fn defaulted(&mut self, value: Expr, default: Option<Expr>, kind: VarKind, out: &mut Vec<VarDeclarator>) -> Expr {
        match default {
            Some(default) => {
                let value = self.temp("_ref", value, kind, out);
                with_default(value, Some(default))
            }
            None => value,
        }
    }

    fn lower_var_decl(&mut self, decl: &mut VarDecl) {
        let needs = decl.decls.iter().any(|declarator| {
            (self.lowers(Target::ES2015) && declarator.pattern.is_destructuring())
                || (self.lowers(Target::ES2018) && has_object_rest(&declarator.pattern))
        });
        if !needs {
            return;
        }

        let mut out = Vec::with_capacity(decl.decls.len());
        for declarator in std::mem::take(&mut decl.decls) {
            match declarator.init {
                Some(init) if declarator.pattern.is_destructuring() => {
                    self.lower_pattern(declarator.pattern, init, decl.kind, &mut out);
                }
                init => out.push(VarDeclarator { init, ..declarator }),
            }
        }
        if decl.kind != VarKind::Var && self.lowers(Target::ES2015) {
            out = self.hoist_temps(out);
        }
        trace!(declarators = out.len(), "lowered destructuring declaration");
        self.rewrites += 1;
        decl.decls = out;
    }

    /// Move the temps of a lowered `let`/`const` into a `var` at the top of
    /// the enclosing frame and assign them inside the next initializer:
    /// `const a = (_ref = get(), _ref.a)`.
    fn hoist_temps(&mut self, decls: Vec<VarDeclarator>) -> Vec<VarDeclarator> {
        let mut out = Vec::with_capacity(decls.len());
        let mut pending: Vec<(RefId, VarDeclarator)> = Vec::new();
        for declarator in decls {
            let temp = declarator
                .pattern
                .as_ident()
                .and_then(|ident| ident.ref_id)
                .filter(|id| self.refs.get(*id).ghost && self.refs.get(*id).kind == RefKind::Var);
            match temp {
                Some(id) if declarator.init.is_some() => pending.push((id, declarator)),
                _ => {
                    let init = declarator.init.map(|init| self.flush_temps(&mut pending, init));
                    out.push(VarDeclarator { init, ..declarator });
                }
            }
        }
        // A pattern that binds nothing leaves its source temp last. It stays
        // a declarator so the source is still evaluated.
        if let Some((_, last)) = pending.pop() {
            let init = last.init.map(|init| self.flush_temps(&mut pending, init));
            out.push(VarDeclarator { init, ..last });
        }
        out
    }

    /// `(_ref = a, _ref2 = b, init)`, registering the temps with the frame.
    fn flush_temps(&mut self, pending: &mut Vec<(RefId, VarDeclarator)>, init: Expr) -> Expr {
        if pending.is_empty() {
            return init;
        }
        let span = init.span;
        let mut exprs = Vec::with_capacity(pending.len() + 1);
        for (id, temp) in pending.drain(..) {
            if let Some(frame) = self.frames.last_mut() {
                frame.temps.push(id);
            }
            if let Some(value) = temp.init {
                exprs.push(assign_expr(temp.pattern, value, temp.span));
            }
        }
        exprs.push(init);
        Expr::new(ExprKind::Sequence(exprs), span)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Replace default, rest and destructured parameters with plain ones,
    /// returning the statements that restore their bindings.
    fn lower_params(&mut self, params: &mut Vec<Param>) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        let mut kept = Vec::with_capacity(params.len());

        for (index, param) in std::mem::take(params).into_iter().enumerate() {
            let Param { pattern, default, rest, span } = param;
            if rest {
                let arguments = Expr::ident(self.global_ident("arguments", span));
                let args = vec![arguments, Expr::number(index as f64, span)];
                let value = self.helper_call(Helper::SlicedArrayRest, args, span);
                let mut decls = Vec::new();
                self.lower_pattern(pattern, value, VarKind::Var, &mut decls);
                stmts.push(var_stmt(VarKind::Var, decls, span));
                break;
            }

            if pattern.is_destructuring() {
                let scope = self.current_scope();
                let id = self.ghost("_ref", RefKind::Parameter, scope);
                let temp = self.ident_for(id, span);
                kept.push(Param::simple(temp.clone()));
                let source = with_default(Expr::ident(temp), default);
                let mut decls = Vec::new();
                self.lower_pattern(pattern, source, VarKind::Var, &mut decls);
                stmts.push(var_stmt(VarKind::Var, decls, span));
                continue;
            }

            match (pattern.as_ident().cloned(), default) {
                (Some(ident), Some(default)) => {
                    let test = Expr::binary(BinaryOp::StrictEq, Expr::ident(ident.clone()), Expr::undefined(span), span);
                    let assign = assign_expr(Pattern::ident(ident), default, span);
                    stmts.push(Stmt::new(
                        StmtKind::If { test, consequent: Box::new(Stmt::expr(assign)), alternate: None },
                        span,
                    ));
                    kept.push(Param { pattern, default: None, rest: false, span });
                }
                (_, default) => kept.push(Param { pattern, default, rest: false, span }),
            }
        }

        *params = kept;
        stmts
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn arrow_to_function(&mut self, arrow: ArrowFunction, span: Span) -> Expr {
        let body = match arrow.body {
            ArrowBody::Expr(expr) => vec![return_stmt(*expr)],
            ArrowBody::Block(body) => body,
        };
        let mut func = Function::new(arrow.params, body, arrow.span);
        func.is_async = arrow.is_async;
        func.return_type = arrow.return_type;
        trace!(start = span.start, "lowered arrow function");
        self.rewrites += 1;
        Expr::new(ExprKind::Function(Box::new(func)), span)
    }

    /// `Math.pow(left, right)`
    fn math_pow(&mut self, left: Expr, right: Expr, span: Span) -> Expr {
        let math = Expr::ident(self.global_ident("Math", span));
        self.rewrites += 1;
        Expr::call(Expr::member(math, "pow", span), vec![left, right], span)
    }

    /// `left != null ? left : right`, through a temp unless `left` is a
    /// plain identifier.
    fn nullish(&mut self, left: Expr, right: Expr, span: Span) -> Expr {
        let (test_operand, value) = if left.is_identifier() {
            (left.clone(), left)
        } else {
            let temp = self.hoisted_temp("_a", span);
            (assign_expr(Pattern::ident(temp.clone()), left, span), Expr::ident(temp))
        };
        let test = Expr::binary(BinaryOp::NotEq, test_operand, Expr::new(ExprKind::Null, span), span);
        self.rewrites += 1;
        Expr::conditional(test, value, right, span)
    }

    /// `"a" + b + "c"`
    fn concat_template(&mut self, template: Template, span: Span) -> Expr {
        let mut quasis = template.quasis.into_iter();
        let head = quasis.next().map(|chunk| chunk.cooked).unwrap_or_default();
        let mut result = Expr::string(head, span);
        for (expr, chunk) in template.exprs.into_iter().zip(quasis) {
            result = Expr::binary(BinaryOp::Add, result, expr, span);
            if !chunk.cooked.is_empty() {
                result = Expr::binary(BinaryOp::Add, result, Expr::string(chunk.cooked, span), span);
            }
        }
        self.rewrites += 1;
        result
    }
}

impl Visitor for Lowerer {
    fn enter_scope(&mut self, kind: ScopeKind) {
        let id = self.scope_ids[self.next_scope];
        self.next_scope += 1;
        self.scope_stack.push(id);
        match kind {
            ScopeKind::Module => self.frames.push(Frame::new(false, id)),
            ScopeKind::Function => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.scope = id;
                }
            }
            ScopeKind::Block => {}
        }
    }

    fn exit_scope(&mut self, _kind: ScopeKind) {
        self.scope_stack.pop();
    }

    fn enter_function(&mut self, _func: &mut Function) {
        let scope = self.current_scope();
        self.frames.push(Frame::new(false, scope));
    }

    fn exit_function(&mut self, func: &mut Function) {
        let params = if self.lowers(Target::ES2015) && needs_param_lowering(&func.params) {
            self.lower_params(&mut func.params)
        } else {
            Vec::new()
        };
        let frame = self.frames.pop().expect("function frame pushed on entry");
        let mut prologue = self.frame_prologue(&frame, func.span);
        prologue.extend(params);
        insert_prologue(&mut func.body, prologue);
    }

    fn enter_arrow(&mut self, arrow: &mut ArrowFunction) {
        let scope = self.current_scope();
        let mut frame = Frame::new(true, scope);
        if self.lowers(Target::ES2015) {
            let uses = ContextUses::of_arrow(arrow);
            let in_field = self.frames[self.ordinary_frame()].is_field;
            frame.keep = uses.uses_super || uses.uses_new_target || (uses.uses_this && in_field);
            if frame.keep {
                trace!(start = arrow.span.start, "arrow kept for its lexical context");
            }
        }
        self.frames.push(frame);
    }

    fn exit_arrow(&mut self, arrow: &mut ArrowFunction) {
        let keep = self.frames.last().is_some_and(|frame| frame.keep);
        if !keep && self.lowers(Target::ES2015) && needs_param_lowering(&arrow.params) {
            let body = std::mem::replace(&mut arrow.body, ArrowBody::Block(Vec::new()));
            let mut body = match body {
                ArrowBody::Expr(expr) => vec![return_stmt(*expr)],
                ArrowBody::Block(body) => body,
            };
            let prologue = self.lower_params(&mut arrow.params);
            insert_prologue(&mut body, prologue);
            arrow.body = ArrowBody::Block(body);
        }
        let frame = self.frames.pop().expect("arrow frame pushed on entry");
        if let ArrowBody::Block(body) = &mut arrow.body {
            let prologue = self.frame_prologue(&frame, arrow.span);
            insert_prologue(body, prologue);
        }
        self.last_arrow_kept = keep;
    }

    fn enter_field_init(&mut self, _value: &mut Expr) {
        let scope = self.current_scope();
        let mut frame = Frame::new(false, scope);
        frame.is_field = true;
        self.frames.push(frame);
    }

    fn exit_field_init(&mut self, _value: &mut Expr) {
        self.frames.pop();
    }

    fn reference(&mut self, ident: &mut Ident) {
        if ident.name != "arguments" || !self.lowers(Target::ES2015) || !self.in_arrow() {
            return;
        }
        let Some(id) = ident.ref_id else {
            return;
        };
        let index = self.ordinary_frame();
        if self.refs.get(id).kind != RefKind::Global || index == 0 || self.frames[index].is_field {
            return;
        }
        let captured = match self.frames[index].arguments_ref {
            Some(captured) => captured,
            None => {
                let captured = self.ghost("_arguments", RefKind::Var, self.frames[index].scope);
                self.frames[index].arguments_ref = Some(captured);
                captured
            }
        };
        *ident = self.ident_for(captured, ident.span);
        self.rewrites += 1;
    }

    fn exit_stmt(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
        match &mut stmt.kind {
            StmtKind::Var(decl) => self.lower_var_decl(decl),
            StmtKind::Try { handler: Some(handler), .. } if handler.param.is_none() && self.lowers(Target::ES2019) => {
                let scope = self.current_scope();
                let id = self.ghost("_unused", RefKind::CatchParam, scope);
                handler.param = Some(Pattern::ident(self.ident_for(id, handler.span)));
                self.rewrites += 1;
            }
            _ => {}
        }
        None
    }

    fn exit_expr(&mut self, expr: &mut Expr) -> Option<Expr> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::This if self.lowers(Target::ES2015) && self.in_arrow() => Some(self.captured_this(span)),
            ExprKind::Arrow(_) if self.lowers(Target::ES2015) && !self.last_arrow_kept => {
                let ExprKind::Arrow(arrow) = take(expr).kind else {
                    return None;
                };
                Some(self.arrow_to_function(*arrow, span))
            }
            ExprKind::Binary { op: BinaryOp::Pow, left, right } if self.lowers(Target::ES2016) => {
                let (left, right) = (take(left), take(right));
                Some(self.math_pow(left, right, span))
            }
            ExprKind::Assign { op: AssignOp::PowAssign, left, right } if self.lowers(Target::ES2016) => {
                let target = match &left.kind {
                    PatternKind::Ident(ident) => Expr::ident(ident.clone()),
                    PatternKind::Expr(target) if is_simple_member(target) => (**target).clone(),
                    _ => return None,
                };
                let value = self.math_pow(target, take(right), span);
                let left = std::mem::replace(&mut **left, Pattern::new(PatternKind::Expr(Box::new(null(span))), span));
                Some(assign_expr(left, value, span))
            }
            ExprKind::Binary { op: BinaryOp::NullishCoalesce, left, right } if self.lowers(Target::ES2020) => {
                let (left, right) = (take(left), take(right));
                Some(self.nullish(left, right, span))
            }
            ExprKind::Template(_) if self.lowers(Target::ES2015) => {
                let ExprKind::Template(template) = take(expr).kind else {
                    return None;
                };
                Some(self.concat_template(*template, span))
            }
            ExprKind::Object(members) if self.lowers(Target::ES2015) => {
                for member in members {
                    if let ObjectMember::Property(prop) = member {
                        // `super` only works inside method syntax.
                        let method = prop.kind == PropertyKind::Method
                            && !match &mut prop.value.kind {
                                ExprKind::Function(func) => ContextUses::of_function(func).uses_super,
                                _ => false,
                            };
                        if prop.shorthand || method {
                            prop.shorthand = false;
                            if method {
                                prop.kind = PropertyKind::Init;
                            }
                            self.rewrites += 1;
                        }
                    }
                }
                None
            }
            _ => None,
        }
    }
}

/// What a function body takes from its surrounding context. Nested
/// functions and class field initializers are not looked into; nested
/// arrows are.
#[derive(Debug, Default)]
struct ContextUses {
    depth: usize,
    /// Depth of the body being examined.
    top: usize,
    /// `this` or `arguments`.
    uses_this: bool,
    uses_super: bool,
    uses_new_target: bool,
}

impl ContextUses {
    fn of_arrow(arrow: &mut ArrowFunction) -> Self {
        let mut uses = Self::default();
        walk_arrow(&mut uses, arrow);
        uses
    }

    fn of_function(func: &mut Function) -> Self {
        // The walk enters `func` itself first.
        let mut uses = Self { top: 1, ..Self::default() };
        walk_function(&mut uses, func, false);
        uses
    }

    fn at_top(&self) -> bool {
        self.depth == self.top
    }
}

impl Visitor for ContextUses {
    fn enter_function(&mut self, _func: &mut Function) {
        self.depth += 1;
    }

    fn exit_function(&mut self, _func: &mut Function) {
        self.depth -= 1;
    }

    fn enter_field_init(&mut self, _value: &mut Expr) {
        self.depth += 1;
    }

    fn exit_field_init(&mut self, _value: &mut Expr) {
        self.depth -= 1;
    }

    fn reference(&mut self, ident: &mut Ident) {
        if self.at_top() && ident.name == "arguments" {
            self.uses_this = true;
        }
    }

    fn enter_expr(&mut self, expr: &mut Expr) {
        if !self.at_top() {
            return;
        }
        match &expr.kind {
            ExprKind::This => self.uses_this = true,
            ExprKind::Super => self.uses_super = true,
            ExprKind::MetaProperty { meta, .. } if meta == "new" => self.uses_new_target = true,
            _ => {}
        }
    }
}

// =============================================================================
// Node builders
// =============================================================================

fn null(span: Span) -> Expr {
    Expr::new(ExprKind::Null, span)
}

/// Move an expression out, leaving `null` behind.
fn take(expr: &mut Expr) -> Expr {
    let span = expr.span;
    std::mem::replace(expr, null(span))
}

fn declarator(pattern: Pattern, init: Option<Expr>, span: Span) -> VarDeclarator {
    VarDeclarator { pattern, init, span }
}

fn var_stmt(kind: VarKind, decls: Vec<VarDeclarator>, span: Span) -> Stmt {
    Stmt::new(StmtKind::Var(VarDecl { kind, decls }), span)
}

fn return_stmt(expr: Expr) -> Stmt {
    let span = expr.span;
    Stmt::new(StmtKind::Return { arg: Some(expr) }, span)
}

fn assign_expr(left: Pattern, right: Expr, span: Span) -> Expr {
    Expr::new(ExprKind::Assign { op: AssignOp::Assign, left: Box::new(left), right: Box::new(right) }, span)
}

/// `value === void 0 ? default : value`
fn with_default(value: Expr, default: Option<Expr>) -> Expr {
    match default {
        Some(default) => {
            let span = value.span;
            let test = Expr::binary(BinaryOp::StrictEq, value.clone(), Expr::undefined(span), span);
            Expr::conditional(test, default, value, span)
        }
        None => value,
    }
}

fn ref_kind(kind: VarKind) -> RefKind {
    match kind {
        VarKind::Var => RefKind::Var,
        VarKind::Let => RefKind::Let,
        VarKind::Const => RefKind::Const,
    }
}

fn needs_param_lowering(params: &[Param]) -> bool {
    params.iter().any(|param| param.rest || param.default.is_some() || param.pattern.is_destructuring())
}

fn has_object_rest(pattern: &Pattern) -> bool {
    match &pattern.kind {
        PatternKind::Object { rest: Some(_), .. } => true,
        PatternKind::Object { properties, .. } => properties.iter().any(|prop| has_object_rest(&prop.value)),
        PatternKind::Array { elements, rest } => {
            elements.iter().flatten().any(|element| has_object_rest(&element.pattern))
                || rest.as_deref().is_some_and(has_object_rest)
        }
        PatternKind::Ident(_) | PatternKind::Expr(_) => false,
    }
}

/// `a.b`, whose object can be read twice.
fn is_simple_member(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Member { object, property: MemberProp::Ident(_), optional: false } if object.is_identifier())
}

fn is_directive(stmt: &Stmt) -> bool {
    matches!(&stmt.kind, StmtKind::Expr(Expr { kind: ExprKind::String(_), .. }))
}

/// Insert after any directive prologue (`"use strict"`).
fn insert_prologue(body: &mut Vec<Stmt>, prologue: Vec<Stmt>) {
    if prologue.is_empty() {
        return;
    }
    let at = body.iter().take_while(|stmt| is_directive(stmt)).count();
    body.splice(at..at, prologue);
}

#[cfg(test)]
mod tests {
    use crate::codegen::{Codegen, CodegenOptions};
    use crate::config::{Target, TargetConfig};
    use crate::{optimize, parse_module};

    fn lower(source: &str, target: Target) -> String {
        let mut module = parse_module("test.js", source).expect("parse");
        optimize(&mut module, &TargetConfig::new(target)).expect("optimize");
        Codegen::new(&module, CodegenOptions::default()).generate()
    }

    #[test]
    fn test_arrow_captures_this() {
        let out = lower("function f() { return () => this.x; }", Target::ES5);
        assert!(out.contains("var _this = this;"), "{out}");
        assert!(out.contains("return function() {"), "{out}");
        assert!(out.contains("return _this.x;"), "{out}");
        assert!(!out.contains("=>"), "{out}");
    }

    #[test]
    fn test_arrow_without_this_needs_no_temp() {
        let out = lower("let g = () => 1;", Target::ES5);
        assert!(out.contains("let g = function() {"), "{out}");
        assert!(out.contains("return 1;"), "{out}");
        assert!(!out.contains("_this"), "{out}");
    }

    #[test]
    fn test_nested_function_keeps_own_this() {
        let out = lower("let g = () => function () { return this; };", Target::ES5);
        assert!(!out.contains("_this"), "{out}");
    }

    #[test]
    fn test_arrow_captures_arguments() {
        let out = lower("function f() { return () => arguments[0]; }", Target::ES5);
        assert!(out.contains("var _arguments = arguments;"), "{out}");
        assert!(out.contains("return _arguments[0];"), "{out}");
    }

    #[test]
    fn test_ghost_names_avoid_existing_bindings() {
        let out = lower("var _this = 1; function f() { return () => this; }", Target::ES5);
        assert!(out.contains("var _this2 = this;"), "{out}");
        assert!(out.contains("return _this2;"), "{out}");
    }

    #[test]
    fn test_class_field_arrow_keeps_instance_this() {
        let out = lower("class A { y = 7; x = () => this.y; }", Target::ES5);
        assert!(out.contains("x = () => this.y;"), "{out}");
        assert!(!out.contains("_this"), "{out}");

        let out = lower("class C { f = () => 1; }", Target::ES5);
        assert!(out.contains("f = function() {"), "{out}");
    }

    #[test]
    fn test_class_field_temps_go_to_enclosing_frame() {
        let out = lower("class D { v = a() ?? 1; }", Target::ES2019);
        assert!(out.starts_with("var _a;"), "{out}");
        assert!(out.contains("v = (_a = a()) != null ? _a : 1;"), "{out}");
    }

    #[test]
    fn test_super_and_new_target_keep_arrows() {
        let out = lower("class B extends A { m() { return () => super.m(); } }", Target::ES5);
        assert!(out.contains("return () => super.m();"), "{out}");

        let out = lower("function F() { return () => new.target; }", Target::ES5);
        assert!(out.contains("return () => new.target;"), "{out}");
    }

    #[test]
    fn test_object_method_with_super_stays_a_method() {
        let out = lower("let o = { m() { return super.m(); }, n() { return 1; } };", Target::ES5);
        assert!(out.contains("m() {"), "{out}");
        assert!(out.contains("n: function() {"), "{out}");
    }

    #[test]
    fn test_arrows_kept_for_es2015() {
        let out = lower("let g = () => this;", Target::ES2015);
        assert!(out.contains("() => this"), "{out}");
    }

    #[test]
    fn test_object_rest_declaration() {
        let out = lower("let obj = {}; const {a, ...rest} = obj;", Target::ES2017);
        assert!(out.contains("const a = obj.a, rest = __objectRest(obj, [\"a\"]);"), "{out}");
        assert!(out.starts_with("var __objectRest = function"), "{out}");
    }

    #[test]
    fn test_object_rest_kept_for_es2018() {
        let out = lower("let obj = {}; const {a, ...rest} = obj;", Target::ES2018);
        assert!(out.contains("const {a, ...rest} = obj;"), "{out}");
        assert!(!out.contains("__objectRest"), "{out}");
    }

    #[test]
    fn test_array_destructuring() {
        let out = lower("let list = []; var [x, , y = 2, ...z] = list;", Target::ES5);
        assert!(out.contains("x = list[0]"), "{out}");
        assert!(out.contains("_ref = list[2], y = _ref === void 0 ? 2 : _ref"), "{out}");
        assert!(out.contains("z = __slicedArrayRest(list, 3)"), "{out}");
    }

    #[test]
    fn test_nested_destructuring_uses_temps() {
        let out = lower("var {a: {b}} = get();", Target::ES5);
        assert!(out.contains("var _ref = get(), _ref2 = _ref.a, b = _ref2.b;"), "{out}");
    }

    #[test]
    fn test_lexical_destructuring_hoists_temps_to_var() {
        let out = lower("function f() { const {a: {b}, c = 1} = get(); return b + c; }", Target::ES5);
        assert!(out.contains("var _ref, _ref2, _ref3;"), "{out}");
        assert!(out.contains("const b = (_ref = get(), _ref2 = _ref.a, _ref2.b), c = (_ref3 = _ref.c, _ref3 === void 0 ? 1 : _ref3);"), "{out}");

        let kept = lower("let o = {}; const {a: {b}} = o;", Target::ES2015);
        assert!(kept.contains("const {a: {b}} = o;"), "{kept}");
    }

    #[test]
    fn test_lexical_destructuring_in_arrow_declares_temps_there() {
        let out = lower("let g = () => { let [x] = h(); return x; };", Target::ES5);
        assert!(out.contains("let g = function() {\n  var _ref;\n  let x = (_ref = h(), _ref[0]);"), "{out}");
    }

    #[test]
    fn test_empty_pattern_still_evaluates_source() {
        let out = lower("const {} = get();", Target::ES5);
        assert!(out.contains("const _ref = get();"), "{out}");
    }

    #[test]
    fn test_parameters() {
        let out = lower("function f(a = 1, {b}, ...c) { return a + b + c.length; }", Target::ES5);
        assert!(out.contains("function f(a, _ref) {"), "{out}");
        assert!(out.contains("if (a === void 0) a = 1;"), "{out}");
        assert!(out.contains("var b = _ref.b;"), "{out}");
        assert!(out.contains("var c = __slicedArrayRest(arguments, 2);"), "{out}");
    }

    #[test]
    fn test_exponent() {
        let out = lower("let x = 2; x ** 3; x **= 2;", Target::ES2015);
        assert!(out.contains("Math.pow(x, 3);"), "{out}");
        assert!(out.contains("x = Math.pow(x, 2);"), "{out}");
        let kept = lower("let x = 2; x ** 3;", Target::ES2016);
        assert!(kept.contains("x ** 3;"), "{kept}");
    }

    #[test]
    fn test_template_concatenation() {
        let out = lower("let b = 1; let s = `a${b}c${b + 1}`;", Target::ES5);
        assert!(out.contains("let s = \"a\" + b + \"c\" + (b + 1);"), "{out}");
    }

    #[test]
    fn test_nullish() {
        let out = lower("let a; a ?? 1; f() ?? 2;", Target::ES2019);
        assert!(out.contains("a != null ? a : 1;"), "{out}");
        assert!(out.contains("var _a;"), "{out}");
        assert!(out.contains("(_a = f()) != null ? _a : 2;"), "{out}");
    }

    #[test]
    fn test_optional_catch_binding() {
        let out = lower("try { f(); } catch { g(); }", Target::ES2018);
        assert!(out.contains("catch (_unused) {"), "{out}");
        let kept = lower("try { f(); } catch { g(); }", Target::ES2019);
        assert!(kept.contains("catch {"), "{kept}");
    }

    #[test]
    fn test_shorthand_members() {
        let out = lower("let a = 1; let o = {a, m() { return a; }};", Target::ES5);
        assert!(out.contains("{a: a, m: function() {"), "{out}");
    }

    #[test]
    fn test_directive_stays_first() {
        let out = lower("function f() { \"use strict\"; return () => this; }", Target::ES5);
        assert!(out.contains("\"use strict\";\n  var _this = this;"), "{out}");
    }

    #[test]
    fn test_esnext_is_untouched() {
        let source = "const {a, ...r} = o;\nlet f = (x = 1) => this ?? x ** 2;\n";
        let out = lower(source, Target::ESNext);
        assert_eq!(out, "const {a, ...r} = o;\nlet f = (x = 1) => this ?? x ** 2;\n");
    }
}
