//! AST node types for JavaScript, Flow and JSX.
//!
//! Design principle: everything is an Expression, Pattern, or Statement.
//! Each category is a `{ kind, span }` wrapper around a closed enum, so
//! every match over a category is checked for exhaustiveness. A parent's
//! span always encloses the spans of its children.

use std::collections::BTreeSet;

use crate::config::TargetConfig;
use crate::scope::{RefId, RefTable, ScopeTree};
use crate::span::{LineIndex, Span};
use crate::token::TemplateChunk;

/// The root of a parsed file.
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Advisory name used in diagnostics.
    pub filename: String,
    /// Top-level statements in source order.
    pub body: Vec<Stmt>,
    /// Scope arena, filled by the resolution pass.
    pub scopes: ScopeTree,
    /// Binding references, filled by the resolution pass.
    pub refs: RefTable,
    /// Runtime helpers referenced by lowered code.
    pub helpers: BTreeSet<Helper>,
    /// Target and minification settings of the last pass over this module.
    pub config: TargetConfig,
    /// Line starts of the source, for positioning resolution errors.
    pub lines: LineIndex,
}

impl Module {
    pub fn new(filename: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self { filename: filename.into(), body, ..Self::default() }
    }

    /// Whether the resolution pass has run.
    pub fn is_resolved(&self) -> bool {
        !self.scopes.is_empty()
    }
}

/// An identifier occurrence. `ref_id` is filled by the resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub ref_id: Option<RefId>,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span, ref_id: None }
    }

    /// An identifier already bound to a reference (used by lowering).
    pub fn resolved(name: impl Into<String>, span: Span, ref_id: RefId) -> Self {
        Self { name: name.into(), span, ref_id: Some(ref_id) }
    }
}

/// Runtime-support functions that lowered code calls by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Helper {
    /// `__objectRest(source, omittedKeys)`
    ObjectRest,
    /// `__slicedArrayRest(source, fromIndex)`
    SlicedArrayRest,
}

impl Helper {
    pub fn name(self) -> &'static str {
        match self {
            Helper::ObjectRest => "__objectRest",
            Helper::SlicedArrayRest => "__slicedArrayRest",
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn ident(ident: Ident) -> Self {
        let span = ident.span;
        Self::new(ExprKind::Ident(ident), span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::String(value.into()), span)
    }

    pub fn number(value: f64, span: Span) -> Self {
        Self::new(ExprKind::Number(value), span)
    }

    /// `void 0`
    pub fn undefined(span: Span) -> Self {
        Self::new(
            ExprKind::Unary { op: UnaryOp::Void, arg: Box::new(Self::number(0.0, span)) },
            span,
        )
    }

    /// `object.name`
    pub fn member(object: Expr, name: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::Member {
                object: Box::new(object),
                property: MemberProp::Ident(name.into()),
                optional: false,
            },
            span,
        )
    }

    /// `object[index]`
    pub fn index(object: Expr, index: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Member {
                object: Box::new(object),
                property: MemberProp::Computed(Box::new(index)),
                optional: false,
            },
            span,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>, span: Span) -> Self {
        Self::new(ExprKind::Call { callee: Box::new(callee), args, optional: false }, span)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Self {
        Self::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
    }

    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        )
    }

    /// Whether evaluating this expression twice is free of side effects.
    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, ExprKind::Ident(_))
    }
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    Null,
    Bool(bool),
    Number(f64),
    /// BigInt literal digits (with radix prefix, without `n`)
    BigInt(String),
    String(String),
    Regex { pattern: String, flags: String },
    /// Template literal: `` `a${b}c` ``
    Template(Box<Template>),
    /// Tagged template: `` tag`template` ``
    TaggedTemplate { tag: Box<Expr>, quasi: Box<Template> },

    // === Identifiers ===
    Ident(Ident),
    This,
    Super,

    // === Compound Expressions ===
    /// Array literal: `[a, , ...b]` (holes are `None`)
    Array(Vec<Option<Expr>>),
    /// Object literal: `{a: 1, ...b}`
    Object(Vec<ObjectMember>),
    Function(Box<Function>),
    Arrow(Box<ArrowFunction>),
    Class(Box<Class>),

    // === Operations ===
    Unary { op: UnaryOp, arg: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    /// Assignment: the target is an identifier, member, or (for `=`) a pattern.
    Assign { op: AssignOp, left: Box<Pattern>, right: Box<Expr> },
    Update { op: UpdateOp, prefix: bool, arg: Box<Expr> },
    Conditional { test: Box<Expr>, consequent: Box<Expr>, alternate: Box<Expr> },
    Sequence(Vec<Expr>),

    // === Member Access and Calls ===
    /// `a.b`, `a[b]`, `a?.b`, `a.#b`
    Member { object: Box<Expr>, property: MemberProp, optional: bool },
    /// `f(a)`, `f?.(a)`
    Call { callee: Box<Expr>, args: Vec<Expr>, optional: bool },
    New { callee: Box<Expr>, args: Vec<Expr> },

    // === Special ===
    /// Spread element: `...arr`
    Spread(Box<Expr>),
    Yield { arg: Option<Box<Expr>>, delegate: bool },
    Await(Box<Expr>),
    /// Dynamic import: `import(x)`
    Import(Box<Expr>),
    /// `new.target`, `import.meta`
    MetaProperty { meta: String, property: String },

    // === JSX ===
    JsxElement(Box<JsxElement>),
    JsxFragment(Box<JsxFragment>),

    /// A runtime helper inserted by lowering.
    Helper(Helper),
}

/// Template literal parts. `quasis.len() == exprs.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub quasis: Vec<TemplateChunk>,
    pub exprs: Vec<Expr>,
}

/// The property side of a member expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Ident(String),
    Private(String),
    Computed(Box<Expr>),
}

// =============================================================================
// Statements
// =============================================================================

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }

    /// A `var`/`let`/`const` declaration with a single declarator.
    pub fn var(kind: VarKind, pattern: Pattern, init: Option<Expr>, span: Span) -> Self {
        Self::new(
            StmtKind::Var(VarDecl { kind, decls: vec![VarDeclarator { pattern, init, span }] }),
            span,
        )
    }
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // === Declarations ===
    Var(VarDecl),
    Function(Box<Function>),
    Class(Box<Class>),

    // === Control Flow ===
    Block(Vec<Stmt>),
    If { test: Expr, consequent: Box<Stmt>, alternate: Option<Box<Stmt>> },
    Switch { discriminant: Expr, cases: Vec<SwitchCase> },
    For { init: Option<ForInit>, test: Option<Expr>, update: Option<Expr>, body: Box<Stmt> },
    ForIn { left: ForHead, right: Expr, body: Box<Stmt> },
    ForOf { left: ForHead, right: Expr, body: Box<Stmt>, is_await: bool },
    While { test: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, test: Expr },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Return { arg: Option<Expr> },
    Throw { arg: Expr },
    Try { block: Vec<Stmt>, handler: Option<CatchClause>, finalizer: Option<Vec<Stmt>> },
    Labeled { label: String, body: Box<Stmt> },

    // === Expressions ===
    Expr(Expr),
    Empty,
    Debugger,
    With { object: Expr, body: Box<Stmt> },

    // === Modules ===
    Import(Box<ImportDecl>),
    Export(Box<ExportDecl>),

    // === Flow declarations (type-only, never emitted) ===
    TypeAlias(Box<TypeAlias>),
    Interface(Box<InterfaceDecl>),
}

/// `var`/`let`/`const` with its declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub decls: Vec<VarDeclarator>,
}

/// Variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub pattern: Pattern,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// Switch case. `test` is `None` for `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
    pub span: Span,
}

/// Catch clause. `param` is `None` for `catch {}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Initializer of a C-style `for`.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

/// Left side of `for-in`/`for-of`.
#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    /// `for (const [a, b] of ...)`
    Var { kind: VarKind, pattern: Pattern },
    /// `for (x.y of ...)`, `for ([a, b] of ...)`
    Pattern(Pattern),
}

// =============================================================================
// Patterns
// =============================================================================

/// A binding or assignment pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
    /// Flow annotation: `x: number`
    pub type_ann: Option<Box<FlowType>>,
    /// Flow optional parameter marker: `x?: T`
    pub optional: bool,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self { kind, span, type_ann: None, optional: false }
    }

    pub fn ident(ident: Ident) -> Self {
        let span = ident.span;
        Self::new(PatternKind::Ident(ident), span)
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            PatternKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// Whether this pattern destructures (array or object form).
    pub fn is_destructuring(&self) -> bool {
        matches!(self.kind, PatternKind::Array { .. } | PatternKind::Object { .. })
    }

    /// Collect every identifier this pattern binds, in source order.
    pub fn bound_idents<'p>(&'p self, out: &mut Vec<&'p Ident>) {
        match &self.kind {
            PatternKind::Ident(ident) => out.push(ident),
            PatternKind::Array { elements, rest } => {
                for element in elements.iter().flatten() {
                    element.pattern.bound_idents(out);
                }
                if let Some(rest) = rest {
                    rest.bound_idents(out);
                }
            }
            PatternKind::Object { properties, rest, .. } => {
                for prop in properties {
                    prop.value.bound_idents(out);
                }
                if let Some(rest) = rest {
                    rest.bound_idents(out);
                }
            }
            PatternKind::Expr(_) => {}
        }
    }
}

/// Pattern kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// Simple identifier: `x`
    Ident(Ident),
    /// Array pattern: `[a, , b = 1, ...rest]`
    Array { elements: Vec<Option<ArrayPatternElement>>, rest: Option<Box<Pattern>> },
    /// Object pattern: `{a, b: c, ...rest}`. `bound_keys` lists the static
    /// property names already bound, which the rest element must omit.
    Object { properties: Vec<ObjectPatternProperty>, rest: Option<Box<Pattern>>, bound_keys: Vec<String> },
    /// Member-expression target, legal only in assignment patterns.
    Expr(Box<Expr>),
}

/// Element in an array pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPatternElement {
    pub pattern: Pattern,
    pub default: Option<Expr>,
}

/// Property in an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: PropertyKey,
    pub value: Pattern,
    pub default: Option<Expr>,
    pub shorthand: bool,
    pub span: Span,
}

// =============================================================================
// Operators
// =============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof, // typeof
    Void,   // void
    Delete, // delete
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

/// Binary operators, logical ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    NullishCoalesce,
    In,
    Instanceof,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalesce => "??",
            BinaryOp::In => "in",
            BinaryOp::Instanceof => "instanceof",
        }
    }

    /// Binding power, matching [`crate::TokenKind::binary_precedence`].
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::NullishCoalesce => 1,
            BinaryOp::Or => 2,
            BinaryOp::And => 3,
            BinaryOp::BitOr => 4,
            BinaryOp::BitXor => 5,
            BinaryOp::BitAnd => 6,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 7,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq | BinaryOp::In | BinaryOp::Instanceof => 8,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 9,
            BinaryOp::Add | BinaryOp::Sub => 10,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 11,
            BinaryOp::Pow => 12,
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    BitOrAssign,
    BitXorAssign,
    BitAndAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::PowAssign => "**=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::UShrAssign => ">>>=",
            AssignOp::BitOrAssign => "|=",
            AssignOp::BitXorAssign => "^=",
            AssignOp::BitAndAssign => "&=",
            AssignOp::AndAssign => "&&=",
            AssignOp::OrAssign => "||=",
            AssignOp::NullishAssign => "??=",
        }
    }
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

// =============================================================================
// Objects
// =============================================================================

/// Member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    Property(Property),
    /// `...expr`
    Spread(Expr),
}

/// Object property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub kind: PropertyKind,
    pub shorthand: bool,
    pub span: Span,
}

/// Property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(String),
    String(String),
    Number(f64),
    Private(String),
    Computed(Box<Expr>),
}

impl PropertyKey {
    /// The key's static name, if it has one.
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyKey::Ident(name) | PropertyKey::String(name) => Some(name.clone()),
            PropertyKey::Number(value) => Some(crate::codegen::format_number(*value)),
            PropertyKey::Private(_) | PropertyKey::Computed(_) => None,
        }
    }
}

/// Property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    Method,
}

// =============================================================================
// Functions and Classes
// =============================================================================

/// Function node (used for declarations, expressions, methods).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
    pub type_params: Vec<FlowTypeParam>,
    pub return_type: Option<Box<FlowType>>,
}

impl Function {
    pub fn new(params: Vec<Param>, body: Vec<Stmt>, span: Span) -> Self {
        Self {
            name: None,
            params,
            body,
            is_async: false,
            is_generator: false,
            span,
            type_params: Vec::new(),
            return_type: None,
        }
    }
}

/// Arrow function node.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
    pub return_type: Option<Box<FlowType>>,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: Pattern,
    pub default: Option<Expr>,
    pub rest: bool,
    pub span: Span,
}

impl Param {
    pub fn simple(ident: Ident) -> Self {
        let span = ident.span;
        Self { pattern: Pattern::ident(ident), default: None, rest: false, span }
    }
}

/// Class node.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<Ident>,
    pub super_class: Option<Box<Expr>>,
    pub body: Vec<ClassMember>,
    pub span: Span,
    pub type_params: Vec<FlowTypeParam>,
    pub super_type_args: Vec<FlowType>,
    pub implements: Vec<FlowType>,
}

/// Class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub span: Span,
}

/// Class member kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    /// Method: `foo() {}`, `get x() {}`, `constructor() {}`
    Method { key: PropertyKey, value: Function, kind: MethodKind, is_static: bool },
    /// Field: `foo = 1`, `static bar: number`
    Property { key: PropertyKey, value: Option<Expr>, is_static: bool, type_ann: Option<Box<FlowType>> },
    /// Stray `;`
    Empty,
}

/// Method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

// =============================================================================
// Modules
// =============================================================================

/// Import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    /// `import type { T } from "mod"`
    pub type_only: bool,
    pub span: Span,
}

/// Import specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import foo from "mod"`
    Default { local: Ident },
    /// `import * as foo from "mod"`
    Namespace { local: Ident },
    /// `import { foo, bar as baz } from "mod"`
    Named { imported: String, local: Ident },
}

impl ImportSpecifier {
    pub fn local(&self) -> &Ident {
        match self {
            ImportSpecifier::Default { local }
            | ImportSpecifier::Namespace { local }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }

    pub fn local_mut(&mut self) -> &mut Ident {
        match self {
            ImportSpecifier::Default { local }
            | ImportSpecifier::Namespace { local }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }
}

/// Export declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export { foo, bar as baz }`, `export { x } from "mod"`
    Named { specifiers: Vec<ExportSpecifier>, source: Option<String>, type_only: bool },
    /// `export default expr`
    Default { expr: Expr },
    /// `export default function foo() {}`, `export default class Foo {}`
    DefaultDecl { decl: Stmt },
    /// `export const x = 1`, `export function foo() {}`
    Decl { decl: Stmt },
    /// `export * from "mod"`, `export * as ns from "mod"`
    All { exported: Option<String>, source: String },
}

/// Export specifier. `local` is a reference only when there is no `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Ident,
    pub exported: String,
    pub span: Span,
}

// =============================================================================
// JSX
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: JsxElementName,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxElementName {
    /// Lowercase host element: `div`, `my-element`
    Intrinsic(String),
    /// Capitalized component, a reference to a binding: `Foo`
    Component(Ident),
    /// `Foo.Bar.Baz`
    Member { object: Ident, path: Vec<String> },
    /// `svg:rect`
    Namespaced { namespace: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    Attribute { name: String, value: Option<JsxAttrValue>, span: Span },
    Spread { argument: Expr, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttrValue {
    String(String),
    Expr(Expr),
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    Text(String),
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
    Expr(Expr),
    Spread(Expr),
}

// =============================================================================
// Flow types
// =============================================================================

/// A Flow type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowType {
    pub kind: FlowTypeKind,
    pub span: Span,
}

impl FlowType {
    pub fn new(kind: FlowTypeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowTypeKind {
    Any,
    Mixed,
    Empty,
    Void,
    Null,
    Number,
    String,
    Boolean,
    Symbol,
    BigInt,
    /// `*`
    Existential,
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    /// `Foo`, `A.B<T>`
    Named { name: Vec<String>, args: Vec<FlowType> },
    /// `?T`
    Nullable(Box<FlowType>),
    /// `T[]`
    Array(Box<FlowType>),
    /// `[A, B]`
    Tuple(Vec<FlowType>),
    Union(Vec<FlowType>),
    Intersection(Vec<FlowType>),
    /// `{ a: T }` or exact `{| a: T |}`
    Object { members: Vec<FlowObjectMember>, exact: bool },
    Function(Box<FlowFunctionType>),
    /// `typeof x.y`
    Typeof(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowObjectMember {
    Property { key: String, value: FlowType, optional: bool, span: Span },
    /// `[key: K]: V`
    Indexer { name: Option<String>, key: FlowType, value: FlowType, span: Span },
    /// `...T`
    Spread(FlowType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowFunctionType {
    pub type_params: Vec<FlowTypeParam>,
    pub params: Vec<FlowFunctionParam>,
    pub rest: Option<FlowFunctionParam>,
    pub ret: FlowType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowFunctionParam {
    pub name: Option<String>,
    pub ty: FlowType,
    pub optional: bool,
}

/// Generic parameter: `T: Bound = Default`
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTypeParam {
    pub name: String,
    pub bound: Option<FlowType>,
    pub default: Option<FlowType>,
    pub span: Span,
}

/// `type T = ...` / `opaque type T: Super = ...`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub type_params: Vec<FlowTypeParam>,
    pub ty: FlowType,
    pub opaque: bool,
    pub supertype: Option<FlowType>,
    pub span: Span,
}

/// `interface I extends J { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<FlowTypeParam>,
    pub extends: Vec<FlowType>,
    pub body: Vec<FlowObjectMember>,
    pub span: Span,
}
