//! Scope and binding-reference arenas.
//!
//! Both live in flat vectors indexed by small copyable ids. Parent links,
//! shadow links and rename targets are plain indices, so nothing here owns
//! anything but its own entries. The resolution pass in
//! [`crate::optimizer`] fills these tables; the mangler and the code
//! generator only read them.

use rustc_hash::FxHashMap;

use crate::ast::Ident;

/// Index of a scope in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a binding reference in a [`RefTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(u32);

impl RefId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The file itself.
    Module,
    /// Function or arrow body together with its parameters.
    Function,
    /// Block, loop head, catch clause or switch body.
    Block,
}

impl ScopeKind {
    /// `var` declarations hoist to the nearest scope of this kind.
    pub fn is_function_boundary(self) -> bool {
        matches!(self, ScopeKind::Module | ScopeKind::Function)
    }
}

/// A lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Names declared (or provisionally used) in this scope.
    pub names: FxHashMap<String, RefId>,
    /// `names` values in insertion order, for deterministic renaming.
    pub order: Vec<RefId>,
    /// Contains a direct `eval(...)` or a `with` statement.
    pub has_eval: bool,
}

/// Arena of scopes. Index 0 is the module scope once the pass has run.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// The module scope.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Allocate a scope. Children are registered with their parent.
    pub fn push(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            children: Vec::new(),
            names: FxHashMap::default(),
            order: Vec::new(),
            has_eval: false,
        });
        if let Some(parent) = parent {
            self.scopes[parent.index()].children.push(id);
        }
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, scope)| (ScopeId(i as u32), scope))
    }

    /// `id` followed by each of its ancestors up to the module scope.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |current| self.get(*current).parent)
    }

    /// Nearest enclosing function or module scope (possibly `id` itself).
    pub fn function_boundary(&self, id: ScopeId) -> ScopeId {
        self.ancestors(id)
            .find(|scope| self.get(*scope).kind.is_function_boundary())
            .unwrap_or(id)
    }

    /// A name registered directly in `id`.
    pub fn lookup_local(&self, id: ScopeId, name: &str) -> Option<RefId> {
        self.get(id).names.get(name).copied()
    }

    /// Register `name` in `scope`. The caller guarantees it is not present.
    pub fn insert(&mut self, scope: ScopeId, name: &str, ref_id: RefId) {
        let entry = self.get_mut(scope);
        entry.names.insert(name.to_string(), ref_id);
        entry.order.push(ref_id);
    }

    /// Drop `name` from `scope` (used when a provisional ref moves out).
    pub fn remove(&mut self, scope: ScopeId, name: &str) -> Option<RefId> {
        let entry = self.get_mut(scope);
        let removed = entry.names.remove(name)?;
        entry.order.retain(|id| *id != removed);
        Some(removed)
    }

    /// Mark `id` and all of its ancestors as containing `eval`/`with`.
    pub fn mark_eval(&mut self, id: ScopeId) {
        let chain: Vec<ScopeId> = self.ancestors(id).collect();
        for scope in chain {
            self.get_mut(scope).has_eval = true;
        }
    }
}

/// How a binding was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Used before (or without) a declaration; settled by the end of the pass.
    Unresolved,
    Var,
    Let,
    Const,
    Import,
    Function,
    Class,
    Parameter,
    CatchParam,
    /// Never declared in this module.
    Global,
}

impl RefKind {
    /// Block-scoped kinds that may not be redeclared in the same scope.
    pub fn is_lexical(self) -> bool {
        matches!(self, RefKind::Let | RefKind::Const | RefKind::Class | RefKind::Import)
    }

    pub fn is_declared(self) -> bool {
        !matches!(self, RefKind::Unresolved | RefKind::Global)
    }
}

/// A binding reference: one per (scope, name) pair.
#[derive(Debug, Clone)]
pub struct Ref {
    pub name: String,
    pub kind: RefKind,
    /// Scope the binding is registered in.
    pub scope: ScopeId,
    /// Declarations plus uses that resolved here.
    pub usages: u32,
    /// The outer binding this one hides.
    pub shadows: Option<RefId>,
    /// Inner bindings hiding this one.
    pub shadowed_by: Vec<RefId>,
    /// Short name assigned by the mangler.
    pub mangled: Option<String>,
    /// Set when this provisional ref was merged into another one.
    pub link: Option<RefId>,
    /// Introduced by lowering rather than written in the source.
    pub ghost: bool,
    /// Name is observable from outside (exports, JSX component tags).
    pub keep_name: bool,
}

/// Arena of binding references.
#[derive(Debug, Clone, Default)]
pub struct RefTable {
    refs: Vec<Ref>,
}

impl RefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn create(&mut self, name: &str, kind: RefKind, scope: ScopeId) -> RefId {
        let id = RefId(self.refs.len() as u32);
        self.refs.push(Ref {
            name: name.to_string(),
            kind,
            scope,
            usages: 0,
            shadows: None,
            shadowed_by: Vec::new(),
            mangled: None,
            link: None,
            ghost: false,
            keep_name: false,
        });
        id
    }

    pub fn get(&self, id: RefId) -> &Ref {
        &self.refs[id.index()]
    }

    pub fn get_mut(&mut self, id: RefId) -> &mut Ref {
        &mut self.refs[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (RefId, &Ref)> {
        self.refs.iter().enumerate().map(|(i, r)| (RefId(i as u32), r))
    }

    /// Follow `link` forwards to the ref that survived merging.
    pub fn canonical(&self, mut id: RefId) -> RefId {
        while let Some(next) = self.get(id).link {
            id = next;
        }
        id
    }

    /// Merge `from` into `to`: `from` becomes an alias and its usages move.
    pub fn link(&mut self, from: RefId, to: RefId) {
        let to = self.canonical(to);
        if from == to {
            return;
        }
        let usages = self.get(from).usages;
        let from_ref = self.get_mut(from);
        from_ref.link = Some(to);
        from_ref.usages = 0;
        self.get_mut(to).usages += usages;
    }

    /// Record that `inner` hides `outer`.
    pub fn set_shadow(&mut self, inner: RefId, outer: RefId) {
        self.get_mut(inner).shadows = Some(outer);
        self.get_mut(outer).shadowed_by.push(inner);
    }

    /// The name the generator prints for `ident`.
    pub fn output_name<'a>(&'a self, ident: &'a Ident) -> &'a str {
        let Some(id) = ident.ref_id else {
            return &ident.name;
        };
        let binding = self.get(self.canonical(id));
        debug_assert!(
            binding.kind != RefKind::Unresolved,
            "unresolved reference `{}` reached the generator",
            binding.name
        );
        binding.mangled.as_deref().unwrap_or(&ident.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn test_function_boundary_and_ancestors() {
        let mut scopes = ScopeTree::new();
        let root = scopes.push(ScopeKind::Module, None);
        let func = scopes.push(ScopeKind::Function, Some(root));
        let block = scopes.push(ScopeKind::Block, Some(func));
        let inner = scopes.push(ScopeKind::Block, Some(block));

        assert_eq!(scopes.root(), root);
        assert_eq!(scopes.function_boundary(inner), func);
        assert_eq!(scopes.function_boundary(root), root);
        assert_eq!(scopes.ancestors(inner).collect::<Vec<_>>(), vec![inner, block, func, root]);
        assert_eq!(scopes.get(func).children, vec![block]);
    }

    #[test]
    fn test_mark_eval_reaches_root() {
        let mut scopes = ScopeTree::new();
        let root = scopes.push(ScopeKind::Module, None);
        let func = scopes.push(ScopeKind::Function, Some(root));
        let sibling = scopes.push(ScopeKind::Function, Some(root));
        scopes.mark_eval(func);
        assert!(scopes.get(func).has_eval);
        assert!(scopes.get(root).has_eval);
        assert!(!scopes.get(sibling).has_eval);
    }

    #[test]
    fn test_link_moves_usages() {
        let mut scopes = ScopeTree::new();
        let root = scopes.push(ScopeKind::Module, None);
        let mut refs = RefTable::new();
        let a = refs.create("x", RefKind::Unresolved, root);
        let b = refs.create("x", RefKind::Var, root);
        let c = refs.create("x", RefKind::Unresolved, root);
        refs.get_mut(a).usages = 2;
        refs.get_mut(b).usages = 1;
        refs.get_mut(c).usages = 4;
        refs.link(a, b);
        refs.link(c, a);
        assert_eq!(refs.canonical(c), b);
        assert_eq!(refs.get(b).usages, 7);
        assert_eq!(refs.get(a).usages, 0);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut scopes = ScopeTree::new();
        let root = scopes.push(ScopeKind::Module, None);
        let mut refs = RefTable::new();
        let id = refs.create("y", RefKind::Let, root);
        scopes.insert(root, "y", id);
        assert_eq!(scopes.lookup_local(root, "y"), Some(id));
        assert_eq!(scopes.remove(root, "y"), Some(id));
        assert!(scopes.get(root).order.is_empty());
    }

    #[test]
    fn test_output_name_prefers_mangled() {
        let mut scopes = ScopeTree::new();
        let root = scopes.push(ScopeKind::Module, None);
        let mut refs = RefTable::new();
        let id = refs.create("counter", RefKind::Let, root);
        let ident = Ident::resolved("counter", Span::empty(0), id);
        assert_eq!(refs.output_name(&ident), "counter");
        refs.get_mut(id).mangled = Some("a".into());
        assert_eq!(refs.output_name(&ident), "a");
        let unbound = Ident::new("free", Span::empty(0));
        assert_eq!(refs.output_name(&unbound), "free");
    }
}
