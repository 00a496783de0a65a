//! Short-name assignment for minification.
//!
//! Works on the resolved scope and ref tables, so no identifier in the AST
//! is touched: each mangleable [`Ref`](crate::scope::Ref) gets a `mangled`
//! name and the generator prints that instead.
//!
//! Scopes are visited parents first. A scope's bindings draw from a fresh
//! [`NameGenerator`], skipping reserved words, every name that stays fixed
//! in the module (globals, exports, bindings visible to `eval`), and the
//! names already handed out in ancestor scopes. Sibling scopes therefore
//! reuse the same short names.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::ast::Module;
use crate::config::TargetConfig;
use crate::scope::{RefId, RefTable, ScopeId, ScopeTree};

/// Assign mangled names to every local binding that may be renamed.
pub fn mangle_module(module: &mut Module, config: &TargetConfig) {
    let mut mangler = Mangler::new(&module.scopes, &mut module.refs, config.mangle_top_level);
    mangler.assign();
    debug!(renamed = mangler.renamed, fixed = mangler.fixed.len(), "mangled names");
}

struct Mangler<'a> {
    scopes: &'a ScopeTree,
    refs: &'a mut RefTable,
    top_level: bool,
    /// Names that keep their spelling somewhere in the module.
    fixed: FxHashSet<String>,
    renamed: usize,
}

impl<'a> Mangler<'a> {
    fn new(scopes: &'a ScopeTree, refs: &'a mut RefTable, top_level: bool) -> Self {
        let mut mangler = Self { scopes, refs, top_level, fixed: FxHashSet::default(), renamed: 0 };
        let fixed: FxHashSet<String> = mangler
            .refs
            .iter()
            .filter(|(id, binding)| binding.link.is_none() && !mangler.is_mangleable(*id))
            .map(|(_, binding)| binding.name.clone())
            .collect();
        mangler.fixed = fixed;
        mangler
    }

    fn is_mangleable(&self, id: RefId) -> bool {
        let binding = self.refs.get(id);
        let scope = self.scopes.get(binding.scope);
        binding.kind.is_declared()
            && binding.link.is_none()
            && !binding.keep_name
            && !scope.has_eval
            && (binding.scope != self.scopes.root() || self.top_level)
    }

    fn assign(&mut self) {
        let scope_ids: Vec<ScopeId> = self.scopes.iter().map(|(id, _)| id).collect();
        for id in scope_ids {
            self.assign_scope(id);
        }
    }

    fn assign_scope(&mut self, scope_id: ScopeId) {
        let scopes = self.scopes;
        let scope = scopes.get(scope_id);
        if scope.has_eval || scope.order.is_empty() {
            return;
        }
        let taken = self.ancestor_names(scope_id);
        let mut names = NameGenerator::new();

        for &id in &scope.order {
            if !self.is_mangleable(id) {
                continue;
            }
            let candidate = names
                .by_ref()
                .find(|candidate| {
                    !taken.contains(candidate) && !self.fixed.contains(candidate) && !is_js_reserved(candidate)
                })
                .expect("name generator is unbounded");
            self.refs.get_mut(id).mangled = Some(candidate);
            self.renamed += 1;
        }
    }

    /// Mangled names already given out in the scopes enclosing `scope_id`.
    fn ancestor_names(&self, scope_id: ScopeId) -> FxHashSet<String> {
        let mut names = FxHashSet::default();
        for ancestor in self.scopes.ancestors(scope_id).skip(1) {
            for &id in &self.scopes.get(ancestor).order {
                if let Some(mangled) = &self.refs.get(id).mangled {
                    names.insert(mangled.clone());
                }
            }
        }
        names
    }
}

/// Generates short identifier names: a, b, ..., z, A, ..., Z, _, $, aa, ba, ...
#[derive(Debug, Default)]
pub struct NameGenerator {
    counter: usize,
}

/// Characters allowed first in a generated name.
const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$";

/// Characters allowed after the first.
const REST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let name = encode_name(self.counter);
        self.counter += 1;
        Some(name)
    }
}

/// The `n`th name in generator order.
fn encode_name(mut n: usize) -> String {
    let first = n % FIRST_CHARS.len();
    n /= FIRST_CHARS.len();

    let mut name = String::with_capacity(4);
    name.push(FIRST_CHARS[first] as char);
    while n > 0 {
        n -= 1;
        name.push(REST_CHARS[n % REST_CHARS.len()] as char);
        n /= REST_CHARS.len();
    }
    name
}

/// Words a generated name must never spell.
pub fn is_js_reserved(name: &str) -> bool {
    matches!(
        name,
        "do" | "if" | "in" | "of" | "for" | "let" | "new" | "try" | "var" | "case" | "else" | "enum"
            | "eval" | "null" | "this" | "true" | "void" | "with" | "await" | "break" | "catch"
            | "class" | "const" | "false" | "super" | "throw" | "while" | "yield" | "delete"
            | "export" | "import" | "public" | "return" | "static" | "switch" | "typeof"
            | "default" | "extends" | "finally" | "package" | "private" | "continue" | "debugger"
            | "function" | "arguments" | "interface" | "protected" | "implements" | "instanceof"
            | "undefined" | "NaN" | "Infinity"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Codegen, CodegenOptions};
    use crate::config::Target;
    use crate::{optimize, parse_module};

    fn minify(source: &str, top_level: bool) -> String {
        let mut module = parse_module("test.js", source).expect("parse");
        let config = TargetConfig::new(Target::ESNext).with_minify(true).with_mangle_top_level(top_level);
        optimize(&mut module, &config).expect("optimize");
        Codegen::new(&module, CodegenOptions::default()).generate()
    }

    #[test]
    fn test_name_generator_sequence() {
        let names: Vec<String> = NameGenerator::new().take(56).collect();
        assert_eq!(names[0], "a");
        assert_eq!(names[1], "b");
        assert_eq!(names[26], "A");
        assert_eq!(names[52], "_");
        assert_eq!(names[53], "$");
        assert_eq!(names[54], "aa");
        assert_eq!(names[55], "ba");
    }

    #[test]
    fn test_reserved_words() {
        for word in ["do", "if", "in", "for", "arguments", "undefined"] {
            assert!(is_js_reserved(word), "{word}");
        }
        assert!(!is_js_reserved("a"));
        assert!(!is_js_reserved("foo"));
    }

    #[test]
    fn test_top_level_renaming() {
        let out = minify("let myVariable = 1; console.log(myVariable);", true);
        assert!(out.contains("let a = 1"), "{out}");
        assert!(out.contains("console.log(a)"), "{out}");
        assert!(!out.contains("myVariable"));
    }

    #[test]
    fn test_top_level_kept_without_flag() {
        let out = minify("function foo(longParam, other) { return longParam + other; }", false);
        assert!(out.contains("function foo(a, b)"), "{out}");
        assert!(out.contains("return a + b"), "{out}");
    }

    #[test]
    fn test_sibling_scopes_reuse_names() {
        let out = minify("function f(first) { return first; } function g(second) { return second; }", false);
        assert!(out.contains("function f(a)"), "{out}");
        assert!(out.contains("function g(a)"), "{out}");
    }

    #[test]
    fn test_inner_scope_avoids_outer_names() {
        let out = minify("function f(outer) { return function (inner) { return outer + inner; }; }", false);
        assert!(out.contains("function f(a)"), "{out}");
        assert!(out.contains("function(b)") || out.contains("function (b)"), "{out}");
        assert!(out.contains("a + b"), "{out}");
    }

    #[test]
    fn test_globals_are_never_taken() {
        let out = minify("function f(x) { return a + x; }", false);
        assert!(out.contains("function f(b)"), "{out}");
        assert!(out.contains("a + b"), "{out}");
    }

    #[test]
    fn test_exports_keep_names() {
        let out = minify("export const visible = 1; const hidden = 2; export { hidden as h };", true);
        assert!(out.contains("const visible = 1"), "{out}");
        assert!(out.contains("const hidden = 2"), "{out}");
    }

    #[test]
    fn test_eval_scope_is_not_mangled() {
        let out = minify("function f(keep) { eval('keep'); return keep; }", false);
        assert!(out.contains("function f(keep)"), "{out}");
    }

    #[test]
    fn test_shorthand_property_is_expanded() {
        let out = minify("function f(value) { return { value }; }", false);
        assert!(out.contains("value: a"), "{out}");
    }

    #[test]
    fn test_labels_and_properties_untouched() {
        let out = minify("function f(obj) { outer: for (;;) { obj.prop = 1; break outer; } }", false);
        assert!(out.contains("outer:"), "{out}");
        assert!(out.contains("a.prop = 1"), "{out}");
        assert!(out.contains("break outer"), "{out}");
    }
}
