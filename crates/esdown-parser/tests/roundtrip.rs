//! Printing is a fixed point: generate, reparse, generate again.

use esdown_parser::{optimize, parse_module, Codegen, CodegenOptions, Target, TargetConfig};

const CORPUS: &[&str] = &[
    "var a = 1, b = [1, , 3], c = {x, y: 2, [k]: 3, 'q': 4, 5: 6, ...rest};",
    "let f = async (a, {b, c: [d = 1] = []}, ...e) => { await a; return b ?? d; };",
    "function* gen() { yield; yield 1; yield* other(); }",
    "class A extends (B || C) { static #count = 0; constructor() { super(); this.#count++; } get x() { return 1; } static async *m() {} }",
    "label: for (let i = 0, j = i; i < 10; i++, j--) { if (i % 2) continue label; else break; }",
    "for (const [k, v] of Object.entries(o)) for (var p in v) delete v[p];",
    "switch (x) { case 1: case 2: f(); break; default: g(); }",
    "try { risky(); } catch ({message}) { log(message); } finally { done(); }",
    "do x--; while (x > 0); while (y) y = y.next;",
    "a = b ? c : d ? e : f; g = (h, i); j = typeof k === 'string' && !l || m;",
    "x = a?.b?.[c]?.(d); y = new Foo.Bar(1)[2]; z = new (getClass())(); w = (1).toFixed(2);",
    "s = `head ${a + `inner ${b}`} tail`; t = tag`raw\\u{41}${x}`;",
    "r = /[/]+/g.test(s) ? -(-x) : +(+y); u = - --v; q = a ** -b;",
    "import def, * as ns from 'mod'; export { def as default, ns }; export * as all from './all';",
    "export const one = 1; export default class {} ",
    "el = <Foo.Bar a=\"1\" b={2} {...props}><span>text {value} more</span><></></Foo.Bar>;",
    "if (a) if (b) c(); else d(); else e();",
    "(function () { 'use strict'; })(); ({}).x; (async () => {})();",
    "big = 10n * 2n; nul = '\\u00000' + '\\0x' + \"\\x001\";",
    "x = a.default\nb()\ny = c?.new\nd()",
];

fn print(source: &str, options: CodegenOptions) -> String {
    let module = parse_module("corpus.js", source).unwrap_or_else(|e| panic!("parse {source:?}: {e:?}"));
    Codegen::new(&module, options).generate()
}

#[test]
fn test_printing_is_idempotent() {
    for source in CORPUS {
        let first = print(source, CodegenOptions::default());
        let second = print(&first, CodegenOptions::default());
        assert_eq!(first, second, "not a fixed point for {source:?}");
    }
}

#[test]
fn test_minified_output_reparses_to_the_same_program() {
    let minify = CodegenOptions { minify: true, ..Default::default() };
    for source in CORPUS {
        let pretty = print(source, CodegenOptions::default());
        let compact = print(source, minify.clone());
        assert!(!compact.contains('\n') || source.contains('`'), "newline in minified output of {source:?}");
        assert_eq!(print(&compact, CodegenOptions::default()), pretty, "minified {source:?} changed meaning");
    }
}

#[test]
fn test_lowered_output_is_stable_under_reparse() {
    let config = TargetConfig::new(Target::ES5);
    for source in CORPUS {
        let mut module = parse_module("corpus.js", source).expect("parse");
        optimize(&mut module, &config).expect("optimize");
        let lowered = Codegen::new(&module, CodegenOptions { omit_helpers: true, ..Default::default() }).generate();
        let reprinted = print(&lowered, CodegenOptions { omit_helpers: true, ..Default::default() });
        assert_eq!(lowered, reprinted, "lowered {source:?} is not a fixed point");
        assert!(!lowered.contains("=>"), "arrow survived lowering in {source:?}");
    }
}

#[test]
fn test_flow_annotations_are_dropped() {
    let source = "// @flow\nimport type { T } from './types';\ntype Pair<A> = [A, A];\n\
                  function first<A>(pair: Pair<A>, fallback?: A): A { return (pair[0]: any) ?? fallback; }\n\
                  class Box<T> implements Container<T> { value: T; }\n";
    let out = print(source, CodegenOptions::default());
    assert_eq!(out, "function first(pair, fallback) {\n  return pair[0] ?? fallback;\n}\nclass Box {\n  value;\n}\n");
}

#[test]
fn test_literals_survive_reparse() {
    let out = print("a = 10n; b = \"\\u00000\";", CodegenOptions::default());
    assert_eq!(out, "a = 10n;\nb = \"\\x000\";\n");
    let module = parse_module("corpus.js", &out).expect("reparse");
    assert_eq!(Codegen::new(&module, CodegenOptions::default()).generate(), out);
}
