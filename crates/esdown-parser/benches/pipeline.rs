//! Whole-pipeline benchmarks: parse, resolve/lower/mangle, generate.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use esdown_parser::{optimize, parse_module, Codegen, CodegenOptions, Target, TargetConfig};

const HEADER: &str = "import { render } from \"./dom\";\n";

const SAMPLE_SOURCE: &str = r#"
export function createStore(reducer, initial = {}, ...middleware) {
    let state = initial;
    const listeners = [];
    const dispatch = (action) => {
        state = reducer(state, action);
        listeners.forEach((listener) => listener.call(this, state, arguments.length));
        return action;
    };
    const { subscribe = (fn) => listeners.push(fn), ...extra } = middleware[0] ?? {};
    return { dispatch, subscribe, getState: () => state, extra, size: 2 ** listeners.length };
}

export const View = ({ title, items }) => (
    <ul className="list">
        {items.map((item) => <li key={item.id}>{`${title}: ${item.label}`}</li>)}
    </ul>
);

render(<View title="Items" items={[]} />);
"#;

/// Twenty copies of the sample with distinct top-level names.
fn source() -> String {
    let mut source = HEADER.to_string();
    for i in 0..20 {
        let copy = SAMPLE_SOURCE.replace("createStore", &format!("createStore{i}")).replace("View", &format!("View{i}"));
        source.push_str(&copy);
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let source = source();
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("module", |b| {
        b.iter(|| parse_module("bench.js", black_box(&source)).expect("parse"));
    });
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let source = source();
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(source.len() as u64));

    for (name, config) in [
        ("esnext", TargetConfig::new(Target::ESNext)),
        ("es5", TargetConfig::new(Target::ES5)),
        ("es5-minify", TargetConfig::new(Target::ES5).with_minify(true).with_mangle_top_level(true)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| {
                let mut module = parse_module("bench.js", black_box(&source)).expect("parse");
                optimize(&mut module, config).expect("optimize");
                let options = CodegenOptions { minify: config.minify, ..Default::default() };
                Codegen::new(&module, options).generate()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_pipeline);
criterion_main!(benches);
