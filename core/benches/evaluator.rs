//! Benchmarks for the evaluator.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. flat: a long chain of infix additions, read once
//! 2. nested: deeply nested groups built directly on the heap
//! 3. calls: recursive `func` calls, under both stepper paths

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tumble_core::api::{ExecutionOptions, StepperPath};
use tumble_core::cell::{Element, ListKind};
use tumble_core::interpreter::Interpreter;

/// Generate an arithmetic expression like "1 + 1 + 1 + ... + 1" with `n` additions.
fn generate_arithmetic_chain(n: usize) -> String {
    let mut expr = String::from("1");
    for _ in 0..n {
        expr.push_str(" + 1");
    }
    expr
}

fn booted(options: ExecutionOptions) -> Interpreter {
    let mut interp = Interpreter::new(options);
    interp.boot().expect("prelude failed");
    interp
}

fn bench_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat");
    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut interp = booted(ExecutionOptions::default());
            let loaded = interp.load(&generate_arithmetic_chain(size)).expect("load failed");
            b.iter(|| {
                let result = interp.eval_block(black_box(loaded.block), 0, None);
                black_box(result.is_ok())
            });
        });
    }
    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");
    for depth in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut interp = booted(ExecutionOptions {
                max_depth: depth * 2 + 16,
                ..ExecutionOptions::default()
            });
            let mut inner = Element::integer(1);
            for _ in 0..depth {
                inner = Element::list(ListKind::Group, interp.heap.alloc_array(&[inner]));
            }
            let program = interp.heap.alloc_array(&[inner]);
            b.iter(|| {
                let result = interp.eval_block(black_box(program), 0, None);
                black_box(result.is_ok())
            });
        });
    }
    group.finish();
}

fn bench_calls(c: &mut Criterion) {
    let mut group = c.benchmark_group("calls");
    let source = "fib: func [n] [either n < 2 [n] [(fib n - 1) + fib n - 2]] fib 15";
    for path in [StepperPath::Inline, StepperPath::Sublevel] {
        group.bench_function(format!("{:?}", path), |b| {
            let mut interp = booted(ExecutionOptions {
                stepper: path,
                ..ExecutionOptions::default()
            });
            let loaded = interp.load(source).expect("load failed");
            b.iter(|| {
                let result = interp.eval_block(black_box(loaded.block), 0, None);
                black_box(result.is_ok())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flat, bench_nested, bench_calls);
criterion_main!(benches);
