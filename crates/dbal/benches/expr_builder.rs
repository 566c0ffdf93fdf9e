use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dbal::{CompositeExpression, Expression, ExpressionBuilder, Part, SqlitePlatform};
use std::sync::Arc;

/// Build an AND filter with `n` comparisons:
/// ("col0" = ?) AND ("col1" = ?) AND ...
fn build_filter(eb: &mut ExpressionBuilder, n: usize) -> CompositeExpression {
    let parts: Vec<Part> = (0..n)
        .map(|i| {
            let expression: Expression = eb
                .eq(&format!("col{i}"), i as i64, None)
                .expect("valid column");
            Part::from(expression)
        })
        .collect();
    eb.and(parts).expect("non-empty")
}

fn bench_build_positional(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_builder/build_positional");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), false);
                black_box(build_filter(&mut eb, n));
            });
        });
    }

    group.finish();
}

fn bench_build_named(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_builder/build_named");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), true);
                black_box(build_filter(&mut eb, n));
            });
        });
    }

    group.finish();
}

fn bench_render_and_params(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_builder/render_and_params");

    for n in [1, 5, 10, 50, 100] {
        let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), false);
        let filter = build_filter(&mut eb, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| {
                black_box(filter.to_string());
                black_box(filter.params());
            });
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), false);
                black_box(eb.in_list("id", values.iter().copied(), None).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build_positional,
    bench_build_named,
    bench_render_and_params,
    bench_in_list
);
criterion_main!(benches);
