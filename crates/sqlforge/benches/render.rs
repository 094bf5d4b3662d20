use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlforge::QueryBuilder;

/// Build a SELECT over `n` joined tables with `n` AND-ed conditions:
/// SELECT t0.id, ... FROM table_0 t0 INNER JOIN table_1 t1 ON ... WHERE ...
fn build_wide_select(n: usize) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    let columns: Vec<String> = (0..=n).map(|i| format!("t{i}.id")).collect();
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    qb.select(&column_refs).from("table_0", "t0");
    for i in 1..=n {
        let parent = format!("t{}", i - 1);
        let alias = format!("t{i}");
        qb.inner_join(
            &parent,
            &format!("table_{i}"),
            alias.as_str(),
            &format!("{alias}.parent_id = {parent}.id"),
        );
    }
    for i in 0..=n {
        let placeholder = qb.create_positional_parameter(i as i64, None);
        qb.and_where(format!("t{i}.id = {placeholder}"));
    }
    qb
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut qb = build_wide_select(n);
                black_box(qb.sql().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_dirty_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/dirty");

    for n in [1, 5, 10, 50] {
        let qb = build_wide_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| {
                let mut qb = qb.clone();
                black_box(qb.sql().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_cached_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/cached");

    for n in [1, 5, 10, 50] {
        let mut qb = build_wide_select(n);
        qb.sql().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(qb.sql().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build_and_render,
    bench_dirty_render,
    bench_cached_render
);
criterion_main!(benches);
