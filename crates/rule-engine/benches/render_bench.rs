//! 渲染性能基准测试
//!
//! 测试覆盖：
//! - 左偏长链（深度随规模增长）
//! - 平衡树（宽度随规模增长）
//! - 通过 RuleStore 创建和组合规则

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rule_engine::{LogicalOperator, NodeArena, NodeId, RuleStore, render};
use std::hint::black_box;

/// 构建 n 个叶子的左偏 AND 链
fn build_chain(n: usize) -> (NodeArena, NodeId) {
    let mut arena = NodeArena::with_capacity(n * 2);
    let mut root = arena.make_leaf("field_0 = 0");
    for i in 1..n {
        let leaf = arena.make_leaf(format!("field_{} = {}", i, i));
        root = arena.make_combination(LogicalOperator::And, root, leaf);
    }
    (arena, root)
}

/// 构建 n 个叶子的平衡树，逐层交替 AND / OR
fn build_balanced(n: usize) -> (NodeArena, NodeId) {
    let mut arena = NodeArena::with_capacity(n * 2);
    let mut level: Vec<NodeId> = (0..n)
        .map(|i| arena.make_leaf(format!("field_{} > {}", i, i)))
        .collect();

    let mut depth = 0;
    while level.len() > 1 {
        let operator = if depth % 2 == 0 {
            LogicalOperator::And
        } else {
            LogicalOperator::Or
        };
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => arena.make_combination(operator, *left, *right),
                [single] => *single,
                _ => unreachable!(),
            })
            .collect();
        depth += 1;
    }

    (arena, level[0])
}

fn bench_render_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_chain");

    for size in [10, 100, 1_000, 10_000] {
        let (arena, root) = build_chain(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| render(black_box(&arena), black_box(root)))
        });
    }

    group.finish();
}

fn bench_render_balanced(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_balanced");

    for size in [16, 256, 4_096] {
        let (arena, root) = build_balanced(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| render(black_box(&arena), black_box(root)))
        });
    }

    group.finish();
}

fn bench_store_build(c: &mut Criterion) {
    c.bench_function("store_create_and_combine_100", |b| {
        b.iter(|| {
            let store = RuleStore::new();
            let mut last = store.create_rule("a = 0").unwrap();
            for i in 1..100 {
                let leaf = store.create_rule(&format!("a = {}", i)).unwrap();
                last = store.combine_rules(last, leaf, "OR").unwrap();
            }
            black_box(store.render_rule(last))
        })
    });
}

criterion_group!(
    benches,
    bench_render_chain,
    bench_render_balanced,
    bench_store_build,
);

criterion_main!(benches);
