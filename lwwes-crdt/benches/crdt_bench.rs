//! Benchmarks for element set writes, merges and tree reconstruction.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lwwes_crdt::{ElementSet, Graph, NodeId};
use std::hint::black_box;

/// A tree of `size` nodes where every node has up to four children.
fn wide_graph(size: usize) -> Graph {
    let graph = Graph::new();
    for i in 0..size {
        let node = format!("n{i}");
        let parent = if i == 0 {
            NodeId::ROOT.to_owned()
        } else {
            format!("n{}", (i - 1) / 4)
        };
        let _ = graph.add_node(node.as_str(), parent.as_str(), 100);
    }
    graph
}

fn bench_add_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("element_set_add");
    for &size in &[100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let set = ElementSet::new();
                for i in 0..size {
                    set.add_data(i, i as i64);
                }
                black_box(set)
            });
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_merge");
    for &size in &[100usize, 1_000] {
        let left = wide_graph(size);
        let right = wide_graph(size);
        let _ = right.remove_node("n1", "n0", 200);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let target = left.clone();
                target.merge(&right);
                black_box(target)
            });
        });
    }
    group.finish();
}

fn bench_query_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_query_all_nodes");
    for &size in &[100usize, 1_000] {
        let graph = wide_graph(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| black_box(graph.query_all_nodes()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add_data, bench_merge, bench_query_all);
criterion_main!(benches);
