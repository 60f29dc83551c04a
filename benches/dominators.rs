//! Benchmarks for numbering and dominator construction.
//!
//! Graph shapes that stress different parts of the pipeline:
//! - Deep chain (long tree paths, deep path compression)
//! - Wide switch (one block with many successors, a join with many predecessors)
//! - Nested loops (many back edges, frontiers containing loop headers)
//! - The Lengauer-Tarjan paper graph (small, irregular)

extern crate cfgdom;

use cfgdom::{
    analysis::{compute_dominators_with, iterative_dominators, DfsNumbering},
    graph::Rooted,
    AnalysisConfig, BlockGraph, BlockId,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// `entry -> b1 -> ... -> bn -> exit`.
fn chain(length: usize) -> BlockGraph {
    let mut graph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit().unwrap();
    let mut last = entry;
    for _ in 0..length {
        last = graph.create_block(&[last]).unwrap();
    }
    graph.add_successors(last, &[exit]).unwrap();
    graph
}

/// `entry -> switch -> {case_1 .. case_n} -> exit`.
fn switch(cases: usize) -> BlockGraph {
    let mut graph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit().unwrap();
    let switch = graph.create_block(&[entry]).unwrap();
    for _ in 0..cases {
        let case = graph.create_block(&[switch]).unwrap();
        graph.add_successors(case, &[exit]).unwrap();
    }
    graph
}

/// `depth` loops nested inside each other, each with a header and a latch.
fn nested_loops(depth: usize) -> BlockGraph {
    let mut graph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit().unwrap();
    let mut headers = Vec::with_capacity(depth);
    let mut last = entry;
    for _ in 0..depth {
        last = graph.create_block(&[last]).unwrap();
        headers.push(last);
    }
    for &header in headers.iter().rev() {
        let latch = graph.create_block(&[last]).unwrap();
        graph.add_successors(latch, &[header]).unwrap();
        last = latch;
    }
    graph.add_successors(last, &[exit]).unwrap();
    graph
}

fn lengauer_tarjan() -> BlockGraph {
    let mut graph = BlockGraph::new();
    let ids: Vec<BlockId> = (0..10).map(|_| graph.create_block(&[]).unwrap()).collect();
    let edges = [
        (0, 1),
        (0, 9),
        (1, 2),
        (1, 8),
        (2, 3),
        (2, 6),
        (3, 4),
        (4, 5),
        (6, 7),
        (6, 5),
        (8, 9),
        (8, 7),
        (9, 8),
        (7, 6),
        (5, 4),
    ];
    for (from, to) in edges {
        graph.add_successors(ids[from], &[ids[to]]).unwrap();
    }
    graph.mark_entry(ids[0]).unwrap();
    graph.mark_exit(ids[5]).unwrap();
    graph
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("finalize");
    for length in [1_000, 100_000] {
        let graph = chain(length);
        group.bench_with_input(BenchmarkId::new("chain", length), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                graph.finalize().unwrap();
                black_box(graph)
            });
        });
    }
    for cases in [64, 4_096] {
        let graph = switch(cases);
        group.bench_with_input(BenchmarkId::new("switch", cases), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                graph.finalize().unwrap();
                black_box(graph)
            });
        });
    }
    let graph = nested_loops(1_000);
    group.bench_function("nested_loops_1000", |b| {
        b.iter(|| {
            let mut graph = graph.clone();
            graph.finalize().unwrap();
            black_box(graph)
        });
    });
    let graph = lengauer_tarjan();
    group.bench_function("lengauer_tarjan_paper", |b| {
        b.iter(|| {
            let mut graph = graph.clone();
            graph.finalize().unwrap();
            black_box(graph)
        });
    });
    group.finish();
}

/// Lengauer-Tarjan against the iterative algorithm on a pre-computed numbering.
fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("dominators");
    for (name, graph) in [("chain_10000", chain(10_000)), ("loops_500", nested_loops(500))] {
        let entry = graph.entry().unwrap();
        let rooted = Rooted::new(&graph, entry);
        let numbering = DfsNumbering::compute(&rooted);

        group.bench_function(BenchmarkId::new("lengauer_tarjan", name), |b| {
            b.iter(|| black_box(compute_dominators_with(&rooted, black_box(&numbering)).unwrap()));
        });
        group.bench_function(BenchmarkId::new("iterative", name), |b| {
            b.iter(|| black_box(iterative_dominators(&rooted, black_box(&numbering)).unwrap()));
        });
    }
    group.finish();
}

/// Queries on a finalized graph.
fn bench_queries(c: &mut Criterion) {
    let mut graph = nested_loops(1_000);
    graph.set_config(AnalysisConfig::minimal());
    graph.finalize().unwrap();
    let blocks: Vec<BlockId> = graph.reverse_postorder();
    let tree = graph.dominators();

    c.bench_function("dominates_all_pairs_sampled", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &a in blocks.iter().step_by(17) {
                for &other in blocks.iter().step_by(13) {
                    count += usize::from(tree.dominates(a, other));
                }
            }
            black_box(count)
        });
    });
    c.bench_function("iterated_frontier_outer_latch", |b| {
        let latch = blocks[blocks.len() - 2];
        b.iter(|| black_box(tree.iterated_dominance_frontier(black_box(latch))));
    });
}

criterion_group!(benches, bench_finalize, bench_algorithms, bench_queries);
criterion_main!(benches);
