//! Shared fixtures for the unit tests.
//!
//! - [`TestGraph`] is a minimal edge-list graph implementing the graph traits, so the
//!   analyses can be tested without going through [`BlockGraph`](crate::BlockGraph).
//! - [`factories`] builds the named scenario graphs (diamond, chain, loop, the
//!   Lengauer-Tarjan paper graph) both as `TestGraph`s and as `BlockGraph`s.
//! - [`oracle`] answers dominance questions by brute force, one reachability walk per
//!   removed block, for cross-checking.


use proptest::prelude::*;

use crate::graph::{BlockId, GraphBase, Predecessors, RootedGraph, Successors};

/// Edge-list graph rooted at `b0`, with adjacency lists for O(degree) neighbour queries.
#[derive(Debug, Clone)]
pub(crate) struct TestGraph {
    pub(crate) block_count: usize,
    pub(crate) edges: Vec<(BlockId, BlockId)>,
    pub(crate) entry: BlockId,
    succs: Vec<Vec<BlockId>>,
    preds: Vec<Vec<BlockId>>,
}

impl TestGraph {
    pub(crate) fn new(block_count: usize, edges: &[(usize, usize)]) -> Self {
        let mut succs = vec![Vec::new(); block_count];
        let mut preds = vec![Vec::new(); block_count];
        for &(from, to) in edges {
            succs[from].push(BlockId::new(to));
            preds[to].push(BlockId::new(from));
        }
        TestGraph {
            block_count,
            edges: edges
                .iter()
                .map(|&(from, to)| (BlockId::new(from), BlockId::new(to)))
                .collect(),
            entry: BlockId::new(0),
            succs,
            preds,
        }
    }
}

impl GraphBase for TestGraph {
    fn id_bound(&self) -> usize {
        self.block_count
    }

    fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.block_count).map(BlockId::new)
    }
}

impl Successors for TestGraph {
    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.succs.get(block.index()).into_iter().flatten().copied()
    }
}

impl Predecessors for TestGraph {
    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.preds.get(block.index()).into_iter().flatten().copied()
    }
}

impl RootedGraph for TestGraph {
    fn entry(&self) -> BlockId {
        self.entry
    }
}

/// Shorthand for `BlockId::new`.
pub(crate) fn b(index: usize) -> BlockId {
    BlockId::new(index)
}

/// Random rooted graphs with up to `max_blocks` blocks and no parallel edges.
///
/// Nothing forces connectivity, so most generated graphs contain blocks that are
/// unreachable from `b0`; the analyses must ignore them.
pub(crate) fn arb_graph(max_blocks: usize) -> impl Strategy<Value = TestGraph> {
    (1..=max_blocks).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..=n * 3).prop_map(move |mut edges| {
            edges.sort_unstable();
            edges.dedup();
            TestGraph::new(n, &edges)
        })
    })
}

/// Random graphs in which every block is reachable from `b0`.
///
/// A random spanning tree (each block `i > 0` hangs off some block `< i`) is
/// overlaid with arbitrary extra edges, which produces back edges, cross edges,
/// self-loops, and irreducible regions.
pub(crate) fn arb_connected_graph(max_blocks: usize) -> impl Strategy<Value = TestGraph> {
    (2..=max_blocks).prop_flat_map(|n| {
        let tree = prop::collection::vec(any::<prop::sample::Index>(), n - 1);
        let extra = prop::collection::vec((0..n, 0..n), 0..=n * 2);
        (tree, extra).prop_map(move |(tree, extra)| {
            let mut edges: Vec<(usize, usize)> = tree
                .iter()
                .enumerate()
                .map(|(i, parent)| (parent.index(i + 1), i + 1))
                .collect();
            edges.extend(extra);
            edges.sort_unstable();
            edges.dedup();
            TestGraph::new(n, &edges)
        })
    })
}
