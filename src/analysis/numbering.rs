//! Depth-first numbering.
//!
//! One iterative walk from the root assigns every reachable block its pre-order,
//! post-order and reverse post-order number and its parent in the spanning tree, and
//! classifies every edge it crosses:
//!
//! | Target of `u -> v`                 | Kind                          |
//! |------------------------------------|-------------------------------|
//! | not yet visited                    | [`Tree`](DfsEdgeKind::Tree)   |
//! | on the stack (`u` itself included) | [`Back`](DfsEdgeKind::Back)   |
//! | finished, `pre(u) < pre(v)`        | [`Forward`](DfsEdgeKind::Forward) |
//! | finished, `pre(u) > pre(v)`        | [`Cross`](DfsEdgeKind::Cross) |
//!
//! Blocks the walk never reaches get no numbers and are ignored by every later
//! analysis. The numbering is a pure function of the graph and the successor order,
//! so recomputing it on an unchanged graph gives identical results.

use log::trace;

use crate::graph::{BlockId, BlockSet, DfsEdgeKind, RootedGraph, Successors};

/// Depth-first numbering of the blocks reachable from a root.
///
/// Per-block tables are indexed by [`BlockId::index`]; the pre-order table maps
/// numbers back to blocks.
///
/// # Examples
///
/// ```rust
/// use cfgdom::{analysis::DfsNumbering, graph::Rooted, BlockGraph};
///
/// let mut graph: BlockGraph = BlockGraph::new();
/// let entry = graph.create_block(&[])?;
/// let body = graph.create_block(&[entry])?;
/// graph.add_successors(body, &[body])?;
///
/// let numbering = DfsNumbering::compute(&Rooted::new(&graph, entry));
/// assert_eq!(numbering.pre(body), Some(1));
/// assert_eq!(numbering.rpost(entry), Some(0));
/// assert_eq!(numbering.parent(body), Some(entry));
/// # Ok::<(), cfgdom::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfsNumbering {
    root: BlockId,
    id_bound: usize,
    pre: Vec<Option<usize>>,
    post: Vec<Option<usize>>,
    parent: Vec<Option<BlockId>>,
    /// Blocks by pre-order number.
    vertex: Vec<BlockId>,
    /// Blocks by post-order number.
    finished: Vec<BlockId>,
    edges: Vec<(BlockId, BlockId, DfsEdgeKind)>,
}

struct Frame {
    block: BlockId,
    succs: Vec<BlockId>,
    next: usize,
}

impl DfsNumbering {
    /// Numbers the blocks reachable from the graph's entry.
    pub fn compute<G: RootedGraph>(graph: &G) -> Self {
        Self::compute_from(graph, graph.entry())
    }

    /// Numbers the blocks reachable from `root`.
    ///
    /// Returns an empty numbering if `root` is outside the graph.
    pub fn compute_from<G: Successors>(graph: &G, root: BlockId) -> Self {
        let bound = graph.id_bound();
        let mut numbering = DfsNumbering {
            root,
            id_bound: bound,
            pre: vec![None; bound],
            post: vec![None; bound],
            parent: vec![None; bound],
            vertex: Vec::new(),
            finished: Vec::new(),
            edges: Vec::new(),
        };
        if root.index() >= bound {
            return numbering;
        }

        let mut visiting = BlockSet::new(bound);
        let mut stack = vec![numbering.enter(graph, root, &mut visiting)];

        while let Some(frame) = stack.last_mut() {
            let u = frame.block;
            let Some(v) = frame.succs.get(frame.next).copied() else {
                stack.pop();
                visiting.remove(u);
                numbering.post[u.index()] = Some(numbering.finished.len());
                numbering.finished.push(u);
                continue;
            };
            frame.next += 1;

            let kind = match (numbering.pre[u.index()], numbering.pre[v.index()]) {
                (_, None) => DfsEdgeKind::Tree,
                _ if visiting.contains(v) => DfsEdgeKind::Back,
                (Some(pu), Some(pv)) if pu < pv => DfsEdgeKind::Forward,
                _ => DfsEdgeKind::Cross,
            };
            trace!("dfs: {u} -> {v} is a {kind}");
            numbering.edges.push((u, v, kind));

            if kind == DfsEdgeKind::Tree {
                numbering.parent[v.index()] = Some(u);
                let frame = numbering.enter(graph, v, &mut visiting);
                stack.push(frame);
            }
        }

        numbering
    }

    fn enter<G: Successors>(&mut self, graph: &G, block: BlockId, visiting: &mut BlockSet) -> Frame {
        self.pre[block.index()] = Some(self.vertex.len());
        self.vertex.push(block);
        visiting.insert(block);
        Frame {
            block,
            succs: graph.successors(block).collect(),
            next: 0,
        }
    }

    /// The block the walk started from.
    #[must_use]
    pub const fn root(&self) -> BlockId {
        self.root
    }

    /// Size of the id space the numbering was computed over.
    #[must_use]
    pub const fn id_bound(&self) -> usize {
        self.id_bound
    }

    /// Number of reachable blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertex.len()
    }

    /// Returns `true` if nothing was numbered (the root was outside the graph).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty()
    }

    /// Returns `true` if `block` was reached.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.pre(block).is_some()
    }

    /// Pre-order number of `block`.
    #[must_use]
    pub fn pre(&self, block: BlockId) -> Option<usize> {
        self.pre.get(block.index()).copied().flatten()
    }

    /// Post-order number of `block`.
    #[must_use]
    pub fn post(&self, block: BlockId) -> Option<usize> {
        self.post.get(block.index()).copied().flatten()
    }

    /// Reverse post-order number of `block`: `(len - 1) - post`.
    #[must_use]
    pub fn rpost(&self, block: BlockId) -> Option<usize> {
        self.post(block).map(|post| self.len() - 1 - post)
    }

    /// Spanning-tree parent of `block`; `None` for the root and unreached blocks.
    #[must_use]
    pub fn parent(&self, block: BlockId) -> Option<BlockId> {
        self.parent.get(block.index()).copied().flatten()
    }

    /// The block with pre-order number `pre`.
    #[must_use]
    pub fn vertex(&self, pre: usize) -> Option<BlockId> {
        self.vertex.get(pre).copied()
    }

    /// Reachable blocks in pre-order.
    #[must_use]
    pub fn preorder(&self) -> &[BlockId] {
        &self.vertex
    }

    /// Reachable blocks in post-order.
    #[must_use]
    pub fn postorder(&self) -> &[BlockId] {
        &self.finished
    }

    /// Reachable blocks in reverse post-order.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        self.finished.iter().rev().copied().collect()
    }

    /// Every edge leaving a reachable block, with its classification, in the order
    /// the walk crossed them.
    #[must_use]
    pub fn edges(&self) -> &[(BlockId, BlockId, DfsEdgeKind)] {
        &self.edges
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        analysis::traversal::{dfs, postorder},
        test::{
            arb_graph, b,
            factories::{chain, diamond, lengauer_tarjan_paper, simple_loop},
            TestGraph,
        },
    };

    fn kind_of(numbering: &DfsNumbering, from: usize, to: usize) -> DfsEdgeKind {
        numbering
            .edges()
            .iter()
            .find(|(f, t, _)| *f == b(from) && *t == b(to))
            .map(|(_, _, kind)| *kind)
            .unwrap()
    }

    #[test]
    fn test_numbering_diamond() {
        let numbering = DfsNumbering::compute(&diamond());

        assert_eq!(numbering.len(), 4);
        assert_eq!(numbering.preorder(), &[b(0), b(1), b(3), b(2)]);
        assert_eq!(numbering.postorder(), &[b(3), b(1), b(2), b(0)]);
        assert_eq!(numbering.reverse_postorder(), vec![b(0), b(2), b(1), b(3)]);
        assert_eq!(numbering.rpost(b(0)), Some(0));
        assert_eq!(numbering.rpost(b(3)), Some(3));
        assert_eq!(numbering.parent(b(3)), Some(b(1)));
        assert_eq!(numbering.parent(b(0)), None);

        assert_eq!(kind_of(&numbering, 0, 1), DfsEdgeKind::Tree);
        assert_eq!(kind_of(&numbering, 2, 3), DfsEdgeKind::Cross);
    }

    #[test]
    fn test_numbering_classifies_back_edges() {
        let numbering = DfsNumbering::compute(&simple_loop());
        assert_eq!(kind_of(&numbering, 2, 1), DfsEdgeKind::Back);
        assert_eq!(kind_of(&numbering, 2, 3), DfsEdgeKind::Tree);
        assert_eq!(numbering.edges().len(), 4);
    }

    #[test]
    fn test_numbering_self_loop_is_back_edge() {
        let graph = TestGraph::new(2, &[(0, 1), (1, 1)]);
        let numbering = DfsNumbering::compute(&graph);
        assert_eq!(kind_of(&numbering, 1, 1), DfsEdgeKind::Back);
    }

    #[test]
    fn test_numbering_forward_edge() {
        let graph = TestGraph::new(3, &[(0, 1), (1, 2), (0, 2)]);
        let numbering = DfsNumbering::compute(&graph);
        assert_eq!(kind_of(&numbering, 0, 2), DfsEdgeKind::Forward);
    }

    #[test]
    fn test_numbering_skips_unreachable() {
        let graph = TestGraph::new(4, &[(0, 1), (2, 1), (3, 2)]);
        let numbering = DfsNumbering::compute(&graph);

        assert_eq!(numbering.len(), 2);
        assert!(numbering.contains(b(1)));
        assert!(!numbering.contains(b(2)));
        assert_eq!(numbering.pre(b(3)), None);
        assert_eq!(numbering.rpost(b(3)), None);
        // edges out of unreachable blocks are never crossed
        assert_eq!(numbering.edges().len(), 1);
    }

    #[test]
    fn test_numbering_invalid_root() {
        let numbering = DfsNumbering::compute_from(&chain(2), b(5));
        assert!(numbering.is_empty());
        assert_eq!(numbering.pre(b(0)), None);
        assert_eq!(numbering.pre(b(99)), None);
    }

    #[test]
    fn test_numbering_deep_chain_does_not_overflow() {
        let graph = chain(200_000);
        let numbering = DfsNumbering::compute(&graph);
        assert_eq!(numbering.len(), 200_000);
        assert_eq!(numbering.pre(b(199_999)), Some(199_999));
        assert_eq!(numbering.post(b(199_999)), Some(0));
    }

    #[test]
    fn test_numbering_lengauer_tarjan_paper() {
        let numbering = DfsNumbering::compute(&lengauer_tarjan_paper());
        assert_eq!(numbering.len(), 10);
        // r x1 x2 x3 y3 z3 y2 z2 y1 z1 is exactly the walk order
        let expected: Vec<BlockId> = (0..10).map(b).collect();
        assert_eq!(numbering.preorder(), expected.as_slice());
    }

    proptest! {
        #[test]
        fn prop_numbering_matches_traversals(graph in arb_graph(24)) {
            let numbering = DfsNumbering::compute(&graph);

            let preorder: Vec<BlockId> = dfs(&graph, b(0)).collect();
            prop_assert_eq!(numbering.preorder(), preorder.as_slice());
            let expected_post = postorder(&graph, b(0));
            prop_assert_eq!(numbering.postorder(), expected_post.as_slice());

            for &block in numbering.preorder() {
                let pre = numbering.pre(block).unwrap();
                prop_assert_eq!(numbering.vertex(pre), Some(block));
                let rpost = numbering.rpost(block).unwrap();
                prop_assert_eq!(rpost + numbering.post(block).unwrap(), numbering.len() - 1);
                if let Some(parent) = numbering.parent(block) {
                    prop_assert!(numbering.pre(parent).unwrap() < pre);
                }
            }
        }

        #[test]
        fn prop_numbering_is_idempotent(graph in arb_graph(24)) {
            prop_assert_eq!(DfsNumbering::compute(&graph), DfsNumbering::compute(&graph));
        }

        #[test]
        fn prop_edge_kinds_agree_with_numbers(graph in arb_graph(24)) {
            let numbering = DfsNumbering::compute(&graph);
            for &(u, v, kind) in numbering.edges() {
                let (pu, pv) = (numbering.pre(u).unwrap(), numbering.pre(v).unwrap());
                let (qu, qv) = (numbering.post(u).unwrap(), numbering.post(v).unwrap());
                match kind {
                    DfsEdgeKind::Tree => prop_assert_eq!(numbering.parent(v), Some(u)),
                    // v is an ancestor of u (or u itself)
                    DfsEdgeKind::Back => prop_assert!(pv <= pu && qv >= qu),
                    DfsEdgeKind::Forward => prop_assert!(pu < pv && qu > qv),
                    DfsEdgeKind::Cross => prop_assert!(pv < pu && qv < qu),
                }
            }
        }
    }
}
