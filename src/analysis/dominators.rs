//! Dominator computation using the Lengauer-Tarjan algorithm.
//!
//! # Algorithm
//!
//! Lengauer-Tarjan works on the depth-first numbering of the graph. Processing
//! blocks in decreasing pre-order, it computes each block's **semi-dominator** (the
//! block with the smallest pre-number from which a path reaches it through blocks
//! with larger pre-numbers) using a forest of already-processed blocks queried with
//! `eval` and grown with `link`. Immediate dominators follow from the semi-dominators
//! in a second, increasing pass.
//!
//! This implementation uses the simple `link` (no balancing) with path compression,
//! O(E log V). Path compression is iterative: the ancestor chain is collected first
//! and then fixed up from the root end, so arbitrarily long chains never touch the
//! call stack.
//!
//! All scratch state lives in a `DominatorComputation` built fresh per run and
//! indexed by pre-number, so nothing leaks between computations.
//!
//! [`iterative_dominators`] computes the same result with the Cooper-Harvey-Kennedy
//! fixed-point algorithm. It is slower but simple enough to trust, and serves as the
//! cross-check behind [`AnalysisConfig::verify`](crate::AnalysisConfig::verify).

use log::debug;

use crate::{
    analysis::{DfsNumbering, DominatorTree},
    error::invariant_error,
    graph::{BlockId, GraphBase, Predecessors, Reversed, RootedGraph, Successors},
    Result,
};

/// Computes the dominator tree of the blocks reachable from the graph's entry.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`](crate::Error::InvariantViolation) if the entry
/// is outside the graph or the graph's successor and predecessor views disagree.
///
/// # Examples
///
/// ```rust
/// use cfgdom::{analysis::compute_dominators, graph::Rooted, BlockGraph};
///
/// let mut graph: BlockGraph = BlockGraph::new();
/// let entry = graph.create_block(&[])?;
/// let a = graph.create_block(&[entry])?;
/// let b = graph.create_block(&[a])?;
///
/// let tree = compute_dominators(&Rooted::new(&graph, entry))?;
/// assert_eq!(tree.idom(b), Some(a));
/// assert_eq!(tree.depth(b), 2);
/// # Ok::<(), cfgdom::Error>(())
/// ```
pub fn compute_dominators<G: RootedGraph>(graph: &G) -> Result<DominatorTree> {
    let numbering = DfsNumbering::compute(graph);
    compute_dominators_with(graph, &numbering)
}

/// Computes the dominator tree from an existing depth-first numbering of `graph`.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`](crate::Error::InvariantViolation) if the
/// numbering is empty, was computed over a different id space, or does not match
/// the graph's predecessors.
pub fn compute_dominators_with<G: Predecessors>(
    graph: &G,
    numbering: &DfsNumbering,
) -> Result<DominatorTree> {
    check_numbering(graph, numbering)?;
    debug!(
        "lengauer-tarjan: {} reachable blocks from {}",
        numbering.len(),
        numbering.root()
    );

    let mut computation = DominatorComputation::new(numbering);
    computation.run(graph, numbering)?;
    let (idom, semi) = computation.into_tables(numbering.id_bound());

    DominatorTree::build(graph, numbering.root(), idom, semi)
}

/// Computes the post-dominator tree: dominators of the reversed graph rooted at `exit`.
///
/// Blocks that cannot reach `exit` are not part of the result.
///
/// # Errors
///
/// Same as [`compute_dominators`].
pub fn compute_post_dominators<G>(graph: &G, exit: BlockId) -> Result<DominatorTree>
where
    G: Successors + Predecessors,
{
    compute_dominators(&Reversed::new(graph, exit))
}

/// Computes immediate dominators with the iterative Cooper-Harvey-Kennedy algorithm.
///
/// Each block's idom is repeatedly recomputed as the nearest common ancestor of its
/// processed predecessors, walking in reverse post-order until nothing changes.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`](crate::Error::InvariantViolation) on the same
/// conditions as [`compute_dominators_with`].
pub fn iterative_dominators<G: Predecessors>(
    graph: &G,
    numbering: &DfsNumbering,
) -> Result<DominatorTree> {
    check_numbering(graph, numbering)?;

    let order = numbering.reverse_postorder();
    // idom by reverse post-order number; the root has rpost 0
    let mut doms: Vec<Option<usize>> = vec![None; order.len()];
    doms[0] = Some(0);

    let mut changed = true;
    let mut rounds = 0;
    while changed {
        changed = false;
        rounds += 1;
        for (rpost, &block) in order.iter().enumerate().skip(1) {
            let mut new_idom = None;
            for pred in graph.predecessors(block) {
                let Some(p) = numbering.rpost(pred) else {
                    continue;
                };
                if doms[p].is_none() {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => p,
                    Some(current) => intersect(&doms, p, current),
                });
            }
            if new_idom != doms[rpost] {
                doms[rpost] = new_idom;
                changed = true;
            }
        }
    }
    debug!("iterative dominators converged after {rounds} rounds");

    let mut idom = vec![None; numbering.id_bound()];
    for (rpost, &block) in order.iter().enumerate().skip(1) {
        match doms[rpost] {
            Some(d) => idom[block.index()] = Some(order[d]),
            None => {
                return Err(invariant_error!(
                    "{} is reachable but has no processed predecessor",
                    block
                ))
            }
        }
    }

    DominatorTree::build(graph, numbering.root(), idom, Vec::new())
}

fn intersect(doms: &[Option<usize>], mut a: usize, mut b: usize) -> usize {
    while a != b {
        while a > b {
            a = doms[a].unwrap_or(0);
        }
        while b > a {
            b = doms[b].unwrap_or(0);
        }
    }
    a
}

/// Fails unless `a` and `b` assign every block the same immediate dominator.
pub(crate) fn verify_dominators(a: &DominatorTree, b: &DominatorTree) -> Result<()> {
    if a.root() != b.root() || a.len() != b.len() {
        return Err(invariant_error!(
            "dominator trees differ in shape: root {} with {} blocks vs root {} with {} blocks",
            a.root(),
            a.len(),
            b.root(),
            b.len()
        ));
    }
    for &block in a.preorder() {
        if !b.contains(block) || a.idom(block) != b.idom(block) {
            return Err(invariant_error!(
                "idom({}) is {:?} but the iterative algorithm found {:?}",
                block,
                a.idom(block),
                b.contains(block).then(|| b.idom(block)).flatten()
            ));
        }
    }
    Ok(())
}

fn check_numbering<G: GraphBase>(graph: &G, numbering: &DfsNumbering) -> Result<()> {
    if numbering.is_empty() {
        return Err(invariant_error!(
            "root {} is outside the graph",
            numbering.root()
        ));
    }
    if numbering.id_bound() != graph.id_bound() {
        return Err(invariant_error!(
            "numbering covers {} block ids but the graph has {}; renumber after structural edits",
            numbering.id_bound(),
            graph.id_bound()
        ));
    }
    Ok(())
}

/// Scratch state of one Lengauer-Tarjan run.
///
/// Every table is indexed by pre-order number, and every stored value is a
/// pre-order number too; block ids only appear at the boundary.
struct DominatorComputation {
    /// Block with each pre-number.
    vertex: Vec<BlockId>,
    /// Spanning-tree parent.
    parent: Vec<usize>,
    /// Semi-dominator.
    semi: Vec<usize>,
    /// Vertex with minimal semi on the compressed path to the forest root.
    label: Vec<usize>,
    /// Forest link; `None` for forest roots.
    ancestor: Vec<Option<usize>>,
    /// Vertices whose semi-dominator is the index.
    bucket: Vec<Vec<usize>>,
    /// Immediate dominator, provisional until the final pass.
    idom: Vec<usize>,
    /// Reused by `compress`.
    path: Vec<usize>,
}

impl DominatorComputation {
    fn new(numbering: &DfsNumbering) -> Self {
        let n = numbering.len();
        let vertex = numbering.preorder().to_vec();
        let parent = vertex
            .iter()
            .map(|&block| {
                numbering
                    .parent(block)
                    .and_then(|p| numbering.pre(p))
                    .unwrap_or(0)
            })
            .collect();

        Self {
            vertex,
            parent,
            semi: (0..n).collect(),
            label: (0..n).collect(),
            ancestor: vec![None; n],
            bucket: vec![Vec::new(); n],
            idom: vec![0; n],
            path: Vec::new(),
        }
    }

    fn run<G: Predecessors>(&mut self, graph: &G, numbering: &DfsNumbering) -> Result<()> {
        let n = self.vertex.len();

        for i in (1..n).rev() {
            let w = self.vertex[i];

            for pred in graph.predecessors(w) {
                // unreachable predecessors carry no number and never dominate anything
                let Some(v) = numbering.pre(pred) else {
                    continue;
                };
                let u = self.eval(v);
                if self.semi[u] < self.semi[i] {
                    self.semi[i] = self.semi[u];
                }
            }

            if self.semi[i] >= i {
                return Err(invariant_error!(
                    "semi-dominator of {} (pre {}) is {}, not a proper ancestor",
                    w,
                    i,
                    self.semi[i]
                ));
            }

            self.bucket[self.semi[i]].push(i);
            let parent = self.parent[i];
            self.link(parent, i);

            for v in std::mem::take(&mut self.bucket[parent]) {
                let u = self.eval(v);
                self.idom[v] = if self.semi[u] < self.semi[v] { u } else { parent };
            }
        }

        for i in 1..n {
            if self.idom[i] != self.semi[i] {
                self.idom[i] = self.idom[self.idom[i]];
            }
        }
        Ok(())
    }

    fn link(&mut self, parent: usize, child: usize) {
        self.ancestor[child] = Some(parent);
    }

    fn eval(&mut self, v: usize) -> usize {
        if self.ancestor[v].is_none() {
            return v;
        }
        self.compress(v);
        self.label[v]
    }

    /// Points every vertex on the path from `v` directly at the forest root's child,
    /// carrying the minimal-semi label down.
    fn compress(&mut self, v: usize) {
        let mut path = std::mem::take(&mut self.path);

        let mut x = v;
        while let Some(a) = self.ancestor[x] {
            if self.ancestor[a].is_none() {
                break;
            }
            path.push(x);
            x = a;
        }

        // root end first, so each ancestor is already compressed
        while let Some(x) = path.pop() {
            let Some(a) = self.ancestor[x] else {
                continue;
            };
            if self.semi[self.label[a]] < self.semi[self.label[x]] {
                self.label[x] = self.label[a];
            }
            self.ancestor[x] = self.ancestor[a];
        }

        self.path = path;
    }

    /// Converts the pre-number tables into per-block idom and semi tables.
    fn into_tables(self, id_bound: usize) -> (Vec<Option<BlockId>>, Vec<Option<BlockId>>) {
        let mut idom = vec![None; id_bound];
        let mut semi = vec![None; id_bound];
        for i in 1..self.vertex.len() {
            let block = self.vertex[i].index();
            idom[block] = Some(self.vertex[self.idom[i]]);
            semi[block] = Some(self.vertex[self.semi[i]]);
        }
        (idom, semi)
    }
}
