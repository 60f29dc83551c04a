//! The dominator tree and the queries answered from it.
//!
//! A [`DominatorTree`] is built once from an immediate-dominator table. Construction
//! derives everything the queries need, so each query is cheap:
//!
//! - the children lists of the tree,
//! - a pre/post interval per block from a walk over the tree (not the CFG), which
//!   turns strict dominance into interval containment in O(1),
//! - the depth of every block,
//! - the dominance frontier of every block.
//!
//! # Theory
//!
//! `a` **dominates** `b` if every path from the root to `b` passes through `a`. The
//! **dominance frontier** of `a` is the set of blocks `b` such that `a` dominates a
//! predecessor of `b` but does not strictly dominate `b`: the places where `a`'s
//! dominance ends. A block can be in its own frontier when it sits on a cycle that
//! re-enters it.
//!
//! # Panics
//!
//! Every query taking a block panics if that block is not part of the tree (it was
//! unreachable when the tree was built, has since been removed, or was created
//! afterwards). Answering such a query with a default would silently corrupt the
//! transformations that rely on dominance.

use std::collections::BTreeSet;

use crate::{
    error::invariant_error,
    graph::{BlockId, BlockSet, Predecessors},
    Result,
};

/// Immediate dominators plus the derived tree, intervals, depths and frontiers.
///
/// # Examples
///
/// ```rust
/// use cfgdom::BlockGraph;
///
/// // entry -> {a, b} -> exit
/// let mut graph: BlockGraph = BlockGraph::new();
/// let (entry, exit) = graph.entry_and_exit()?;
/// let a = graph.create_block(&[entry])?;
/// let b = graph.create_block(&[entry])?;
/// graph.add_predecessors(exit, &[a, b])?;
/// graph.finalize()?;
///
/// let tree = graph.dominators();
/// assert_eq!(tree.idom(exit), Some(entry));
/// assert!(tree.strictly_dominates(entry, a));
/// assert!(!tree.dominates(a, exit));
/// assert_eq!(tree.dominance_frontier(a), &[exit]);
/// # Ok::<(), cfgdom::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorTree {
    root: BlockId,
    idom: Vec<Option<BlockId>>,
    /// Semi-dominators, when the tree came from Lengauer-Tarjan.
    semi: Vec<Option<BlockId>>,
    children: Vec<Vec<BlockId>>,
    /// `(tree_pre, tree_post)` per block; `None` outside the tree.
    interval: Vec<Option<(usize, usize)>>,
    depth: Vec<usize>,
    frontier: Vec<Vec<BlockId>>,
    /// Blocks in tree pre-order.
    order: Vec<BlockId>,
}

impl DominatorTree {
    /// Builds the tree from per-block immediate dominators.
    ///
    /// `idom[root]` must be `None`; every other block with `Some` idom is part of the
    /// tree. Fails if the idom links do not form a tree hanging off `root`.
    pub(crate) fn build<G: Predecessors>(
        graph: &G,
        root: BlockId,
        idom: Vec<Option<BlockId>>,
        semi: Vec<Option<BlockId>>,
    ) -> Result<Self> {
        let bound = idom.len();
        if root.index() >= bound {
            return Err(invariant_error!("root {} outside id space {}", root, bound));
        }
        if let Some(parent) = idom[root.index()] {
            return Err(invariant_error!("root {} has idom {}", root, parent));
        }

        let mut children = vec![Vec::new(); bound];
        let mut members = 1;
        for (index, parent) in idom.iter().enumerate() {
            let Some(parent) = *parent else { continue };
            if parent.index() >= bound {
                return Err(invariant_error!(
                    "idom of b{} is {}, outside id space {}",
                    index,
                    parent,
                    bound
                ));
            }
            children[parent.index()].push(BlockId::new(index));
            members += 1;
        }

        let mut tree = DominatorTree {
            root,
            idom,
            semi,
            children,
            interval: vec![None; bound],
            depth: vec![0; bound],
            frontier: vec![Vec::new(); bound],
            order: Vec::with_capacity(members),
        };
        tree.number_intervals();

        if tree.order.len() != members {
            return Err(invariant_error!(
                "idom links contain a cycle: {} of {} blocks hang off root {}",
                tree.order.len(),
                members,
                root
            ));
        }

        tree.compute_frontiers(graph);
        Ok(tree)
    }

    /// Pre/post numbers of a walk over the tree itself, plus depths.
    #[allow(clippy::items_after_statements)]
    fn number_intervals(&mut self) {
        #[derive(Clone, Copy)]
        enum State {
            Enter,
            Exit,
        }

        let mut pre = vec![0; self.idom.len()];
        let mut post_counter = 0;
        let mut stack = vec![(self.root, State::Enter)];

        while let Some((block, state)) = stack.pop() {
            let index = block.index();
            match state {
                State::Enter => {
                    pre[index] = self.order.len();
                    self.order.push(block);
                    stack.push((block, State::Exit));
                    for &child in self.children[index].iter().rev() {
                        self.depth[child.index()] = self.depth[index] + 1;
                        stack.push((child, State::Enter));
                    }
                }
                State::Exit => {
                    self.interval[index] = Some((pre[index], post_counter));
                    post_counter += 1;
                }
            }
        }
    }

    fn compute_frontiers<G: Predecessors>(&mut self, graph: &G) {
        for position in 0..self.order.len() {
            let block = self.order[position];
            let preds: Vec<BlockId> = graph
                .predecessors(block)
                .filter(|&p| self.contains(p))
                .collect();

            // The root has no idom, so a single edge back into it still contributes
            let join = preds.len() >= 2 || (block == self.root && !preds.is_empty());
            if !join {
                continue;
            }

            let idom = self.idom[block.index()];
            for pred in preds {
                let mut runner = pred;
                while Some(runner) != idom {
                    let frontier = &mut self.frontier[runner.index()];
                    // already walked from here for this block
                    if frontier.last() == Some(&block) {
                        break;
                    }
                    frontier.push(block);
                    match self.idom[runner.index()] {
                        Some(next) => runner = next,
                        None => break,
                    }
                }
            }
        }

        for frontier in &mut self.frontier {
            frontier.sort_unstable();
        }
    }

    fn interval_of(&self, block: BlockId) -> (usize, usize) {
        match self.tree_interval(block) {
            Some(interval) => interval,
            None => panic!(
                "block {block} is not part of the dominator tree rooted at {}",
                self.root
            ),
        }
    }

    /// The root (the entry, or the exit for post-dominators).
    #[must_use]
    pub const fn root(&self) -> BlockId {
        self.root
    }

    /// Number of blocks in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false`: a tree contains at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Size of the id space the tree was built over.
    #[must_use]
    pub fn id_bound(&self) -> usize {
        self.idom.len()
    }

    /// Returns `true` if `block` is part of the tree.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.tree_interval(block).is_some()
    }

    /// Blocks in tree pre-order, root first.
    #[must_use]
    pub fn preorder(&self) -> &[BlockId] {
        &self.order
    }

    /// `(tree_pre, tree_post)` of `block`, or `None` outside the tree.
    #[must_use]
    pub fn tree_interval(&self, block: BlockId) -> Option<(usize, usize)> {
        self.interval.get(block.index()).copied().flatten()
    }

    /// Immediate dominator of `block`; `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    #[must_use]
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        self.interval_of(block);
        self.idom[block.index()]
    }

    /// Semi-dominator of `block` as computed by Lengauer-Tarjan.
    ///
    /// `None` for the root, outside the tree, and for trees built by other algorithms.
    #[must_use]
    pub fn semi(&self, block: BlockId) -> Option<BlockId> {
        self.semi.get(block.index()).copied().flatten()
    }

    /// Blocks immediately dominated by `block`, in block-id order.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    #[must_use]
    pub fn children(&self, block: BlockId) -> &[BlockId] {
        self.interval_of(block);
        &self.children[block.index()]
    }

    /// Returns `true` if `a` dominates `b`. Every block dominates itself.
    ///
    /// # Panics
    ///
    /// Panics if either block is not part of the tree.
    #[must_use]
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        if a == b {
            self.interval_of(a);
            return true;
        }
        self.strictly_dominates(a, b)
    }

    /// Returns `true` if `a` dominates `b` and `a != b`.
    ///
    /// O(1): `b`'s tree interval nests strictly inside `a`'s.
    ///
    /// # Panics
    ///
    /// Panics if either block is not part of the tree.
    #[must_use]
    pub fn strictly_dominates(&self, a: BlockId, b: BlockId) -> bool {
        let (a_pre, a_post) = self.interval_of(a);
        let (b_pre, b_post) = self.interval_of(b);
        b_pre > a_pre && b_post < a_post
    }

    /// Depth of `block` in the tree; the root has depth 0.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    #[must_use]
    pub fn depth(&self, block: BlockId) -> usize {
        self.interval_of(block);
        self.depth[block.index()]
    }

    /// Iterates over the dominators of `block`, from `block` itself up to the root.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    pub fn dominators(&self, block: BlockId) -> DominatorIterator<'_> {
        self.interval_of(block);
        DominatorIterator {
            tree: self,
            current: Some(block),
        }
    }

    /// All dominators of `block`, from `block` up to the root.
    #[must_use]
    pub fn dominators_of(&self, block: BlockId) -> Vec<BlockId> {
        self.dominators(block).collect()
    }

    /// All strict dominators of `block`, from its idom up to the root.
    #[must_use]
    pub fn strict_dominators_of(&self, block: BlockId) -> Vec<BlockId> {
        self.dominators(block).skip(1).collect()
    }

    /// The deepest block dominating both `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either block is not part of the tree.
    #[must_use]
    pub fn common_dominator(&self, a: BlockId, b: BlockId) -> BlockId {
        self.interval_of(b);
        self.dominators(a)
            .find(|&candidate| self.dominates(candidate, b))
            .unwrap_or(self.root)
    }

    /// Blocks dominated by `block`, `block` first, in tree pre-order.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    #[must_use]
    pub fn blocks_dominated_by(&self, block: BlockId) -> Vec<BlockId> {
        self.interval_of(block);
        let mut result = Vec::new();
        let mut worklist = vec![block];
        while let Some(current) = worklist.pop() {
            result.push(current);
            worklist.extend(self.children[current.index()].iter().rev());
        }
        result
    }

    /// Blocks strictly dominated by `block`, in tree pre-order.
    #[must_use]
    pub fn blocks_strictly_dominated_by(&self, block: BlockId) -> Vec<BlockId> {
        let mut blocks = self.blocks_dominated_by(block);
        blocks.remove(0);
        blocks
    }

    /// Dominance frontier of `block`, sorted by id.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    #[must_use]
    pub fn dominance_frontier(&self, block: BlockId) -> &[BlockId] {
        self.interval_of(block);
        &self.frontier[block.index()]
    }

    /// Iterated dominance frontier of `block`: the closure of the frontier under
    /// taking frontiers again.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    #[must_use]
    pub fn iterated_dominance_frontier(&self, block: BlockId) -> BTreeSet<BlockId> {
        self.iterated_dominance_frontier_of_set([block])
    }

    /// Iterated dominance frontier of a set of blocks.
    ///
    /// For the definition sites of a variable this is exactly where SSA construction
    /// places its phi functions.
    ///
    /// # Panics
    ///
    /// Panics if any block is not part of the tree.
    pub fn iterated_dominance_frontier_of_set<I>(&self, blocks: I) -> BTreeSet<BlockId>
    where
        I: IntoIterator<Item = BlockId>,
    {
        let mut result = BTreeSet::new();
        let mut queued = BlockSet::new(self.id_bound());
        let mut worklist = Vec::new();

        for block in blocks {
            self.interval_of(block);
            if queued.insert(block) {
                worklist.push(block);
            }
        }

        while let Some(block) = worklist.pop() {
            for &member in &self.frontier[block.index()] {
                result.insert(member);
                if queued.insert(member) {
                    worklist.push(member);
                }
            }
        }
        result
    }

    /// Walks the iterated dominance frontier of `block`, letting `visit` prune it.
    ///
    /// `visit` is called once per candidate block. Returning `false` rejects the
    /// block: its own frontier is then not explored through it. Pruned SSA uses this
    /// to skip blocks where the variable is dead.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the tree.
    pub fn for_each_in_pruned_iterated_frontier<F>(&self, block: BlockId, mut visit: F)
    where
        F: FnMut(BlockId) -> bool,
    {
        self.interval_of(block);
        let mut seen = BlockSet::new(self.id_bound());
        let mut worklist = vec![block];

        while let Some(current) = worklist.pop() {
            for &member in &self.frontier[current.index()] {
                if seen.insert(member) && visit(member) {
                    worklist.push(member);
                }
            }
        }
    }
}

/// Iterator over the dominators of a block, from the block up to the root.
pub struct DominatorIterator<'a> {
    tree: &'a DominatorTree,
    current: Option<BlockId>,
}

impl Iterator for DominatorIterator<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.idom[current.index()];
        Some(current)
    }
}
