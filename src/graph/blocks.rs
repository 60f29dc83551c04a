//! The block graph container.
//!
//! [`BlockGraph`] owns every block in an arena indexed by [`BlockId`], the edge
//! index, and the results of the last [`finalize`](BlockGraph::finalize). It is the
//! surface an external builder (an AST walker, a bytecode decoder) talks to:
//!
//! 1. create blocks and wire edges ([`create_block`](BlockGraph::create_block),
//!    [`add_successors`](BlockGraph::add_successors), [`consequent`](BlockGraph::consequent), ...),
//! 2. designate the entry and exit,
//! 3. call [`finalize`](BlockGraph::finalize),
//! 4. query dominance.
//!
//! # Invalidation
//!
//! Every structural edit marks the graph dirty: the numbering, both dominator trees,
//! the per-block analysis fields and the cached layout arrays are dropped, and
//! dominance queries panic until the next `finalize`. There is no incremental update.
//!
//! # Lazy Computation
//!
//! The pre-order block array, the edge list in block order, and its partition into
//! conditional and unconditional edges are computed on first access and cached in a
//! [`OnceLock`] until the next edit.

use std::{collections::BTreeSet, sync::OnceLock};

use log::{debug, trace};

use crate::{
    analysis::{
        compute_dominators_with, compute_post_dominators, dfs, dominators::verify_dominators,
        iterative_dominators, DfsNumbering, DominatorTree,
    },
    config::AnalysisConfig,
    error::invariant_error,
    graph::{
        BasicBlock, BlockFlags, BlockId, Edge, EdgeList, FlowKind, GraphBase, Predecessors,
        Rooted, Successors,
    },
    Error, Result,
};

/// Derived arrays, rebuilt on demand after each edit.
#[derive(Debug, Clone, Default)]
struct Layout {
    preorder: Vec<BlockId>,
    edges: Vec<Edge>,
    conditional: Vec<Edge>,
    unconditional: Vec<Edge>,
}

impl Layout {
    fn build<T>(graph: &BlockGraph<T>) -> Self {
        let preorder = match graph.entry {
            Some(entry) => dfs(graph, entry).collect(),
            None => Vec::new(),
        };

        let edges: Vec<Edge> = graph
            .blocks()
            .flat_map(|block| {
                block
                    .succs()
                    .iter()
                    .filter_map(move |&to| graph.edges.get(block.id(), to).copied())
            })
            .collect();

        let (conditional, unconditional) = edges
            .iter()
            .copied()
            .partition(|edge: &Edge| edge.flow().is_conditional());

        Layout {
            preorder,
            edges,
            conditional,
            unconditional,
        }
    }
}

/// A control-flow graph of [`BasicBlock`]s with a single entry and a single exit.
///
/// `T` is the payload stored in each block (statements, instructions, AST node ids).
/// Graphs used purely for their shape use the default `()`.
///
/// # Examples
///
/// ```rust
/// use cfgdom::BlockGraph;
///
/// // entry -> header <-> body, header -> exit
/// let mut graph: BlockGraph<&str> = BlockGraph::new();
/// let (entry, exit) = graph.entry_and_exit()?;
/// let header = graph.create_block(&[entry])?;
/// let body = graph.consequent(header)?;
/// graph.push_node(body, "i += 1")?;
/// graph.add_successors(body, &[header])?;
/// let done = graph.alternate(header)?;
/// graph.add_successors(done, &[exit])?;
///
/// graph.finalize()?;
///
/// assert_eq!(graph.idom(body), Some(header));
/// assert!(graph.dominates(header, exit));
/// assert_eq!(graph.dominance_frontier(body), &[header]);
/// # Ok::<(), cfgdom::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct BlockGraph<T = ()> {
    /// Block arena; removed blocks leave `None` so ids stay stable.
    pub(super) blocks: Vec<Option<BasicBlock<T>>>,
    pub(super) edges: EdgeList,
    pub(super) entry: Option<BlockId>,
    pub(super) exit: Option<BlockId>,
    /// Number of `Some` slots in the arena.
    pub(super) live: usize,
    config: AnalysisConfig,
    dirty: bool,
    numbering: Option<DfsNumbering>,
    dominators: Option<DominatorTree>,
    post_dominators: Option<DominatorTree>,
    layout: OnceLock<Layout>,
}

impl<T> Default for BlockGraph<T> {
    fn default() -> Self {
        Self::with_config(AnalysisConfig::default())
    }
}

impl<T> BlockGraph<T> {
    /// Creates an empty graph with the default [`AnalysisConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph that finalizes with `config`.
    #[must_use]
    pub fn with_config(config: AnalysisConfig) -> Self {
        BlockGraph {
            blocks: Vec::new(),
            edges: EdgeList::new(),
            entry: None,
            exit: None,
            live: 0,
            config,
            dirty: true,
            numbering: None,
            dominators: None,
            post_dominators: None,
            layout: OnceLock::new(),
        }
    }

    /// The configuration used by [`finalize`](Self::finalize).
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replaces the configuration. The graph must be finalized again.
    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Creates the entry and exit sentinels of a fresh graph, unconnected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if the graph already has an entry or exit.
    pub fn entry_and_exit(&mut self) -> Result<(BlockId, BlockId)> {
        if let Some(existing) = self.entry.or(self.exit) {
            return Err(invariant_error!(
                "graph already has sentinel block {}",
                existing
            ));
        }
        let entry = self.create_block(&[])?;
        let exit = self.create_block(&[])?;
        self.mark_entry(entry)?;
        self.mark_exit(exit)?;
        Ok((entry, exit))
    }

    /// Creates a block and makes it a successor of each of `preds`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if a predecessor is not live; nothing is created then.
    pub fn create_block(&mut self, preds: &[BlockId]) -> Result<BlockId> {
        for &pred in preds {
            self.live_block(pred)?;
        }

        let id = BlockId::new(self.blocks.len());
        self.blocks.push(Some(BasicBlock::new(id)));
        self.live += 1;
        self.invalidate();
        trace!("created block {id}");

        for &pred in preds {
            self.link(pred, id, FlowKind::Unconditional)?;
        }
        Ok(id)
    }

    /// Adds `block -> target` for each target not already a successor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if any block is not live; no edge is added then.
    pub fn add_successors(&mut self, block: BlockId, targets: &[BlockId]) -> Result<()> {
        self.live_block(block)?;
        for &target in targets {
            self.live_block(target)?;
        }
        for &target in targets {
            self.link(block, target, FlowKind::Unconditional)?;
        }
        Ok(())
    }

    /// Adds `source -> block` for each source not already a predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if any block is not live; no edge is added then.
    pub fn add_predecessors(&mut self, block: BlockId, sources: &[BlockId]) -> Result<()> {
        self.live_block(block)?;
        for &source in sources {
            self.live_block(source)?;
        }
        for &source in sources {
            self.link(source, block, FlowKind::Unconditional)?;
        }
        Ok(())
    }

    /// Creates the block taken when `block`'s condition holds and marks `block` as a test.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live.
    pub fn consequent(&mut self, block: BlockId) -> Result<BlockId> {
        self.live_block(block)?;
        let target = self.create_block(&[])?;
        self.set_true_target(block, target)?;
        Ok(target)
    }

    /// Creates the block taken when `block`'s condition fails and marks `block` as a test.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live.
    pub fn alternate(&mut self, block: BlockId) -> Result<BlockId> {
        self.live_block(block)?;
        let target = self.create_block(&[])?;
        self.set_false_target(block, target)?;
        Ok(target)
    }

    /// Makes the existing block `target` the true arm of `block`'s branch.
    ///
    /// Used for branches to blocks that already exist, such as a loop condition
    /// jumping back to its header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if either block is not live.
    pub fn set_true_target(&mut self, block: BlockId, target: BlockId) -> Result<()> {
        self.set_branch_target(block, target, FlowKind::ConditionalTrue)
    }

    /// Makes the existing block `target` the false arm of `block`'s branch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if either block is not live.
    pub fn set_false_target(&mut self, block: BlockId, target: BlockId) -> Result<()> {
        self.set_branch_target(block, target, FlowKind::ConditionalFalse)
    }

    fn set_branch_target(&mut self, block: BlockId, target: BlockId, flow: FlowKind) -> Result<()> {
        self.live_block(target)?;
        let current = self.live_block(block)?;
        let previous = match flow {
            FlowKind::ConditionalTrue => current.true_target(),
            _ => current.false_target(),
        };

        // the arm being replaced turns into a plain edge
        if let Some(old) = previous.filter(|&old| old != target) {
            if self.edges.contains(block, old) {
                self.edges.add(block, old, FlowKind::Unconditional);
            }
        }

        self.link(block, target, flow)?;
        self.edges.add(block, target, flow);

        let node = self.live_block_mut(block)?;
        match flow {
            FlowKind::ConditionalTrue => node.set_true_target(Some(target)),
            _ => node.set_false_target(Some(target)),
        }
        node.set_flag(BlockFlags::TEST, true);
        self.invalidate();
        Ok(())
    }

    /// Marks `block` as the entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live, or
    /// [`Error::InvariantViolation`] if a different block is already the entry.
    pub fn mark_entry(&mut self, block: BlockId) -> Result<()> {
        self.live_block(block)?;
        if let Some(current) = self.entry.filter(|&current| current != block) {
            return Err(invariant_error!(
                "{} is already the entry; cannot also mark {}",
                current,
                block
            ));
        }
        self.live_block_mut(block)?.set_flag(BlockFlags::ENTRY, true);
        self.entry = Some(block);
        self.invalidate();
        Ok(())
    }

    /// Marks `block` as the exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live, or
    /// [`Error::InvariantViolation`] if a different block is already the exit.
    pub fn mark_exit(&mut self, block: BlockId) -> Result<()> {
        self.live_block(block)?;
        if let Some(current) = self.exit.filter(|&current| current != block) {
            return Err(invariant_error!(
                "{} is already the exit; cannot also mark {}",
                current,
                block
            ));
        }
        self.live_block_mut(block)?.set_flag(BlockFlags::EXIT, true);
        self.exit = Some(block);
        self.invalidate();
        Ok(())
    }

    /// Marks `block` as ending in a two-way branch.
    ///
    /// The true and false targets may be wired later; [`finalize`](Self::finalize)
    /// checks that the block then has exactly two distinct successors designated as
    /// its true and false targets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live.
    pub fn mark_test(&mut self, block: BlockId) -> Result<()> {
        self.live_block_mut(block)?.set_flag(BlockFlags::TEST, true);
        self.invalidate();
        Ok(())
    }

    /// Appends a payload node to `block`. Does not invalidate the analysis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live.
    pub fn push_node(&mut self, block: BlockId, node: T) -> Result<()> {
        self.live_block_mut(block)?.push_node(node);
        Ok(())
    }

    /// Returns the block with id `block`, if live.
    #[must_use]
    pub fn block(&self, block: BlockId) -> Option<&BasicBlock<T>> {
        self.blocks.get(block.index()).and_then(Option::as_ref)
    }

    pub(super) fn block_mut(&mut self, block: BlockId) -> Option<&mut BasicBlock<T>> {
        self.blocks.get_mut(block.index()).and_then(Option::as_mut)
    }

    pub(super) fn live_block(&self, block: BlockId) -> Result<&BasicBlock<T>> {
        self.block(block).ok_or(Error::UnknownBlock(block))
    }

    pub(super) fn live_block_mut(&mut self, block: BlockId) -> Result<&mut BasicBlock<T>> {
        self.block_mut(block).ok_or(Error::UnknownBlock(block))
    }

    /// Iterates over the live blocks in id order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock<T>> {
        self.blocks.iter().flatten()
    }

    /// The entry block, once designated.
    #[must_use]
    pub const fn entry(&self) -> Option<BlockId> {
        self.entry
    }

    /// The exit block, once designated.
    #[must_use]
    pub const fn exit(&self) -> Option<BlockId> {
        self.exit
    }

    /// Returns `true` if the graph changed since the last successful finalize.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of live blocks.
    #[must_use]
    pub const fn block_count(&self) -> usize {
        self.live
    }

    /// The edge index.
    #[must_use]
    pub fn edge_list(&self) -> &EdgeList {
        &self.edges
    }

    /// All edges, ordered by source block and then successor order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.layout().edges
    }

    /// Edges that are one arm of a conditional branch.
    #[must_use]
    pub fn conditional_edges(&self) -> &[Edge] {
        &self.layout().conditional
    }

    /// Edges that are not part of a conditional branch.
    #[must_use]
    pub fn unconditional_edges(&self) -> &[Edge] {
        &self.layout().unconditional
    }

    /// Blocks reachable from the entry in depth-first pre-order.
    ///
    /// Available before finalize; empty while there is no entry.
    #[must_use]
    pub fn preorder(&self) -> &[BlockId] {
        &self.layout().preorder
    }

    fn layout(&self) -> &Layout {
        self.layout.get_or_init(|| Layout::build(self))
    }

    /// Adds `from -> to` unless present. Returns `true` if the edge is new.
    fn link(&mut self, from: BlockId, to: BlockId, flow: FlowKind) -> Result<bool> {
        self.live_block(from)?;
        self.live_block(to)?;
        // the edge list mirrors the adjacency lists, so one lookup rules out a duplicate
        if self.edges.contains(from, to) {
            return Ok(false);
        }
        self.live_block_mut(from)?.push_succ(to);
        self.live_block_mut(to)?.push_pred(from);
        self.edges.add(from, to, flow);
        self.invalidate();
        Ok(true)
    }

    /// Drops every derived result. The per-block fields are cleared only on the
    /// first edit after a finalize.
    pub(super) fn invalidate(&mut self) {
        if !self.dirty {
            for block in self.blocks.iter_mut().flatten() {
                block.clear_analysis();
            }
            self.edges.clear_classification();
        }
        self.dirty = true;
        self.numbering = None;
        self.dominators = None;
        self.post_dominators = None;
        self.layout.take();
    }

    /// Numbers the graph and computes its dominator tree.
    ///
    /// Runs, in order: pruning of unreachable blocks, test-block validation, removal
    /// of empty blocks, depth-first numbering, Lengauer-Tarjan, and then the optional
    /// cross-check and post-dominator tree, as configured. On success the numbering
    /// and dominator fields of every reachable block are filled in and every edge
    /// leaving a reachable block carries its DFS classification.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingEntry`] / [`Error::MissingExit`] if a sentinel is missing.
    /// - [`Error::InvariantViolation`] for a malformed test block, or if the
    ///   cross-check disagrees.
    pub fn finalize(&mut self) -> Result<()> {
        let entry = self.entry.ok_or(Error::MissingEntry)?;
        let exit = self.exit.ok_or(Error::MissingExit)?;
        debug!(
            "finalize: {} blocks, {} edges",
            self.live,
            self.edges.len()
        );

        if self.config.prune_unreachable {
            self.prune_unreachable()?;
        }
        self.validate_tests()?;
        if self.config.drop_empty_blocks {
            self.drop_empty_blocks()?;
        }
        self.invalidate();

        let (numbering, tree, post) = {
            let rooted = Rooted::new(&*self, entry);
            let numbering = DfsNumbering::compute(&rooted);
            let tree = compute_dominators_with(&rooted, &numbering)?;
            if self.config.verify {
                let oracle = iterative_dominators(&rooted, &numbering)?;
                verify_dominators(&tree, &oracle)?;
            }
            let post = if self.config.post_dominators {
                Some(compute_post_dominators(&*self, exit)?)
            } else {
                None
            };
            (numbering, tree, post)
        };

        for (pre, &block) in numbering.preorder().iter().enumerate() {
            let (Some(post), Some(rpost)) = (numbering.post(block), numbering.rpost(block)) else {
                continue;
            };
            if let Some(node) = self.block_mut(block) {
                node.set_numbering(pre, post, rpost, numbering.parent(block));
                node.set_dominance(
                    tree.semi(block),
                    tree.idom(block),
                    tree.children(block).to_vec(),
                );
            }
        }
        for &(from, to, kind) in numbering.edges() {
            self.edges.classify(from, to, kind);
        }

        debug!(
            "finalize: {} of {} blocks reachable from {}",
            numbering.len(),
            self.live,
            entry
        );
        self.numbering = Some(numbering);
        self.dominators = Some(tree);
        self.post_dominators = post;
        self.dirty = false;
        self.layout.take();
        Ok(())
    }

    fn validate_tests(&self) -> Result<()> {
        for block in self.blocks().filter(|block| block.is_test()) {
            let (Some(on_true), Some(on_false)) = (block.true_target(), block.false_target())
            else {
                return Err(invariant_error!(
                    "test block {} needs both a true and a false target",
                    block.id()
                ));
            };
            let succs = block.succs();
            if on_true == on_false
                || succs.len() != 2
                || !succs.contains(&on_true)
                || !succs.contains(&on_false)
            {
                return Err(invariant_error!(
                    "test block {} must branch to two distinct successors, has {:?} (true {}, false {})",
                    block.id(),
                    succs,
                    on_true,
                    on_false
                ));
            }
        }
        Ok(())
    }

    /// The numbering from the last finalize, `None` while dirty.
    #[must_use]
    pub fn numbering(&self) -> Option<&DfsNumbering> {
        if self.dirty {
            None
        } else {
            self.numbering.as_ref()
        }
    }

    /// The dominator tree from the last finalize.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFinalized`] if the graph changed since then.
    pub fn try_dominators(&self) -> Result<&DominatorTree> {
        if self.dirty {
            return Err(Error::NotFinalized);
        }
        self.dominators.as_ref().ok_or(Error::NotFinalized)
    }

    /// The dominator tree from the last finalize.
    ///
    /// # Panics
    ///
    /// Panics if the graph changed since the last finalize.
    #[must_use]
    pub fn dominators(&self) -> &DominatorTree {
        match self.try_dominators() {
            Ok(tree) => tree,
            Err(_) => panic!("dominance queried on a graph modified since the last finalize"),
        }
    }

    /// The post-dominator tree, if [`AnalysisConfig::post_dominators`] is set and
    /// the graph is finalized.
    #[must_use]
    pub fn post_dominators(&self) -> Option<&DominatorTree> {
        if self.dirty {
            None
        } else {
            self.post_dominators.as_ref()
        }
    }

    /// Returns `true` if `a` dominates `b`.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty or either block is not in the dominator tree.
    #[must_use]
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dominators().dominates(a, b)
    }

    /// Returns `true` if `a` dominates `b` and `a != b`.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty or either block is not in the dominator tree.
    #[must_use]
    pub fn strictly_dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dominators().strictly_dominates(a, b)
    }

    /// Immediate dominator of `block`; `None` for the entry.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty or `block` is not in the dominator tree.
    #[must_use]
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        self.dominators().idom(block)
    }

    /// Dominance frontier of `block`, sorted by id.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty or `block` is not in the dominator tree.
    #[must_use]
    pub fn dominance_frontier(&self, block: BlockId) -> &[BlockId] {
        self.dominators().dominance_frontier(block)
    }

    /// Iterated dominance frontier of `block`.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty or `block` is not in the dominator tree.
    #[must_use]
    pub fn iterated_dominance_frontier(&self, block: BlockId) -> BTreeSet<BlockId> {
        self.dominators().iterated_dominance_frontier(block)
    }

    /// Blocks dominated by `block`, `block` first, in dominator-tree pre-order.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty or `block` is not in the dominator tree.
    #[must_use]
    pub fn blocks_dominated_by(&self, block: BlockId) -> Vec<BlockId> {
        self.dominators().blocks_dominated_by(block)
    }

    /// Reachable blocks in reverse post-order, the canonical order for forward
    /// data-flow problems.
    ///
    /// # Panics
    ///
    /// Panics if the graph is dirty.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        match self.numbering() {
            Some(numbering) => numbering.reverse_postorder(),
            None => panic!("reverse post-order requested on a graph modified since the last finalize"),
        }
    }
}

impl<T> GraphBase for BlockGraph<T> {
    fn id_bound(&self) -> usize {
        self.blocks.len()
    }

    fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        self.blocks().map(BasicBlock::id)
    }
}

impl<T> Successors for BlockGraph<T> {
    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.block(block)
            .map(BasicBlock::succs)
            .unwrap_or_default()
            .iter()
            .copied()
    }
}

impl<T> Predecessors for BlockGraph<T> {
    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.block(block)
            .map(BasicBlock::preds)
            .unwrap_or_default()
            .iter()
            .copied()
    }
}
