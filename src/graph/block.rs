//! The basic block node type.
//!
//! A [`BasicBlock`] owns its payload nodes and the ids of its neighbours. It never
//! holds references to other blocks: predecessors, successors, the DFS parent, the
//! semi-dominator, the immediate dominator, and the dominator-tree children are all
//! [`BlockId`]s resolved through the owning [`BlockGraph`](crate::graph::BlockGraph).
//!
//! Blocks are only created and mutated through the graph. The numbering and
//! dominator fields are written by [`BlockGraph::finalize`](crate::graph::BlockGraph::finalize)
//! and cleared on the first structural edit after it.

use bitflags::bitflags;

use crate::graph::BlockId;

bitflags! {
    /// Role flags of a block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockFlags: u8 {
        /// The unique entry block.
        const ENTRY = 1;
        /// The unique exit block.
        const EXIT = 1 << 1;
        /// The block ends in a two-way conditional branch.
        const TEST = 1 << 2;
    }
}

/// A node of the control-flow graph.
#[derive(Debug, Clone)]
pub struct BasicBlock<T = ()> {
    id: BlockId,
    flags: BlockFlags,
    preds: Vec<BlockId>,
    succs: Vec<BlockId>,
    nodes: Vec<T>,
    true_target: Option<BlockId>,
    false_target: Option<BlockId>,
    // Depth-first numbering
    pre: Option<usize>,
    post: Option<usize>,
    rpost: Option<usize>,
    parent: Option<BlockId>,
    // Dominators
    semi: Option<BlockId>,
    idom: Option<BlockId>,
    idom_children: Vec<BlockId>,
}

impl<T> BasicBlock<T> {
    pub(crate) fn new(id: BlockId) -> Self {
        Self {
            id,
            flags: BlockFlags::empty(),
            preds: Vec::new(),
            succs: Vec::new(),
            nodes: Vec::new(),
            true_target: None,
            false_target: None,
            pre: None,
            post: None,
            rpost: None,
            parent: None,
            semi: None,
            idom: None,
            idom_children: Vec::new(),
        }
    }

    /// The id of this block.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Role flags.
    #[must_use]
    pub const fn flags(&self) -> BlockFlags {
        self.flags
    }

    /// Predecessors in insertion order.
    #[must_use]
    pub fn preds(&self) -> &[BlockId] {
        &self.preds
    }

    /// Successors in insertion order.
    #[must_use]
    pub fn succs(&self) -> &[BlockId] {
        &self.succs
    }

    /// Payload nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    /// Returns `true` if the block carries no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` for the entry block.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.flags.contains(BlockFlags::ENTRY)
    }

    /// Returns `true` for the exit block.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.flags.contains(BlockFlags::EXIT)
    }

    /// Returns `true` if the block ends in a conditional branch.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.flags.contains(BlockFlags::TEST)
    }

    /// Successor taken when the branch condition holds.
    #[must_use]
    pub const fn true_target(&self) -> Option<BlockId> {
        self.true_target
    }

    /// Successor taken when the branch condition fails.
    #[must_use]
    pub const fn false_target(&self) -> Option<BlockId> {
        self.false_target
    }

    /// Depth-first pre-order number, `None` if unnumbered or unreachable.
    #[must_use]
    pub const fn pre(&self) -> Option<usize> {
        self.pre
    }

    /// Depth-first post-order number.
    #[must_use]
    pub const fn post(&self) -> Option<usize> {
        self.post
    }

    /// Reverse post-order number.
    #[must_use]
    pub const fn rpost(&self) -> Option<usize> {
        self.rpost
    }

    /// Parent in the depth-first spanning tree. `None` for the entry.
    #[must_use]
    pub const fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    /// Semi-dominator computed by Lengauer-Tarjan. `None` for the entry.
    #[must_use]
    pub const fn semi(&self) -> Option<BlockId> {
        self.semi
    }

    /// Immediate dominator. `None` for the entry.
    #[must_use]
    pub const fn idom(&self) -> Option<BlockId> {
        self.idom
    }

    /// Blocks whose immediate dominator is this block.
    #[must_use]
    pub fn idom_children(&self) -> &[BlockId] {
        &self.idom_children
    }

    pub(crate) fn set_flag(&mut self, flag: BlockFlags, value: bool) {
        self.flags.set(flag, value);
    }

    pub(crate) fn push_node(&mut self, node: T) {
        self.nodes.push(node);
    }

    /// Returns `true` if `block` was not a successor yet.
    pub(crate) fn add_succ(&mut self, block: BlockId) -> bool {
        add_unique(&mut self.succs, block)
    }

    /// Returns `true` if `block` was not a predecessor yet.
    pub(crate) fn add_pred(&mut self, block: BlockId) -> bool {
        add_unique(&mut self.preds, block)
    }

    /// Appends `block` without checking for duplicates. The caller has already
    /// ruled the edge out.
    pub(crate) fn push_succ(&mut self, block: BlockId) {
        self.succs.push(block);
    }

    pub(crate) fn push_pred(&mut self, block: BlockId) {
        self.preds.push(block);
    }

    /// Removes `block` from the successors and from the branch targets.
    pub(crate) fn remove_succ(&mut self, block: BlockId) -> bool {
        if self.true_target == Some(block) {
            self.true_target = None;
        }
        if self.false_target == Some(block) {
            self.false_target = None;
        }
        remove_item(&mut self.succs, block)
    }

    pub(crate) fn remove_pred(&mut self, block: BlockId) -> bool {
        remove_item(&mut self.preds, block)
    }

    /// Rewires the successor `old` to `new` in place, merging if `new` is already
    /// a successor. Branch targets pointing at `old` follow.
    pub(crate) fn replace_succ(&mut self, old: BlockId, new: BlockId) {
        if self.true_target == Some(old) {
            self.true_target = Some(new);
        }
        if self.false_target == Some(old) {
            self.false_target = Some(new);
        }
        replace_item(&mut self.succs, old, new);
    }

    pub(crate) fn replace_pred(&mut self, old: BlockId, new: BlockId) {
        replace_item(&mut self.preds, old, new);
    }

    pub(crate) fn set_true_target(&mut self, target: Option<BlockId>) {
        self.true_target = target;
    }

    pub(crate) fn set_false_target(&mut self, target: Option<BlockId>) {
        self.false_target = target;
    }

    pub(crate) fn set_numbering(
        &mut self,
        pre: usize,
        post: usize,
        rpost: usize,
        parent: Option<BlockId>,
    ) {
        self.pre = Some(pre);
        self.post = Some(post);
        self.rpost = Some(rpost);
        self.parent = parent;
    }

    pub(crate) fn set_dominance(
        &mut self,
        semi: Option<BlockId>,
        idom: Option<BlockId>,
        children: Vec<BlockId>,
    ) {
        self.semi = semi;
        self.idom = idom;
        self.idom_children = children;
    }

    /// Forgets every numbering and dominator field.
    pub(crate) fn clear_analysis(&mut self) {
        self.pre = None;
        self.post = None;
        self.rpost = None;
        self.parent = None;
        self.semi = None;
        self.idom = None;
        self.idom_children.clear();
    }
}

fn add_unique(list: &mut Vec<BlockId>, block: BlockId) -> bool {
    if list.contains(&block) {
        false
    } else {
        list.push(block);
        true
    }
}

fn remove_item(list: &mut Vec<BlockId>, block: BlockId) -> bool {
    match list.iter().position(|&b| b == block) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

fn replace_item(list: &mut Vec<BlockId>, old: BlockId, new: BlockId) {
    let Some(index) = list.iter().position(|&b| b == old) else {
        return;
    };
    if old == new {
        return;
    }
    if list.contains(&new) {
        list.remove(index);
    } else {
        list[index] = new;
    }
}
