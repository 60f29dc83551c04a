//! Structural maintenance of a [`BlockGraph`].
//!
//! Redirecting edges, bypassing empty blocks, and removing blocks. Every operation
//! keeps the successor and predecessor lists mirrored and the edge index in sync,
//! and invalidates the analysis when it changes anything.

use log::{debug, trace};

use crate::{
    analysis::reachable,
    graph::{BlockFlags, BlockGraph, BlockId, Edge, FlowKind, GraphBase},
    Error, Result,
};

impl<T> BlockGraph<T> {
    /// Redirects the edge `block -> old` to `block -> new`.
    ///
    /// The successor keeps its position, and the branch role of the edge (true or
    /// false arm) moves with it. If `new` already is a successor the two edges merge.
    /// Does nothing if `old` is not a successor of `block`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` or `new` is not live.
    pub fn replace_successor(&mut self, block: BlockId, old: BlockId, new: BlockId) -> Result<()> {
        self.live_block(new)?;
        if old == new || !self.live_block(block)?.succs().contains(&old) {
            return Ok(());
        }

        self.live_block_mut(block)?.replace_succ(old, new);
        let flow = self
            .edges
            .remove(block, old)
            .map_or(FlowKind::Unconditional, |edge| edge.flow());
        if !self.edges.contains(block, new) {
            self.edges.add(block, new, flow);
        }
        if let Some(target) = self.block_mut(old) {
            target.remove_pred(block);
        }
        self.live_block_mut(new)?.add_pred(block);

        trace!("{block}: successor {old} replaced by {new}");
        self.invalidate();
        Ok(())
    }

    /// Redirects the edge `old -> block` to `new -> block`.
    ///
    /// The predecessor keeps its position in `block`'s list. If the edge was a branch
    /// arm of `old`, it becomes the same arm of `new`. Does nothing if `old` is not a
    /// predecessor of `block`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` or `new` is not live.
    pub fn replace_predecessor(
        &mut self,
        block: BlockId,
        old: BlockId,
        new: BlockId,
    ) -> Result<()> {
        self.live_block(new)?;
        if old == new || !self.live_block(block)?.preds().contains(&old) {
            return Ok(());
        }

        self.live_block_mut(block)?.replace_pred(old, new);
        let flow = self
            .edges
            .remove(old, block)
            .map_or(FlowKind::Unconditional, |edge| edge.flow());
        if let Some(source) = self.block_mut(old) {
            source.remove_succ(block);
        }

        let source = self.live_block_mut(new)?;
        source.add_succ(block);
        match flow {
            FlowKind::ConditionalTrue => {
                source.set_true_target(Some(block));
                source.set_flag(BlockFlags::TEST, true);
            }
            FlowKind::ConditionalFalse => {
                source.set_false_target(Some(block));
                source.set_flag(BlockFlags::TEST, true);
            }
            FlowKind::Unconditional => {}
        }
        if !self.edges.contains(new, block) {
            self.edges.add(new, block, flow);
        }

        trace!("{block}: predecessor {old} replaced by {new}");
        self.invalidate();
        Ok(())
    }

    /// Bypasses an empty block with a single successor and removes it.
    ///
    /// Each predecessor is redirected to the successor. The block is left alone, and
    /// `Ok(false)` returned, when it:
    ///
    /// - is the entry or the exit,
    /// - carries payload nodes,
    /// - has no predecessors, or not exactly one successor,
    /// - is its own successor,
    /// - has a test predecessor that already branches to the successor, which would
    ///   collapse both arms of that test onto one block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live.
    pub fn unhook(&mut self, block: BlockId) -> Result<bool> {
        let current = self.live_block(block)?;
        if current.is_entry()
            || current.is_exit()
            || !current.is_empty()
            || current.preds().is_empty()
        {
            return Ok(false);
        }
        let &[succ] = current.succs() else {
            return Ok(false);
        };
        if succ == block {
            return Ok(false);
        }

        let preds = current.preds().to_vec();
        for &pred in &preds {
            let source = self.live_block(pred)?;
            if source.is_test() && source.succs().contains(&succ) {
                trace!("{block}: kept, test {pred} already branches to {succ}");
                return Ok(false);
            }
        }

        for &pred in &preds {
            self.replace_successor(pred, block, succ)?;
        }
        self.remove_block(block)?;
        trace!("unhooked {block}: {} predecessors now reach {succ}", preds.len());
        Ok(true)
    }

    /// Unhooks every empty block that can be bypassed. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from [`unhook`](Self::unhook).
    pub fn drop_empty_blocks(&mut self) -> Result<usize> {
        let candidates: Vec<BlockId> = self.block_ids().collect();
        let mut dropped = 0;
        for block in candidates {
            if self.unhook(block)? {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!("dropped {dropped} empty blocks");
        }
        Ok(dropped)
    }

    /// Removes every block not reachable from the entry, except the exit.
    ///
    /// Returns the number of blocks removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEntry`] if no entry has been designated.
    pub fn prune_unreachable(&mut self) -> Result<usize> {
        let entry = self.entry.ok_or(Error::MissingEntry)?;
        let live = reachable(&*self, entry);
        let doomed: Vec<BlockId> = self
            .block_ids()
            .filter(|&block| !live.contains(block) && Some(block) != self.exit)
            .collect();

        for &block in &doomed {
            trace!("pruning unreachable {block}");
            self.remove_block(block)?;
        }
        if !doomed.is_empty() {
            debug!("pruned {} unreachable blocks", doomed.len());
        }
        Ok(doomed.len())
    }

    /// Removes `block` and every edge touching it.
    ///
    /// The id is never reused. Removing the entry or exit clears that designation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if `block` is not live.
    pub fn remove_block(&mut self, block: BlockId) -> Result<()> {
        let removed = self
            .blocks
            .get_mut(block.index())
            .and_then(Option::take)
            .ok_or(Error::UnknownBlock(block))?;

        for &succ in removed.succs() {
            if let Some(target) = self.block_mut(succ) {
                target.remove_pred(block);
            }
        }
        for &pred in removed.preds() {
            if let Some(source) = self.block_mut(pred) {
                source.remove_succ(block);
            }
        }
        self.edges
            .remove_block(block, removed.succs(), removed.preds());

        if self.entry == Some(block) {
            self.entry = None;
        }
        if self.exit == Some(block) {
            self.exit = None;
        }
        self.live -= 1;
        self.invalidate();
        Ok(())
    }

    /// Removes the edge `from -> to`. Returns the removed edge, or `None` if there was none.
    pub fn remove_edge(&mut self, from: BlockId, to: BlockId) -> Option<Edge> {
        let unlinked = self
            .block_mut(from)
            .is_some_and(|source| source.remove_succ(to));
        if !unlinked {
            return None;
        }
        if let Some(target) = self.block_mut(to) {
            target.remove_pred(from);
        }
        let edge = self.edges.remove(from, to);
        self.invalidate();
        edge
    }
}
