//! Block identifier for control flow graphs.
//!
//! [`BlockId`] is a dense, strongly-typed index into the block arena owned by a
//! [`BlockGraph`](crate::graph::BlockGraph). Every relation between blocks
//! (predecessors, successors, DFS parent, immediate dominator, dominator-tree
//! children) is stored as a `BlockId` and resolved through the arena, so blocks
//! never hold references to each other.

use std::fmt;

/// A strongly-typed identifier for a basic block.
///
/// Ids are assigned sequentially from 0 when blocks are created and are never
/// reused while the owning graph lives, even after the block is removed. Per-block
/// analysis results are stored in vectors indexed by [`BlockId::index`].
///
/// # Examples
///
/// ```rust
/// use cfgdom::BlockId;
///
/// let block = BlockId::new(3);
/// assert_eq!(block.index(), 3);
/// assert_eq!(format!("{block}"), "b3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Creates a `BlockId` from a raw arena index.
    ///
    /// Normal usage obtains ids from [`BlockGraph::create_block`](crate::graph::BlockGraph::create_block);
    /// this constructor exists for tests and for graph types implemented outside the crate.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        BlockId(index)
    }

    /// Returns the raw arena index of this block.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<usize> for BlockId {
    #[inline]
    fn from(index: usize) -> Self {
        BlockId(index)
    }
}

impl From<BlockId> for usize {
    #[inline]
    fn from(block: BlockId) -> Self {
        block.0
    }
}
