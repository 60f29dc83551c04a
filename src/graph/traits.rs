//! Trait definitions for graph abstractions.
//!
//! The numbering pass, the Lengauer-Tarjan builder, and the dominator-tree query
//! layer are written once against these traits. [`BlockGraph`](crate::graph::BlockGraph)
//! implements them, and so can any other graph shape (test graphs, a reversed view
//! for post-dominators).
//!
//! # Architecture
//!
//! - [`GraphBase`] - Size of the id space and iteration over live blocks
//! - [`Successors`] - Forward edge traversal (outgoing edges)
//! - [`Predecessors`] - Backward edge traversal (incoming edges)
//! - [`RootedGraph`] - Graphs with a designated entry block (for dominator computation)
//! - [`Rooted`] - Adapter designating the root of a graph that has none of its own
//! - [`Reversed`] - Adapter flipping edge direction and re-rooting, for post-dominators

use crate::graph::BlockId;

/// Core properties shared by every graph the analyses run over.
pub trait GraphBase {
    /// Returns one past the largest block index this graph can hand out.
    ///
    /// Analyses allocate per-block tables of this size and index them with
    /// [`BlockId::index`]. Removed blocks may leave holes below the bound.
    fn id_bound(&self) -> usize;

    /// Returns an iterator over the live blocks of the graph.
    fn block_ids(&self) -> impl Iterator<Item = BlockId>;
}

/// Graphs that can enumerate outgoing edges.
pub trait Successors: GraphBase {
    /// Returns the successors of `block` in insertion order.
    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId>;
}

/// Graphs that can enumerate incoming edges.
pub trait Predecessors: GraphBase {
    /// Returns the predecessors of `block` in insertion order.
    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId>;
}

/// A graph with a single designated entry block.
///
/// This is everything the dominator analyses need: the entry is the root of the
/// depth-first spanning tree and of the resulting dominator tree.
pub trait RootedGraph: Successors + Predecessors {
    /// Returns the entry (root) block.
    fn entry(&self) -> BlockId;
}

/// A view of a graph rooted at a chosen block.
///
/// [`BlockGraph`](crate::graph::BlockGraph) keeps its entry as an `Option` (a graph
/// under construction may not have one yet), so the analyses run over
/// `Rooted::new(&graph, entry)` instead of the graph itself.
#[derive(Debug, Clone, Copy)]
pub struct Rooted<'g, G> {
    graph: &'g G,
    root: BlockId,
}

impl<'g, G> Rooted<'g, G> {
    /// Wraps `graph`, treating `root` as its entry.
    #[must_use]
    pub fn new(graph: &'g G, root: BlockId) -> Self {
        Self { graph, root }
    }

    /// Returns the wrapped graph.
    #[must_use]
    pub fn inner(&self) -> &'g G {
        self.graph
    }
}

impl<G: GraphBase> GraphBase for Rooted<'_, G> {
    fn id_bound(&self) -> usize {
        self.graph.id_bound()
    }

    fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        self.graph.block_ids()
    }
}

impl<G: Successors> Successors for Rooted<'_, G> {
    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.graph.successors(block)
    }
}

impl<G: Predecessors> Predecessors for Rooted<'_, G> {
    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.graph.predecessors(block)
    }
}

impl<G: Successors + Predecessors> RootedGraph for Rooted<'_, G> {
    fn entry(&self) -> BlockId {
        self.root
    }
}

/// A view of a graph with every edge reversed and a different root.
///
/// Running the dominator analyses over `Reversed::new(&graph, exit)` yields
/// post-dominators: `a` post-dominates `b` when every path from `b` to the exit
/// passes through `a`.
///
/// # Examples
///
/// ```rust,ignore
/// use cfgdom::graph::{Reversed, RootedGraph};
///
/// let reversed = Reversed::new(&graph, exit);
/// assert_eq!(reversed.entry(), exit);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reversed<'g, G> {
    graph: &'g G,
    root: BlockId,
}

impl<'g, G> Reversed<'g, G> {
    /// Wraps `graph`, treating `root` as the entry of the reversed graph.
    #[must_use]
    pub fn new(graph: &'g G, root: BlockId) -> Self {
        Self { graph, root }
    }

    /// Returns the wrapped graph.
    #[must_use]
    pub fn inner(&self) -> &'g G {
        self.graph
    }
}

impl<G: GraphBase> GraphBase for Reversed<'_, G> {
    fn id_bound(&self) -> usize {
        self.graph.id_bound()
    }

    fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        self.graph.block_ids()
    }
}

impl<G: Predecessors> Successors for Reversed<'_, G> {
    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.graph.predecessors(block)
    }
}

impl<G: Successors> Predecessors for Reversed<'_, G> {
    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.graph.successors(block)
    }
}

impl<G: Successors + Predecessors> RootedGraph for Reversed<'_, G> {
    fn entry(&self) -> BlockId {
        self.root
    }
}
