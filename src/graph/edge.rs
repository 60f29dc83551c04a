//! Edge model for the block graph.
//!
//! Every edge carries two orthogonal classifications:
//!
//! - [`FlowKind`] - what the edge means for control flow (unconditional, or one arm
//!   of a two-way branch). Set when the edge is created.
//! - [`DfsEdgeKind`] - how the depth-first numbering pass reached the edge (tree,
//!   back, forward, cross). Set by [`EdgeList::classify`] during numbering and
//!   `None` until then.
//!
//! [`EdgeList`] indexes edges by their `(from, to)` pair. There is at most one edge
//! per ordered pair; adding a second one merges into the first.

use std::collections::HashMap;

use strum::{Display, EnumCount, EnumIter};

use crate::graph::BlockId;

/// Classification of an edge relative to a depth-first spanning tree.
///
/// # Examples
///
/// ```rust
/// use cfgdom::DfsEdgeKind;
///
/// assert_eq!(DfsEdgeKind::Back.to_string(), "back edge");
/// assert!(DfsEdgeKind::Back.is_retreating());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display)]
pub enum DfsEdgeKind {
    /// The edge that first discovered its target.
    #[strum(serialize = "tree edge")]
    Tree,
    /// An edge to a block still on the DFS stack (an ancestor, or the block itself).
    #[strum(serialize = "back edge")]
    Back,
    /// An edge to an already finished descendant.
    #[strum(serialize = "forward edge")]
    Forward,
    /// An edge to an already finished block in another subtree.
    #[strum(serialize = "cross edge")]
    Cross,
}

impl DfsEdgeKind {
    /// Returns `true` for [`Back`](Self::Back) edges, the only kind that closes a cycle.
    #[must_use]
    pub const fn is_retreating(self) -> bool {
        matches!(self, Self::Back)
    }
}

/// The kind of control flow represented by an edge.
///
/// # Examples
///
/// ```rust
/// use cfgdom::FlowKind;
///
/// assert!(FlowKind::ConditionalTrue.is_conditional());
/// assert!(!FlowKind::Unconditional.is_conditional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, Display)]
pub enum FlowKind {
    /// Direct jump or fall-through.
    #[default]
    Unconditional,
    /// Taken when the branch condition of a test block holds.
    ConditionalTrue,
    /// Taken when the branch condition of a test block fails.
    ConditionalFalse,
}

impl FlowKind {
    /// Returns `true` for either arm of a conditional branch.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, Self::ConditionalTrue | Self::ConditionalFalse)
    }
}

/// A directed edge between two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    from: BlockId,
    to: BlockId,
    dfs: Option<DfsEdgeKind>,
    flow: FlowKind,
}

impl Edge {
    /// Creates an unclassified edge.
    #[must_use]
    pub const fn new(from: BlockId, to: BlockId, flow: FlowKind) -> Self {
        Self {
            from,
            to,
            dfs: None,
            flow,
        }
    }

    /// Source block.
    #[must_use]
    pub const fn from(&self) -> BlockId {
        self.from
    }

    /// Target block.
    #[must_use]
    pub const fn to(&self) -> BlockId {
        self.to
    }

    /// DFS classification, `None` until the numbering pass has seen the edge.
    #[must_use]
    pub const fn dfs(&self) -> Option<DfsEdgeKind> {
        self.dfs
    }

    /// Control-flow kind.
    #[must_use]
    pub const fn flow(&self) -> FlowKind {
        self.flow
    }

    /// Returns `true` if the edge connects a block to itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Index of all edges in a graph, keyed by `(from, to)`.
///
/// Lookups, insertions and removals are O(1). Removing or classifying an edge that
/// does not exist is not an error.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    edges: HashMap<(BlockId, BlockId), Edge>,
}

impl EdgeList {
    /// Creates an empty edge list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the edge `from -> to`, or updates the flow kind of the existing one.
    ///
    /// An existing DFS classification is kept.
    pub fn add(&mut self, from: BlockId, to: BlockId, flow: FlowKind) -> &Edge {
        self.edges
            .entry((from, to))
            .and_modify(|edge| edge.flow = flow)
            .or_insert_with(|| Edge::new(from, to, flow))
    }

    /// Returns the edge `from -> to`, if present.
    #[must_use]
    pub fn get(&self, from: BlockId, to: BlockId) -> Option<&Edge> {
        self.edges.get(&(from, to))
    }

    /// Returns `true` if the edge `from -> to` exists.
    #[must_use]
    pub fn contains(&self, from: BlockId, to: BlockId) -> bool {
        self.edges.contains_key(&(from, to))
    }

    /// Removes the edge `from -> to` and returns it. Missing edges are ignored.
    pub fn remove(&mut self, from: BlockId, to: BlockId) -> Option<Edge> {
        self.edges.remove(&(from, to))
    }

    /// Records the DFS classification of `from -> to`, inserting an unconditional
    /// edge if none exists yet.
    pub fn classify(&mut self, from: BlockId, to: BlockId, kind: DfsEdgeKind) -> &Edge {
        let edge = self
            .edges
            .entry((from, to))
            .or_insert_with(|| Edge::new(from, to, FlowKind::Unconditional));
        edge.dfs = Some(kind);
        edge
    }

    /// Drops every DFS classification, ahead of renumbering.
    pub fn clear_classification(&mut self) {
        for edge in self.edges.values_mut() {
            edge.dfs = None;
        }
    }

    /// Removes every edge into or out of `block`, returning how many were removed.
    ///
    /// `succs` and `preds` are the block's adjacency lists, so only the edges that
    /// touch it are visited. A self-loop appears in both and is counted once.
    pub fn remove_block(
        &mut self,
        block: BlockId,
        succs: &[BlockId],
        preds: &[BlockId],
    ) -> usize {
        let outgoing = succs
            .iter()
            .filter(|&&succ| self.edges.remove(&(block, succ)).is_some())
            .count();
        let incoming = preds
            .iter()
            .filter(|&&pred| self.edges.remove(&(pred, block)).is_some())
            .count();
        outgoing + incoming
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if there are no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterates over all edges in unspecified order.
    ///
    /// [`BlockGraph::edges`](crate::graph::BlockGraph::edges) returns them in block order.
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }
}
