//! Control-flow analyses over the graph traits.
//!
//! Everything here is generic over [`RootedGraph`](crate::graph::RootedGraph) (or the
//! narrower trait an algorithm needs), so it runs unchanged on a
//! [`BlockGraph`](crate::BlockGraph), a [`Reversed`](crate::graph::Reversed) view of one
//! for post-dominators, or any other graph type.
//!
//! # Architecture
//!
//! - [`traversal`] - Plain iterative orders (pre-order, post-order, reverse post-order)
//! - [`numbering`] - Depth-first numbering with edge classification
//! - [`dominators`] - Lengauer-Tarjan and the iterative cross-check
//! - [`tree`] - The dominator tree and its queries (dominance, frontiers, walks)
//!
//! The pipeline runs in that order: numbering feeds Lengauer-Tarjan, whose immediate
//! dominators are turned into a [`DominatorTree`].
//!
//! # Usage
//!
//! ```rust
//! use cfgdom::{analysis::{compute_post_dominators, DfsNumbering}, graph::Rooted, BlockGraph};
//!
//! let mut graph: BlockGraph = BlockGraph::new();
//! let (entry, exit) = graph.entry_and_exit()?;
//! let test = graph.create_block(&[entry])?;
//! let then = graph.consequent(test)?;
//! let otherwise = graph.alternate(test)?;
//! graph.add_predecessors(exit, &[then, otherwise])?;
//!
//! let numbering = DfsNumbering::compute(&Rooted::new(&graph, entry));
//! assert_eq!(numbering.len(), 5);
//!
//! let post = compute_post_dominators(&graph, exit)?;
//! assert_eq!(post.idom(test), Some(exit));
//! # Ok::<(), cfgdom::Error>(())
//! ```

pub mod dominators;
pub mod numbering;
pub mod traversal;
pub mod tree;

pub use dominators::{
    compute_dominators, compute_dominators_with, compute_post_dominators, iterative_dominators,
};
pub use numbering::DfsNumbering;
pub use traversal::{dfs, postorder, reachable, reverse_postorder, DfsIterator};
pub use tree::{DominatorIterator, DominatorTree};
