//! Control-flow graph model.
//!
//! # Architecture
//!
//! - [`id`] - Stable block identifiers
//! - [`block`] - Basic blocks with their adjacency, payload and analysis fields
//! - [`edge`] - Edge records, flow and DFS classification, and the edge index
//! - [`blocks`] - The [`BlockGraph`] container, construction API and finalize pipeline
//! - [`maintenance`] - Edge redirection, empty-block bypass and block removal
//! - [`set`] - Dense block sets used by the traversals
//! - [`traits`] - The graph traits the analyses are written against
//!
//! # Key Types
//!
//! - [`BlockGraph`] - Arena of blocks with a single entry and exit
//! - [`BasicBlock`] - One straight-line block
//! - [`BlockId`] - Index of a block in its graph, never reused
//! - [`Edge`] - Directed edge with its [`FlowKind`] and [`DfsEdgeKind`]

pub mod block;
pub mod blocks;
pub mod edge;
pub mod id;
pub mod maintenance;
pub mod set;
pub mod traits;

pub use block::{BasicBlock, BlockFlags};
pub use blocks::BlockGraph;
pub use edge::{DfsEdgeKind, Edge, EdgeList, FlowKind};
pub use id::BlockId;
pub use set::{BlockSet, BlockSetIter};
pub use traits::{GraphBase, Predecessors, Reversed, Rooted, RootedGraph, Successors};
