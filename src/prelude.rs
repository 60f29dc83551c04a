//! # cfgdom Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cfgdom library. Import this module to build a graph, finalize it, and query
//! dominance without spelling out module paths.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cfgdom operations
pub use crate::Error;

/// The result type used throughout cfgdom
pub use crate::Result;

/// Configuration of the finalize pipeline
pub use crate::AnalysisConfig;

// ================================================================================================
// Graph Model
// ================================================================================================

/// Graph container, blocks, and block identifiers
pub use crate::graph::{BasicBlock, BlockFlags, BlockGraph, BlockId, BlockSet};

/// Edges and their classification
pub use crate::graph::{DfsEdgeKind, Edge, EdgeList, FlowKind};

// ================================================================================================
// Graph Traits and Adapters
// ================================================================================================

/// Traits the analyses are written against
pub use crate::graph::{GraphBase, Predecessors, RootedGraph, Successors};

/// Views that re-root or reverse a graph
pub use crate::graph::{Reversed, Rooted};

// ================================================================================================
// Analyses
// ================================================================================================

/// Depth-first numbering and plain traversals
pub use crate::analysis::{dfs, postorder, reachable, reverse_postorder, DfsNumbering};

/// Dominator computation
pub use crate::analysis::{
    compute_dominators, compute_dominators_with, compute_post_dominators, iterative_dominators,
};

/// Dominator tree and its walks
pub use crate::analysis::{DominatorIterator, DominatorTree};
