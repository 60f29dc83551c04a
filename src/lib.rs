// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cfgdom
//!
//! Control-flow graphs and dominance analysis for compilers, decompilers and
//! program analysis tools.
//!
//! `cfgdom` models a function body as a graph of basic blocks with one entry and one
//! exit, numbers it with an iterative depth-first search, and computes its dominator
//! tree with the Lengauer-Tarjan algorithm. The resulting tree answers dominance in
//! constant time and provides the dominance frontiers needed for SSA construction.
//!
//! ## Features
//!
//! - **Arena-backed graph** - Blocks live in a vector indexed by stable [`BlockId`]s
//! - **No recursion** - Numbering, path compression and all walks are iterative, so
//!   graphs with hundreds of thousands of blocks cannot overflow the stack
//! - **Constant-time dominance** - Dominator-tree interval numbers answer `dominates`
//! - **Frontiers** - Dominance frontiers, iterated frontiers, and a pruned variant
//!   for pruned SSA
//! - **Post-dominators** - The same builder over a reversed view rooted at the exit
//! - **Generic analyses** - Every algorithm runs over the traits in [`graph::traits`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cfgdom::prelude::*;
//!
//! // if (c) { x } else { y }
//! let mut graph: BlockGraph = BlockGraph::new();
//! let (entry, exit) = graph.entry_and_exit()?;
//! let test = graph.create_block(&[entry])?;
//! let then = graph.consequent(test)?;
//! let otherwise = graph.alternate(test)?;
//! graph.add_predecessors(exit, &[then, otherwise])?;
//!
//! graph.finalize()?;
//!
//! assert_eq!(graph.idom(exit), Some(test));
//! assert!(graph.dominates(test, then));
//! assert!(!graph.dominates(then, exit));
//! assert_eq!(graph.dominance_frontier(then), &[exit]);
//! # Ok::<(), cfgdom::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`graph`] - Block ids, basic blocks, edges, and the [`BlockGraph`] container
//! - [`analysis`] - Traversals, depth-first numbering, dominators, and the [`DominatorTree`]
//! - [`config`] - [`AnalysisConfig`] switches for the finalize pipeline
//! - [`prelude`] - Re-exports of the commonly used types
//! - [`Error`] and [`Result`] - Error handling
//!
//! ### The finalize pipeline
//!
//! [`BlockGraph::finalize`] prunes unreachable blocks, validates conditional
//! branches, optionally bypasses empty blocks, numbers the graph, and builds the
//! dominator tree (and, if configured, the post-dominator tree). Any later edit marks
//! the graph dirty and discards the results; there is no incremental update.
//!
//! ## Logging
//!
//! Pipeline milestones are reported through the [`log`](https://docs.rs/log) facade at
//! `debug` level and per-block decisions at `trace` level. No logger is installed by
//! the library.
//!
//! ## Error Handling
//!
//! Construction and [`BlockGraph::finalize`] return [`Result`]. Dominance queries
//! about a block outside the current dominator tree are programming errors and panic
//! with a message naming the block:
//!
//! ```rust
//! use cfgdom::{BlockGraph, Error};
//!
//! let mut graph: BlockGraph = BlockGraph::new();
//! let (entry, _) = graph.entry_and_exit()?;
//! let test = graph.create_block(&[entry])?;
//! graph.mark_test(test)?;
//!
//! match graph.finalize() {
//!     Err(Error::InvariantViolation { message, .. }) => println!("rejected: {message}"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # Ok::<(), cfgdom::Error>(())
//! ```
//!
//! ## References
//!
//! - Lengauer, Tarjan. *A Fast Algorithm for Finding Dominators in a Flowgraph* (1979)
//! - Cytron et al. *Efficiently Computing Static Single Assignment Form and the
//!   Control Dependence Graph* (1991)
//! - Cooper, Harvey, Kennedy. *A Simple, Fast Dominance Algorithm* (2001)

pub(crate) mod error;

#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust
/// use cfgdom::prelude::*;
///
/// let graph: BlockGraph = BlockGraph::with_config(AnalysisConfig::paranoid());
/// assert!(graph.is_dirty());
/// ```
pub mod prelude;

/// Traversals, depth-first numbering, dominator computation and the dominator tree.
pub mod analysis;

/// Switches for the [`BlockGraph::finalize`] pipeline.
pub mod config;

/// Block ids, basic blocks, edges, graph traits and the [`BlockGraph`] container.
pub mod graph;

/// `cfgdom` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// ```rust
/// use cfgdom::{BlockGraph, BlockId, Result};
///
/// fn straight_line(len: usize) -> Result<(BlockGraph, BlockId)> {
///     let mut graph = BlockGraph::new();
///     let (entry, exit) = graph.entry_and_exit()?;
///     let mut last = entry;
///     for _ in 0..len {
///         last = graph.create_block(&[last])?;
///     }
///     graph.add_successors(last, &[exit])?;
///     graph.finalize()?;
///     Ok((graph, last))
/// }
///
/// let (graph, last) = straight_line(3)?;
/// assert_eq!(graph.dominators().depth(last), 3);
/// # Ok::<(), cfgdom::Error>(())
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `cfgdom` Error type
///
/// The error type for all fallible operations in this crate.
pub use error::Error;

/// The block graph container, its blocks and their identifiers.
pub use graph::{BasicBlock, BlockGraph, BlockId};

/// Edge classification and branch flow.
pub use graph::{DfsEdgeKind, FlowKind};

/// The dominator tree and its queries.
pub use analysis::DominatorTree;

/// Finalize pipeline configuration.
pub use config::AnalysisConfig;
